// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire-map form of the action-space tree.
//!
//! The wire shape is conceptually JSON:
//!
//! ```json
//! { "name"?, "range"?, "children"?: { "<index>": … }, "description"?, "value"? }
//! ```
//!
//! Children keys are stringified structural positions; `serde_json` renders
//! the `BTreeMap<u32, _>` keys that way on its own. A wire node is
//! recoverable only if it carries `value` and/or `children`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Bounds, Node, WireError};

/// How much schema metadata the wire form keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMode {
    /// Keep every field of every node.
    Full,
    /// Omit `name`/`range`/`description` on concrete nodes, producing the
    /// compact payloads used for transport and storage.
    ExcludeUnset,
}

/// JSON-compatible mirror of [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireNode {
    /// Field label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Inclusive bounds, wire name `range`.
    #[serde(rename = "range", skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Assigned integer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    /// Children keyed by stringified structural position.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<u32, WireNode>,
}

impl WireNode {
    /// Mirror a node into its wire form.
    pub fn from_node(node: &Node, mode: WireMode) -> Self {
        let compact = matches!(mode, WireMode::ExcludeUnset) && node.is_concrete();
        Self {
            name: if compact { None } else { node.name.clone() },
            bounds: if compact { None } else { node.bounds },
            description: if compact { None } else { node.description.clone() },
            value: node.value,
            children: node
                .children
                .iter()
                .map(|(idx, child)| (*idx, Self::from_node(child, mode)))
                .collect(),
        }
    }

    /// Recover a node, rejecting wire nodes with neither value nor children.
    pub fn try_into_node(self) -> Result<Node, WireError> {
        self.into_node_at("$")
    }

    fn into_node_at(self, path: &str) -> Result<Node, WireError> {
        if self.value.is_none() && self.children.is_empty() {
            return Err(WireError::MissingContent {
                path: path.to_owned(),
            });
        }
        let mut children = BTreeMap::new();
        for (idx, child) in self.children {
            let child_path = format!("{path}/{idx}");
            children.insert(idx, child.into_node_at(&child_path)?);
        }
        Ok(Node {
            name: self.name,
            bounds: self.bounds,
            description: self.description,
            value: self.value,
            children,
        })
    }
}

/// Serialize a node to its JSON wire-map.
pub fn to_wire_json(node: &Node, mode: WireMode) -> Result<serde_json::Value, WireError> {
    Ok(serde_json::to_value(WireNode::from_node(node, mode))?)
}

/// Recover a node from its JSON wire-map.
pub fn node_from_wire_json(value: serde_json::Value) -> Result<Node, WireError> {
    let wire: WireNode = serde_json::from_value(value)?;
    wire.try_into_node()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn populated_tree() -> Node {
        let mut children = BTreeMap::new();
        children.insert(
            0,
            Node::leaf("latency_ms", Bounds::new(1, 2000).unwrap())
                .with_description("injected delay")
                .with_value(250),
        );
        children.insert(
            1,
            Node::leaf("jitter_ms", Bounds::new(0, 500).unwrap()).with_value(40),
        );
        Node::internal("network_delay", children)
    }

    // ── 1. full mode keeps schema metadata ──────────────────────────────

    #[test]
    fn full_mode_keeps_metadata() {
        let json = to_wire_json(&populated_tree(), WireMode::Full).unwrap();
        assert_eq!(json["name"], "network_delay");
        assert_eq!(json["range"][1], 1);
        assert_eq!(json["children"]["0"]["name"], "latency_ms");
        assert_eq!(json["children"]["0"]["description"], "injected delay");
    }

    // ── 2. exclude-unset drops metadata on concrete nodes ───────────────

    #[test]
    fn exclude_unset_drops_metadata_when_concrete() {
        let json = to_wire_json(&populated_tree(), WireMode::ExcludeUnset).unwrap();
        assert!(json.get("name").is_none());
        assert!(json.get("range").is_none());
        assert_eq!(json["children"]["0"]["value"], 250);
        assert!(json["children"]["0"].get("name").is_none());
    }

    // ── 3. exclude-unset keeps metadata on template nodes ───────────────

    #[test]
    fn exclude_unset_keeps_metadata_on_templates() {
        let mut template = populated_tree();
        template.children.get_mut(&1).unwrap().value = None;
        let json = to_wire_json(&template, WireMode::ExcludeUnset).unwrap();
        // Not concrete: one leaf is unpopulated, so metadata survives.
        assert_eq!(json["name"], "network_delay");
        assert_eq!(json["children"]["1"]["name"], "jitter_ms");
    }

    // ── 4. wire round-trip is structural identity ───────────────────────

    #[test]
    fn wire_round_trip_identity() {
        let node = populated_tree();
        let json = to_wire_json(&node, WireMode::Full).unwrap();
        let back = node_from_wire_json(json).unwrap();
        assert_eq!(back, node);
    }

    // ── 5. a node without value or children is invalid ──────────────────

    #[test]
    fn empty_wire_node_rejected() {
        let err = node_from_wire_json(serde_json::json!({ "name": "hollow" })).unwrap_err();
        assert!(matches!(err, WireError::MissingContent { ref path } if path == "$"));

        let nested = serde_json::json!({
            "value": 1,
            "children": { "0": { "name": "empty child" } }
        });
        let err = node_from_wire_json(nested).unwrap_err();
        assert!(matches!(err, WireError::MissingContent { ref path } if path == "$/0"));
    }

    // ── 6. children keys survive as stringified positions ───────────────

    #[test]
    fn children_keys_are_stringified_positions() {
        let json = to_wire_json(&populated_tree(), WireMode::Full).unwrap();
        let keys: Vec<&String> = json["children"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["0", "1"]);
    }
}
