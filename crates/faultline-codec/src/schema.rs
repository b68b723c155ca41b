// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Schema derivation: descriptor + live topology → template tree.

use std::collections::BTreeMap;

use faultline_schema::{Bounds, FieldKind, Node, RecordDescriptor};
use faultline_topology::TopologySnapshot;

use crate::{resolve_role, CodecError};

/// Derive the template tree for a record type against one snapshot.
///
/// The template carries no assigned values. Static bounds come from the
/// declaration verbatim; dynamic bounds resolve against `snapshot`; nested
/// records recurse, each internal node bounding its child-index domain
/// `[0, field_count - 1]`. Any resolution failure fails the whole
/// derivation — partial schemas are never returned.
pub fn derive_schema(
    descriptor: &RecordDescriptor,
    snapshot: &TopologySnapshot,
) -> Result<Node, CodecError> {
    let mut children = BTreeMap::new();
    for (position, field) in descriptor.fields.iter().enumerate() {
        let mut child = match field.kind {
            FieldKind::Static { bounds, .. } => Node::leaf(field.name, bounds),
            FieldKind::Dynamic { role, .. } => {
                Node::leaf(field.name, resolve_role(role, snapshot)?)
            }
            FieldKind::Record(nested) => {
                let mut node = derive_schema(nested, snapshot)?;
                node.name = Some(field.name.to_owned());
                node
            }
        };
        if let Some(text) = field.description {
            child = child.with_description(text);
        }
        children.insert(position_key(position), child);
    }
    Ok(Node::internal(descriptor.name, children))
}

pub(crate) fn index_bounds(descriptor: &RecordDescriptor) -> Result<Bounds, CodecError> {
    Ok(Bounds::index_domain(descriptor.fields.len())?)
}

pub(crate) fn position_key(position: usize) -> u32 {
    // Field counts are tiny; positions always fit.
    u32::try_from(position).unwrap_or(u32::MAX)
}
