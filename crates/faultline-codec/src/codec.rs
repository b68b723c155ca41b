// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The record codec: populated trees ↔ value trees ↔ typed records.
//!
//! Both directions re-validate every leaf against bounds resolved at call
//! time — static bounds from the declaration, dynamic bounds from the
//! snapshot the caller fetched for this operation. A conversion either fully
//! succeeds or fails with the first violation; no partially-populated record
//! or tree ever escapes.

use std::collections::BTreeMap;

use faultline_schema::{Bounds, FieldDescriptor, FieldKind, IntWidth, Node, RecordDescriptor};
use faultline_topology::TopologySnapshot;

use crate::schema::{index_bounds, position_key};
use crate::{resolve_role, CodecError, Configurable, FieldValue, RecordValue};

/// Decode a populated tree into a typed record.
pub fn decode_node<T: Configurable>(
    node: &Node,
    snapshot: &TopologySnapshot,
) -> Result<T, CodecError> {
    let descriptor = T::descriptor()?;
    let value = decode_record_node(descriptor, node, snapshot)?;
    T::from_value(&value)
}

/// Encode a typed record into a populated tree.
///
/// The inverse of [`decode_node`], used to externalize a concrete
/// configuration (for storage or transport) after a sampler produced it
/// directly as a record. Validation is identical to the decode path.
pub fn encode_record<T: Configurable>(
    record: &T,
    snapshot: &TopologySnapshot,
) -> Result<Node, CodecError> {
    let value = record.to_value()?;
    encode_record_value(&value, snapshot)
}

/// Walk a populated node against `descriptor`, validating as we go.
pub fn decode_record_node(
    descriptor: &'static RecordDescriptor,
    node: &Node,
    snapshot: &TopologySnapshot,
) -> Result<RecordValue, CodecError> {
    if node.value.is_some() && node.children.is_empty() {
        return Err(CodecError::type_mismatch(
            descriptor.name,
            "expected a record subtree, found a bare value",
        ));
    }
    let field_count = position_key(descriptor.fields.len());
    for position in node.children.keys() {
        if *position >= field_count {
            return Err(CodecError::type_mismatch(
                descriptor.name,
                format!("no declared field at position {position}"),
            ));
        }
    }

    let mut value = RecordValue::empty(descriptor);
    let mut populated = 0_usize;
    for (position, field) in descriptor.fields.iter().enumerate() {
        let child = node.child(position_key(position));
        match field.kind {
            FieldKind::Static { bounds, width } => {
                if let Some(raw) = leaf_value(field, child)? {
                    check_leaf(field.name, raw, bounds, width)?;
                    value.set_at(position, FieldValue::Int(raw));
                    populated += 1;
                } else {
                    require_presence(descriptor, field)?;
                }
            }
            FieldKind::Dynamic { role, width } => {
                if let Some(raw) = leaf_value(field, child)? {
                    let bounds = resolve_role(role, snapshot)?;
                    check_leaf(field.name, raw, bounds, width)?;
                    value.set_at(position, FieldValue::Int(raw));
                    populated += 1;
                } else {
                    require_presence(descriptor, field)?;
                }
            }
            FieldKind::Record(nested) => match child {
                Some(subtree) if !subtree.children.is_empty() => {
                    let inner = decode_record_node(nested, subtree, snapshot)?;
                    value.set_at(position, FieldValue::Record(inner));
                    populated += 1;
                }
                Some(subtree) if subtree.value.is_some() => {
                    return Err(CodecError::type_mismatch(
                        field.name,
                        "expected a record subtree, found a bare value",
                    ));
                }
                _ => require_presence(descriptor, field)?,
            },
        }
    }

    if descriptor.selector && populated != 1 {
        return Err(CodecError::SelectorCardinality {
            record: descriptor.name,
            selected: populated,
        });
    }
    Ok(value)
}

/// Walk a value tree back into a populated node, validating as we go.
pub fn encode_record_value(
    value: &RecordValue,
    snapshot: &TopologySnapshot,
) -> Result<Node, CodecError> {
    let descriptor = value.descriptor();
    let mut children = BTreeMap::new();
    let mut populated = 0_usize;
    for (position, field) in descriptor.fields.iter().enumerate() {
        let Some(slot) = value.slot(position) else {
            require_presence(descriptor, field)?;
            continue;
        };
        populated += 1;
        let child = match (field.kind, slot) {
            (FieldKind::Static { bounds, width }, FieldValue::Int(raw)) => {
                check_leaf(field.name, *raw, bounds, width)?;
                Node::leaf(field.name, bounds).with_value(*raw)
            }
            (FieldKind::Dynamic { role, width }, FieldValue::Int(raw)) => {
                let bounds = resolve_role(role, snapshot)?;
                check_leaf(field.name, *raw, bounds, width)?;
                Node::leaf(field.name, bounds).with_value(*raw)
            }
            (FieldKind::Record(nested), FieldValue::Record(inner)) => {
                if !std::ptr::eq(nested, inner.descriptor()) {
                    return Err(CodecError::type_mismatch(
                        field.name,
                        format!(
                            "value is a `{}` record, field declares `{}`",
                            inner.descriptor().name,
                            nested.name
                        ),
                    ));
                }
                let mut node = encode_record_value(inner, snapshot)?;
                node.name = Some(field.name.to_owned());
                node
            }
            (FieldKind::Record(_), FieldValue::Int(_)) => {
                return Err(CodecError::type_mismatch(
                    field.name,
                    "expected a nested record value, found an integer",
                ));
            }
            (_, FieldValue::Record(_)) => {
                return Err(CodecError::type_mismatch(
                    field.name,
                    "expected an integer value, found a nested record",
                ));
            }
        };
        let child = match field.description {
            Some(text) => child.with_description(text),
            None => child,
        };
        children.insert(position_key(position), child);
    }

    if descriptor.selector && populated != 1 {
        return Err(CodecError::SelectorCardinality {
            record: descriptor.name,
            selected: populated,
        });
    }

    let mut node = Node::internal(descriptor.name, children);
    // Bound the declared child-index domain even when optional fields are
    // omitted from the encoded form.
    node.bounds = Some(index_bounds(descriptor)?);
    Ok(node)
}

/// The populated value of a leaf child, `None` when absent or unpopulated.
fn leaf_value(field: &FieldDescriptor, child: Option<&Node>) -> Result<Option<i64>, CodecError> {
    match child {
        None => Ok(None),
        Some(node) if !node.children.is_empty() => Err(CodecError::type_mismatch(
            field.name,
            "expected a leaf, found a subtree",
        )),
        Some(node) => Ok(node.value),
    }
}

fn check_leaf(field: &str, value: i64, bounds: Bounds, width: IntWidth) -> Result<(), CodecError> {
    if !bounds.contains(value) {
        return Err(CodecError::OutOfRange {
            field: field.to_owned(),
            value,
            min: bounds.min(),
            max: bounds.max(),
        });
    }
    if !width.admits(value) {
        return Err(CodecError::Width {
            field: field.to_owned(),
            value,
            width,
        });
    }
    Ok(())
}

/// Absence is fine for optional fields and inside selector records (where
/// cardinality is enforced after the walk); required otherwise.
fn require_presence(
    descriptor: &RecordDescriptor,
    field: &FieldDescriptor,
) -> Result<(), CodecError> {
    if field.optional || descriptor.selector {
        return Ok(());
    }
    Err(CodecError::type_mismatch(
        field.name,
        format!("required field of `{}` absent", descriptor.name),
    ))
}
