// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generic action-space tree and field descriptors for Faultline.
//!
//! This crate holds the pure data layer of the action-space encoder:
//!
//! - [`Bounds`] — inclusive integer bounds, parsed from the `"<min>-<max>"`
//!   declaration vocabulary and carried on the wire as `[min, max]`.
//! - [`Node`] — a generic tree element describing either a value domain
//!   (leaf) or a child-index domain (internal), with an optional assigned
//!   value. Children are keyed by integer position.
//! - [`WireNode`] — the JSON-compatible wire-map mirror of [`Node`], with a
//!   compact [`WireMode::ExcludeUnset`] form for transport and storage.
//! - [`RecordDescriptor`] / [`FieldDescriptor`] — declarative, compile-time
//!   schemas for configuration record types. Descriptors replace runtime
//!   field reflection: each configuration type enumerates its fields once
//!   and the deriver/codec walk that list.
//!
//! # Determinism Invariant
//!
//! Nothing in this crate exposes unordered iteration. Children are held in a
//! `BTreeMap` keyed by position and descriptors are ordered lists, so every
//! walk over a schema or a populated tree visits fields in declaration order.

mod bounds;
mod descriptor;
mod error;
mod node;
mod wire;

pub use bounds::Bounds;
pub use descriptor::{
    FieldDescriptor, FieldKind, IntWidth, RecordBuilder, RecordDescriptor, TopologyRole,
};
pub use error::{SchemaError, WireError};
pub use node::Node;
pub use wire::{node_from_wire_json, to_wire_json, WireMode, WireNode};
