// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Action-space schema derivation and record codec for Faultline.
//!
//! This crate turns the fault catalog into a finite, addressable space over
//! one target system's live topology, and moves configurations between
//! their three representations:
//!
//! - **typed record** ([`FaultSpec`] and the catalog types) — what samplers
//!   and the execution layer work with;
//! - **generic tree** ([`faultline_schema::Node`]) — what an integer-vector
//!   policy populates, one value per leaf;
//! - **wire map** — the JSON form, via `faultline-schema`.
//!
//! Derivation ([`derive_schema`]) and both codec directions re-resolve every
//! dynamic bound against a snapshot fetched at call time, so validation
//! always reflects the current cache generation. All conversions are total:
//! they either fully succeed or fail with a [`CodecError`] naming the field,
//! the offending value, and the resolved bounds.

mod blast;
mod catalog;
mod codec;
mod error;
mod resolve;
mod schema;
mod space;
mod value;

pub use blast::{expected_blast_radius, BlastRadius};
pub use catalog::{
    ContainerKill, DatabaseFault, DatabaseFaultMode, DnsAction, DnsFault, FaultSpec, HttpAbort,
    HttpDelay, NetworkDelay, PodKill, RuntimeFault, RuntimeFaultMode, TimeSkew,
};
pub use codec::{decode_node, decode_record_node, encode_record, encode_record_value};
pub use error::CodecError;
pub use resolve::resolve_role;
pub use schema::derive_schema;
pub use space::ActionSpace;
pub use value::{Configurable, FieldValue, RecordValue};
