// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Codec error taxonomy.

use faultline_schema::{IntWidth, SchemaError, TopologyRole, WireError};
use faultline_topology::TopologyError;
use thiserror::Error;

/// Errors raised while deriving schemas or converting between records,
/// trees, and wire maps.
///
/// Only the topology-flavored variants ([`Topology`](CodecError::Topology),
/// [`RangeResolution`](CodecError::RangeResolution)) are retryable — see
/// [`is_retryable`](CodecError::is_retryable). Everything else signals a
/// malformed request or a configuration-type bug and will fail identically
/// until the input changes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed configuration-type declaration.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Malformed wire-map payload.
    #[error(transparent)]
    Wire(#[from] WireError),
    /// The topology cache could not populate from its provider.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// A dynamic dimension could not be sized against live topology.
    #[error("[RANGE_RESOLUTION] cannot size `{role}` for system `{system}`: {detail}")]
    RangeResolution {
        /// The dimension being resolved.
        role: TopologyRole,
        /// Target system identifier.
        system: String,
        /// What went wrong.
        detail: String,
    },
    /// A supplied value violates the field's resolved bounds.
    #[error("[OUT_OF_RANGE] field `{field}`: value {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Field the value was supplied for.
        field: String,
        /// The offending value.
        value: i64,
        /// Resolved lower bound.
        min: i64,
        /// Resolved upper bound.
        max: i64,
    },
    /// A supplied value does not fit the field's declared integer width.
    #[error("[OUT_OF_RANGE_WIDTH] field `{field}`: value {value} does not fit {width}")]
    Width {
        /// Field the value was supplied for.
        field: String,
        /// The offending value.
        value: i64,
        /// Declared width.
        width: IntWidth,
    },
    /// A tagged-union record with anything other than exactly one populated
    /// variant.
    #[error(
        "[SELECTOR_CARDINALITY] record `{record}`: {selected} variant fields populated, exactly one required"
    )]
    SelectorCardinality {
        /// The union record type.
        record: &'static str,
        /// How many variant fields were populated.
        selected: usize,
    },
    /// The populated tree or value does not match the declared shape.
    #[error("[TYPE_MISMATCH] field `{field}`: {detail}")]
    TypeMismatch {
        /// Field (or record) where the shapes diverge.
        field: String,
        /// What diverged.
        detail: String,
    },
}

impl CodecError {
    /// Whether retrying after refreshing topology can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Topology(_) | Self::RangeResolution { .. })
    }

    pub(crate) fn type_mismatch(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            detail: detail.into(),
        }
    }
}
