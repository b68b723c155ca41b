// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for schema declaration and wire-map recovery.

use thiserror::Error;

/// Errors raised while declaring or validating a configuration schema.
///
/// Every variant signals a configuration-type bug: the declaration itself is
/// malformed. These are not retryable — the type has to change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A `"<min>-<max>"` range declaration could not be parsed.
    #[error("[SCHEMA_RANGE_SPEC] malformed range declaration `{spec}`")]
    InvalidRangeSpec {
        /// The declaration text as written.
        spec: String,
    },
    /// Declared or computed bounds with `min > max`.
    #[error("[SCHEMA_BOUNDS] inverted bounds: min {min} > max {max}")]
    InvertedBounds {
        /// Lower bound as declared.
        min: i64,
        /// Upper bound as declared.
        max: i64,
    },
    /// A record descriptor with no fields has no addressable space.
    #[error("[SCHEMA_EMPTY_RECORD] record `{record}` declares no fields")]
    EmptyRecord {
        /// Name of the offending record type.
        record: &'static str,
    },
    /// Two fields of one record share a name.
    #[error("[SCHEMA_DUPLICATE_FIELD] record `{record}` declares field `{field}` more than once")]
    DuplicateField {
        /// Name of the offending record type.
        record: &'static str,
        /// The duplicated field name.
        field: &'static str,
    },
}

/// Errors raised while recovering a [`Node`](crate::Node) from its wire-map
/// form.
#[derive(Debug, Error)]
pub enum WireError {
    /// A wire node must carry `value` and/or `children` to be recoverable.
    #[error("[WIRE_EMPTY_NODE] node at `{path}` carries neither value nor children")]
    MissingContent {
        /// Slash-separated child-index path from the root (root is `$`).
        path: String,
    },
    /// The payload was not valid JSON for the wire-map shape.
    #[error("[WIRE_JSON] {0}")]
    Json(#[from] serde_json::Error),
}
