// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Topology acquisition errors.

use thiserror::Error;

/// Errors raised while acquiring topology data.
///
/// Both variants are transient: the caller may retry after refreshing
/// topology or widening the deadline. Malformed-input conditions never
/// surface here — they belong to the codec's error set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The provider could not produce a resource table.
    #[error("[TOPOLOGY_UNAVAILABLE] {what} unavailable for system `{system}`: {detail}")]
    Unavailable {
        /// Target system identifier.
        system: String,
        /// Which table was being fetched.
        what: &'static str,
        /// Provider-supplied detail.
        detail: String,
    },
    /// The caller's deadline elapsed before population finished.
    #[error("[TOPOLOGY_DEADLINE] deadline exceeded while {when}")]
    DeadlineExceeded {
        /// The population step that was underway.
        when: &'static str,
    },
}
