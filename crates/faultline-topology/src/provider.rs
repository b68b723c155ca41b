// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Topology provider port and deadline time-boxing.

use std::time::{Duration, Instant};

use crate::{
    ContainerRecord, DatabaseOperation, EndpointPair, RuntimeMethod, TopologyError,
};

/// Wall-clock budget for a topology acquisition.
///
/// Cache population can sit on an interactive request path while the provider
/// performs network I/O, so every provider call receives the caller's
/// deadline. [`Deadline::none`] means unbounded. The cache checks the
/// deadline between table fetches; providers should also honor it inside
/// long-running calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No time bound.
    pub fn none() -> Self {
        Self(None)
    }

    /// Expire `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self(Some(Instant::now() + budget))
    }

    /// Expire at the given instant.
    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    /// Whether the deadline has elapsed.
    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Remaining budget, if bounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Fail with [`TopologyError::DeadlineExceeded`] if elapsed.
    ///
    /// `when` names the step underway, for the error message.
    pub fn check(&self, when: &'static str) -> Result<(), TopologyError> {
        if self.expired() {
            return Err(TopologyError::DeadlineExceeded { when });
        }
        Ok(())
    }
}

/// Port to whatever supplies raw per-system resource tables.
///
/// Implementations flatten and deduplicate their own source (a live cluster,
/// an offline trace pipeline); the cache applies the deterministic sorts and
/// derived views on top. All methods are synchronous and must respect the
/// passed [`Deadline`].
pub trait TopologyProvider: Send + Sync {
    /// Workload identifiers for the namespace.
    fn workload_labels(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<String>, TopologyError>;

    /// Observed endpoint pairs for the namespace.
    fn endpoint_pairs(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<EndpointPair>, TopologyError>;

    /// Observed database operations for the namespace, all engines.
    fn database_operations(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<DatabaseOperation>, TopologyError>;

    /// Observed language-runtime methods for the namespace.
    fn runtime_methods(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<RuntimeMethod>, TopologyError>;

    /// Running containers for the namespace.
    fn containers(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<ContainerRecord>, TopologyError>;
}
