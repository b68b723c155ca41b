// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dynamic range resolution.

use faultline_schema::{Bounds, TopologyRole};
use faultline_topology::TopologySnapshot;

use crate::CodecError;

/// Size a dynamic dimension against one topology snapshot.
///
/// The result is the index domain `[0, N-1]` over the snapshot's list for
/// `role`. An empty list is a resolution failure, not `[0, 0]`: a dimension
/// with no live resources has no valid index, and defaulting would let a
/// sampler pick targets that do not exist. Callers resolve against a freshly
/// fetched snapshot on every derivation and every decode, so bounds always
/// reflect the current cache generation.
pub fn resolve_role(role: TopologyRole, snapshot: &TopologySnapshot) -> Result<Bounds, CodecError> {
    let count = snapshot.count(role);
    Bounds::index_domain(count).map_err(|_| CodecError::RangeResolution {
        role,
        system: snapshot.system.clone(),
        detail: format!(
            "no {role} resources in namespace `{}` (generation {})",
            snapshot.namespace, snapshot.generation
        ),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use faultline_topology::mock::{StaticProvider, Tables};
    use faultline_topology::{CacheManager, Deadline, TopologyProvider};
    use std::sync::Arc;

    fn snapshot_with_workloads(workloads: &[&str]) -> Arc<TopologySnapshot> {
        let provider = Arc::new(StaticProvider::new(Tables {
            workloads: workloads.iter().map(|w| (*w).to_owned()).collect(),
            ..Tables::default()
        }));
        let manager = CacheManager::new(provider as Arc<dyn TopologyProvider>);
        manager.snapshot("shop", "prod", Deadline::none()).unwrap()
    }

    // ── 1. live dimensions resolve to [0, n-1] ──────────────────────────

    #[test]
    fn live_dimension_resolves() {
        let snapshot = snapshot_with_workloads(&["a", "b", "c"]);
        let bounds = resolve_role(TopologyRole::Workloads, &snapshot).unwrap();
        assert_eq!((bounds.min(), bounds.max()), (0, 2));
    }

    // ── 2. empty dimensions are a resolution failure ────────────────────

    #[test]
    fn empty_dimension_fails() {
        let snapshot = snapshot_with_workloads(&["a"]);
        let err = resolve_role(TopologyRole::NetworkPairs, &snapshot).unwrap_err();
        assert!(matches!(
            err,
            CodecError::RangeResolution { role: TopologyRole::NetworkPairs, .. }
        ));
        assert!(err.is_retryable());
    }
}
