// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-process registry of system caches.

use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::{
    Deadline, GrpcRoutePolicy, RpcRoutePolicy, SystemCache, TopologyError, TopologyProvider,
    TopologySnapshot,
};

/// Registry of [`SystemCache`]s keyed by target-system identifier.
///
/// Passed explicitly into every call site — there is no process-global
/// instance, so tests and embedders compose independent managers freely.
/// `system_cache` get-or-creates atomically: at most one cache object exists
/// per system until it is explicitly cleared. Creating a cache is cheap;
/// the expensive provider round happens inside the cache's own populate
/// lock, so building one system's topology never blocks another system's.
pub struct CacheManager {
    provider: Arc<dyn TopologyProvider>,
    policy: Arc<dyn RpcRoutePolicy>,
    caches: RwLock<FxHashMap<String, Arc<SystemCache>>>,
}

impl CacheManager {
    /// A manager over `provider` with the default gRPC route policy.
    pub fn new(provider: Arc<dyn TopologyProvider>) -> Self {
        Self::with_policy(provider, Arc::new(GrpcRoutePolicy))
    }

    /// A manager with an explicit RPC-route classification policy.
    pub fn with_policy(
        provider: Arc<dyn TopologyProvider>,
        policy: Arc<dyn RpcRoutePolicy>,
    ) -> Self {
        Self {
            provider,
            policy,
            caches: RwLock::new(FxHashMap::default()),
        }
    }

    /// The cache for `system`, constructing it on first request.
    pub fn system_cache(&self, system: &str) -> Arc<SystemCache> {
        if let Some(cache) = self
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(system)
        {
            return Arc::clone(cache);
        }
        let mut caches = self.caches.write().unwrap_or_else(PoisonError::into_inner);
        let cache = caches.entry(system.to_owned()).or_insert_with(|| {
            tracing::debug!(system, "constructed system cache");
            Arc::new(SystemCache::new(
                system,
                Arc::clone(&self.provider),
                Arc::clone(&self.policy),
            ))
        });
        Arc::clone(cache)
    }

    /// Convenience: the current snapshot for (`system`, `namespace`).
    pub fn snapshot(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Arc<TopologySnapshot>, TopologyError> {
        self.system_cache(system).snapshot(namespace, deadline)
    }

    /// Invalidate one system's cache; the next access rebuilds it.
    pub fn invalidate(&self, system: &str) {
        if let Some(cache) = self
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(system)
        {
            cache.invalidate();
        }
    }

    /// Drop a system's cache object entirely.
    pub fn clear(&self, system: &str) {
        self.caches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(system);
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let systems: Vec<String> = self
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("CacheManager")
            .field("systems", &systems)
            .finish_non_exhaustive()
    }
}
