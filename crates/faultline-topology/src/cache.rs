// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-system topology cache with generation snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use faultline_schema::TopologyRole;
use rustc_hash::FxHashMap;

use crate::{
    aggregate_network_pairs, derive_dns_pairs, filter_database_operations, ContainerRecord,
    DatabaseOperation, Deadline, DnsPair, EndpointPair, NetworkPair, RpcRoutePolicy,
    RuntimeMethod, TopologyError, TopologyProvider,
};

/// One fully-built generation of a system's topology for one namespace.
///
/// Snapshots are immutable once published. Every list is sorted by its
/// deterministic key and deduplicated, so index `i` denotes the same record
/// for the snapshot's whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologySnapshot {
    /// Target system identifier.
    pub system: String,
    /// Namespace the lists were built for.
    pub namespace: String,
    /// Cache generation this snapshot belongs to.
    pub generation: u64,
    /// Sorted workload labels.
    pub workloads: Vec<String>,
    /// Sorted endpoint pairs.
    pub endpoints: Vec<EndpointPair>,
    /// Aggregated network-dependency pairs.
    pub network_pairs: Vec<NetworkPair>,
    /// DNS-fault-eligible pairs.
    pub dns_pairs: Vec<DnsPair>,
    /// Actionable database operations (supported engine only).
    pub database_operations: Vec<DatabaseOperation>,
    /// Sorted language-runtime methods.
    pub runtime_methods: Vec<RuntimeMethod>,
    /// Sorted containers.
    pub containers: Vec<ContainerRecord>,
}

impl TopologySnapshot {
    /// Cardinality of the list backing `role`.
    pub fn count(&self, role: TopologyRole) -> usize {
        match role {
            TopologyRole::Workloads => self.workloads.len(),
            TopologyRole::Containers => self.containers.len(),
            TopologyRole::EndpointPairs => self.endpoints.len(),
            TopologyRole::NetworkPairs => self.network_pairs.len(),
            TopologyRole::DnsPairs => self.dns_pairs.len(),
            TopologyRole::DatabaseOperations => self.database_operations.len(),
            TopologyRole::RuntimeMethods => self.runtime_methods.len(),
        }
    }

    /// Workload label at `index`.
    pub fn workload(&self, index: usize) -> Option<&str> {
        self.workloads.get(index).map(String::as_str)
    }

    /// Endpoint pair at `index`.
    pub fn endpoint(&self, index: usize) -> Option<&EndpointPair> {
        self.endpoints.get(index)
    }

    /// Network-dependency pair at `index`.
    pub fn network_pair(&self, index: usize) -> Option<&NetworkPair> {
        self.network_pairs.get(index)
    }

    /// DNS-eligible pair at `index`.
    pub fn dns_pair(&self, index: usize) -> Option<&DnsPair> {
        self.dns_pairs.get(index)
    }

    /// Database operation at `index`.
    pub fn database_operation(&self, index: usize) -> Option<&DatabaseOperation> {
        self.database_operations.get(index)
    }

    /// Runtime method at `index`.
    pub fn runtime_method(&self, index: usize) -> Option<&RuntimeMethod> {
        self.runtime_methods.get(index)
    }

    /// Container at `index`.
    pub fn container(&self, index: usize) -> Option<&ContainerRecord> {
        self.containers.get(index)
    }
}

/// Lazily-populated topology cache for one target system.
///
/// Snapshots are memoized per namespace. Population runs under a dedicated
/// mutex so concurrent first accesses trigger exactly one provider round per
/// generation, and [`invalidate`](SystemCache::invalidate) serializes with
/// any in-flight population. Reads of an already-populated namespace take a
/// shared lock and clone an `Arc` — non-blocking and side-effect free.
pub struct SystemCache {
    system: String,
    provider: Arc<dyn TopologyProvider>,
    policy: Arc<dyn RpcRoutePolicy>,
    snapshots: RwLock<FxHashMap<String, Arc<TopologySnapshot>>>,
    populate: Mutex<()>,
    generation: AtomicU64,
}

impl SystemCache {
    pub(crate) fn new(
        system: impl Into<String>,
        provider: Arc<dyn TopologyProvider>,
        policy: Arc<dyn RpcRoutePolicy>,
    ) -> Self {
        Self {
            system: system.into(),
            provider,
            policy,
            snapshots: RwLock::new(FxHashMap::default()),
            populate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Target system this cache serves.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Current generation counter (bumped on every invalidation).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The current snapshot for `namespace`, populating it if absent.
    pub fn snapshot(
        &self,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Arc<TopologySnapshot>, TopologyError> {
        if let Some(snapshot) = self.read_snapshots().get(namespace) {
            return Ok(Arc::clone(snapshot));
        }

        let _populating = self.lock_populate();
        // Lost the race: another caller published while we waited.
        if let Some(snapshot) = self.read_snapshots().get(namespace) {
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = Arc::new(self.build_snapshot(namespace, deadline)?);
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(namespace.to_owned(), Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Drop every namespace's lists; the next access rebuilds a new
    /// generation.
    pub fn invalidate(&self) {
        let _populating = self.lock_populate();
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(system = %self.system, generation, "topology cache invalidated");
    }

    fn read_snapshots(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, FxHashMap<String, Arc<TopologySnapshot>>> {
        self.snapshots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_populate(&self) -> MutexGuard<'_, ()> {
        self.populate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn build_snapshot(
        &self,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<TopologySnapshot, TopologyError> {
        let system = self.system.as_str();

        deadline.check("listing workload labels")?;
        let mut workloads = self.provider.workload_labels(system, namespace, deadline)?;
        workloads.sort();
        workloads.dedup();

        deadline.check("listing endpoint pairs")?;
        let mut endpoints = self.provider.endpoint_pairs(system, namespace, deadline)?;
        endpoints.sort_by(|a, b| {
            (&a.caller, &a.callee, &a.route, &a.method, a.callee_port, &a.span_name)
                .cmp(&(&b.caller, &b.callee, &b.route, &b.method, b.callee_port, &b.span_name))
        });
        endpoints.dedup();

        deadline.check("listing database operations")?;
        let database_operations =
            filter_database_operations(self.provider.database_operations(system, namespace, deadline)?);

        deadline.check("listing runtime methods")?;
        let mut runtime_methods = self.provider.runtime_methods(system, namespace, deadline)?;
        runtime_methods.sort_by(|a, b| {
            (&a.caller, &a.class, &a.method).cmp(&(&b.caller, &b.class, &b.method))
        });
        runtime_methods.dedup();

        deadline.check("listing containers")?;
        let mut containers = self.provider.containers(system, namespace, deadline)?;
        containers.sort_by(|a, b| {
            (&a.pod, &a.workload, &a.container).cmp(&(&b.pod, &b.workload, &b.container))
        });
        containers.dedup();

        let network_pairs = aggregate_network_pairs(&endpoints);
        let dns_pairs = derive_dns_pairs(&endpoints, self.policy.as_ref());

        let generation = self.generation();
        tracing::debug!(
            system,
            namespace,
            generation,
            workloads = workloads.len(),
            endpoints = endpoints.len(),
            network_pairs = network_pairs.len(),
            dns_pairs = dns_pairs.len(),
            database_operations = database_operations.len(),
            runtime_methods = runtime_methods.len(),
            containers = containers.len(),
            "topology cache populated"
        );

        Ok(TopologySnapshot {
            system: system.to_owned(),
            namespace: namespace.to_owned(),
            generation,
            workloads,
            endpoints,
            network_pairs,
            dns_pairs,
            database_operations,
            runtime_methods,
            containers,
        })
    }
}

impl std::fmt::Debug for SystemCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemCache")
            .field("system", &self.system)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{StaticProvider, Tables};
    use crate::GrpcRoutePolicy;

    fn cache_over(tables: Tables) -> (Arc<StaticProvider>, SystemCache) {
        let provider = Arc::new(StaticProvider::new(tables));
        let cache = SystemCache::new(
            "shop",
            Arc::clone(&provider) as Arc<dyn TopologyProvider>,
            Arc::new(GrpcRoutePolicy),
        );
        (provider, cache)
    }

    fn three_workloads() -> Tables {
        Tables {
            workloads: vec!["cart".to_owned(), "frontend".to_owned(), "payments".to_owned()],
            ..Tables::default()
        }
    }

    // ── 1. population is lazy and memoized ──────────────────────────────

    #[test]
    fn population_is_lazy_and_memoized() {
        let (provider, cache) = cache_over(three_workloads());
        assert_eq!(provider.rounds(), 0);
        let first = cache.snapshot("prod", Deadline::none()).unwrap();
        let second = cache.snapshot("prod", Deadline::none()).unwrap();
        assert_eq!(provider.rounds(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    // ── 2. workloads come back sorted and deduplicated ──────────────────

    #[test]
    fn workloads_sorted_and_deduplicated() {
        let tables = Tables {
            workloads: vec!["payments".to_owned(), "cart".to_owned(), "cart".to_owned()],
            ..Tables::default()
        };
        let (_, cache) = cache_over(tables);
        let snapshot = cache.snapshot("prod", Deadline::none()).unwrap();
        assert_eq!(snapshot.workloads, ["cart", "payments"]);
        assert_eq!(snapshot.count(TopologyRole::Workloads), 2);
    }

    // ── 3. invalidate starts a new generation ───────────────────────────

    #[test]
    fn invalidate_starts_new_generation() {
        let (provider, cache) = cache_over(three_workloads());
        let before = cache.snapshot("prod", Deadline::none()).unwrap();
        assert_eq!(before.generation, 0);

        provider.set_tables(Tables {
            workloads: vec!["cart".to_owned()],
            ..Tables::default()
        });
        // Tables changed, but the published generation is immutable.
        let same = cache.snapshot("prod", Deadline::none()).unwrap();
        assert_eq!(same.workloads.len(), 3);

        cache.invalidate();
        let after = cache.snapshot("prod", Deadline::none()).unwrap();
        assert_eq!(after.generation, 1);
        assert_eq!(after.workloads, ["cart"]);
        assert_eq!(provider.rounds(), 2);
    }

    // ── 4. provider failure propagates and leaves nothing published ─────

    #[test]
    fn provider_failure_publishes_nothing() {
        let (provider, cache) = cache_over(three_workloads());
        provider.set_failing(true);
        let err = cache.snapshot("prod", Deadline::none()).unwrap_err();
        assert!(matches!(err, TopologyError::Unavailable { .. }));

        provider.set_failing(false);
        let snapshot = cache.snapshot("prod", Deadline::none()).unwrap();
        assert_eq!(snapshot.workloads.len(), 3);
    }

    // ── 5. expired deadline fails population before provider calls ──────

    #[test]
    fn expired_deadline_fails_population() {
        let (provider, cache) = cache_over(three_workloads());
        let expired = Deadline::at(std::time::Instant::now() - std::time::Duration::from_millis(1));
        let err = cache.snapshot("prod", expired).unwrap_err();
        assert!(matches!(err, TopologyError::DeadlineExceeded { .. }));
        assert_eq!(provider.rounds(), 0);
    }

    // ── 6. racing first accesses trigger exactly one populate ───────────

    #[test]
    fn racing_first_accesses_populate_once() {
        let (provider, cache) = cache_over(three_workloads());
        let cache = Arc::new(cache);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                cache.snapshot("prod", Deadline::none()).map(|s| s.generation)
            }));
        }
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 0);
        }
        assert_eq!(provider.rounds(), 1);
    }

    // ── 7. namespaces are cached independently ──────────────────────────

    #[test]
    fn namespaces_cached_independently() {
        let (provider, cache) = cache_over(three_workloads());
        let prod = cache.snapshot("prod", Deadline::none()).unwrap();
        let staging = cache.snapshot("staging", Deadline::none()).unwrap();
        assert_eq!(provider.rounds(), 2);
        assert_eq!(prod.namespace, "prod");
        assert_eq!(staging.namespace, "staging");
    }
}
