// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory topology provider for tests.
//!
//! [`StaticProvider`] serves fixed tables, counts populate rounds, and can be
//! toggled into a failing state or handed new tables mid-test to exercise
//! invalidation and re-resolution paths. Enabled for downstream crates via
//! the `test-utils` feature.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::{
    ContainerRecord, DatabaseOperation, Deadline, EndpointPair, RuntimeMethod, TopologyError,
    TopologyProvider,
};

/// The raw tables a [`StaticProvider`] serves.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    /// Workload labels (provider order; the cache sorts).
    pub workloads: Vec<String>,
    /// Endpoint pairs.
    pub endpoints: Vec<EndpointPair>,
    /// Database operations, all engines.
    pub database_operations: Vec<DatabaseOperation>,
    /// Runtime methods.
    pub runtime_methods: Vec<RuntimeMethod>,
    /// Containers.
    pub containers: Vec<ContainerRecord>,
}

/// Fixed-table provider for headless tests.
#[derive(Debug, Default)]
pub struct StaticProvider {
    tables: Mutex<Tables>,
    rounds: AtomicUsize,
    failing: AtomicBool,
}

impl StaticProvider {
    /// A provider serving `tables`.
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
            rounds: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Replace the served tables (visible to the next populate).
    pub fn set_tables(&self, tables: Tables) {
        *self.tables.lock().unwrap_or_else(PoisonError::into_inner) = tables;
    }

    /// Number of populate rounds observed (workload-label fetches).
    pub fn rounds(&self) -> usize {
        self.rounds.load(Ordering::Acquire)
    }

    /// Make every call fail with [`TopologyError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    fn guard(
        &self,
        system: &str,
        what: &'static str,
        deadline: Deadline,
    ) -> Result<Tables, TopologyError> {
        deadline.check(what)?;
        if self.failing.load(Ordering::Acquire) {
            return Err(TopologyError::Unavailable {
                system: system.to_owned(),
                what,
                detail: "static provider set to fail".to_owned(),
            });
        }
        Ok(self
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

impl TopologyProvider for StaticProvider {
    fn workload_labels(
        &self,
        system: &str,
        _namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<String>, TopologyError> {
        let tables = self.guard(system, "workload labels", deadline)?;
        self.rounds.fetch_add(1, Ordering::AcqRel);
        Ok(tables.workloads)
    }

    fn endpoint_pairs(
        &self,
        system: &str,
        _namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<EndpointPair>, TopologyError> {
        Ok(self.guard(system, "endpoint pairs", deadline)?.endpoints)
    }

    fn database_operations(
        &self,
        system: &str,
        _namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<DatabaseOperation>, TopologyError> {
        Ok(self
            .guard(system, "database operations", deadline)?
            .database_operations)
    }

    fn runtime_methods(
        &self,
        system: &str,
        _namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<RuntimeMethod>, TopologyError> {
        Ok(self
            .guard(system, "runtime methods", deadline)?
            .runtime_methods)
    }

    fn containers(
        &self,
        system: &str,
        _namespace: &str,
        deadline: Deadline,
    ) -> Result<Vec<ContainerRecord>, TopologyError> {
        Ok(self.guard(system, "containers", deadline)?.containers)
    }
}
