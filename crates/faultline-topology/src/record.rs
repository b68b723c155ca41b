// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flattened, index-stable resource records.
//!
//! Each record is one tuple from a per-system, per-namespace resource list.
//! Records own plain strings and carry no handles; their identity for
//! deduplication is full structural equality, and their position in a
//! published list is assigned by the deterministic sorts in `derive`.

use serde::{Deserialize, Serialize};

/// One observed caller→callee endpoint (route + method granularity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPair {
    /// Calling service.
    pub caller: String,
    /// Request route as observed in traces.
    pub route: String,
    /// Request method.
    pub method: String,
    /// Called service.
    pub callee: String,
    /// Port the callee was reached on.
    pub callee_port: u16,
    /// Trace span name for this call edge.
    pub span_name: String,
}

/// Aggregated caller→callee network dependency.
///
/// One entry per (caller, callee) pair regardless of how many routes connect
/// them; `span_names` is the sorted set of distinct non-empty span names
/// observed between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPair {
    /// Calling service.
    pub caller: String,
    /// Called service.
    pub callee: String,
    /// Sorted, deduplicated span names observed between the pair.
    pub span_names: Vec<String>,
}

/// A caller→domain pair eligible for DNS-resolution faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsPair {
    /// Calling service.
    pub caller: String,
    /// Target domain the caller resolves.
    pub domain: String,
    /// Sorted, deduplicated span names observed between the pair.
    pub span_names: Vec<String>,
}

/// One database operation observed for a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseOperation {
    /// Calling service.
    pub caller: String,
    /// Database name.
    pub database: String,
    /// Table the operation touches.
    pub table: String,
    /// Operation kind (e.g. `select`, `update`).
    pub operation: String,
    /// Backing engine as reported by the trace pipeline.
    pub engine: String,
}

/// One language-runtime method observed for a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMethod {
    /// Calling service.
    pub caller: String,
    /// Fully qualified class name.
    pub class: String,
    /// Method name.
    pub method: String,
}

/// One running container in the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Pod name.
    pub pod: String,
    /// Workload label the pod belongs to.
    pub workload: String,
    /// Container name within the pod.
    pub container: String,
}
