// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resource topology cache for Faultline.
//!
//! The action-space encoder sizes its dynamic dimensions against the live
//! topology of one target system. This crate supplies that data path:
//!
//! - [`TopologyProvider`] — the narrow port to whatever lists workloads and
//!   trace-derived resource tables (a cluster client, an offline pipeline, a
//!   fixture). Calls are time-boxed by an explicit [`Deadline`].
//! - [`SystemCache`] — per-system memo of [`TopologySnapshot`] generations,
//!   one per namespace. A snapshot is built fully, then published as an
//!   immutable `Arc`; readers never observe a half-computed list.
//! - [`CacheManager`] — the per-process registry handed explicitly to every
//!   call site. There is no global singleton.
//! - Derived views — network-pair aggregation, DNS-fault eligibility under a
//!   pluggable [`RpcRoutePolicy`], and the supported-engine database filter.
//!
//! # Index Stability Invariant
//!
//! Within one cache generation, index `i` into any resource list always
//! denotes the same record: every list is sorted by a deterministic key and
//! deduplicated before publication. Encoded configurations store only such
//! indices, so a decode after an invalidation that shrank a list must fail
//! loudly rather than silently hit a different record.

mod cache;
mod derive;
mod error;
mod manager;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
mod policy;
mod provider;
mod record;

pub use cache::{SystemCache, TopologySnapshot};
pub use derive::{
    aggregate_network_pairs, derive_dns_pairs, filter_database_operations,
    SUPPORTED_DATABASE_ENGINE,
};
pub use error::TopologyError;
pub use manager::CacheManager;
pub use policy::{GrpcRoutePolicy, RpcRoutePolicy};
pub use provider::{Deadline, TopologyProvider};
pub use record::{
    ContainerRecord, DatabaseOperation, DnsPair, EndpointPair, NetworkPair, RuntimeMethod,
};
