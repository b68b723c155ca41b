// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Derived topology views.
//!
//! The provider hands over raw tables; these functions produce the sorted,
//! deduplicated, filtered lists the action space indexes into. Sorting is by
//! a deterministic key in every case (caller first, then callee/domain/table
//! tie-breakers), so index assignment is stable across repeated calls within
//! a generation.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{DatabaseOperation, DnsPair, EndpointPair, NetworkPair, RpcRoutePolicy};

/// The one database engine the fault mechanism can target.
pub const SUPPORTED_DATABASE_ENGINE: &str = "mysql";

/// Group endpoint pairs into aggregated network-dependency pairs.
///
/// One output entry per distinct (caller, callee); its span-name set is the
/// sorted union of the group's distinct non-empty span names. A group whose
/// endpoints carry no span names still yields a pair with an empty set.
pub fn aggregate_network_pairs(endpoints: &[EndpointPair]) -> Vec<NetworkPair> {
    let mut groups: FxHashMap<(&str, &str), BTreeSet<&str>> = FxHashMap::default();
    for pair in endpoints {
        let spans = groups
            .entry((pair.caller.as_str(), pair.callee.as_str()))
            .or_default();
        if !pair.span_name.is_empty() {
            spans.insert(pair.span_name.as_str());
        }
    }
    let mut out: Vec<NetworkPair> = groups
        .into_iter()
        .map(|((caller, callee), spans)| NetworkPair {
            caller: caller.to_owned(),
            callee: callee.to_owned(),
            span_names: spans.into_iter().map(str::to_owned).collect(),
        })
        .collect();
    out.sort_by(|a, b| (&a.caller, &a.callee).cmp(&(&b.caller, &b.callee)));
    out
}

/// Derive the DNS-fault-eligible pairs from raw endpoint traffic.
///
/// A (caller, callee) pair is excluded iff it appears in RPC-style traffic
/// (per `policy`) and never in ordinary routed traffic: communication then
/// happens exclusively over a connection-oriented channel where resolution is
/// not repeated per request, so manipulating it has no observable effect.
/// Eligible pairs keep the same aggregated span-name sets as the network
/// view, with the callee reinterpreted as the resolved domain.
pub fn derive_dns_pairs(endpoints: &[EndpointPair], policy: &dyn RpcRoutePolicy) -> Vec<DnsPair> {
    let mut rpc: FxHashSet<(&str, &str)> = FxHashSet::default();
    let mut routed: FxHashSet<(&str, &str)> = FxHashSet::default();
    for pair in endpoints {
        let key = (pair.caller.as_str(), pair.callee.as_str());
        if policy.is_rpc_route(pair) {
            rpc.insert(key);
        } else {
            routed.insert(key);
        }
    }
    aggregate_network_pairs(endpoints)
        .into_iter()
        .filter(|pair| {
            let key = (pair.caller.as_str(), pair.callee.as_str());
            !(rpc.contains(&key) && !routed.contains(&key))
        })
        .map(|pair| DnsPair {
            caller: pair.caller,
            domain: pair.callee,
            span_names: pair.span_names,
        })
        .collect()
}

/// Retain only operations the fault mechanism can target.
///
/// Operations against any other engine remain valid topology data — they are
/// just not actionable here, so they are dropped from this derived view. The
/// result is sorted by (caller, database, table, operation) and deduplicated.
pub fn filter_database_operations(operations: Vec<DatabaseOperation>) -> Vec<DatabaseOperation> {
    let mut out: Vec<DatabaseOperation> = operations
        .into_iter()
        .filter(|op| op.engine == SUPPORTED_DATABASE_ENGINE)
        .collect();
    out.sort_by(|a, b| {
        (&a.caller, &a.database, &a.table, &a.operation)
            .cmp(&(&b.caller, &b.database, &b.table, &b.operation))
    });
    out.dedup();
    out
}
