// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property tests: in-range records survive every representation change.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use faultline_codec::{
    decode_node, encode_record, FaultSpec, HttpAbort, NetworkDelay, TimeSkew,
};
use faultline_schema::{node_from_wire_json, to_wire_json, WireMode};
use faultline_topology::mock::{StaticProvider, Tables};
use faultline_topology::{CacheManager, Deadline, EndpointPair, TopologyProvider, TopologySnapshot};
use proptest::prelude::*;

fn snapshot() -> Arc<TopologySnapshot> {
    let endpoints = vec![
        EndpointPair {
            caller: "frontend".to_owned(),
            route: "/api/cart".to_owned(),
            method: "POST".to_owned(),
            callee: "cart".to_owned(),
            callee_port: 8080,
            span_name: "http add item".to_owned(),
        },
        EndpointPair {
            caller: "frontend".to_owned(),
            route: "/api/checkout".to_owned(),
            method: "POST".to_owned(),
            callee: "checkout".to_owned(),
            callee_port: 8080,
            span_name: "http checkout".to_owned(),
        },
    ];
    let provider = Arc::new(StaticProvider::new(Tables {
        workloads: vec!["cart".to_owned(), "checkout".to_owned(), "frontend".to_owned()],
        endpoints,
        ..Tables::default()
    }));
    CacheManager::new(provider as Arc<dyn TopologyProvider>)
        .snapshot("shop", "prod", Deadline::none())
        .unwrap()
}

fn assert_round_trip(spec: &FaultSpec, snapshot: &TopologySnapshot) {
    let tree = encode_record(spec, snapshot).unwrap();
    let direct: FaultSpec = decode_node(&tree, snapshot).unwrap();
    assert_eq!(&direct, spec);

    for mode in [WireMode::Full, WireMode::ExcludeUnset] {
        let wire = to_wire_json(&tree, mode).unwrap();
        let recovered = node_from_wire_json(wire).unwrap();
        let decoded: FaultSpec = decode_node(&recovered, snapshot).unwrap();
        assert_eq!(&decoded, spec);
    }
}

proptest! {
    // ── network delay over its full numeric domain ──────────────────────

    #[test]
    fn network_delay_round_trips(
        pair in 0u32..2,
        latency_ms in 1u32..=2000,
        jitter_ms in proptest::option::of(0u32..=500),
        correlation_pct in proptest::option::of(0u8..=100),
    ) {
        let snapshot = snapshot();
        let spec = FaultSpec::NetworkDelay(NetworkDelay {
            pair,
            latency_ms,
            jitter_ms,
            correlation_pct,
        });
        assert_round_trip(&spec, &snapshot);
    }

    // ── time skew, including the negative half of its range ─────────────

    #[test]
    fn time_skew_round_trips(workload in 0u32..3, offset_secs in -600i32..=600) {
        let snapshot = snapshot();
        let spec = FaultSpec::TimeSkew(TimeSkew { workload, offset_secs });
        assert_round_trip(&spec, &snapshot);
    }

    // ── http abort across the status-code band ──────────────────────────

    #[test]
    fn http_abort_round_trips(endpoint in 0u32..2, status_code in 400u16..=599) {
        let snapshot = snapshot();
        let spec = FaultSpec::HttpAbort(HttpAbort { endpoint, status_code });
        assert_round_trip(&spec, &snapshot);
    }
}
