// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end action-space scenarios against a mock topology.
#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeMap;
use std::sync::Arc;

use faultline_codec::{
    ActionSpace, CodecError, FaultSpec, NetworkDelay, PodKill, TimeSkew,
};
use faultline_schema::{node_from_wire_json, to_wire_json, Node, WireMode};
use faultline_topology::mock::{StaticProvider, Tables};
use faultline_topology::{
    CacheManager, ContainerRecord, DatabaseOperation, Deadline, EndpointPair, RuntimeMethod,
    TopologyProvider,
};

fn endpoint(caller: &str, route: &str, callee: &str, span: &str) -> EndpointPair {
    EndpointPair {
        caller: caller.to_owned(),
        route: route.to_owned(),
        method: "POST".to_owned(),
        callee: callee.to_owned(),
        callee_port: 8080,
        span_name: span.to_owned(),
    }
}

fn db_op(caller: &str, operation: &str, engine: &str) -> DatabaseOperation {
    DatabaseOperation {
        caller: caller.to_owned(),
        database: "shop".to_owned(),
        table: "orders".to_owned(),
        operation: operation.to_owned(),
        engine: engine.to_owned(),
    }
}

fn shop_tables() -> Tables {
    Tables {
        workloads: vec!["payments".to_owned(), "cart".to_owned(), "frontend".to_owned()],
        endpoints: vec![
            // frontend→cart over both gRPC and plain HTTP: DNS-eligible.
            endpoint("frontend", "/shop.CartService/Add", "cart", "rpc add item"),
            endpoint("frontend", "/api/cart", "cart", "http add item"),
            // frontend→payments over gRPC only: DNS-excluded.
            endpoint("frontend", "/shop.PaymentService/Charge", "payments", "rpc charge"),
        ],
        database_operations: vec![
            db_op("cart", "select", "mysql"),
            db_op("cart", "update", "postgresql"),
        ],
        runtime_methods: vec![RuntimeMethod {
            caller: "cart".to_owned(),
            class: "shop.cart.CartServiceImpl".to_owned(),
            method: "addItem".to_owned(),
        }],
        containers: vec![ContainerRecord {
            pod: "cart-5b9f7c".to_owned(),
            workload: "cart".to_owned(),
            container: "server".to_owned(),
        }],
        ..Tables::default()
    }
}

fn space_over(tables: Tables) -> (Arc<StaticProvider>, ActionSpace) {
    let provider = Arc::new(StaticProvider::new(tables));
    let manager = CacheManager::new(Arc::clone(&provider) as Arc<dyn TopologyProvider>);
    (provider, ActionSpace::new(Arc::new(manager)))
}

/// Populate a leaf of `tree` (path of child positions) with `value`.
fn assign(tree: &mut Node, path: &[u32], value: i64) {
    let mut node = tree;
    for position in path {
        node = node.children.get_mut(position).unwrap();
    }
    node.value = Some(value);
}

/// A populated pod-kill tree carved out of the full catalog schema.
fn pod_kill_tree(schema: &Node, workload: i64, grace: i64) -> Node {
    let mut tree = Node::internal("FaultSpec", BTreeMap::new());
    tree.children.insert(0, schema.child(0).unwrap().clone());
    assign(&mut tree, &[0, 0], workload);
    assign(&mut tree, &[0, 1], grace);
    tree
}

// ── scenario A: workload index decodes by deterministic sort order ──────

#[test]
fn workload_index_follows_sort_order() {
    let (_, space) = space_over(shop_tables());
    let schema = space.schema("shop", "prod", Deadline::none()).unwrap();

    // Three workloads: the pod-kill workload leaf spans [0, 2].
    let workload_leaf = schema.child(0).unwrap().child(0).unwrap();
    let bounds = workload_leaf.bounds.unwrap();
    assert_eq!((bounds.min(), bounds.max()), (0, 2));

    let decoded = space
        .decode("shop", "prod", &pod_kill_tree(&schema, 1, 0), Deadline::none())
        .unwrap();
    let FaultSpec::PodKill(kill) = decoded else {
        panic!("expected a pod kill, got {decoded:?}");
    };
    assert_eq!(kill.workload, 1);

    // Index 1 is "frontend": the sorted order is cart, frontend, payments.
    let radius = space
        .blast_radius("shop", "prod", &decoded, Deadline::none())
        .unwrap();
    assert!(radius.services.contains(&"frontend".to_owned()));
}

// ── scenario B: dns eligibility follows the traffic mix ─────────────────

#[test]
fn dns_eligibility_follows_traffic_mix() {
    let (provider, _) = space_over(shop_tables());
    let manager = CacheManager::new(provider as Arc<dyn TopologyProvider>);
    let snapshot = manager.snapshot("shop", "prod", Deadline::none()).unwrap();

    let pairs: Vec<(&str, &str)> = snapshot
        .dns_pairs
        .iter()
        .map(|p| (p.caller.as_str(), p.domain.as_str()))
        .collect();
    assert_eq!(pairs, [("frontend", "cart")]);
    // Mixed-traffic pair keeps the union of its span names.
    assert_eq!(snapshot.dns_pairs[0].span_names, ["http add item", "rpc add item"]);
}

// ── scenario C: only the supported engine is actionable ─────────────────

#[test]
fn only_supported_engine_is_actionable() {
    let (provider, _) = space_over(shop_tables());
    let manager = CacheManager::new(provider as Arc<dyn TopologyProvider>);
    let snapshot = manager.snapshot("shop", "prod", Deadline::none()).unwrap();

    assert_eq!(snapshot.database_operations.len(), 1);
    assert_eq!(snapshot.database_operations[0].operation, "select");
}

// ── selector cardinality: zero and two both fail ────────────────────────

#[test]
fn selector_requires_exactly_one_variant() {
    let (_, space) = space_over(shop_tables());
    let schema = space.schema("shop", "prod", Deadline::none()).unwrap();

    let hollow = Node::internal("FaultSpec", BTreeMap::new());
    let err = space.decode("shop", "prod", &hollow, Deadline::none()).unwrap_err();
    assert!(matches!(err, CodecError::SelectorCardinality { selected: 0, .. }));

    let mut doubled = pod_kill_tree(&schema, 0, 0);
    let mut skew = schema.child(8).unwrap().clone();
    assign(&mut skew, &[0], 0);
    assign(&mut skew, &[1], 30);
    doubled.children.insert(8, skew);
    let err = space.decode("shop", "prod", &doubled, Deadline::none()).unwrap_err();
    assert!(matches!(err, CodecError::SelectorCardinality { selected: 2, .. }));

    let decoded = space
        .decode("shop", "prod", &pod_kill_tree(&schema, 0, 0), Deadline::none())
        .unwrap();
    assert!(matches!(decoded, FaultSpec::PodKill(_)));
}

// ── monotonic validity at the bounds ────────────────────────────────────

#[test]
fn values_at_bounds_decode_and_neighbors_fail() {
    let (_, space) = space_over(shop_tables());
    let schema = space.schema("shop", "prod", Deadline::none()).unwrap();

    for grace in [0, 600] {
        let decoded = space
            .decode("shop", "prod", &pod_kill_tree(&schema, 0, grace), Deadline::none())
            .unwrap();
        assert!(matches!(decoded, FaultSpec::PodKill(PodKill { .. })));
    }
    for grace in [-1, 601] {
        let err = space
            .decode("shop", "prod", &pod_kill_tree(&schema, 0, grace), Deadline::none())
            .unwrap_err();
        assert!(
            matches!(err, CodecError::OutOfRange { value, .. } if value == grace),
            "grace {grace} must be rejected"
        );
    }
}

// ── negative declared ranges ────────────────────────────────────────────

#[test]
fn negative_ranges_accept_their_edges() {
    let (_, space) = space_over(shop_tables());
    let schema = space.schema("shop", "prod", Deadline::none()).unwrap();

    let skew_tree = |offset: i64| {
        let mut tree = Node::internal("FaultSpec", BTreeMap::new());
        tree.children.insert(8, schema.child(8).unwrap().clone());
        assign(&mut tree, &[8, 0], 0);
        assign(&mut tree, &[8, 1], offset);
        tree
    };

    for offset in [-600, 0, 600] {
        let decoded = space
            .decode("shop", "prod", &skew_tree(offset), Deadline::none())
            .unwrap();
        let FaultSpec::TimeSkew(TimeSkew { offset_secs, .. }) = decoded else {
            panic!("expected a time skew, got {decoded:?}");
        };
        assert_eq!(i64::from(offset_secs), offset);
    }
    for offset in [-601, 601] {
        let err = space
            .decode("shop", "prod", &skew_tree(offset), Deadline::none())
            .unwrap_err();
        assert!(matches!(err, CodecError::OutOfRange { .. }), "offset {offset} must fail");
    }
}

// ── dynamic bounds re-resolve across invalidation ───────────────────────

#[test]
fn decode_revalidates_after_invalidation() {
    let (provider, space) = space_over(shop_tables());
    let schema = space.schema("shop", "prod", Deadline::none()).unwrap();
    let tree = pod_kill_tree(&schema, 2, 0);

    // Three workloads: index 2 is valid.
    assert!(space.decode("shop", "prod", &tree, Deadline::none()).is_ok());

    // Topology shrinks to one workload. Same tree, new generation: rejected.
    provider.set_tables(Tables {
        workloads: vec!["cart".to_owned()],
        ..shop_tables()
    });
    space.invalidate("shop");
    let err = space.decode("shop", "prod", &tree, Deadline::none()).unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { value: 2, max: 0, .. }));

    // And back: growth makes the same tree valid again.
    provider.set_tables(shop_tables());
    space.invalidate("shop");
    assert!(space.decode("shop", "prod", &tree, Deadline::none()).is_ok());
}

// ── records survive encode → wire → decode ──────────────────────────────

#[test]
fn record_survives_wire_round_trip() {
    let (_, space) = space_over(shop_tables());
    let spec = FaultSpec::NetworkDelay(NetworkDelay {
        pair: 1,
        latency_ms: 250,
        jitter_ms: Some(40),
        correlation_pct: None,
    });

    let tree = space.encode("shop", "prod", &spec, Deadline::none()).unwrap();
    let wire = to_wire_json(&tree, WireMode::ExcludeUnset).unwrap();
    let recovered = node_from_wire_json(wire).unwrap();
    let decoded = space
        .decode("shop", "prod", &recovered, Deadline::none())
        .unwrap();
    assert_eq!(decoded, spec);

    // The full wire form reproduces the tree structurally.
    let full = to_wire_json(&tree, WireMode::Full).unwrap();
    assert_eq!(node_from_wire_json(full).unwrap(), tree);
}

// ── blast radius names the pair and its spans ───────────────────────────

#[test]
fn blast_radius_names_pair_and_spans() {
    let (_, space) = space_over(shop_tables());
    // Pairs sort caller-first: (frontend, cart) precedes (frontend, payments).
    let spec = FaultSpec::NetworkDelay(NetworkDelay {
        pair: 0,
        latency_ms: 100,
        jitter_ms: None,
        correlation_pct: None,
    });
    let radius = space
        .blast_radius("shop", "prod", &spec, Deadline::none())
        .unwrap();
    assert_eq!(radius.services, ["cart", "frontend"]);
    assert_eq!(radius.span_names, ["http add item", "rpc add item"]);
}
