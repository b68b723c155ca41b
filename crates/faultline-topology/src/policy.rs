// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! RPC-route classification policy.
//!
//! DNS-fault eligibility hinges on whether a pair communicates exclusively
//! over a persistent connection-oriented channel, where host resolution is
//! not repeated per request. What "looks like an RPC route" is a protocol
//! naming convention, not a cache concern, so the classification is a
//! pluggable trait with one shipped default.

use crate::EndpointPair;

/// Classifies an observed endpoint as RPC-style or ordinary routed traffic.
pub trait RpcRoutePolicy: Send + Sync {
    /// Whether this endpoint's route follows the RPC naming convention.
    fn is_rpc_route(&self, pair: &EndpointPair) -> bool;
}

/// Default policy: gRPC route shapes.
///
/// Matches `/package.Service/Method` — a leading slash, exactly two path
/// segments, and a dotted first segment. Anything else is treated as
/// ordinary routed traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcRoutePolicy;

impl RpcRoutePolicy for GrpcRoutePolicy {
    fn is_rpc_route(&self, pair: &EndpointPair) -> bool {
        let Some(rest) = pair.route.strip_prefix('/') else {
            return false;
        };
        let mut segments = rest.split('/');
        let (Some(service), Some(method)) = (segments.next(), segments.next()) else {
            return false;
        };
        if segments.next().is_some() {
            return false;
        }
        service.contains('.') && !method.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(route: &str) -> EndpointPair {
        EndpointPair {
            caller: "checkout".to_owned(),
            route: route.to_owned(),
            method: "POST".to_owned(),
            callee: "payments".to_owned(),
            callee_port: 9000,
            span_name: String::new(),
        }
    }

    // ── 1. grpc-shaped routes classify as rpc ───────────────────────────

    #[test]
    fn grpc_shapes_classify_as_rpc() {
        let policy = GrpcRoutePolicy;
        assert!(policy.is_rpc_route(&pair("/hipstershop.PaymentService/Charge")));
        assert!(policy.is_rpc_route(&pair("/io.grpc.health.v1.Health/Check")));
    }

    // ── 2. ordinary routes do not ───────────────────────────────────────

    #[test]
    fn ordinary_routes_do_not() {
        let policy = GrpcRoutePolicy;
        assert!(!policy.is_rpc_route(&pair("/api/v1/orders")));
        assert!(!policy.is_rpc_route(&pair("/healthz")));
        assert!(!policy.is_rpc_route(&pair("orders")));
        assert!(!policy.is_rpc_route(&pair("/hipstershop.Cart/Get/extra")));
    }
}
