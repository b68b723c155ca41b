// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Expected blast radius of a decoded experiment.

use std::collections::BTreeSet;

use faultline_schema::TopologyRole;
use faultline_topology::TopologySnapshot;

use crate::{CodecError, FaultSpec};

/// Sorted prediction of what an experiment should visibly affect.
///
/// `services` are the workloads expected to degrade (the direct target plus
/// its upstream callers); `span_names` are the trace spans where the fault
/// should surface. The verifier compares observed traces against this set
/// after the experiment runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlastRadius {
    /// Affected services, sorted and deduplicated.
    pub services: Vec<String>,
    /// Trace span names expected to show the fault, sorted and deduplicated.
    pub span_names: Vec<String>,
}

/// Predict the blast radius of `spec` against one snapshot.
///
/// Every index in `spec` is resolved against `snapshot`; a stale index (from
/// a tree encoded under an older generation) fails with
/// [`CodecError::OutOfRange`] rather than silently naming the wrong record.
pub fn expected_blast_radius(
    spec: &FaultSpec,
    snapshot: &TopologySnapshot,
) -> Result<BlastRadius, CodecError> {
    let mut services = BTreeSet::new();
    let mut span_names = BTreeSet::new();

    match spec {
        FaultSpec::PodKill(inner) => {
            let workload = workload_at(snapshot, "workload", inner.workload)?;
            service_impact(workload, snapshot, &mut services, &mut span_names);
        }
        FaultSpec::TimeSkew(inner) => {
            let workload = workload_at(snapshot, "workload", inner.workload)?;
            service_impact(workload, snapshot, &mut services, &mut span_names);
        }
        FaultSpec::ContainerKill(inner) => {
            let index = index_of("container", inner.container)?;
            let record = snapshot
                .container(index)
                .ok_or_else(|| stale("container", inner.container, snapshot, TopologyRole::Containers))?;
            let workload = record.workload.clone();
            service_impact(&workload, snapshot, &mut services, &mut span_names);
        }
        FaultSpec::NetworkDelay(inner) => {
            let index = index_of("pair", inner.pair)?;
            let pair = snapshot
                .network_pair(index)
                .ok_or_else(|| stale("pair", inner.pair, snapshot, TopologyRole::NetworkPairs))?;
            services.insert(pair.caller.clone());
            services.insert(pair.callee.clone());
            span_names.extend(pair.span_names.iter().cloned());
        }
        FaultSpec::DnsFault(inner) => {
            let index = index_of("pair", inner.pair)?;
            let pair = snapshot
                .dns_pair(index)
                .ok_or_else(|| stale("pair", inner.pair, snapshot, TopologyRole::DnsPairs))?;
            services.insert(pair.caller.clone());
            services.insert(pair.domain.clone());
            span_names.extend(pair.span_names.iter().cloned());
        }
        FaultSpec::HttpAbort(inner) => {
            endpoint_impact(snapshot, inner.endpoint, &mut services, &mut span_names)?;
        }
        FaultSpec::HttpDelay(inner) => {
            endpoint_impact(snapshot, inner.endpoint, &mut services, &mut span_names)?;
        }
        FaultSpec::RuntimeFault(inner) => {
            let index = index_of("method", inner.method)?;
            let record = snapshot
                .runtime_method(index)
                .ok_or_else(|| stale("method", inner.method, snapshot, TopologyRole::RuntimeMethods))?;
            let service = record.caller.clone();
            service_impact(&service, snapshot, &mut services, &mut span_names);
        }
        FaultSpec::DatabaseFault(inner) => {
            let index = index_of("operation", inner.operation)?;
            let record = snapshot.database_operation(index).ok_or_else(|| {
                stale("operation", inner.operation, snapshot, TopologyRole::DatabaseOperations)
            })?;
            let service = record.caller.clone();
            service_impact(&service, snapshot, &mut services, &mut span_names);
        }
    }

    Ok(BlastRadius {
        services: services.into_iter().collect(),
        span_names: span_names.into_iter().collect(),
    })
}

/// The target degrades, and so does everything that calls into it; the
/// visible spans are the calls that terminate at the target.
fn service_impact(
    service: &str,
    snapshot: &TopologySnapshot,
    services: &mut BTreeSet<String>,
    span_names: &mut BTreeSet<String>,
) {
    services.insert(service.to_owned());
    for endpoint in &snapshot.endpoints {
        if endpoint.callee == service {
            services.insert(endpoint.caller.clone());
            if !endpoint.span_name.is_empty() {
                span_names.insert(endpoint.span_name.clone());
            }
        }
    }
}

fn endpoint_impact(
    snapshot: &TopologySnapshot,
    endpoint_index: u32,
    services: &mut BTreeSet<String>,
    span_names: &mut BTreeSet<String>,
) -> Result<(), CodecError> {
    let index = index_of("endpoint", endpoint_index)?;
    let endpoint = snapshot
        .endpoint(index)
        .ok_or_else(|| stale("endpoint", endpoint_index, snapshot, TopologyRole::EndpointPairs))?;
    services.insert(endpoint.caller.clone());
    services.insert(endpoint.callee.clone());
    if !endpoint.span_name.is_empty() {
        span_names.insert(endpoint.span_name.clone());
    }
    Ok(())
}

fn workload_at<'snap>(
    snapshot: &'snap TopologySnapshot,
    field: &str,
    index: u32,
) -> Result<&'snap str, CodecError> {
    let position = index_of(field, index)?;
    snapshot
        .workload(position)
        .ok_or_else(|| stale(field, index, snapshot, TopologyRole::Workloads))
}

fn index_of(field: &str, index: u32) -> Result<usize, CodecError> {
    usize::try_from(index).map_err(|_| CodecError::OutOfRange {
        field: field.to_owned(),
        value: i64::from(index),
        min: 0,
        max: i64::from(u32::MAX),
    })
}

fn stale(
    field: &str,
    index: u32,
    snapshot: &TopologySnapshot,
    role: TopologyRole,
) -> CodecError {
    let count = snapshot.count(role);
    CodecError::OutOfRange {
        field: field.to_owned(),
        value: i64::from(index),
        min: 0,
        max: i64::try_from(count).unwrap_or(i64::MAX) - 1,
    }
}
