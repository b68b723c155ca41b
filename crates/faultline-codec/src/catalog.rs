// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The fault catalog: typed configuration records and their declarations.
//!
//! Each record pairs a plain struct with a [`RecordDescriptor`] built once
//! per process. Dynamic fields name the topology dimension they index;
//! static fields carry their bounds in the `"<min>-<max>"` declaration
//! vocabulary. [`FaultSpec`] is the top-level tagged union over the catalog:
//! an explicit sum type whose discriminant is validated at construction
//! rather than inferred from which sibling happens to be populated.

use std::sync::LazyLock;

use faultline_schema::{
    FieldDescriptor, IntWidth, RecordDescriptor, SchemaError, TopologyRole,
};
use serde::{Deserialize, Serialize};

use crate::{CodecError, Configurable, RecordValue};

type DescriptorResult = Result<RecordDescriptor, SchemaError>;

fn resolved(lock: &'static LazyLock<DescriptorResult>) -> Result<&'static RecordDescriptor, SchemaError> {
    lock.as_ref().map_err(Clone::clone)
}

// ── pod kill ────────────────────────────────────────────────────────────

/// Kill one pod of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodKill {
    /// Index into the namespace's sorted workload list.
    pub workload: u32,
    /// Grace period granted to the pod before the kill, in seconds.
    pub grace_period_secs: u16,
}

static POD_KILL: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("PodKill")
        .field(
            FieldDescriptor::dynamic("workload", TopologyRole::Workloads, IntWidth::U32)
                .describe("index of the workload whose pod is killed"),
        )
        .try_field(FieldDescriptor::ranged("grace_period_secs", "0-600", IntWidth::U16))?
        .build()
});

impl Configurable for PodKill {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&POD_KILL)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            workload: value.int_as("workload")?,
            grace_period_secs: value.int_as("grace_period_secs")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("workload", i64::from(self.workload))?;
        value.set_int("grace_period_secs", i64::from(self.grace_period_secs))?;
        Ok(value)
    }
}

// ── container kill ──────────────────────────────────────────────────────

/// Kill one container inside a running pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerKill {
    /// Index into the namespace's sorted container list.
    pub container: u32,
}

static CONTAINER_KILL: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("ContainerKill")
        .field(
            FieldDescriptor::dynamic("container", TopologyRole::Containers, IntWidth::U32)
                .describe("index of the container to kill"),
        )
        .build()
});

impl Configurable for ContainerKill {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&CONTAINER_KILL)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            container: value.int_as("container")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("container", i64::from(self.container))?;
        Ok(value)
    }
}

// ── network delay ───────────────────────────────────────────────────────

/// Delay traffic between one caller→callee pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDelay {
    /// Index into the aggregated network-dependency pair list.
    pub pair: u32,
    /// Injected latency in milliseconds.
    pub latency_ms: u32,
    /// Latency jitter in milliseconds.
    pub jitter_ms: Option<u32>,
    /// Correlation with the previous packet's delay, in percent.
    pub correlation_pct: Option<u8>,
}

static NETWORK_DELAY: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("NetworkDelay")
        .field(
            FieldDescriptor::dynamic("pair", TopologyRole::NetworkPairs, IntWidth::U32)
                .describe("index of the caller→callee pair to impair"),
        )
        .try_field(FieldDescriptor::ranged("latency_ms", "1-2000", IntWidth::U32))?
        .try_field(
            FieldDescriptor::ranged("jitter_ms", "0-500", IntWidth::U32).map(FieldDescriptor::optional),
        )?
        .try_field(
            FieldDescriptor::ranged("correlation_pct", "0-100", IntWidth::U8)
                .map(FieldDescriptor::optional),
        )?
        .build()
});

impl Configurable for NetworkDelay {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&NETWORK_DELAY)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            pair: value.int_as("pair")?,
            latency_ms: value.int_as("latency_ms")?,
            jitter_ms: value.opt_int_as("jitter_ms")?,
            correlation_pct: value.opt_int_as("correlation_pct")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("pair", i64::from(self.pair))?;
        value.set_int("latency_ms", i64::from(self.latency_ms))?;
        if let Some(jitter) = self.jitter_ms {
            value.set_int("jitter_ms", i64::from(jitter))?;
        }
        if let Some(correlation) = self.correlation_pct {
            value.set_int("correlation_pct", i64::from(correlation))?;
        }
        Ok(value)
    }
}

// ── dns fault ───────────────────────────────────────────────────────────

/// What a DNS fault answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DnsAction {
    /// Resolution fails outright.
    Error,
    /// Resolution returns a random address.
    RandomAddress,
}

impl DnsAction {
    fn from_index(field: &str, value: i64) -> Result<Self, CodecError> {
        match value {
            0 => Ok(Self::Error),
            1 => Ok(Self::RandomAddress),
            _ => Err(CodecError::OutOfRange {
                field: field.to_owned(),
                value,
                min: 0,
                max: 1,
            }),
        }
    }

    fn index(self) -> i64 {
        match self {
            Self::Error => 0,
            Self::RandomAddress => 1,
        }
    }
}

/// Break host resolution for one caller→domain pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsFault {
    /// Index into the DNS-eligible pair list.
    pub pair: u32,
    /// How resolution misbehaves.
    pub action: DnsAction,
}

static DNS_FAULT: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("DnsFault")
        .field(
            FieldDescriptor::dynamic("pair", TopologyRole::DnsPairs, IntWidth::U32)
                .describe("index of the caller→domain pair to break"),
        )
        .try_field(
            FieldDescriptor::ranged("action", "0-1", IntWidth::U8)
                .map(|f| f.describe("0 resolves to an error, 1 to a random address")),
        )?
        .build()
});

impl Configurable for DnsFault {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&DNS_FAULT)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            pair: value.int_as("pair")?,
            action: DnsAction::from_index("action", value.int("action")?)?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("pair", i64::from(self.pair))?;
        value.set_int("action", self.action.index())?;
        Ok(value)
    }
}

// ── http request mutation ───────────────────────────────────────────────

/// Abort requests on one endpoint with a fixed status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpAbort {
    /// Index into the endpoint-pair list.
    pub endpoint: u32,
    /// Status code returned instead of the real response.
    pub status_code: u16,
}

static HTTP_ABORT: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("HttpAbort")
        .field(
            FieldDescriptor::dynamic("endpoint", TopologyRole::EndpointPairs, IntWidth::U32)
                .describe("index of the endpoint to abort"),
        )
        .try_field(FieldDescriptor::ranged("status_code", "400-599", IntWidth::U16))?
        .build()
});

impl Configurable for HttpAbort {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&HTTP_ABORT)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            endpoint: value.int_as("endpoint")?,
            status_code: value.int_as("status_code")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("endpoint", i64::from(self.endpoint))?;
        value.set_int("status_code", i64::from(self.status_code))?;
        Ok(value)
    }
}

/// Delay responses on one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpDelay {
    /// Index into the endpoint-pair list.
    pub endpoint: u32,
    /// Injected delay in milliseconds.
    pub delay_ms: u32,
}

static HTTP_DELAY: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("HttpDelay")
        .field(
            FieldDescriptor::dynamic("endpoint", TopologyRole::EndpointPairs, IntWidth::U32)
                .describe("index of the endpoint to delay"),
        )
        .try_field(FieldDescriptor::ranged("delay_ms", "1-60000", IntWidth::U32))?
        .build()
});

impl Configurable for HttpDelay {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&HTTP_DELAY)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            endpoint: value.int_as("endpoint")?,
            delay_ms: value.int_as("delay_ms")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("endpoint", i64::from(self.endpoint))?;
        value.set_int("delay_ms", i64::from(self.delay_ms))?;
        Ok(value)
    }
}

// ── language-runtime fault ──────────────────────────────────────────────

/// How a runtime method misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeFaultMode {
    /// The method throws.
    Exception,
    /// The method stalls.
    Latency,
}

impl RuntimeFaultMode {
    fn from_index(field: &str, value: i64) -> Result<Self, CodecError> {
        match value {
            0 => Ok(Self::Exception),
            1 => Ok(Self::Latency),
            _ => Err(CodecError::OutOfRange {
                field: field.to_owned(),
                value,
                min: 0,
                max: 1,
            }),
        }
    }

    fn index(self) -> i64 {
        match self {
            Self::Exception => 0,
            Self::Latency => 1,
        }
    }
}

/// Inject a fault into one language-runtime method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFault {
    /// Index into the runtime-method list.
    pub method: u32,
    /// How the method misbehaves.
    pub mode: RuntimeFaultMode,
    /// Injected latency in milliseconds, for [`RuntimeFaultMode::Latency`].
    pub latency_ms: Option<u32>,
}

static RUNTIME_FAULT: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("RuntimeFault")
        .field(
            FieldDescriptor::dynamic("method", TopologyRole::RuntimeMethods, IntWidth::U32)
                .describe("index of the class method to fault"),
        )
        .try_field(
            FieldDescriptor::ranged("mode", "0-1", IntWidth::U8)
                .map(|f| f.describe("0 throws an exception, 1 injects latency")),
        )?
        .try_field(
            FieldDescriptor::ranged("latency_ms", "0-10000", IntWidth::U32)
                .map(FieldDescriptor::optional),
        )?
        .build()
});

impl Configurable for RuntimeFault {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&RUNTIME_FAULT)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            method: value.int_as("method")?,
            mode: RuntimeFaultMode::from_index("mode", value.int("mode")?)?,
            latency_ms: value.opt_int_as("latency_ms")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("method", i64::from(self.method))?;
        value.set_int("mode", self.mode.index())?;
        if let Some(latency) = self.latency_ms {
            value.set_int("latency_ms", i64::from(latency))?;
        }
        Ok(value)
    }
}

// ── database fault ──────────────────────────────────────────────────────

/// How a database operation misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseFaultMode {
    /// The operation stalls.
    Delay,
    /// The operation fails.
    Error,
}

impl DatabaseFaultMode {
    fn from_index(field: &str, value: i64) -> Result<Self, CodecError> {
        match value {
            0 => Ok(Self::Delay),
            1 => Ok(Self::Error),
            _ => Err(CodecError::OutOfRange {
                field: field.to_owned(),
                value,
                min: 0,
                max: 1,
            }),
        }
    }

    fn index(self) -> i64 {
        match self {
            Self::Delay => 0,
            Self::Error => 1,
        }
    }
}

/// Inject a fault into one database operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseFault {
    /// Index into the actionable database-operation list.
    pub operation: u32,
    /// How the operation misbehaves.
    pub mode: DatabaseFaultMode,
    /// Injected delay in milliseconds, for [`DatabaseFaultMode::Delay`].
    pub delay_ms: Option<u32>,
}

static DATABASE_FAULT: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("DatabaseFault")
        .field(
            FieldDescriptor::dynamic("operation", TopologyRole::DatabaseOperations, IntWidth::U32)
                .describe("index of the database operation to fault"),
        )
        .try_field(
            FieldDescriptor::ranged("mode", "0-1", IntWidth::U8)
                .map(|f| f.describe("0 delays the operation, 1 fails it")),
        )?
        .try_field(
            FieldDescriptor::ranged("delay_ms", "0-10000", IntWidth::U32)
                .map(FieldDescriptor::optional),
        )?
        .build()
});

impl Configurable for DatabaseFault {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&DATABASE_FAULT)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            operation: value.int_as("operation")?,
            mode: DatabaseFaultMode::from_index("mode", value.int("mode")?)?,
            delay_ms: value.opt_int_as("delay_ms")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("operation", i64::from(self.operation))?;
        value.set_int("mode", self.mode.index())?;
        if let Some(delay) = self.delay_ms {
            value.set_int("delay_ms", i64::from(delay))?;
        }
        Ok(value)
    }
}

// ── time skew ───────────────────────────────────────────────────────────

/// Skew one workload's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSkew {
    /// Index into the namespace's sorted workload list.
    pub workload: u32,
    /// Clock offset in seconds; negative values run the clock behind.
    pub offset_secs: i32,
}

static TIME_SKEW: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("TimeSkew")
        .field(
            FieldDescriptor::dynamic("workload", TopologyRole::Workloads, IntWidth::U32)
                .describe("index of the workload whose clock is skewed"),
        )
        .try_field(FieldDescriptor::ranged("offset_secs", "-600-600", IntWidth::I32))?
        .build()
});

impl Configurable for TimeSkew {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&TIME_SKEW)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        Ok(Self {
            workload: value.int_as("workload")?,
            offset_secs: value.int_as("offset_secs")?,
        })
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        value.set_int("workload", i64::from(self.workload))?;
        value.set_int("offset_secs", i64::from(self.offset_secs))?;
        Ok(value)
    }
}

// ── the union ───────────────────────────────────────────────────────────

/// One fully-specified fault experiment.
///
/// The schema tree for this type is the whole action space: one optional
/// child per variant, of which a populated tree selects exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultSpec {
    /// Kill one pod of a workload.
    PodKill(PodKill),
    /// Kill one container inside a pod.
    ContainerKill(ContainerKill),
    /// Delay traffic between a caller→callee pair.
    NetworkDelay(NetworkDelay),
    /// Break host resolution for a caller→domain pair.
    DnsFault(DnsFault),
    /// Abort requests on one endpoint.
    HttpAbort(HttpAbort),
    /// Delay responses on one endpoint.
    HttpDelay(HttpDelay),
    /// Fault one language-runtime method.
    RuntimeFault(RuntimeFault),
    /// Fault one database operation.
    DatabaseFault(DatabaseFault),
    /// Skew one workload's clock.
    TimeSkew(TimeSkew),
}

static FAULT_SPEC: LazyLock<DescriptorResult> = LazyLock::new(|| {
    RecordDescriptor::builder("FaultSpec")
        .selector()
        .field(FieldDescriptor::record("pod_kill", resolved(&POD_KILL)?).optional())
        .field(FieldDescriptor::record("container_kill", resolved(&CONTAINER_KILL)?).optional())
        .field(FieldDescriptor::record("network_delay", resolved(&NETWORK_DELAY)?).optional())
        .field(FieldDescriptor::record("dns_fault", resolved(&DNS_FAULT)?).optional())
        .field(FieldDescriptor::record("http_abort", resolved(&HTTP_ABORT)?).optional())
        .field(FieldDescriptor::record("http_delay", resolved(&HTTP_DELAY)?).optional())
        .field(FieldDescriptor::record("runtime_fault", resolved(&RUNTIME_FAULT)?).optional())
        .field(FieldDescriptor::record("database_fault", resolved(&DATABASE_FAULT)?).optional())
        .field(FieldDescriptor::record("time_skew", resolved(&TIME_SKEW)?).optional())
        .build()
});

impl Configurable for FaultSpec {
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError> {
        resolved(&FAULT_SPEC)
    }

    fn from_value(value: &RecordValue) -> Result<Self, CodecError> {
        let (field, selected) = value.sole_populated()?;
        let inner = selected.as_record(field.name)?;
        match field.name {
            "pod_kill" => Ok(Self::PodKill(PodKill::from_value(inner)?)),
            "container_kill" => Ok(Self::ContainerKill(ContainerKill::from_value(inner)?)),
            "network_delay" => Ok(Self::NetworkDelay(NetworkDelay::from_value(inner)?)),
            "dns_fault" => Ok(Self::DnsFault(DnsFault::from_value(inner)?)),
            "http_abort" => Ok(Self::HttpAbort(HttpAbort::from_value(inner)?)),
            "http_delay" => Ok(Self::HttpDelay(HttpDelay::from_value(inner)?)),
            "runtime_fault" => Ok(Self::RuntimeFault(RuntimeFault::from_value(inner)?)),
            "database_fault" => Ok(Self::DatabaseFault(DatabaseFault::from_value(inner)?)),
            "time_skew" => Ok(Self::TimeSkew(TimeSkew::from_value(inner)?)),
            other => Err(CodecError::type_mismatch(other, "unknown fault variant")),
        }
    }

    fn to_value(&self) -> Result<RecordValue, CodecError> {
        let mut value = RecordValue::empty(Self::descriptor()?);
        match self {
            Self::PodKill(spec) => value.set_record("pod_kill", spec.to_value()?)?,
            Self::ContainerKill(spec) => value.set_record("container_kill", spec.to_value()?)?,
            Self::NetworkDelay(spec) => value.set_record("network_delay", spec.to_value()?)?,
            Self::DnsFault(spec) => value.set_record("dns_fault", spec.to_value()?)?,
            Self::HttpAbort(spec) => value.set_record("http_abort", spec.to_value()?)?,
            Self::HttpDelay(spec) => value.set_record("http_delay", spec.to_value()?)?,
            Self::RuntimeFault(spec) => value.set_record("runtime_fault", spec.to_value()?)?,
            Self::DatabaseFault(spec) => value.set_record("database_fault", spec.to_value()?)?,
            Self::TimeSkew(spec) => value.set_record("time_skew", spec.to_value()?)?,
        }
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ── 1. every catalog descriptor builds ──────────────────────────────

    #[test]
    fn every_descriptor_builds() {
        assert!(PodKill::descriptor().is_ok());
        assert!(ContainerKill::descriptor().is_ok());
        assert!(NetworkDelay::descriptor().is_ok());
        assert!(DnsFault::descriptor().is_ok());
        assert!(HttpAbort::descriptor().is_ok());
        assert!(HttpDelay::descriptor().is_ok());
        assert!(RuntimeFault::descriptor().is_ok());
        assert!(DatabaseFault::descriptor().is_ok());
        let union = FaultSpec::descriptor().unwrap();
        assert!(union.selector);
        assert_eq!(union.fields.len(), 9);
    }

    // ── 2. union value round-trips through to_value/from_value ──────────

    #[test]
    fn union_value_round_trip() {
        let spec = FaultSpec::NetworkDelay(NetworkDelay {
            pair: 3,
            latency_ms: 250,
            jitter_ms: Some(40),
            correlation_pct: None,
        });
        let back = FaultSpec::from_value(&spec.to_value().unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    // ── 3. mode enums reject indices outside their domain ───────────────

    #[test]
    fn mode_enums_reject_bad_indices() {
        assert!(DnsAction::from_index("action", 2).is_err());
        assert!(RuntimeFaultMode::from_index("mode", -1).is_err());
        assert_eq!(DatabaseFaultMode::from_index("mode", 1).unwrap(), DatabaseFaultMode::Error);
    }
}
