// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative field and record descriptors.
//!
//! Each configuration record type enumerates its fields once, in declaration
//! order, through a [`RecordDescriptor`] built with [`RecordBuilder`]. The
//! schema deriver and the codec walk these descriptors instead of inspecting
//! types at runtime; the builder validates the declaration up front so a
//! malformed record surfaces as a [`SchemaError`] on first use, never as a
//! silent misencoding.

use serde::{Deserialize, Serialize};

use crate::{Bounds, SchemaError};

/// Topology dimension a dynamic field draws its cardinality from.
///
/// Each role maps to exactly one resource-list accessor on a topology
/// snapshot; the resolved range is always `[0, N-1]` over the current
/// generation's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyRole {
    /// Workload labels in the namespace.
    Workloads,
    /// Containers across the namespace's pods.
    Containers,
    /// Caller→callee endpoint pairs (route + method granularity).
    EndpointPairs,
    /// Aggregated caller→callee network-dependency pairs.
    NetworkPairs,
    /// DNS-fault-eligible caller→domain pairs.
    DnsPairs,
    /// Actionable database operations.
    DatabaseOperations,
    /// Language-runtime method pairs (class + method granularity).
    RuntimeMethods,
}

impl std::fmt::Display for TopologyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Workloads => "workloads",
            Self::Containers => "containers",
            Self::EndpointPairs => "endpoint-pairs",
            Self::NetworkPairs => "network-pairs",
            Self::DnsPairs => "dns-pairs",
            Self::DatabaseOperations => "database-operations",
            Self::RuntimeMethods => "runtime-methods",
        };
        f.write_str(label)
    }
}

/// Declared integer width of a leaf field.
///
/// Decode rejects values the declared width cannot carry, independent of the
/// (possibly wider) range bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    /// Unsigned 8-bit.
    U8,
    /// Unsigned 16-bit.
    U16,
    /// Unsigned 32-bit.
    U32,
    /// Signed 32-bit.
    I32,
    /// Signed 64-bit.
    I64,
}

impl IntWidth {
    /// Whether the width can carry `value`.
    pub fn admits(self, value: i64) -> bool {
        match self {
            Self::U8 => u8::try_from(value).is_ok(),
            Self::U16 => u16::try_from(value).is_ok(),
            Self::U32 => u32::try_from(value).is_ok(),
            Self::I32 => i32::try_from(value).is_ok(),
            Self::I64 => true,
        }
    }

    /// Whether the width admits negative values.
    pub fn is_signed(self) -> bool {
        matches!(self, Self::I32 | Self::I64)
    }
}

impl std::fmt::Display for IntWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::I64 => "i64",
        };
        f.write_str(label)
    }
}

/// What a declared field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Integer leaf with bounds fixed in the declaration.
    Static {
        /// Declared bounds.
        bounds: Bounds,
        /// Declared width.
        width: IntWidth,
    },
    /// Integer leaf whose bounds resolve against live topology by role.
    Dynamic {
        /// Topology dimension supplying the cardinality.
        role: TopologyRole,
        /// Declared width.
        width: IntWidth,
    },
    /// Nested configuration record.
    Record(&'static RecordDescriptor),
}

/// One declared field of a configuration record.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Field name as declared.
    pub name: &'static str,
    /// Human-readable description, surfaced on schema nodes.
    pub description: Option<&'static str>,
    /// Whether the field may be absent in a populated tree.
    pub optional: bool,
    /// What the field holds.
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// An integer field with bounds parsed from `"<min>-<max>"`.
    pub fn ranged(name: &'static str, spec: &str, width: IntWidth) -> Result<Self, SchemaError> {
        Ok(Self {
            name,
            description: None,
            optional: false,
            kind: FieldKind::Static {
                bounds: Bounds::parse(spec)?,
                width,
            },
        })
    }

    /// An integer field whose range resolves against live topology.
    pub fn dynamic(name: &'static str, role: TopologyRole, width: IntWidth) -> Self {
        Self {
            name,
            description: None,
            optional: false,
            kind: FieldKind::Dynamic { role, width },
        }
    }

    /// A nested record field.
    pub fn record(name: &'static str, descriptor: &'static RecordDescriptor) -> Self {
        Self {
            name,
            description: None,
            optional: false,
            kind: FieldKind::Record(descriptor),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn describe(mut self, text: &'static str) -> Self {
        self.description = Some(text);
        self
    }

    /// Mark the field as permitted to be absent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Declarative schema of one configuration record type.
#[derive(Debug)]
pub struct RecordDescriptor {
    /// Record type name.
    pub name: &'static str,
    /// Tagged union: decoding requires exactly one populated field.
    pub selector: bool,
    /// Ordered field declarations; structural position is the index here.
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Start building a record descriptor.
    pub fn builder(name: &'static str) -> RecordBuilder {
        RecordBuilder {
            name,
            selector: false,
            fields: Vec::new(),
        }
    }

    /// Field descriptor at structural position `index`.
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Position of the field named `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Builder validating a record declaration.
#[derive(Debug)]
pub struct RecordBuilder {
    name: &'static str,
    selector: bool,
    fields: Vec<FieldDescriptor>,
}

impl RecordBuilder {
    /// Mark the record as a tagged union over its fields.
    #[must_use]
    pub fn selector(mut self) -> Self {
        self.selector = true;
        self
    }

    /// Append a field declaration.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a field declaration from a fallible constructor.
    ///
    /// Lets descriptor blocks chain `ranged` declarations with `?`.
    pub fn try_field(self, field: Result<FieldDescriptor, SchemaError>) -> Result<Self, SchemaError> {
        Ok(self.field(field?))
    }

    /// Validate and finish the declaration.
    pub fn build(self) -> Result<RecordDescriptor, SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::EmptyRecord { record: self.name });
        }
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|prior| prior.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    record: self.name,
                    field: field.name,
                });
            }
        }
        Ok(RecordDescriptor {
            name: self.name,
            selector: self.selector,
            fields: self.fields,
        })
    }
}
