// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Positional value trees between typed records and schema nodes.
//!
//! A [`RecordValue`] mirrors one [`RecordDescriptor`]: a slot per declared
//! field, each absent or holding an integer or a nested record. The codec
//! engine fills value trees from populated nodes (after validation) and
//! typed constructors read them out; the reverse direction externalizes a
//! typed record back into a tree.

use faultline_schema::{FieldDescriptor, RecordDescriptor, SchemaError};

use crate::CodecError;

/// A single field slot's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Integer leaf value.
    Int(i64),
    /// Nested record value.
    Record(RecordValue),
}

impl FieldValue {
    /// The nested record, or a type mismatch naming `field`.
    pub fn as_record(&self, field: &str) -> Result<&RecordValue, CodecError> {
        match self {
            Self::Record(value) => Ok(value),
            Self::Int(_) => Err(CodecError::type_mismatch(field, "expected a nested record")),
        }
    }
}

/// Values for one record, slotted by declared field position.
#[derive(Debug, Clone)]
pub struct RecordValue {
    descriptor: &'static RecordDescriptor,
    slots: Vec<Option<FieldValue>>,
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.descriptor, other.descriptor) && self.slots == other.slots
    }
}

impl Eq for RecordValue {}

impl RecordValue {
    /// An all-absent value over `descriptor`.
    pub fn empty(descriptor: &'static RecordDescriptor) -> Self {
        Self {
            slots: vec![None; descriptor.fields.len()],
            descriptor,
        }
    }

    /// The descriptor this value mirrors.
    pub fn descriptor(&self) -> &'static RecordDescriptor {
        self.descriptor
    }

    /// Store an integer for the named field.
    pub fn set_int(&mut self, field: &str, value: i64) -> Result<(), CodecError> {
        self.set(field, FieldValue::Int(value))
    }

    /// Store a nested record for the named field.
    pub fn set_record(&mut self, field: &str, value: RecordValue) -> Result<(), CodecError> {
        self.set(field, FieldValue::Record(value))
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), CodecError> {
        let position = self
            .descriptor
            .position_of(field)
            .ok_or_else(|| self.unknown_field(field))?;
        self.slots[position] = Some(value);
        Ok(())
    }

    pub(crate) fn set_at(&mut self, position: usize, value: FieldValue) {
        self.slots[position] = Some(value);
    }

    /// The slot for the named field (`None` when absent).
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        let position = self.descriptor.position_of(field)?;
        self.slots[position].as_ref()
    }

    pub(crate) fn slot(&self, position: usize) -> Option<&FieldValue> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// A required integer field.
    pub fn int(&self, field: &str) -> Result<i64, CodecError> {
        match self.get(field) {
            Some(FieldValue::Int(value)) => Ok(*value),
            Some(FieldValue::Record(_)) => {
                Err(CodecError::type_mismatch(field, "expected an integer"))
            }
            None => Err(CodecError::type_mismatch(field, "required field absent")),
        }
    }

    /// An optional integer field.
    pub fn opt_int(&self, field: &str) -> Result<Option<i64>, CodecError> {
        match self.get(field) {
            Some(FieldValue::Int(value)) => Ok(Some(*value)),
            Some(FieldValue::Record(_)) => {
                Err(CodecError::type_mismatch(field, "expected an integer"))
            }
            None => Ok(None),
        }
    }

    /// A required integer field, narrowed to its in-memory type.
    pub fn int_as<T: TryFrom<i64>>(&self, field: &str) -> Result<T, CodecError> {
        let value = self.int(field)?;
        T::try_from(value)
            .map_err(|_| CodecError::type_mismatch(field, format!("value {value} does not fit")))
    }

    /// An optional integer field, narrowed to its in-memory type.
    pub fn opt_int_as<T: TryFrom<i64>>(&self, field: &str) -> Result<Option<T>, CodecError> {
        match self.opt_int(field)? {
            None => Ok(None),
            Some(value) => T::try_from(value)
                .map(Some)
                .map_err(|_| CodecError::type_mismatch(field, format!("value {value} does not fit"))),
        }
    }

    /// A required nested record field.
    pub fn record(&self, field: &str) -> Result<&RecordValue, CodecError> {
        match self.get(field) {
            Some(value) => value.as_record(field),
            None => Err(CodecError::type_mismatch(field, "required field absent")),
        }
    }

    /// Populated slots in declaration order.
    pub fn populated(&self) -> impl Iterator<Item = (usize, &FieldDescriptor, &FieldValue)> {
        self.descriptor
            .fields
            .iter()
            .enumerate()
            .filter_map(|(position, field)| {
                self.slots[position]
                    .as_ref()
                    .map(|value| (position, field, value))
            })
    }

    /// The single populated field of a selector record.
    ///
    /// Fails with [`CodecError::SelectorCardinality`] for zero or several.
    pub fn sole_populated(&self) -> Result<(&FieldDescriptor, &FieldValue), CodecError> {
        let mut populated = self.populated().map(|(_, field, value)| (field, value));
        match (populated.next(), populated.next()) {
            (Some(only), None) => Ok(only),
            (None, _) => Err(CodecError::SelectorCardinality {
                record: self.descriptor.name,
                selected: 0,
            }),
            (Some(_), Some(_)) => Err(CodecError::SelectorCardinality {
                record: self.descriptor.name,
                selected: 2 + populated.count(),
            }),
        }
    }

    fn unknown_field(&self, field: &str) -> CodecError {
        CodecError::type_mismatch(
            field,
            format!("record `{}` declares no such field", self.descriptor.name),
        )
    }
}

/// A configuration record type the codec can move through the action space.
///
/// Implementations pair a declarative [`RecordDescriptor`] with constructors
/// in both directions. Descriptor access is fallible: a malformed declaration
/// surfaces as the original [`SchemaError`] on every use instead of a panic
/// at first touch.
pub trait Configurable: Sized {
    /// The type's field declaration.
    fn descriptor() -> Result<&'static RecordDescriptor, SchemaError>;

    /// Build the typed record from a validated value tree.
    fn from_value(value: &RecordValue) -> Result<Self, CodecError>;

    /// Externalize the typed record into a value tree.
    fn to_value(&self) -> Result<RecordValue, CodecError>;
}
