//! Decoded record abstraction consumed by the aggregation core.
//!
//! A [`Record`] is one decoded message from a telemetry stream. Decoders push
//! records into a [`RecordSink`] one at a time; the sink never hands them
//! back, so decoders may reuse or drop a record after `ingest` returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded value kind of a field, as declared by the binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    Enum,
    Sint8,
    Uint8,
    Sint16,
    Uint16,
    Sint32,
    Uint32,
    String,
    Float32,
    Float64,
    Uint8z,
    Uint16z,
    Uint32z,
    Byte,
    Sint64,
    Uint64,
    Uint64z,
    /// A base type byte the decoder does not know.
    Unknown(u8),
}

impl BaseType {
    /// Map a FIT base type byte onto a kind.
    ///
    /// The endian-ability bit (0x80) is ignored for matching so that
    /// writers which omit it are still understood.
    pub fn from_byte(byte: u8) -> Self {
        match byte & 0x1F {
            0x00 => BaseType::Enum,
            0x01 => BaseType::Sint8,
            0x02 => BaseType::Uint8,
            0x03 => BaseType::Sint16,
            0x04 => BaseType::Uint16,
            0x05 => BaseType::Sint32,
            0x06 => BaseType::Uint32,
            0x07 => BaseType::String,
            0x08 => BaseType::Float32,
            0x09 => BaseType::Float64,
            0x0A => BaseType::Uint8z,
            0x0B => BaseType::Uint16z,
            0x0C => BaseType::Uint32z,
            0x0D => BaseType::Byte,
            0x0E => BaseType::Sint64,
            0x0F => BaseType::Uint64,
            0x10 => BaseType::Uint64z,
            _ => BaseType::Unknown(byte),
        }
    }

    /// The canonical FIT base type byte.
    pub fn to_byte(self) -> u8 {
        match self {
            BaseType::Enum => 0x00,
            BaseType::Sint8 => 0x01,
            BaseType::Uint8 => 0x02,
            BaseType::Sint16 => 0x83,
            BaseType::Uint16 => 0x84,
            BaseType::Sint32 => 0x85,
            BaseType::Uint32 => 0x86,
            BaseType::String => 0x07,
            BaseType::Float32 => 0x88,
            BaseType::Float64 => 0x89,
            BaseType::Uint8z => 0x0A,
            BaseType::Uint16z => 0x8B,
            BaseType::Uint32z => 0x8C,
            BaseType::Byte => 0x0D,
            BaseType::Sint64 => 0x8E,
            BaseType::Uint64 => 0x8F,
            BaseType::Uint64z => 0x90,
            BaseType::Unknown(b) => b,
        }
    }

    /// Width in bytes of one scalar, if the kind has a fixed width.
    pub fn size(self) -> Option<usize> {
        match self {
            BaseType::Enum
            | BaseType::Sint8
            | BaseType::Uint8
            | BaseType::Uint8z
            | BaseType::Byte
            | BaseType::String => Some(1),
            BaseType::Sint16 | BaseType::Uint16 | BaseType::Uint16z => Some(2),
            BaseType::Sint32 | BaseType::Uint32 | BaseType::Uint32z | BaseType::Float32 => Some(4),
            BaseType::Float64 | BaseType::Sint64 | BaseType::Uint64 | BaseType::Uint64z => Some(8),
            BaseType::Unknown(_) => None,
        }
    }

    /// Whether values of this kind widen into the `f64` column domain.
    ///
    /// Strings, byte arrays, 64-bit integers and unknown kinds do not.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            BaseType::Enum
                | BaseType::Sint8
                | BaseType::Uint8
                | BaseType::Sint16
                | BaseType::Uint16
                | BaseType::Sint32
                | BaseType::Uint32
                | BaseType::Float32
                | BaseType::Float64
                | BaseType::Uint8z
                | BaseType::Uint16z
                | BaseType::Uint32z
        )
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Enum => write!(f, "enum"),
            BaseType::Sint8 => write!(f, "sint8"),
            BaseType::Uint8 => write!(f, "uint8"),
            BaseType::Sint16 => write!(f, "sint16"),
            BaseType::Uint16 => write!(f, "uint16"),
            BaseType::Sint32 => write!(f, "sint32"),
            BaseType::Uint32 => write!(f, "uint32"),
            BaseType::String => write!(f, "string"),
            BaseType::Float32 => write!(f, "float32"),
            BaseType::Float64 => write!(f, "float64"),
            BaseType::Uint8z => write!(f, "uint8z"),
            BaseType::Uint16z => write!(f, "uint16z"),
            BaseType::Uint32z => write!(f, "uint32z"),
            BaseType::Byte => write!(f, "byte"),
            BaseType::Sint64 => write!(f, "sint64"),
            BaseType::Uint64 => write!(f, "uint64"),
            BaseType::Uint64z => write!(f, "uint64z"),
            BaseType::Unknown(b) => write!(f, "unknown(0x{b:02x})"),
        }
    }
}

/// One raw scalar as it came off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    Opaque(Vec<u8>),
}

/// A named measurement within a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub units: String,
    pub base_type: BaseType,
    pub values: Vec<RawValue>,
}

impl Field {
    /// Build a single-valued field.
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        base_type: BaseType,
        value: RawValue,
    ) -> Self {
        Self::multi(name, units, base_type, vec![value])
    }

    /// Build a field carrying several values.
    pub fn multi(
        name: impl Into<String>,
        units: impl Into<String>,
        base_type: BaseType,
        values: Vec<RawValue>,
    ) -> Self {
        Field {
            name: name.into(),
            units: units.into(),
            base_type,
            values,
        }
    }

    /// Number of scalar values carried by this field.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Widen value `index` to `f64`.
    ///
    /// Returns `None` when the field's kind is not numeric or the stored
    /// value does not match a numeric representation.
    pub fn value_as_f64(&self, index: usize) -> Option<f64> {
        if !self.base_type.is_numeric() {
            return None;
        }
        match self.values.get(index)? {
            RawValue::Signed(v) => Some(*v as f64),
            RawValue::Unsigned(v) => Some(*v as f64),
            RawValue::Float(v) => Some(*v),
            RawValue::Text(_) | RawValue::Opaque(_) => None,
        }
    }
}

/// One decoded message, tagged with its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record-type identifier (FIT global message number).
    pub type_id: u16,
    /// Friendly type name, e.g. `record` or `session`.
    pub type_name: String,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(type_id: u16, type_name: impl Into<String>) -> Self {
        Record {
            type_id,
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, builder style.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// Receiver of decoded records.
///
/// Decoders call `ingest` once per record, in stream order, and never
/// concurrently.
pub trait RecordSink {
    fn ingest(&mut self, record: &Record);
}

impl RecordSink for Vec<Record> {
    fn ingest(&mut self, record: &Record) {
        self.push(record.clone());
    }
}
