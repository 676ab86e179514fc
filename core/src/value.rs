//! Value types for record fields.
//!
//! Values are the data stored in record fields. Vouch supports the usual
//! scalar kinds, nested records, packed `Any` records, and the two collection
//! shapes (repeated fields as lists, map fields as ordered key/value pairs).

use crate::{FieldId, NumericValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value that can be stored in a record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value by number.
    Enum(i32),
    /// Nested record.
    Message(Record),
    /// Packed record of a dynamically known type.
    Any(AnyValue),
    /// Elements of a repeated field.
    List(Vec<Value>),
    /// Entries of a map field, in insertion order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Returns true if this value equals the zero value of its kind.
    ///
    /// Collections are default when empty. A nested record is default when
    /// all of its fields are.
    pub fn is_default(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::Int32(v) => *v == 0,
            Value::Int64(v) => *v == 0,
            Value::UInt32(v) => *v == 0,
            Value::UInt64(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Double(v) => *v == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Enum(v) => *v == 0,
            Value::Message(record) => record.is_default(),
            Value::Any(any) => any.is_default(),
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
        }
    }

    /// Get as a typed number if this is a numeric value.
    pub fn as_numeric(&self) -> Option<NumericValue> {
        match self {
            Value::Int32(v) => Some(NumericValue::I32(*v)),
            Value::Int64(v) => Some(NumericValue::I64(*v)),
            Value::UInt32(v) => Some(NumericValue::U32(*v)),
            Value::UInt64(v) => Some(NumericValue::U64(*v)),
            Value::Float(v) => Some(NumericValue::F32(*v)),
            Value::Double(v) => Some(NumericValue::F64(*v)),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as record if this is a Message value.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Message(record) => Some(record),
            _ => None,
        }
    }

    /// Get as packed value if this is an Any value.
    pub fn as_any(&self) -> Option<&AnyValue> {
        match self {
            Value::Any(any) => Some(any),
            _ => None,
        }
    }

    /// Returns the kind name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
            Value::Any(_) => "any",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Enum(v) => write!(f, "enum:{}", v),
            Value::Message(record) => write!(f, "{}", record),
            Value::Any(any) => write!(f, "any({})", any.type_url),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Message(record)
    }
}

impl From<AnyValue> for Value {
    fn from(any: AnyValue) -> Self {
        Value::Any(any)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// One record instance: a type name plus the values of its set fields.
///
/// A field missing from the record is unset and reads as the zero value of
/// its declared kind. Records own their nested records, so a record tree is
/// always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    type_name: String,
    fields: BTreeMap<FieldId, Value>,
}

impl Record {
    /// Create an empty record of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field, builder style.
    pub fn with(mut self, field: FieldId, value: impl Into<Value>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Set a field.
    pub fn set(&mut self, field: FieldId, value: impl Into<Value>) {
        self.fields.insert(field, value.into());
    }

    /// Unset a field, returning its previous value.
    pub fn clear(&mut self, field: FieldId) -> Option<Value> {
        self.fields.remove(&field)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Get the value of a set field.
    pub fn get(&self, field: FieldId) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// Check whether a field is present.
    pub fn is_set(&self, field: FieldId) -> bool {
        self.fields.contains_key(&field)
    }

    /// Iterate over set fields in field-number order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &Value)> {
        self.fields.iter().map(|(id, value)| (*id, value))
    }

    /// Returns true if every field holds its zero value.
    pub fn is_default(&self) -> bool {
        self.fields.values().all(Value::is_default)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.type_name)?;
        for (i, (id, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", id, value)?;
        }
        write!(f, " }}")
    }
}

/// A packed record whose type is only known at runtime.
///
/// The type URL ends with `/<type name>`; the payload is opaque to the core
/// and is decoded by whoever knows the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyValue {
    pub type_url: String,
    pub value: Vec<u8>,
}

impl AnyValue {
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }

    /// The type name encoded in the URL (everything after the last `/`).
    pub fn type_name(&self) -> &str {
        self.type_url
            .rsplit('/')
            .next()
            .unwrap_or(self.type_url.as_str())
    }

    pub fn is_default(&self) -> bool {
        self.type_url.is_empty() && self.value.is_empty()
    }
}
