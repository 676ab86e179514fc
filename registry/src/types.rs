//! Schema definition types.

use std::collections::HashMap;
use std::fmt;
use vouch_core::{AnyValue, FieldId, NumericKind, Record, TypeId, Value};

/// Declared kind of a field's elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bytes,
    /// Enum type, by name.
    Enum(String),
    /// Nested record type, by name.
    Message(String),
    /// Packed record of any registered type.
    Any,
}

impl FieldKind {
    /// The numeric kind of this field kind, if it is numeric.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            FieldKind::Int32 => Some(NumericKind::I32),
            FieldKind::Int64 => Some(NumericKind::I64),
            FieldKind::UInt32 => Some(NumericKind::U32),
            FieldKind::UInt64 => Some(NumericKind::U64),
            FieldKind::Float => Some(NumericKind::F32),
            FieldKind::Double => Some(NumericKind::F64),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_kind().is_some()
    }

    /// Returns true for nested record kinds, packed or not.
    pub fn is_message(&self) -> bool {
        matches!(self, FieldKind::Message(_) | FieldKind::Any)
    }

    /// Returns the schema-level name of this kind.
    pub fn name(&self) -> &str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Enum(name) | FieldKind::Message(name) => name.as_str(),
            FieldKind::Any => "any",
        }
    }

    /// The zero value of this kind.
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int32 => Value::Int32(0),
            FieldKind::Int64 => Value::Int64(0),
            FieldKind::UInt32 => Value::UInt32(0),
            FieldKind::UInt64 => Value::UInt64(0),
            FieldKind::Float => Value::Float(0.0),
            FieldKind::Double => Value::Double(0.0),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Enum(_) => Value::Enum(0),
            FieldKind::Message(name) => Value::Message(Record::new(name.clone())),
            FieldKind::Any => Value::Any(AnyValue::default()),
        }
    }

    /// Check whether a single element value is of this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Bool, Value::Bool(_))
            | (FieldKind::Int32, Value::Int32(_))
            | (FieldKind::Int64, Value::Int64(_))
            | (FieldKind::UInt32, Value::UInt32(_))
            | (FieldKind::UInt64, Value::UInt64(_))
            | (FieldKind::Float, Value::Float(_))
            | (FieldKind::Double, Value::Double(_))
            | (FieldKind::String, Value::String(_))
            | (FieldKind::Bytes, Value::Bytes(_))
            | (FieldKind::Enum(_), Value::Enum(_))
            | (FieldKind::Any, Value::Any(_)) => true,
            (FieldKind::Message(name), Value::Message(record)) => record.type_name() == name,
            _ => false,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many elements a field holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one element.
    #[default]
    Singular,
    /// Zero or more elements, in order.
    Repeated,
    /// Zero or more entries keyed by a scalar kind.
    Map { key: FieldKind },
}

/// Field definition within a type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Stable field identity.
    pub id: FieldId,
    /// Field name.
    pub name: String,
    /// Kind of the field's elements (map values for map fields).
    pub kind: FieldKind,
    /// Singular, repeated or map.
    pub cardinality: Cardinality,
    /// Name of the oneof group this field belongs to, if any.
    pub oneof: Option<String>,
}

impl FieldDef {
    pub fn new(id: u32, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: FieldId::new(id),
            name: name.into(),
            kind,
            cardinality: Cardinality::Singular,
            oneof: None,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    pub fn map_with_key(mut self, key: FieldKind) -> Self {
        self.cardinality = Cardinality::Map { key };
        self
    }

    pub fn is_singular(&self) -> bool {
        matches!(self.cardinality, Cardinality::Singular)
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated)
    }

    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map { .. })
    }

    pub fn is_collection(&self) -> bool {
        !self.is_singular()
    }

    /// The value an unset field reads as.
    pub fn default_value(&self) -> Value {
        match self.cardinality {
            Cardinality::Singular => self.kind.default_value(),
            Cardinality::Repeated => Value::List(Vec::new()),
            Cardinality::Map { .. } => Value::Map(Vec::new()),
        }
    }

    /// Check whether a whole field value matches this declaration.
    pub fn accepts(&self, value: &Value) -> bool {
        match (&self.cardinality, value) {
            (Cardinality::Singular, v) => self.kind.accepts(v),
            (Cardinality::Repeated, Value::List(items)) => {
                items.iter().all(|item| self.kind.accepts(item))
            }
            (Cardinality::Map { key }, Value::Map(entries)) => entries
                .iter()
                .all(|(k, v)| key.accepts(k) && self.kind.accepts(v)),
            _ => false,
        }
    }

    /// Human-readable type label, e.g. `repeated string` or `map<string, int32>`.
    pub fn type_label(&self) -> String {
        match &self.cardinality {
            Cardinality::Singular => self.kind.name().to_string(),
            Cardinality::Repeated => format!("repeated {}", self.kind),
            Cardinality::Map { key } => format!("map<{}, {}>", key, self.kind),
        }
    }
}

/// A named group of mutually exclusive fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofDef {
    pub name: String,
    /// Case fields, in declaration order.
    pub fields: Vec<FieldId>,
}

/// Record type definition.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Unique identifier.
    pub id: TypeId,
    /// Fully qualified type name.
    pub name: String,
    /// Field definitions, in declaration order.
    fields: Vec<FieldDef>,
    /// Oneof groups, in declaration order.
    oneofs: Vec<OneofDef>,
    /// Field position by name.
    by_name: HashMap<String, usize>,
    /// Field position by id.
    by_id: HashMap<FieldId, usize>,
}

impl TypeDef {
    pub(crate) fn new(
        id: TypeId,
        name: impl Into<String>,
        fields: Vec<FieldDef>,
        oneofs: Vec<OneofDef>,
    ) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        let by_id = fields.iter().enumerate().map(|(i, f)| (f.id, i)).collect();
        Self {
            id,
            name: name.into(),
            fields,
            oneofs,
            by_name,
            by_id,
        }
    }

    /// All field definitions, in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Get a field definition by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Get a field definition by id.
    pub fn field(&self, id: FieldId) -> Option<&FieldDef> {
        self.by_id.get(&id).map(|&i| &self.fields[i])
    }

    /// Check if this type has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All oneof groups, in declaration order.
    pub fn oneofs(&self) -> &[OneofDef] {
        &self.oneofs
    }

    /// Get a oneof group by name.
    pub fn oneof(&self, name: &str) -> Option<&OneofDef> {
        self.oneofs.iter().find(|o| o.name == name)
    }
}
