//! Registry-checked record construction.

use crate::{RegistryError, TypeDef};
use vouch_core::{Record, Value};

/// Builds a record by field name, checking each value against its declaration.
pub struct RecordBuilder<'r> {
    type_def: &'r TypeDef,
    record: Record,
}

impl<'r> RecordBuilder<'r> {
    pub(crate) fn new(type_def: &'r TypeDef) -> Self {
        Self {
            type_def,
            record: Record::new(type_def.name.clone()),
        }
    }

    /// Set a field by name.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Result<Self, RegistryError> {
        let field_def =
            self.type_def
                .field_by_name(field)
                .ok_or_else(|| RegistryError::UnknownField {
                    type_name: self.type_def.name.clone(),
                    field: field.to_string(),
                })?;
        let value = value.into();
        if !field_def.accepts(&value) {
            return Err(RegistryError::KindMismatch {
                field: field.to_string(),
                expected: field_def.type_label(),
                actual: value.type_name().to_string(),
            });
        }
        // Setting one case of a oneof clears the others.
        if let Some(oneof) = field_def.oneof.as_deref().and_then(|n| self.type_def.oneof(n)) {
            for id in oneof.fields.iter().filter(|id| **id != field_def.id) {
                self.record.clear(*id);
            }
        }
        self.record.set(field_def.id, value);
        Ok(self)
    }

    /// Set a map field from key/value pairs.
    pub fn set_map<K, V, I>(self, field: &str, entries: I) -> Result<Self, RegistryError>
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.set(field, Value::Map(entries))
    }

    pub fn build(self) -> Record {
        self.record
    }
}
