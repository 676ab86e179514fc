//! The Registry - immutable schema lookup.

use crate::{RecordBuilder, RegistryError, TypeDef};
use std::collections::HashMap;
use vouch_core::{AnyValue, Record, TypeId};

/// Resolves the dynamic type of a packed value.
///
/// Returns `None` when the type is unknown or the payload cannot be decoded;
/// callers decide whether that is an error.
pub trait AnyUnpacker: Send + Sync {
    fn unpack(&self, any: &AnyValue) -> Option<Record>;
}

/// The Registry provides runtime lookup of record type definitions.
/// It is immutable after construction.
#[derive(Debug)]
pub struct Registry {
    /// Type definitions by ID.
    types: HashMap<TypeId, TypeDef>,
    /// Type ID lookup by name.
    type_names: HashMap<String, TypeId>,
    /// Prefix of packed type URLs.
    type_url_prefix: String,
}

impl Registry {
    pub(crate) fn new(
        types: HashMap<TypeId, TypeDef>,
        type_names: HashMap<String, TypeId>,
        type_url_prefix: String,
    ) -> Self {
        Self {
            types,
            type_names,
            type_url_prefix,
        }
    }

    // ==================== Type Lookups ====================

    /// Get a type definition by name.
    pub fn get_type_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.type_names.get(name).and_then(|id| self.types.get(id))
    }

    /// Get a type definition by ID.
    pub fn get_type(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(&id)
    }

    /// Get a type ID by name.
    pub fn get_type_id(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    /// Get all type definitions.
    pub fn all_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Get the number of types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ==================== Records ====================

    /// Start building a record of the named type.
    pub fn record(&self, type_name: &str) -> Result<RecordBuilder<'_>, RegistryError> {
        let type_def = self
            .get_type_by_name(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))?;
        Ok(RecordBuilder::new(type_def))
    }

    /// Type URL under which records of `type_name` are packed.
    pub fn type_url(&self, type_name: &str) -> String {
        format!("{}/{}", self.type_url_prefix, type_name)
    }

    /// Pack a record of a registered type into an `AnyValue`.
    pub fn pack(&self, record: &Record) -> Result<AnyValue, RegistryError> {
        if self.get_type_by_name(record.type_name()).is_none() {
            return Err(RegistryError::UnknownType(record.type_name().to_string()));
        }
        let value = serde_json::to_vec(record).map_err(|e| RegistryError::Pack {
            type_name: record.type_name().to_string(),
            reason: e.to_string(),
        })?;
        Ok(AnyValue::new(self.type_url(record.type_name()), value))
    }
}

impl AnyUnpacker for Registry {
    fn unpack(&self, any: &AnyValue) -> Option<Record> {
        let type_name = any.type_name();
        if self.get_type_by_name(type_name).is_none() {
            tracing::debug!(type_url = %any.type_url, "packed type is not registered");
            return None;
        }
        match serde_json::from_slice::<Record>(&any.value) {
            Ok(record) if record.type_name() == type_name => Some(record),
            Ok(record) => {
                tracing::debug!(
                    type_url = %any.type_url,
                    actual = %record.type_name(),
                    "packed payload has a different type"
                );
                None
            }
            Err(e) => {
                tracing::debug!(type_url = %any.type_url, error = %e, "cannot decode packed payload");
                None
            }
        }
    }
}
