//! RegistryBuilder for constructing an immutable Registry.

use crate::{FieldDef, FieldKind, OneofDef, Registry, TypeDef};
use std::collections::HashMap;
use thiserror::Error;
use vouch_core::TypeId;

/// Default prefix of packed type URLs.
pub const DEFAULT_TYPE_URL_PREFIX: &str = "type.vouch.dev";

/// Errors that can occur during registry construction or record building.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate type name: {0}")]
    DuplicateTypeName(String),

    #[error("Duplicate field `{field}` in type {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("Duplicate field number {number} in type {type_name}")]
    DuplicateFieldNumber { type_name: String, number: u32 },

    #[error("Oneof `{oneof}` in type {type_name} names unknown field `{field}`")]
    UnknownOneofField {
        type_name: String,
        oneof: String,
        field: String,
    },

    #[error("Field `{field}` in type {type_name} cannot be part of a oneof")]
    InvalidOneofField { type_name: String, field: String },

    #[error("Field `{field}` in type {type_name} refers to unknown type {target}")]
    UnknownFieldType {
        type_name: String,
        field: String,
        target: String,
    },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown field `{field}` in type {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("Field `{field}` expects {expected}, got {actual}")]
    KindMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Cannot pack record of type {type_name}: {reason}")]
    Pack { type_name: String, reason: String },
}

/// Builder for constructing an immutable Registry.
#[derive(Debug)]
pub struct RegistryBuilder {
    /// Next type ID to allocate.
    next_type_id: u32,
    /// Types being built.
    types: HashMap<TypeId, TypeDef>,
    /// Type name to ID mapping.
    type_names: HashMap<String, TypeId>,
    /// Prefix of packed type URLs.
    type_url_prefix: String,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            next_type_id: 0,
            types: HashMap::new(),
            type_names: HashMap::new(),
            type_url_prefix: DEFAULT_TYPE_URL_PREFIX.to_string(),
        }
    }
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different prefix for packed type URLs.
    pub fn type_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.type_url_prefix = prefix.into();
        self
    }

    /// Add a type definition.
    pub fn add_type(&mut self, name: impl Into<String>) -> TypeBuilder<'_> {
        let name = name.into();
        let id = TypeId::new(self.next_type_id);
        self.next_type_id += 1;

        TypeBuilder {
            builder: self,
            id,
            name,
            fields: Vec::new(),
            oneofs: Vec::new(),
        }
    }

    /// Build the immutable Registry.
    ///
    /// Every nested record kind must name a registered type, so types may be
    /// added in any order and may refer to themselves.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for type_def in self.types.values() {
            for field in type_def.fields() {
                if let FieldKind::Message(target) = &field.kind {
                    if !self.type_names.contains_key(target) {
                        return Err(RegistryError::UnknownFieldType {
                            type_name: type_def.name.clone(),
                            field: field.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        Ok(Registry::new(
            self.types,
            self.type_names,
            self.type_url_prefix,
        ))
    }
}

/// Builder for a type definition.
pub struct TypeBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    id: TypeId,
    name: String,
    fields: Vec<FieldDef>,
    oneofs: Vec<(String, Vec<String>)>,
}

impl<'a> TypeBuilder<'a> {
    /// Add a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Group already added fields into a oneof.
    pub fn oneof<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.oneofs
            .push((name.into(), fields.into_iter().map(Into::into).collect()));
        self
    }

    /// Finish building this type.
    pub fn done(mut self) -> Result<TypeId, RegistryError> {
        // Check for duplicate name
        if self.builder.type_names.contains_key(&self.name) {
            return Err(RegistryError::DuplicateTypeName(self.name));
        }

        for (i, field) in self.fields.iter().enumerate() {
            for earlier in &self.fields[..i] {
                if earlier.name == field.name {
                    return Err(RegistryError::DuplicateField {
                        type_name: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if earlier.id == field.id {
                    return Err(RegistryError::DuplicateFieldNumber {
                        type_name: self.name.clone(),
                        number: field.id.raw(),
                    });
                }
            }
        }

        // Resolve oneof members and tag their fields
        let mut oneofs = Vec::with_capacity(self.oneofs.len());
        for (oneof_name, member_names) in &self.oneofs {
            let mut members = Vec::with_capacity(member_names.len());
            for member in member_names {
                let field = self
                    .fields
                    .iter_mut()
                    .find(|f| &f.name == member)
                    .ok_or_else(|| RegistryError::UnknownOneofField {
                        type_name: self.name.clone(),
                        oneof: oneof_name.clone(),
                        field: member.clone(),
                    })?;
                if !field.is_singular() || field.oneof.is_some() {
                    return Err(RegistryError::InvalidOneofField {
                        type_name: self.name.clone(),
                        field: member.clone(),
                    });
                }
                field.oneof = Some(oneof_name.clone());
                members.push(field.id);
            }
            oneofs.push(OneofDef {
                name: oneof_name.clone(),
                fields: members,
            });
        }

        let type_def = TypeDef::new(self.id, self.name.clone(), self.fields, oneofs);

        self.builder.type_names.insert(self.name, self.id);
        self.builder.types.insert(self.id, type_def);

        Ok(self.id)
    }
}
