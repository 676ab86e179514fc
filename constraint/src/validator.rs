//! The top-level entry point for validating records.

use std::sync::Arc;
use vouch_core::Record;
use vouch_registry::{AnyUnpacker, Registry};

use crate::access::RecordView;
use crate::config::ValidatorConfig;
use crate::error::{ConstraintError, ConstraintResult};
use crate::evaluator::{EvalContext, MessageValidator};
use crate::model::ConstraintSet;
use crate::resolver::ConstraintSetResolver;
use crate::violation::ValidationError;

/// Validates records against the constraints of their types.
///
/// Immutable once built and safe to share across threads.
#[derive(Clone)]
pub struct Validator {
    registry: Arc<Registry>,
    resolver: Arc<dyn ConstraintSetResolver>,
    unpacker: Arc<dyn AnyUnpacker>,
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator that unpacks `Any` values through the registry.
    pub fn new(registry: Arc<Registry>, resolver: Arc<dyn ConstraintSetResolver>) -> Self {
        let unpacker: Arc<dyn AnyUnpacker> = registry.clone();
        Self {
            registry,
            resolver,
            unpacker,
            config: ValidatorConfig::default(),
        }
    }

    /// Resolve packed `Any` values with a different unpacker.
    pub fn with_unpacker(mut self, unpacker: Arc<dyn AnyUnpacker>) -> Self {
        self.unpacker = unpacker;
        self
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate a record against the constraints registered for its type.
    ///
    /// Returns `Ok(None)` for a valid record. Errors mean the constraints or
    /// the record's shape are broken, not that the data is invalid.
    pub fn validate(&self, record: &Record) -> ConstraintResult<Option<ValidationError>> {
        let Some(constraints) = self.resolver.resolve(record.type_name()) else {
            tracing::trace!(type_name = %record.type_name(), "no constraints registered");
            return Ok(None);
        };
        self.validate_with(record, &constraints)
    }

    /// Validate a record against an explicit constraint set.
    pub fn validate_with(
        &self,
        record: &Record,
        constraints: &ConstraintSet,
    ) -> ConstraintResult<Option<ValidationError>> {
        let type_name = record.type_name();
        let declaration = self
            .registry
            .get_type_by_name(type_name)
            .ok_or_else(|| ConstraintError::UnknownType(type_name.to_string()))?;
        if constraints.type_name() != type_name {
            return Err(ConstraintError::ConstraintSetMismatch {
                type_name: type_name.to_string(),
                declared_for: constraints.type_name().to_string(),
            });
        }

        tracing::debug!(type_name = %type_name, constraints = constraints.len(), "validating record");
        let context = EvalContext::new(
            &self.registry,
            self.resolver.as_ref(),
            self.unpacker.as_ref(),
            &self.config,
        );
        let view = RecordView::new(record, declaration);
        let result = MessageValidator::new(view, constraints, context).translate()?;

        tracing::debug!(
            type_name = %type_name,
            violations = result.as_ref().map_or(0, ValidationError::len),
            "validated record"
        );
        Ok(result)
    }
}
