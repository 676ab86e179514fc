//! ConstraintSetBuilder for declaring the constraints of a record type.

use std::sync::Arc;
use vouch_registry::{FieldDef, FieldKind, Registry, TypeDef};

use crate::bound::BoundParser;
use crate::error::{ConstraintError, ConstraintResult};
use crate::model::{
    CompanionConstraint, Constraint, ConstraintSet, CustomConstraint, DistinctConstraint,
    FieldGroupConstraint, MessageTemplate, OneofConstraint, PatternConstraint, PatternModifiers,
    PluginConstraint, RangeConstraint, RequiredConstraint, ValidateConstraint,
};

/// Builder for the constraint set of one record type.
///
/// Each call checks the constraint against the type's declaration, so a
/// built set never refers to unknown fields or inapplicable kinds.
#[derive(Debug)]
pub struct ConstraintSetBuilder<'r> {
    registry: &'r Registry,
    declaration: &'r TypeDef,
    constraints: Vec<Constraint>,
}

impl<'r> ConstraintSetBuilder<'r> {
    pub(crate) fn new(registry: &'r Registry, type_name: &str) -> ConstraintResult<Self> {
        let declaration = registry
            .get_type_by_name(type_name)
            .ok_or_else(|| ConstraintError::UnknownType(type_name.to_string()))?;
        Ok(Self {
            registry,
            declaration,
            constraints: Vec::new(),
        })
    }

    // ==================== Field constraints ====================

    /// The field must be set to a non-default value.
    pub fn required(self, field: &str) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        let is_scalar = field.kind == FieldKind::Bool || field.kind.is_numeric();
        if field.is_singular() && is_scalar {
            return Err(self.inapplicable(RequiredConstraint::NAME, field));
        }
        self.push_required(field, false)
    }

    /// The collection field must not be empty; its elements may be default.
    pub fn required_collection(self, field: &str) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        if field.is_singular() {
            return Err(self.inapplicable(RequiredConstraint::NAME, field));
        }
        self.push_required(field, true)
    }

    /// Elements must lie within an interval such as `[0..100)`.
    pub fn range(self, field: &str, range: &str) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        let (lower, upper) = self.bounds(field)?.parse_range(range)?;
        self.push_range(field, Some(lower), Some(upper))
    }

    /// Elements must be at least `bound`, or above it when `exclusive`.
    pub fn min(self, field: &str, bound: &str, exclusive: bool) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        let lower = self.bounds(field)?.parse(bound, exclusive)?;
        self.push_range(field, Some(lower), None)
    }

    /// Elements must be at most `bound`, or below it when `exclusive`.
    pub fn max(self, field: &str, bound: &str, exclusive: bool) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        let upper = self.bounds(field)?.parse(bound, exclusive)?;
        self.push_range(field, None, Some(upper))
    }

    /// Non-default string elements must match `pattern`.
    pub fn pattern(
        mut self,
        field: &str,
        pattern: &str,
        modifiers: PatternModifiers,
    ) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        if field.kind != FieldKind::String {
            return Err(self.inapplicable(PatternConstraint::NAME, field));
        }
        let message = default_message(
            PatternConstraint::NAME,
            PatternConstraint::DEFAULT_MESSAGE,
            PatternConstraint::PLACEHOLDERS,
        )?;
        let constraint = PatternConstraint::new(field.clone(), pattern, modifiers, message)?;
        self.constraints.push(Constraint::Pattern(constraint));
        Ok(self)
    }

    /// A repeated or map field must not hold the same value twice.
    pub fn distinct(mut self, field: &str) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        if field.is_singular() {
            return Err(self.inapplicable(DistinctConstraint::NAME, field));
        }
        let message = default_message(
            DistinctConstraint::NAME,
            DistinctConstraint::DEFAULT_MESSAGE,
            DistinctConstraint::PLACEHOLDERS,
        )?;
        self.constraints.push(Constraint::Distinct(DistinctConstraint {
            field: field.clone(),
            message,
        }));
        Ok(self)
    }

    /// When `field` is set, `companion` must be set too.
    pub fn goes(mut self, field: &str, companion: &str) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        if !self.declaration.has_field(companion) {
            return Err(ConstraintError::UnknownCompanion {
                type_name: self.declaration.name.clone(),
                field: field.name.clone(),
                companion: companion.to_string(),
            });
        }
        if companion == field.name {
            return Err(ConstraintError::SelfReference {
                field: field.name.clone(),
            });
        }
        let message = default_message(
            CompanionConstraint::NAME,
            CompanionConstraint::DEFAULT_MESSAGE,
            CompanionConstraint::PLACEHOLDERS,
        )?;
        self.constraints.push(Constraint::Companion(CompanionConstraint {
            field: field.clone(),
            companion: companion.to_string(),
            message,
        }));
        Ok(self)
    }

    /// Records held by the field are validated against their own constraints.
    pub fn validate(mut self, field: &str) -> ConstraintResult<Self> {
        let field = self.field(field)?;
        if !field.kind.is_message() {
            return Err(self.inapplicable(ValidateConstraint::NAME, field));
        }
        let message = default_message(
            ValidateConstraint::NAME,
            ValidateConstraint::DEFAULT_MESSAGE,
            ValidateConstraint::PLACEHOLDERS,
        )?;
        self.constraints.push(Constraint::Validate(ValidateConstraint {
            field: field.clone(),
            message,
        }));
        Ok(self)
    }

    // ==================== Message constraints ====================

    /// At least one group of fields must be fully set.
    ///
    /// Groups are separated by `|` and fields within a group by `&`, e.g.
    /// `email | phone & country`.
    pub fn require_fields(mut self, expression: &str) -> ConstraintResult<Self> {
        let mut alternatives = Vec::new();
        for alternative in expression.split('|') {
            let names: Vec<&str> = alternative
                .split('&')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect();
            if names.is_empty() {
                return Err(ConstraintError::EmptyFieldGroup {
                    type_name: self.declaration.name.clone(),
                    group: expression.to_string(),
                });
            }
            let fields = names
                .into_iter()
                .map(|name| self.field(name).cloned())
                .collect::<ConstraintResult<Vec<_>>>()?;
            alternatives.push(fields);
        }
        let message = default_message(
            FieldGroupConstraint::NAME,
            FieldGroupConstraint::DEFAULT_MESSAGE,
            FieldGroupConstraint::PLACEHOLDERS,
        )?;
        self.constraints
            .push(Constraint::FieldGroup(FieldGroupConstraint {
                expression: expression.trim().to_string(),
                alternatives,
                message,
            }));
        Ok(self)
    }

    /// One case of the named oneof must be set.
    pub fn oneof_required(mut self, oneof: &str) -> ConstraintResult<Self> {
        let declaration = self.declaration;
        let def = declaration
            .oneof(oneof)
            .ok_or_else(|| ConstraintError::UnknownOneof {
                type_name: declaration.name.clone(),
                oneof: oneof.to_string(),
            })?;
        let cases = def
            .fields
            .iter()
            .filter_map(|id| declaration.field(*id))
            .cloned()
            .collect();
        let message = default_message(
            OneofConstraint::NAME,
            OneofConstraint::DEFAULT_MESSAGE,
            OneofConstraint::PLACEHOLDERS,
        )?;
        self.constraints.push(Constraint::OneofRequired(OneofConstraint {
            oneof: oneof.to_string(),
            cases,
            message,
        }));
        Ok(self)
    }

    /// Run a plugin against every record of this type.
    pub fn custom(mut self, plugin: Arc<dyn CustomConstraint>) -> ConstraintResult<Self> {
        self.constraints
            .push(Constraint::Custom(PluginConstraint { plugin }));
        Ok(self)
    }

    // ==================== Messages ====================

    /// Replace the message of the constraint added last.
    pub fn with_message(mut self, text: &str) -> ConstraintResult<Self> {
        let last = self
            .constraints
            .last_mut()
            .ok_or(ConstraintError::MessageWithoutConstraint)?;
        last.set_message(text)?;
        Ok(self)
    }

    pub fn build(self) -> ConstraintSet {
        ConstraintSet::new(self.declaration.name.clone(), self.constraints)
    }

    // ==================== Helpers ====================

    fn field(&self, name: &str) -> ConstraintResult<&'r FieldDef> {
        self.declaration
            .field_by_name(name)
            .ok_or_else(|| ConstraintError::unknown_field(&self.declaration.name, name))
    }

    fn bounds(&self, field: &'r FieldDef) -> ConstraintResult<BoundParser<'r>> {
        BoundParser::new(self.registry, self.declaration, field)
    }

    fn inapplicable(&self, constraint: &'static str, field: &FieldDef) -> ConstraintError {
        ConstraintError::inapplicable(constraint, &field.name, field.type_label())
    }

    fn push_required(
        mut self,
        field: &FieldDef,
        collection_means_non_empty: bool,
    ) -> ConstraintResult<Self> {
        let message = default_message(
            RequiredConstraint::NAME,
            RequiredConstraint::DEFAULT_MESSAGE,
            RequiredConstraint::PLACEHOLDERS,
        )?;
        self.constraints.push(Constraint::Required(RequiredConstraint {
            field: field.clone(),
            collection_means_non_empty,
            message,
        }));
        Ok(self)
    }

    fn push_range(
        mut self,
        field: &FieldDef,
        lower: Option<crate::bound::NumericBound>,
        upper: Option<crate::bound::NumericBound>,
    ) -> ConstraintResult<Self> {
        let message = default_message(
            RangeConstraint::NAME,
            RangeConstraint::DEFAULT_MESSAGE,
            RangeConstraint::PLACEHOLDERS,
        )?;
        self.constraints.push(Constraint::NumericRange(RangeConstraint {
            field: field.clone(),
            lower,
            upper,
            message,
        }));
        Ok(self)
    }
}

fn default_message(
    constraint: &'static str,
    text: &str,
    supported: &[crate::model::Placeholder],
) -> ConstraintResult<MessageTemplate> {
    MessageTemplate::new(constraint, text, supported)
}
