//! Constraint evaluation.
//!
//! A [`MessageValidator`] checks one record against the constraint set of its
//! type. Violations are collected in constraint declaration order. Validate
//! constraints recurse into nested records through the injected resolver and
//! wrap whatever the nested run finds as children of a single violation on
//! the field holding the nested record.

use std::cmp::Ordering;
use std::collections::HashMap;
use vouch_core::{NumericError, NumericKind, NumericValue, Record, TemplateString, Value};
use vouch_registry::{AnyUnpacker, FieldDef, Registry};

use crate::access::RecordView;
use crate::bound::{BoundValue, NumericBound};
use crate::config::{UnresolvedAnyPolicy, ValidatorConfig};
use crate::error::{ConstraintError, ConstraintResult};
use crate::model::{
    CompanionConstraint, Constraint, ConstraintSet, DistinctConstraint, FieldGroupConstraint,
    MessageTemplate, OneofConstraint, PatternConstraint, Placeholder, PluginConstraint,
    RangeConstraint, RequiredConstraint, ValidateConstraint,
};
use crate::resolver::ConstraintSetResolver;
use crate::violation::{ConstraintViolation, ValidationError};

const UNRESOLVED_ANY_MESSAGE: &str =
    "The field `${parent.type}.${field.path}` holds a packed value of the unknown type `${field.value}`.";

/// Collaborators and settings shared by one validation run.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub registry: &'a Registry,
    pub resolver: &'a dyn ConstraintSetResolver,
    pub unpacker: &'a dyn AnyUnpacker,
    pub config: &'a ValidatorConfig,
    /// Nesting level of the record being checked; the root is 0.
    pub depth: usize,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        registry: &'a Registry,
        resolver: &'a dyn ConstraintSetResolver,
        unpacker: &'a dyn AnyUnpacker,
        config: &'a ValidatorConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            unpacker,
            config,
            depth: 0,
        }
    }

    fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// Checks one record against one constraint set.
pub struct MessageValidator<'a> {
    view: RecordView<'a>,
    constraints: &'a ConstraintSet,
    context: EvalContext<'a>,
    violations: Vec<ConstraintViolation>,
}

impl<'a> MessageValidator<'a> {
    pub fn new(
        view: RecordView<'a>,
        constraints: &'a ConstraintSet,
        context: EvalContext<'a>,
    ) -> Self {
        Self {
            view,
            constraints,
            context,
            violations: Vec::new(),
        }
    }

    /// Run every constraint. `None` means the record is valid.
    pub fn translate(self) -> ConstraintResult<Option<ValidationError>> {
        Ok(ValidationError::new(self.collect()?))
    }

    fn collect(mut self) -> ConstraintResult<Vec<ConstraintViolation>> {
        let constraints = self.constraints;
        for constraint in constraints.iter() {
            tracing::trace!(
                constraint = constraint.name(),
                type_name = %self.view.type_name(),
                path = %self.view.path(),
                "checking constraint"
            );
            self.check(constraint)?;
        }
        Ok(self.violations)
    }

    fn check(&mut self, constraint: &Constraint) -> ConstraintResult<()> {
        match constraint {
            Constraint::Required(c) => self.check_required(c),
            Constraint::NumericRange(c) => self.check_range(c),
            Constraint::Pattern(c) => self.check_pattern(c),
            Constraint::Distinct(c) => self.check_distinct(c),
            Constraint::Companion(c) => self.check_companion(c),
            Constraint::Validate(c) => self.check_validate(c),
            Constraint::FieldGroup(c) => self.check_field_group(c),
            Constraint::OneofRequired(c) => self.check_oneof(c),
            Constraint::Custom(c) => self.check_custom(c),
        }
    }

    // ==================== Field constraints ====================

    fn check_required(&mut self, c: &RequiredConstraint) -> ConstraintResult<()> {
        let value = self.view.value_of(&c.field)?;
        let violated = if c.collection_means_non_empty && c.field.is_collection() {
            value.is_empty()
        } else {
            value.is_default()
        };
        if violated {
            let violation = self.field_violation(&c.message, &c.field, TemplateString::new);
            self.violations.push(violation);
        }
        Ok(())
    }

    fn check_range(&mut self, c: &RangeConstraint) -> ConstraintResult<()> {
        let kind = c.field.kind.numeric_kind().ok_or_else(|| {
            ConstraintError::inapplicable(RangeConstraint::NAME, &c.field.name, c.field.type_label())
        })?;
        let lower = self.resolve_bound(c.lower.as_ref(), &c.field, kind)?;
        let upper = self.resolve_bound(c.upper.as_ref(), &c.field, kind)?;
        let range_text = c.range_text();

        let value = self.view.value_of(&c.field)?;
        for element in value.values() {
            let number = element.as_numeric().ok_or_else(|| {
                ConstraintError::field_kind_mismatch(
                    self.view.type_name(),
                    &c.field.name,
                    kind.name(),
                    element.type_name(),
                )
            })?;
            let within_lower = match &lower {
                Some((bound, limit)) => within(bound, number, *limit, true)?,
                None => true,
            };
            let within_upper = match &upper {
                Some((bound, limit)) => within(bound, number, *limit, false)?,
                None => true,
            };
            if !(within_lower && within_upper) {
                let violation = self
                    .field_violation(&c.message, &c.field, |t| {
                        TemplateString::new(t)
                            .with_value(Placeholder::FieldValue.key(), element.to_string())
                            .with_value(Placeholder::RangeValue.key(), range_text.as_str())
                    })
                    .with_value(element.clone());
                self.violations.push(violation);
            }
        }
        Ok(())
    }

    /// Resolve a bound to a value of the field's kind.
    fn resolve_bound<'b>(
        &self,
        bound: Option<&'b NumericBound>,
        field: &FieldDef,
        kind: NumericKind,
    ) -> ConstraintResult<Option<(&'b NumericBound, NumericValue)>> {
        let Some(bound) = bound else {
            return Ok(None);
        };
        let value = match &bound.value {
            BoundValue::Literal(literal) => *literal,
            BoundValue::Field(reference) => self.view.resolve_numeric(reference)?,
        };
        let mismatch = || ConstraintError::BoundKindMismatch {
            field: field.name.clone(),
            bound: bound.value.to_string(),
            bound_kind: value.kind(),
            field_kind: kind,
        };
        let widened = value.widen_to(kind).ok_or_else(mismatch)?;
        Ok(Some((bound, widened)))
    }

    fn check_pattern(&mut self, c: &PatternConstraint) -> ConstraintResult<()> {
        let value = self.view.value_of(&c.field)?;
        for element in value.non_default() {
            let text = element.as_str().ok_or_else(|| {
                ConstraintError::field_kind_mismatch(
                    self.view.type_name(),
                    &c.field.name,
                    c.field.kind.name(),
                    element.type_name(),
                )
            })?;
            if c.matches(text) {
                continue;
            }
            let violation = self
                .field_violation(&c.message, &c.field, |t| {
                    TemplateString::new(t)
                        .with_value(Placeholder::FieldValue.key(), text)
                        .with_value(Placeholder::RegexPattern.key(), c.pattern.as_str())
                        .with_value(Placeholder::RegexModifiers.key(), c.modifiers.to_string())
                })
                .with_value(element.clone());
            self.violations.push(violation);
        }
        Ok(())
    }

    fn check_distinct(&mut self, c: &DistinctConstraint) -> ConstraintResult<()> {
        let value = self.view.value_of(&c.field)?;
        let duplicates = duplicates(value.values());
        if duplicates.is_empty() {
            return Ok(());
        }

        let duplicates = Value::List(duplicates);
        let violation = self
            .field_violation(&c.message, &c.field, |t| {
                TemplateString::new(t)
                    .with_value(Placeholder::FieldDuplicates.key(), duplicates.to_string())
            })
            .with_value(duplicates);
        self.violations.push(violation);
        Ok(())
    }

    fn check_companion(&mut self, c: &CompanionConstraint) -> ConstraintResult<()> {
        let declaration = self.view.declaration();
        let companion = declaration.field_by_name(&c.companion).ok_or_else(|| {
            ConstraintError::UnknownCompanion {
                type_name: declaration.name.clone(),
                field: c.field.name.clone(),
                companion: c.companion.clone(),
            }
        })?;

        let subject = self.view.value_of(&c.field)?;
        if subject.is_default() || !self.view.value_of(companion)?.is_default() {
            return Ok(());
        }
        let violation = self.field_violation(&c.message, &c.field, |t| {
            TemplateString::new(t).with_value(Placeholder::GoesCompanion.key(), c.companion.as_str())
        });
        self.violations.push(violation);
        Ok(())
    }

    fn check_validate(&mut self, c: &ValidateConstraint) -> ConstraintResult<()> {
        // A present record is validated even when all of its fields are zero.
        if c.field.is_singular() && !self.view.is_set(&c.field) {
            return Ok(());
        }
        let value = self.view.value_of(&c.field)?;
        for element in value.values() {
            let unpacked;
            let record: &Record = match element {
                Value::Message(record) => record,
                Value::Any(any) => match self.context.unpacker.unpack(any) {
                    Some(record) => {
                        unpacked = record;
                        &unpacked
                    }
                    None => {
                        tracing::debug!(
                            type_url = %any.type_url,
                            path = %self.view.field_path(&c.field),
                            "packed value has an unresolvable type"
                        );
                        if self.context.config.unresolved_any == UnresolvedAnyPolicy::Reject {
                            let message = MessageTemplate::new(
                                ValidateConstraint::NAME,
                                UNRESOLVED_ANY_MESSAGE,
                                &[
                                    Placeholder::FieldPath,
                                    Placeholder::ParentType,
                                    Placeholder::FieldValue,
                                ],
                            )?;
                            let violation = self
                                .field_violation(&message, &c.field, |t| {
                                    TemplateString::new(t)
                                        .with_value(Placeholder::FieldValue.key(), any.type_url.as_str())
                                })
                                .with_value(element.clone());
                            self.violations.push(violation);
                        }
                        continue;
                    }
                },
                other => {
                    return Err(ConstraintError::field_kind_mismatch(
                        self.view.type_name(),
                        &c.field.name,
                        c.field.kind.name(),
                        other.type_name(),
                    ))
                }
            };

            let children = self.validate_nested(&c.field, record)?;
            if children.is_empty() {
                continue;
            }
            let violation = self
                .field_violation(&c.message, &c.field, TemplateString::new)
                .with_value(element.clone())
                .with_children(children);
            self.violations.push(violation);
        }
        Ok(())
    }

    /// Validate a nested record, returning its violations.
    fn validate_nested(
        &self,
        field: &FieldDef,
        record: &Record,
    ) -> ConstraintResult<Vec<ConstraintViolation>> {
        let type_name = record.type_name();
        let Some(constraints) = self.context.resolver.resolve(type_name) else {
            tracing::trace!(type_name = %type_name, "no constraints registered");
            return Ok(Vec::new());
        };
        let declaration = self
            .context
            .registry
            .get_type_by_name(type_name)
            .ok_or_else(|| ConstraintError::UnknownType(type_name.to_string()))?;
        let view = self.view.nested_in(&field.name, record, declaration);

        let context = self.context.nested();
        if context.depth > context.config.max_depth {
            return Err(ConstraintError::DepthExceeded {
                type_name: type_name.to_string(),
                path: view.path().to_string(),
                max_depth: context.config.max_depth,
            });
        }
        MessageValidator::new(view, &constraints, context).collect()
    }

    // ==================== Message constraints ====================

    fn check_field_group(&mut self, c: &FieldGroupConstraint) -> ConstraintResult<()> {
        for alternative in &c.alternatives {
            let mut satisfied = true;
            for field in alternative {
                if self.view.value_of(field)?.is_default() {
                    satisfied = false;
                    break;
                }
            }
            if satisfied {
                return Ok(());
            }
        }
        let path = self.view.path().clone();
        let message = c
            .message
            .to_template()
            .with_value(Placeholder::GroupPath.key(), path.to_string())
            .with_value(Placeholder::ParentType.key(), self.view.type_name())
            .with_value(Placeholder::GroupFields.key(), c.expression.as_str());
        self.violations
            .push(ConstraintViolation::new(message, self.view.type_name(), path));
        Ok(())
    }

    fn check_oneof(&mut self, c: &OneofConstraint) -> ConstraintResult<()> {
        if c.cases.iter().any(|case| self.view.is_set(case)) {
            return Ok(());
        }
        let path = self.view.path().child(c.oneof.as_str());
        let message = c
            .message
            .to_template()
            .with_value(Placeholder::GroupPath.key(), path.to_string())
            .with_value(Placeholder::ParentType.key(), self.view.type_name());
        self.violations
            .push(ConstraintViolation::new(message, self.view.type_name(), path));
        Ok(())
    }

    fn check_custom(&mut self, c: &PluginConstraint) -> ConstraintResult<()> {
        let found = c
            .plugin
            .evaluate(&self.view)
            .map_err(|source| ConstraintError::Custom {
                name: c.plugin.name().to_string(),
                source,
            })?;
        self.violations.extend(found);
        Ok(())
    }

    // ==================== Helpers ====================

    /// A violation on `field` with the placeholders every field constraint shares.
    fn field_violation<F>(
        &self,
        message: &MessageTemplate,
        field: &FieldDef,
        template: F,
    ) -> ConstraintViolation
    where
        F: FnOnce(String) -> TemplateString,
    {
        let path = self.view.field_path(field);
        let message = template(message.text().to_string())
            .with_value(Placeholder::FieldPath.key(), path.to_string())
            .with_value(Placeholder::FieldType.key(), field.type_label())
            .with_value(Placeholder::ParentType.key(), self.view.type_name());
        ConstraintViolation::new(message, self.view.type_name(), path)
    }
}

/// Hashable identity of a scalar element. Equal keys mean equal values.
#[derive(PartialEq, Eq, Hash)]
enum ElementKey<'v> {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(u32),
    Double(u64),
    Str(&'v str),
    Bytes(&'v [u8]),
    Enum(i32),
}

impl<'v> ElementKey<'v> {
    /// `None` for NaN and for composite values, which are compared directly.
    fn of(value: &'v Value) -> Option<Self> {
        let key = match value {
            Value::Bool(v) => ElementKey::Bool(*v),
            Value::Int32(v) => ElementKey::Int32(*v),
            Value::Int64(v) => ElementKey::Int64(*v),
            Value::UInt32(v) => ElementKey::UInt32(*v),
            Value::UInt64(v) => ElementKey::UInt64(*v),
            // -0.0 == 0.0, so both zeros share the bits of 0.0.
            Value::Float(v) if v.is_nan() => return None,
            Value::Float(v) => ElementKey::Float(if *v == 0.0 { 0 } else { v.to_bits() }),
            Value::Double(v) if v.is_nan() => return None,
            Value::Double(v) => ElementKey::Double(if *v == 0.0 { 0 } else { v.to_bits() }),
            Value::String(v) => ElementKey::Str(v),
            Value::Bytes(v) => ElementKey::Bytes(v),
            Value::Enum(v) => ElementKey::Enum(*v),
            Value::Message(_) | Value::Any(_) | Value::List(_) | Value::Map(_) => return None,
        };
        Some(key)
    }
}

/// Values occurring more than once, each listed once in first-seen order.
fn duplicates<'v>(elements: impl Iterator<Item = &'v Value>) -> Vec<Value> {
    // One group per distinct value: its first occurrence and a count.
    let mut groups: Vec<(&'v Value, usize)> = Vec::new();
    let mut keyed: HashMap<ElementKey<'v>, usize> = HashMap::new();
    for element in elements {
        let key = ElementKey::of(element);
        let found = match &key {
            Some(key) => keyed.get(key).copied(),
            None => groups.iter().position(|(first, _)| *first == element),
        };
        match found {
            Some(index) => groups[index].1 += 1,
            None => {
                if let Some(key) = key {
                    keyed.insert(key, groups.len());
                }
                groups.push((element, 1));
            }
        }
    }
    groups
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(value, _)| value.clone())
        .collect()
}

/// Check `value` against one side of a range.
fn within(
    bound: &NumericBound,
    value: NumericValue,
    limit: NumericValue,
    is_lower: bool,
) -> ConstraintResult<bool> {
    let admitted = match compare(value, limit)? {
        Some(ordering) if is_lower => bound.admits_from_below(ordering),
        Some(ordering) => bound.admits_from_above(ordering),
        None => false,
    };
    Ok(admitted)
}

/// Order two values of the same kind. NaN is unordered and never in range.
fn compare(value: NumericValue, limit: NumericValue) -> ConstraintResult<Option<Ordering>> {
    match value.try_cmp(&limit) {
        Ok(ordering) => Ok(Some(ordering)),
        Err(NumericError::Unordered { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
