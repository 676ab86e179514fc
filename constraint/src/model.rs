//! The constraint model.
//!
//! A [`ConstraintSet`] holds the constraints declared for one record type, in
//! declaration order. Constraints are built once per type through
//! [`ConstraintSet::builder`] and are immutable afterwards.

use regex_lite::{Regex, RegexBuilder};
use std::fmt;
use std::sync::Arc;
use vouch_core::{placeholders, TemplateString};
use vouch_registry::{FieldDef, Registry};

use crate::access::RecordView;
use crate::bound::NumericBound;
use crate::builder::ConstraintSetBuilder;
use crate::error::{ConstraintError, ConstraintResult, CustomError};
use crate::violation::ConstraintViolation;

// ==================== Placeholders ====================

/// A named value that a violation message may refer to as `${key}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    FieldPath,
    FieldType,
    FieldValue,
    ParentType,
    RangeValue,
    RegexPattern,
    RegexModifiers,
    FieldDuplicates,
    GoesCompanion,
    GroupPath,
    GroupFields,
}

impl Placeholder {
    pub const ALL: [Placeholder; 11] = [
        Placeholder::FieldPath,
        Placeholder::FieldType,
        Placeholder::FieldValue,
        Placeholder::ParentType,
        Placeholder::RangeValue,
        Placeholder::RegexPattern,
        Placeholder::RegexModifiers,
        Placeholder::FieldDuplicates,
        Placeholder::GoesCompanion,
        Placeholder::GroupPath,
        Placeholder::GroupFields,
    ];

    /// The name used inside `${..}`.
    pub fn key(&self) -> &'static str {
        match self {
            Placeholder::FieldPath => "field.path",
            Placeholder::FieldType => "field.type",
            Placeholder::FieldValue => "field.value",
            Placeholder::ParentType => "parent.type",
            Placeholder::RangeValue => "range.value",
            Placeholder::RegexPattern => "regex.pattern",
            Placeholder::RegexModifiers => "regex.modifiers",
            Placeholder::FieldDuplicates => "field.duplicates",
            Placeholder::GoesCompanion => "goes.companion",
            Placeholder::GroupPath => "group.path",
            Placeholder::GroupFields => "group.fields",
        }
    }

    pub fn from_key(key: &str) -> Option<Placeholder> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}}}", self.key())
    }
}

/// A message template whose placeholders were checked against a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    /// Check `text` against the placeholders `constraint` supports.
    pub fn new(
        constraint: &'static str,
        text: impl Into<String>,
        supported: &[Placeholder],
    ) -> ConstraintResult<Self> {
        let text = text.into();
        for name in placeholders(&text) {
            let known = Placeholder::from_key(name).filter(|p| supported.contains(p));
            if known.is_none() {
                return Err(ConstraintError::UnsupportedPlaceholder {
                    constraint,
                    placeholder: name.to_string(),
                });
            }
        }
        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// A fresh template string without values.
    pub fn to_template(&self) -> TemplateString {
        TemplateString::new(self.text.clone())
    }
}

// ==================== Constraint variants ====================

/// The field must hold a non-default value.
#[derive(Debug, Clone)]
pub struct RequiredConstraint {
    pub field: FieldDef,
    /// For collections, only an empty collection violates the constraint.
    pub collection_means_non_empty: bool,
    pub message: MessageTemplate,
}

impl RequiredConstraint {
    pub const NAME: &'static str = "Required";
    pub const PLACEHOLDERS: &'static [Placeholder] = &[
        Placeholder::FieldPath,
        Placeholder::FieldType,
        Placeholder::ParentType,
    ];
    pub const DEFAULT_MESSAGE: &'static str =
        "The field `${parent.type}.${field.path}` of the type `${field.type}` must be set.";
}

/// Every element of a numeric field must lie within the bounds.
#[derive(Debug, Clone)]
pub struct RangeConstraint {
    pub field: FieldDef,
    pub lower: Option<NumericBound>,
    pub upper: Option<NumericBound>,
    pub message: MessageTemplate,
}

impl RangeConstraint {
    pub const NAME: &'static str = "NumericRange";
    pub const PLACEHOLDERS: &'static [Placeholder] = &[
        Placeholder::FieldPath,
        Placeholder::FieldType,
        Placeholder::FieldValue,
        Placeholder::ParentType,
        Placeholder::RangeValue,
    ];
    pub const DEFAULT_MESSAGE: &'static str =
        "The field `${parent.type}.${field.path}` must be ${range.value}. The passed value: `${field.value}`.";

    /// The bounds in readable form, e.g. `[0..100)` or `>= 0`.
    pub fn range_text(&self) -> String {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => format!(
                "{}{}..{}{}",
                if lower.exclusive { '(' } else { '[' },
                lower.value,
                upper.value,
                if upper.exclusive { ')' } else { ']' },
            ),
            (Some(lower), None) => {
                format!("{} {}", if lower.exclusive { ">" } else { ">=" }, lower.value)
            }
            (None, Some(upper)) => {
                format!("{} {}", if upper.exclusive { "<" } else { "<=" }, upper.value)
            }
            (None, None) => "unbounded".to_string(),
        }
    }
}

/// Flags applied when compiling a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternModifiers {
    pub case_insensitive: bool,
    pub multiline: bool,
    pub dot_all: bool,
    /// Accept a match anywhere in the value instead of the whole value.
    pub allow_partial_match: bool,
}

impl PatternModifiers {
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn dot_all(mut self) -> Self {
        self.dot_all = true;
        self
    }

    pub fn partial(mut self) -> Self {
        self.allow_partial_match = true;
        self
    }
}

impl fmt::Display for PatternModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.case_insensitive, "case_insensitive"),
            (self.multiline, "multiline"),
            (self.dot_all, "dot_all"),
            (self.allow_partial_match, "allow_partial_match"),
        ];
        let enabled: Vec<&str> = names
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "[{}]", enabled.join(", "))
    }
}

/// Every non-default element of a string field must match a regex.
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    pub field: FieldDef,
    /// The pattern as written.
    pub pattern: String,
    pub modifiers: PatternModifiers,
    /// Compiled once; anchored unless partial matches are allowed.
    regex: Regex,
    pub message: MessageTemplate,
}

impl PatternConstraint {
    pub const NAME: &'static str = "Pattern";
    pub const PLACEHOLDERS: &'static [Placeholder] = &[
        Placeholder::FieldPath,
        Placeholder::FieldType,
        Placeholder::FieldValue,
        Placeholder::ParentType,
        Placeholder::RegexPattern,
        Placeholder::RegexModifiers,
    ];
    pub const DEFAULT_MESSAGE: &'static str =
        "The field `${parent.type}.${field.path}` of the type `${field.type}` must match the regular expression `${regex.pattern}` (modifiers: ${regex.modifiers}). The passed value: `${field.value}`.";

    pub fn new(
        field: FieldDef,
        pattern: impl Into<String>,
        modifiers: PatternModifiers,
        message: MessageTemplate,
    ) -> ConstraintResult<Self> {
        let pattern = pattern.into();
        let source = if modifiers.allow_partial_match {
            pattern.clone()
        } else {
            format!(r"\A(?:{})\z", pattern)
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(modifiers.case_insensitive)
            .multi_line(modifiers.multiline)
            .dot_matches_new_line(modifiers.dot_all)
            .build()
            .map_err(|e| ConstraintError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            field,
            pattern,
            modifiers,
            regex,
            message,
        })
    }

    /// Check a value against the pattern, honoring partial matching.
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// A collection must not contain the same value twice.
#[derive(Debug, Clone)]
pub struct DistinctConstraint {
    pub field: FieldDef,
    pub message: MessageTemplate,
}

impl DistinctConstraint {
    pub const NAME: &'static str = "Distinct";
    pub const PLACEHOLDERS: &'static [Placeholder] = &[
        Placeholder::FieldPath,
        Placeholder::FieldType,
        Placeholder::ParentType,
        Placeholder::FieldDuplicates,
    ];
    pub const DEFAULT_MESSAGE: &'static str =
        "The field `${parent.type}.${field.path}` of the type `${field.type}` must not contain duplicates. The duplicates found: ${field.duplicates}.";
}

/// When the field is set, its companion must be set too.
#[derive(Debug, Clone)]
pub struct CompanionConstraint {
    pub field: FieldDef,
    /// Name of the companion field in the same type.
    pub companion: String,
    pub message: MessageTemplate,
}

impl CompanionConstraint {
    pub const NAME: &'static str = "Companion";
    pub const PLACEHOLDERS: &'static [Placeholder] = &[
        Placeholder::FieldPath,
        Placeholder::FieldType,
        Placeholder::ParentType,
        Placeholder::GoesCompanion,
    ];
    pub const DEFAULT_MESSAGE: &'static str =
        "The field `${parent.type}.${goes.companion}` must also be set when `${field.path}` is set.";
}

/// Nested records held by the field are validated recursively.
#[derive(Debug, Clone)]
pub struct ValidateConstraint {
    pub field: FieldDef,
    pub message: MessageTemplate,
}

impl ValidateConstraint {
    pub const NAME: &'static str = "Validate";
    pub const PLACEHOLDERS: &'static [Placeholder] = &[
        Placeholder::FieldPath,
        Placeholder::FieldType,
        Placeholder::ParentType,
    ];
    pub const DEFAULT_MESSAGE: &'static str =
        "The field `${parent.type}.${field.path}` of the type `${field.type}` must be valid.";
}

/// At least one alternative set of fields must be fully set.
#[derive(Debug, Clone)]
pub struct FieldGroupConstraint {
    /// The group as written, e.g. `email | phone & country`.
    pub expression: String,
    /// Alternatives in order; each is a set of fields.
    pub alternatives: Vec<Vec<FieldDef>>,
    pub message: MessageTemplate,
}

impl FieldGroupConstraint {
    pub const NAME: &'static str = "FieldGroup";
    pub const PLACEHOLDERS: &'static [Placeholder] = &[
        Placeholder::GroupPath,
        Placeholder::ParentType,
        Placeholder::GroupFields,
    ];
    pub const DEFAULT_MESSAGE: &'static str =
        "The message `${parent.type}` must have at least one of the field groups `${group.fields}` set.";
}

/// One case of a oneof must be set.
#[derive(Debug, Clone)]
pub struct OneofConstraint {
    pub oneof: String,
    pub cases: Vec<FieldDef>,
    pub message: MessageTemplate,
}

impl OneofConstraint {
    pub const NAME: &'static str = "OneofRequired";
    pub const PLACEHOLDERS: &'static [Placeholder] =
        &[Placeholder::GroupPath, Placeholder::ParentType];
    pub const DEFAULT_MESSAGE: &'static str =
        "The oneof group `${parent.type}.${group.path}` must have one of its fields set.";
}

/// An externally supplied check over a whole record.
///
/// Violations returned are reported verbatim. An error aborts validation and
/// reaches the caller as [`ConstraintError::Custom`].
pub trait CustomConstraint: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, view: &RecordView<'_>) -> Result<Vec<ConstraintViolation>, CustomError>;
}

/// Handle to a custom constraint plugin.
#[derive(Clone)]
pub struct PluginConstraint {
    pub plugin: Arc<dyn CustomConstraint>,
}

impl PluginConstraint {
    pub const NAME: &'static str = "Custom";
}

impl fmt::Debug for PluginConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConstraint")
            .field("name", &self.plugin.name())
            .finish()
    }
}

/// One declarative rule on a record type.
#[derive(Debug, Clone)]
pub enum Constraint {
    Required(RequiredConstraint),
    NumericRange(RangeConstraint),
    Pattern(PatternConstraint),
    Distinct(DistinctConstraint),
    Companion(CompanionConstraint),
    Validate(ValidateConstraint),
    FieldGroup(FieldGroupConstraint),
    OneofRequired(OneofConstraint),
    Custom(PluginConstraint),
}

impl Constraint {
    /// Variant name, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Required(_) => RequiredConstraint::NAME,
            Constraint::NumericRange(_) => RangeConstraint::NAME,
            Constraint::Pattern(_) => PatternConstraint::NAME,
            Constraint::Distinct(_) => DistinctConstraint::NAME,
            Constraint::Companion(_) => CompanionConstraint::NAME,
            Constraint::Validate(_) => ValidateConstraint::NAME,
            Constraint::FieldGroup(_) => FieldGroupConstraint::NAME,
            Constraint::OneofRequired(_) => OneofConstraint::NAME,
            Constraint::Custom(_) => PluginConstraint::NAME,
        }
    }

    /// The field a field-level constraint targets.
    pub fn field(&self) -> Option<&FieldDef> {
        match self {
            Constraint::Required(c) => Some(&c.field),
            Constraint::NumericRange(c) => Some(&c.field),
            Constraint::Pattern(c) => Some(&c.field),
            Constraint::Distinct(c) => Some(&c.field),
            Constraint::Companion(c) => Some(&c.field),
            Constraint::Validate(c) => Some(&c.field),
            Constraint::FieldGroup(_) | Constraint::OneofRequired(_) | Constraint::Custom(_) => {
                None
            }
        }
    }

    /// Placeholders a message of this constraint may use.
    pub fn placeholders(&self) -> &'static [Placeholder] {
        match self {
            Constraint::Required(_) => RequiredConstraint::PLACEHOLDERS,
            Constraint::NumericRange(_) => RangeConstraint::PLACEHOLDERS,
            Constraint::Pattern(_) => PatternConstraint::PLACEHOLDERS,
            Constraint::Distinct(_) => DistinctConstraint::PLACEHOLDERS,
            Constraint::Companion(_) => CompanionConstraint::PLACEHOLDERS,
            Constraint::Validate(_) => ValidateConstraint::PLACEHOLDERS,
            Constraint::FieldGroup(_) => FieldGroupConstraint::PLACEHOLDERS,
            Constraint::OneofRequired(_) => OneofConstraint::PLACEHOLDERS,
            Constraint::Custom(_) => &[],
        }
    }

    pub fn message(&self) -> Option<&MessageTemplate> {
        match self {
            Constraint::Required(c) => Some(&c.message),
            Constraint::NumericRange(c) => Some(&c.message),
            Constraint::Pattern(c) => Some(&c.message),
            Constraint::Distinct(c) => Some(&c.message),
            Constraint::Companion(c) => Some(&c.message),
            Constraint::Validate(c) => Some(&c.message),
            Constraint::FieldGroup(c) => Some(&c.message),
            Constraint::OneofRequired(c) => Some(&c.message),
            Constraint::Custom(_) => None,
        }
    }

    /// Replace the message template, checking its placeholders.
    pub fn set_message(&mut self, text: impl Into<String>) -> ConstraintResult<()> {
        let message = MessageTemplate::new(self.name(), text, self.placeholders())?;
        let slot = match self {
            Constraint::Required(c) => &mut c.message,
            Constraint::NumericRange(c) => &mut c.message,
            Constraint::Pattern(c) => &mut c.message,
            Constraint::Distinct(c) => &mut c.message,
            Constraint::Companion(c) => &mut c.message,
            Constraint::Validate(c) => &mut c.message,
            Constraint::FieldGroup(c) => &mut c.message,
            Constraint::OneofRequired(c) => &mut c.message,
            Constraint::Custom(_) => return Err(ConstraintError::MessageWithoutConstraint),
        };
        *slot = message;
        Ok(())
    }
}

// ==================== Constraint sets ====================

/// The constraints of one record type, in declaration order.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    type_name: String,
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(type_name: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            type_name: type_name.into(),
            constraints,
        }
    }

    /// Start building the constraints of a registered type.
    pub fn builder<'r>(
        registry: &'r Registry,
        type_name: &str,
    ) -> ConstraintResult<ConstraintSetBuilder<'r>> {
        ConstraintSetBuilder::new(registry, type_name)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
