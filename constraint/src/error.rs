//! Constraint error types.
//!
//! These are definition errors: the constraint itself, or the record's shape,
//! is broken. Data that fails a constraint is reported as a violation instead.

use thiserror::Error;
use vouch_core::{NumericError, NumericKind};

/// Result type for constraint operations.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Error raised by a custom constraint plugin.
pub type CustomError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or evaluating constraints.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("Empty bound for field `{field}`")]
    EmptyBound { field: String },

    #[error("Malformed bound `{bound}` for field `{field}`: {reason}")]
    MalformedBound {
        field: String,
        bound: String,
        reason: String,
    },

    #[error(transparent)]
    Numeric(#[from] NumericError),

    #[error("Unknown field `{field}` in type {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("Bound of field `{field}` refers to the field itself")]
    SelfReference { field: String },

    #[error("Bound reference `{path}` in type {type_name} is not a singular numeric field")]
    NonNumericReference { type_name: String, path: String },

    #[error("Malformed range `{range}` for field `{field}`: {reason}")]
    MalformedRange {
        field: String,
        range: String,
        reason: String,
    },

    #[error("Range `{range}` of field `{field}` has its lower bound above its upper bound")]
    InvertedRange { field: String, range: String },

    #[error("Bound `{bound}` of kind {bound_kind} cannot be compared with field `{field}` of kind {field_kind}")]
    BoundKindMismatch {
        field: String,
        bound: String,
        bound_kind: NumericKind,
        field_kind: NumericKind,
    },

    #[error("Companion field `{companion}` of `{field}` is not declared in type {type_name}")]
    UnknownCompanion {
        type_name: String,
        field: String,
        companion: String,
    },

    #[error("{constraint} does not apply to field `{field}` of type {field_type}")]
    InapplicableField {
        constraint: &'static str,
        field: String,
        field_type: String,
    },

    #[error("Placeholder `${{{placeholder}}}` is not supported in {constraint} messages")]
    UnsupportedPlaceholder {
        constraint: &'static str,
        placeholder: String,
    },

    #[error("A custom message needs a preceding constraint with a message template")]
    MessageWithoutConstraint,

    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unknown oneof `{oneof}` in type {type_name}")]
    UnknownOneof { type_name: String, oneof: String },

    #[error("Field group `{group}` of type {type_name} has an empty alternative")]
    EmptyFieldGroup { type_name: String, group: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Record of type {type_name} checked against constraints of {declared_for}")]
    ConstraintSetMismatch {
        type_name: String,
        declared_for: String,
    },

    #[error("Field `{field}` of {type_name} holds {actual}, declared as {expected}")]
    FieldKindMismatch {
        type_name: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Validation of {type_name} at `{path}` exceeds the maximum depth of {max_depth}")]
    DepthExceeded {
        type_name: String,
        path: String,
        max_depth: usize,
    },

    #[error("Custom constraint `{name}` failed: {source}")]
    Custom {
        name: String,
        #[source]
        source: CustomError,
    },

    #[error("Invalid validator configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ConstraintError {
    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    pub fn inapplicable(
        constraint: &'static str,
        field: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self::InapplicableField {
            constraint,
            field: field.into(),
            field_type: field_type.into(),
        }
    }

    pub fn field_kind_mismatch(
        type_name: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::FieldKindMismatch {
            type_name: type_name.into(),
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn malformed_range(
        field: impl Into<String>,
        range: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRange {
            field: field.into(),
            range: range.into(),
            reason: reason.into(),
        }
    }
}
