//! Numeric bounds and their textual notation.
//!
//! A bound is either a literal parsed against the constrained field's kind,
//! or a dotted reference to another numeric field of the same record type:
//!
//! ```text
//! 0            literal
//! 12.5         literal (floating fields only)
//! limits.max   reference, resolved against the record at evaluation time
//! ```
//!
//! Ranges use interval notation with `..` as the delimiter: `[0..100]`,
//! `(0.0 .. 1.0]`. Square brackets include the bound, parentheses exclude it.

use std::cmp::Ordering;
use std::fmt;
use vouch_core::{FieldId, NumericKind, NumericValue};
use vouch_registry::{FieldDef, FieldKind, Registry, TypeDef};

use crate::error::{ConstraintError, ConstraintResult};

/// A reference from a bound to a numeric field of the same record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldReference {
    /// Field names, outermost first.
    path: Vec<String>,
    /// Field ids matching `path`.
    hops: Vec<FieldId>,
    /// Kind of the referenced field.
    kind: NumericKind,
}

impl FieldReference {
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn hops(&self) -> &[FieldId] {
        &self.hops
    }

    pub fn kind(&self) -> NumericKind {
        self.kind
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join("."))
    }
}

/// The value side of a bound.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Literal(NumericValue),
    Field(FieldReference),
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Literal(v) => write!(f, "{}", v),
            BoundValue::Field(r) => write!(f, "{}", r),
        }
    }
}

/// A single-sided numeric limit.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericBound {
    pub value: BoundValue,
    pub exclusive: bool,
}

impl NumericBound {
    /// The literal value, if this bound is not a field reference.
    pub fn literal(&self) -> Option<NumericValue> {
        match &self.value {
            BoundValue::Literal(v) => Some(*v),
            BoundValue::Field(_) => None,
        }
    }

    /// Check `value` against this bound used as a lower limit.
    pub fn admits_from_below(&self, ordering: Ordering) -> bool {
        ordering == Ordering::Greater || (ordering == Ordering::Equal && !self.exclusive)
    }

    /// Check `value` against this bound used as an upper limit.
    pub fn admits_from_above(&self, ordering: Ordering) -> bool {
        ordering == Ordering::Less || (ordering == Ordering::Equal && !self.exclusive)
    }
}

/// Parses bounds for one numeric field of one record type.
pub struct BoundParser<'r> {
    registry: &'r Registry,
    declaration: &'r TypeDef,
    field: &'r FieldDef,
    kind: NumericKind,
}

impl<'r> BoundParser<'r> {
    /// Create a parser for bounds of `field`, which must be numeric.
    pub fn new(
        registry: &'r Registry,
        declaration: &'r TypeDef,
        field: &'r FieldDef,
    ) -> ConstraintResult<Self> {
        let kind = field.kind.numeric_kind().ok_or_else(|| {
            ConstraintError::inapplicable("NumericRange", &field.name, field.type_label())
        })?;
        Ok(Self {
            registry,
            declaration,
            field,
            kind,
        })
    }

    /// Kind of the constrained field.
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    /// Parse one bound: a literal or a field reference.
    pub fn parse(&self, text: &str, exclusive: bool) -> ConstraintResult<NumericBound> {
        let first = text.chars().next().ok_or_else(|| ConstraintError::EmptyBound {
            field: self.field.name.clone(),
        })?;
        let value = if first.is_alphabetic() || first == '_' {
            BoundValue::Field(self.resolve_reference(text)?)
        } else {
            BoundValue::Literal(self.kind.parse(text)?)
        };
        Ok(NumericBound { value, exclusive })
    }

    /// Parse an interval such as `[0..100]` or `(0.0 .. 1.0]`.
    pub fn parse_range(&self, text: &str) -> ConstraintResult<(NumericBound, NumericBound)> {
        let malformed = |reason: &str| {
            ConstraintError::malformed_range(&self.field.name, text, reason)
        };

        let lower_exclusive = match text.chars().next() {
            Some('[') => false,
            Some('(') => true,
            _ => return Err(malformed("must start with `[` or `(`")),
        };
        let upper_exclusive = match text.chars().last() {
            Some(']') => false,
            Some(')') => true,
            _ => return Err(malformed("must end with `]` or `)`")),
        };
        if text.len() < 2 {
            return Err(malformed("missing bounds"));
        }

        // Both brackets are ASCII, so slicing by byte is safe.
        let inner = &text[1..text.len() - 1];
        let (left, right) = inner
            .split_once("..")
            .ok_or_else(|| malformed("missing `..` delimiter"))?;
        let left = left.strip_suffix(' ').unwrap_or(left);
        let right = right.strip_prefix(' ').unwrap_or(right);

        let lower = self.parse(left, lower_exclusive)?;
        let upper = self.parse(right, upper_exclusive)?;

        if let (Some(l), Some(u)) = (lower.literal(), upper.literal()) {
            if l.try_cmp(&u)? == Ordering::Greater {
                return Err(ConstraintError::InvertedRange {
                    field: self.field.name.clone(),
                    range: text.to_string(),
                });
            }
        }
        Ok((lower, upper))
    }

    fn resolve_reference(&self, text: &str) -> ConstraintResult<FieldReference> {
        let path: Vec<String> = text.split('.').map(str::to_string).collect();
        if path.iter().any(|segment| segment.is_empty()) {
            return Err(ConstraintError::MalformedBound {
                field: self.field.name.clone(),
                bound: text.to_string(),
                reason: "empty path segment".to_string(),
            });
        }
        let non_numeric = || ConstraintError::NonNumericReference {
            type_name: self.declaration.name.clone(),
            path: text.to_string(),
        };

        let mut current = self.declaration;
        let mut hops = Vec::with_capacity(path.len());
        let mut target = None;
        for (i, segment) in path.iter().enumerate() {
            let field = current
                .field_by_name(segment)
                .ok_or_else(|| ConstraintError::unknown_field(&current.name, segment))?;
            hops.push(field.id);

            let is_last = i + 1 == path.len();
            if is_last {
                target = Some(field);
                break;
            }
            current = match (&field.kind, field.is_singular()) {
                (FieldKind::Message(type_name), true) => self
                    .registry
                    .get_type_by_name(type_name)
                    .ok_or_else(|| ConstraintError::UnknownType(type_name.clone()))?,
                _ => return Err(non_numeric()),
            };
        }

        let target = target.ok_or_else(non_numeric)?;
        if path.len() == 1 && target.id == self.field.id {
            return Err(ConstraintError::SelfReference {
                field: self.field.name.clone(),
            });
        }
        let kind = match (target.kind.numeric_kind(), target.is_singular()) {
            (Some(kind), true) => kind,
            _ => return Err(non_numeric()),
        };
        Ok(FieldReference { path, hops, kind })
    }
}
