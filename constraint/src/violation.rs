//! Constraint violation types.
//!
//! Violations are plain data: they carry an unformatted message so rendering
//! and localization can happen later, possibly in another process.

use serde::{Deserialize, Serialize};
use std::fmt;
use vouch_core::{FieldPath, TemplateError, TemplateString, Value};

/// A single constraint failing against one concrete value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Unformatted message with its placeholder values.
    pub message: TemplateString,
    /// Path from the validated root record to the offending field.
    pub field_path: FieldPath,
    /// Name of the type declaring the field.
    pub type_name: String,
    /// The offending value, if the constraint concerns one.
    pub field_value: Option<Value>,
    /// Violations found inside a nested record.
    pub children: Vec<ConstraintViolation>,
}

impl ConstraintViolation {
    /// Create a new violation.
    pub fn new(
        message: TemplateString,
        type_name: impl Into<String>,
        field_path: FieldPath,
    ) -> Self {
        Self {
            message,
            field_path,
            type_name: type_name.into(),
            field_value: None,
            children: Vec::new(),
        }
    }

    /// Attach the offending value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.field_value = Some(value);
        self
    }

    /// Attach nested violations.
    pub fn with_children(mut self, children: Vec<ConstraintViolation>) -> Self {
        self.children = children;
        self
    }

    /// Check if this violation has nested violations.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Render the message, failing on unresolved placeholders.
    pub fn format(&self) -> Result<String, TemplateError> {
        self.message.format()
    }

    /// Violations without children, depth first.
    pub fn leaves(&self) -> Vec<&ConstraintViolation> {
        if self.children.is_empty() {
            return vec![self];
        }
        self.children.iter().flat_map(|c| c.leaves()).collect()
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth + 1);
        if self.field_path.is_root() {
            write!(f, "{}({}): {}", indent, self.type_name, self.message)?;
        } else {
            write!(f, "{}{}: {}", indent, self.field_path, self.message)?;
        }
        for child in &self.children {
            writeln!(f)?;
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

/// The violations found by one validation call.
///
/// Never empty: a valid record yields no `ValidationError` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    violations: Vec<ConstraintViolation>,
}

impl ValidationError {
    /// Wrap violations, or return `None` when there are none.
    pub fn new(violations: Vec<ConstraintViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// Get all top-level violations.
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// Get the number of top-level violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ConstraintViolation> {
        self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl IntoIterator for ValidationError {
    type Item = ConstraintViolation;
    type IntoIter = std::vec::IntoIter<ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationError {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::slice::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
