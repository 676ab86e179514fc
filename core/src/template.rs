//! Lazily formatted message templates.
//!
//! A [`TemplateString`] keeps an unformatted message such as
//! `"The field ${field.path} must be set."` together with the values of its
//! placeholders. Rendering happens only when a message is shown to a user, so
//! presentation and localization can be deferred or skipped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Errors raised while rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Placeholders without a value, each written as `${name}`.
    #[error("Missing values for placeholders: {}", .0.join(", "))]
    MissingPlaceholders(Vec<String>),
}

/// A message template plus the values of its placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateString {
    template: String,
    values: BTreeMap<String, String>,
}

impl TemplateString {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            values: BTreeMap::new(),
        }
    }

    /// Add or replace the value of one placeholder.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Add or replace the value of one placeholder in place.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Names of every `${name}` placeholder in the template, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholders(&self.template)
    }

    /// Render the template, failing if any placeholder has no value.
    ///
    /// All missing placeholders are reported at once.
    pub fn format(&self) -> Result<String, TemplateError> {
        let mut missing: Vec<String> = Vec::new();
        for name in self.placeholders() {
            let wrapped = format!("{OPEN}{name}{CLOSE}");
            if !self.values.contains_key(name) && !missing.contains(&wrapped) {
                missing.push(wrapped);
            }
        }
        if !missing.is_empty() {
            return Err(TemplateError::MissingPlaceholders(missing));
        }
        Ok(self.format_unsafe())
    }

    /// Render the template, leaving placeholders without a value untouched.
    pub fn format_unsafe(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some((before, name, after)) = next_placeholder(rest) {
            out.push_str(before);
            match self.values.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str(OPEN);
                    out.push_str(name);
                    out.push(CLOSE);
                }
            }
            rest = after;
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for TemplateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_unsafe())
    }
}

/// Names of every `${name}` placeholder in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some((_, name, after)) = next_placeholder(rest) {
        names.push(name);
        rest = after;
    }
    names
}

/// Split off the text before the next placeholder, its name, and the text after it.
fn next_placeholder(text: &str) -> Option<(&str, &str, &str)> {
    let start = text.find(OPEN)?;
    let name_start = start + OPEN.len();
    let name_len = text[name_start..].find(CLOSE)?;
    let name_end = name_start + name_len;
    Some((
        &text[..start],
        &text[name_start..name_end],
        &text[name_end + CLOSE.len_utf8()..],
    ))
}
