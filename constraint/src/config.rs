//! Validator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConstraintError, ConstraintResult};

/// Default bound on nested validation depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// What to do with a packed `Any` value whose type cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedAnyPolicy {
    /// Assume the value is valid.
    #[default]
    Skip,
    /// Report a violation on the field.
    Reject,
}

/// Settings of a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Deepest nesting level recursive validation may reach.
    pub max_depth: usize,
    pub unresolved_any: UnresolvedAnyPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unresolved_any: UnresolvedAnyPolicy::default(),
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_unresolved_any(mut self, policy: UnresolvedAnyPolicy) -> Self {
        self.unresolved_any = policy;
        self
    }

    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(text: &str) -> ConstraintResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConstraintError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> ConstraintResult<()> {
        if self.max_depth == 0 {
            return Err(ConstraintError::InvalidConfig {
                reason: "max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
