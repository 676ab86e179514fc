//! Error types for the test framework.

use thiserror::Error;
use vouch_constraint::ConstraintError;
use vouch_registry::RegistryError;

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A fixture record or schema could not be built.
    #[error("fixture error: {0}")]
    Registry(#[from] RegistryError),

    /// A fixture constraint set could not be built.
    #[error("fixture constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    /// Assertion failed.
    #[error("assertion failed for step '{step}': {message}")]
    AssertionFailed { step: String, message: String },

    /// Missing validator setup.
    #[error("scenario '{scenario}' has no {missing}")]
    Incomplete {
        scenario: String,
        missing: &'static str,
    },
}

impl ScenarioError {
    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn incomplete(scenario: impl Into<String>, missing: &'static str) -> Self {
        Self::Incomplete {
            scenario: scenario.into(),
            missing,
        }
    }
}
