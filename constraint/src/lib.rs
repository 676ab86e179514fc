//! Vouch Constraint
//!
//! Declarative constraints over typed records and the engine that checks
//! them. A record that breaks constraints yields a [`ValidationError`]
//! holding a tree of [`ConstraintViolation`]s whose messages are formatted
//! lazily. A broken constraint definition is a [`ConstraintError`] instead.

mod access;
mod bound;
mod builder;
mod config;
mod error;
mod evaluator;
mod model;
mod resolver;
mod validator;
mod violation;

pub use access::{FieldValue, RecordView};
pub use bound::{BoundParser, BoundValue, FieldReference, NumericBound};
pub use builder::ConstraintSetBuilder;
pub use config::{UnresolvedAnyPolicy, ValidatorConfig, DEFAULT_MAX_DEPTH};
pub use error::{ConstraintError, ConstraintResult, CustomError};
pub use evaluator::{EvalContext, MessageValidator};
pub use model::*;
pub use resolver::{ConstraintRegistry, ConstraintSetResolver};
pub use validator::Validator;
pub use violation::{ConstraintViolation, ValidationError};
