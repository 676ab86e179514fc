//! Vouch Core Types
//!
//! This crate provides the foundational types used throughout the vouch engine:
//! - Identity types (TypeId, FieldId) and field paths
//! - Value types (the Value enum, Record and packed AnyValue)
//! - The numeric domain (NumericKind, NumericValue, widening rules)
//! - Lazily formatted message templates (TemplateString)

mod id;
mod numeric;
mod template;
mod value;

pub use id::*;
pub use numeric::*;
pub use template::*;
pub use value::*;
