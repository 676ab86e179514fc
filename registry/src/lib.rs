//! Vouch Registry
//!
//! Runtime schema lookup. Single source of truth for record types, their
//! fields and oneof groups. The registry is immutable after construction via
//! RegistryBuilder, and doubles as the resolver for packed `Any` values.

mod builder;
mod record;
mod registry;
mod types;

pub use builder::{RegistryBuilder, RegistryError, TypeBuilder, DEFAULT_TYPE_URL_PREFIX};
pub use record::RecordBuilder;
pub use registry::{AnyUnpacker, Registry};
pub use types::*;
