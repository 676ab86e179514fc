//! Constraint set lookup by record type.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConstraintResult;
use crate::model::ConstraintSet;

/// Finds the constraints declared for a record type.
///
/// `None` means the type has no constraints, which ends recursion into it.
pub trait ConstraintSetResolver: Send + Sync {
    fn resolve(&self, type_name: &str) -> Option<Arc<ConstraintSet>>;
}

impl<F> ConstraintSetResolver for F
where
    F: Fn(&str) -> Option<Arc<ConstraintSet>> + Send + Sync,
{
    fn resolve(&self, type_name: &str) -> Option<Arc<ConstraintSet>> {
        self(type_name)
    }
}

/// A shared cache of constraint sets by type name.
///
/// Populated up front; lookups take a read lock only.
#[derive(Debug, Default)]
pub struct ConstraintRegistry {
    sets: RwLock<HashMap<String, Arc<ConstraintSet>>>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constraints of a type, replacing earlier ones.
    pub fn register(&self, set: ConstraintSet) -> Arc<ConstraintSet> {
        let set = Arc::new(set);
        let previous = self
            .sets
            .write()
            .insert(set.type_name().to_string(), Arc::clone(&set));
        if previous.is_some() {
            tracing::debug!(type_name = %set.type_name(), "replaced constraint set");
        }
        set
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<ConstraintSet>> {
        self.sets.read().get(type_name).cloned()
    }

    /// Get the constraints of a type, building them on first use.
    pub fn get_or_insert_with<F>(
        &self,
        type_name: &str,
        build: F,
    ) -> ConstraintResult<Arc<ConstraintSet>>
    where
        F: FnOnce() -> ConstraintResult<ConstraintSet>,
    {
        if let Some(set) = self.get(type_name) {
            return Ok(set);
        }
        let mut sets = self.sets.write();
        // Another writer may have won the race.
        if let Some(set) = sets.get(type_name) {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(build()?);
        sets.insert(type_name.to_string(), Arc::clone(&set));
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }

    /// Names of all types with registered constraints, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sets.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl ConstraintSetResolver for ConstraintRegistry {
    fn resolve(&self, type_name: &str) -> Option<Arc<ConstraintSet>> {
        self.get(type_name)
    }
}

impl FromIterator<ConstraintSet> for ConstraintRegistry {
    fn from_iter<I: IntoIterator<Item = ConstraintSet>>(iter: I) -> Self {
        let registry = Self::new();
        for set in iter {
            registry.register(set);
        }
        registry
    }
}
