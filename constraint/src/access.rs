//! Read-only, path-tracking access to record data.

use std::borrow::Cow;
use vouch_core::{FieldPath, NumericValue, Record, Value};
use vouch_registry::{FieldDef, TypeDef};

use crate::bound::FieldReference;
use crate::error::{ConstraintError, ConstraintResult};

/// A view over one record instance at a position in the validated tree.
#[derive(Debug, Clone)]
pub struct RecordView<'a> {
    record: &'a Record,
    declaration: &'a TypeDef,
    path: FieldPath,
}

impl<'a> RecordView<'a> {
    /// A view over a top-level record.
    pub fn new(record: &'a Record, declaration: &'a TypeDef) -> Self {
        Self {
            record,
            declaration,
            path: FieldPath::root(),
        }
    }

    /// A view over a record nested under `segment` of this one.
    pub fn nested_in<'c>(
        &self,
        segment: &str,
        record: &'c Record,
        declaration: &'c TypeDef,
    ) -> RecordView<'c> {
        RecordView {
            record,
            declaration,
            path: self.path.child(segment),
        }
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    pub fn declaration(&self) -> &'a TypeDef {
        self.declaration
    }

    /// Path from the validated root to this record.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn type_name(&self) -> &'a str {
        &self.declaration.name
    }

    /// Path from the validated root to one of this record's fields.
    pub fn field_path(&self, field: &FieldDef) -> FieldPath {
        self.path.child(field.name.as_str())
    }

    /// Check if a field is present, e.g. the active case of a oneof.
    pub fn is_set(&self, field: &FieldDef) -> bool {
        self.record.is_set(field.id)
    }

    /// Materialize the elements of a field.
    ///
    /// Singular fields yield one element, reading as the zero value when unset.
    /// Repeated fields yield their items and map fields their values in
    /// insertion order.
    pub fn value_of(&self, field: &FieldDef) -> ConstraintResult<FieldValue<'a>> {
        let path = self.field_path(field);
        let Some(value) = self.record.get(field.id) else {
            let values = if field.is_singular() {
                vec![Cow::Owned(field.kind.default_value())]
            } else {
                Vec::new()
            };
            return Ok(FieldValue::new(values, path));
        };

        if !field.accepts(value) {
            return Err(ConstraintError::field_kind_mismatch(
                self.type_name(),
                &field.name,
                field.type_label(),
                value.type_name(),
            ));
        }

        let values = match value {
            Value::List(items) if field.is_repeated() => items.iter().map(Cow::Borrowed).collect(),
            Value::Map(entries) if field.is_map() => {
                entries.iter().map(|(_, v)| Cow::Borrowed(v)).collect()
            }
            single => vec![Cow::Borrowed(single)],
        };
        Ok(FieldValue::new(values, path))
    }

    /// Read the current value of a referenced numeric field.
    ///
    /// Unset fields along the way read as zero.
    pub fn resolve_numeric(&self, reference: &FieldReference) -> ConstraintResult<NumericValue> {
        let zero = reference.kind().zero();
        let mut record = self.record;
        let hops = reference.hops();
        for (i, hop) in hops.iter().enumerate() {
            let segment = &reference.path()[i];
            let Some(value) = record.get(*hop) else {
                return Ok(zero);
            };
            if i + 1 == hops.len() {
                return value.as_numeric().ok_or_else(|| {
                    ConstraintError::field_kind_mismatch(
                        record.type_name(),
                        segment,
                        reference.kind().name(),
                        value.type_name(),
                    )
                });
            }
            record = value.as_record().ok_or_else(|| {
                ConstraintError::field_kind_mismatch(
                    record.type_name(),
                    segment,
                    "message",
                    value.type_name(),
                )
            })?;
        }
        Ok(zero)
    }
}

/// The materialized elements of one field.
#[derive(Debug, Clone)]
pub struct FieldValue<'a> {
    values: Vec<Cow<'a, Value>>,
    is_default: bool,
    path: FieldPath,
}

impl<'a> FieldValue<'a> {
    fn new(values: Vec<Cow<'a, Value>>, path: FieldPath) -> Self {
        let is_default = values.iter().all(|v| v.is_default());
        Self {
            values,
            is_default,
            path,
        }
    }

    /// All elements, in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + Clone {
        self.values.iter().map(|v| &**v)
    }

    /// Elements that differ from the zero value. Restartable via `clone`.
    pub fn non_default(&self) -> impl Iterator<Item = &Value> + Clone {
        self.values().filter(|v| !v.is_default())
    }

    /// True if every element is the zero value. Empty collections are default.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Path from the validated root to the field.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }
}
