//! Fixture schemas and their constraints.
//!
//! Every fixture type lives in one `acme` registry so that nested and packed
//! records can refer to each other.

use std::sync::Arc;
use vouch_constraint::{ConstraintRegistry, ConstraintSet, PatternModifiers};
use vouch_registry::{FieldDef, FieldKind, Registry, RegistryBuilder};

use crate::error::ScenarioResult;
use crate::scenario::Scenario;

fn message(type_name: &str) -> FieldKind {
    FieldKind::Message(type_name.to_string())
}

/// The `acme` schema.
pub fn schema() -> ScenarioResult<Arc<Registry>> {
    let mut builder = RegistryBuilder::new();

    // Shipping
    builder
        .add_type("acme.Address")
        .field(FieldDef::new(1, "first_line", FieldKind::String))
        .field(FieldDef::new(2, "city", FieldKind::String))
        .field(FieldDef::new(3, "zip", FieldKind::String))
        .done()?;
    builder
        .add_type("acme.Receiver")
        .field(FieldDef::new(1, "name", FieldKind::String))
        .field(FieldDef::new(2, "address", message("acme.Address")))
        .field(FieldDef::new(3, "previous", message("acme.Address")).repeated())
        .field(FieldDef::new(4, "by_label", message("acme.Address")).map_with_key(FieldKind::String))
        .done()?;

    // Self-referential tree
    builder
        .add_type("acme.TreeNode")
        .field(FieldDef::new(1, "label", FieldKind::String))
        .field(FieldDef::new(2, "left", message("acme.TreeNode")))
        .field(FieldDef::new(3, "right", message("acme.TreeNode")))
        .done()?;

    // Payments
    builder
        .add_type("acme.Payment")
        .field(FieldDef::new(1, "amount", FieldKind::Int64))
        .field(FieldDef::new(2, "card", FieldKind::String))
        .field(FieldDef::new(3, "voucher", FieldKind::String))
        .field(FieldDef::new(4, "note", FieldKind::String))
        .field(FieldDef::new(5, "note_author", FieldKind::String))
        .oneof("method", ["card", "voucher"])
        .done()?;

    // Contacts
    builder
        .add_type("acme.Contact")
        .field(FieldDef::new(1, "email", FieldKind::String))
        .field(FieldDef::new(2, "phone", FieldKind::String))
        .field(FieldDef::new(3, "country", FieldKind::String))
        .field(FieldDef::new(4, "tags", FieldKind::String).repeated())
        .field(FieldDef::new(5, "scores", FieldKind::Int32).map_with_key(FieldKind::String))
        .done()?;

    // Metrics
    builder
        .add_type("acme.Limits")
        .field(FieldDef::new(1, "low", FieldKind::Int32))
        .field(FieldDef::new(2, "high", FieldKind::Int32))
        .field(FieldDef::new(3, "budget", FieldKind::Int64))
        .done()?;
    builder
        .add_type("acme.Reading")
        .field(FieldDef::new(1, "value", FieldKind::Int32))
        .field(FieldDef::new(2, "limits", message("acme.Limits")))
        .field(FieldDef::new(3, "total", FieldKind::Int64))
        .field(FieldDef::new(4, "samples", FieldKind::Int32).repeated())
        .field(FieldDef::new(5, "ratio", FieldKind::Double))
        .field(FieldDef::new(6, "count", FieldKind::UInt32))
        .done()?;

    // Packed payloads
    builder
        .add_type("acme.Envelope")
        .field(FieldDef::new(1, "payload", FieldKind::Any))
        .field(FieldDef::new(2, "attachments", FieldKind::Any).repeated())
        .done()?;

    Ok(Arc::new(builder.build()?))
}

/// Constraints of every `acme` type.
pub fn constraints(schema: &Registry) -> ScenarioResult<Arc<ConstraintRegistry>> {
    let sets = vec![
        ConstraintSet::builder(schema, "acme.Address")?
            .required("first_line")?
            .pattern("zip", r"\d{5}", PatternModifiers::default())?
            .build(),
        ConstraintSet::builder(schema, "acme.Receiver")?
            .validate("address")?
            .validate("previous")?
            .validate("by_label")?
            .build(),
        ConstraintSet::builder(schema, "acme.TreeNode")?
            .required("label")?
            .validate("left")?
            .validate("right")?
            .build(),
        ConstraintSet::builder(schema, "acme.Payment")?
            .min("amount", "0", true)?
            .oneof_required("method")?
            .goes("note", "note_author")?
            .build(),
        ConstraintSet::builder(schema, "acme.Contact")?
            .require_fields("email | phone & country")?
            .distinct("tags")?
            .distinct("scores")?
            .build(),
        ConstraintSet::builder(schema, "acme.Reading")?
            .range("value", "[limits.low..limits.high]")?
            .max("total", "limits.budget", false)?
            .range("samples", "[0..100]")?
            .range("ratio", "[0.0..1.0]")?
            .build(),
        ConstraintSet::builder(schema, "acme.Envelope")?
            .validate("payload")?
            .validate("attachments")?
            .build(),
    ];
    Ok(Arc::new(sets.into_iter().collect()))
}

/// A scenario over the `acme` schema and its constraints, plus the schema
/// for building records.
pub fn scenario(name: &str) -> ScenarioResult<(Arc<Registry>, Scenario)> {
    let schema = schema()?;
    let constraints = constraints(&schema)?;
    let scenario = Scenario::new(name)
        .schema(schema.clone())
        .constraints(constraints);
    Ok((schema, scenario))
}

/// The `acme` schema with only the given constraint sets.
pub fn scenario_with<F>(name: &str, sets: F) -> ScenarioResult<(Arc<Registry>, Scenario)>
where
    F: FnOnce(&Registry) -> ScenarioResult<Vec<ConstraintSet>>,
{
    let schema = schema()?;
    let constraints: ConstraintRegistry = sets(&schema)?.into_iter().collect();
    let scenario = Scenario::new(name)
        .schema(schema.clone())
        .constraints(Arc::new(constraints));
    Ok((schema, scenario))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_constraints_build() {
        let schema = schema().unwrap();
        let constraints = constraints(&schema).unwrap();

        assert_eq!(schema.type_count(), 8);
        assert_eq!(constraints.len(), 7);
        assert!(constraints.get("acme.Limits").is_none());
    }
}
