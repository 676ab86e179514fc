//! Presence integration tests: required fields, companions, field groups and
//! oneofs.

use vouch_constraint::{ConstraintError, ConstraintSet};
use vouch_tests::prelude::*;

mod required {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("required")?;
        Ok(scenario
            .step("missing", record!(schema, "acme.Address")?, |a| {
                a.violations(1)
                    .paths(["first_line"])
                    .message("The field `acme.Address.first_line` of the type `string` must be set.")
            })
            .step("empty_string", record!(schema, "acme.Address", first_line: "")?, |a| {
                a.violations(1).paths(["first_line"])
            })
            .step("set", record!(schema, "acme.Address", first_line: "1 Main St")?, |a| a.valid()))
    }

    #[test]
    fn test_required_field_must_be_non_default() {
        scenario().unwrap().run().unwrap();
    }

    #[test]
    fn test_required_rejects_scalar_numbers() {
        let schema = fixtures::schema().unwrap();
        let result = ConstraintSet::builder(&schema, "acme.Reading")
            .unwrap()
            .required("value");

        assert!(matches!(result, Err(ConstraintError::InapplicableField { .. })));
    }
}

mod companions {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("companions")?;
        Ok(scenario
            .step(
                "note_without_author",
                record!(schema, "acme.Payment", amount: 5i64, card: "4111", note: "gift")?,
                |a| {
                    a.violations(1)
                        .paths(["note"])
                        .message("The field `acme.Payment.note_author` must also be set when `note` is set.")
                },
            )
            .step(
                "note_with_author",
                record!(schema, "acme.Payment", amount: 5i64, card: "4111", note: "gift", note_author: "ann")?,
                |a| a.valid(),
            )
            .step(
                "author_without_note",
                record!(schema, "acme.Payment", amount: 5i64, card: "4111", note_author: "ann")?,
                |a| a.valid(),
            ))
    }

    #[test]
    fn test_companion_follows_its_field() {
        scenario().unwrap().run().unwrap();
    }

    #[test]
    fn test_companion_definitions() {
        let schema = fixtures::schema().unwrap();
        let builder = || ConstraintSet::builder(&schema, "acme.Payment").unwrap();

        assert!(matches!(
            builder().goes("note", "missing"),
            Err(ConstraintError::UnknownCompanion { .. })
        ));
        assert!(matches!(
            builder().goes("note", "note"),
            Err(ConstraintError::SelfReference { .. })
        ));
    }
}

mod field_groups {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("field_groups")?;
        Ok(scenario
            .step("nothing_set", record!(schema, "acme.Contact")?, |a| {
                a.violations(1)
                    .paths([""])
                    .message("The message `acme.Contact` must have at least one of the field groups `email | phone & country` set.")
            })
            .step("email_only", record!(schema, "acme.Contact", email: "a@acme.io")?, |a| {
                a.valid()
            })
            .step("phone_only", record!(schema, "acme.Contact", phone: "555")?, |a| {
                a.violations(1)
            })
            .step(
                "phone_and_country",
                record!(schema, "acme.Contact", phone: "555", country: "DE")?,
                |a| a.valid(),
            ))
    }

    #[test]
    fn test_one_group_must_be_complete() {
        scenario().unwrap().run().unwrap();
    }

    #[test]
    fn test_empty_alternative_is_rejected() {
        let schema = fixtures::schema().unwrap();
        let result = ConstraintSet::builder(&schema, "acme.Contact")
            .unwrap()
            .require_fields("email | ");

        assert!(matches!(result, Err(ConstraintError::EmptyFieldGroup { .. })));
    }
}

mod oneofs {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("oneofs")?;
        Ok(scenario
            .step("no_method", record!(schema, "acme.Payment", amount: 5i64)?, |a| {
                a.violations(1)
                    .paths(["method"])
                    .message("The oneof group `acme.Payment.method` must have one of its fields set.")
            })
            .step("card", record!(schema, "acme.Payment", amount: 5i64, card: "4111")?, |a| {
                a.valid()
            })
            .step(
                "last_case_wins",
                record!(schema, "acme.Payment", amount: 5i64, card: "4111", voucher: "SPRING")?,
                |a| a.valid(),
            ))
    }

    #[test]
    fn test_oneof_requires_a_case() {
        scenario().unwrap().run().unwrap();
    }

    #[test]
    fn test_unknown_oneof_is_rejected() {
        let schema = fixtures::schema().unwrap();
        let result = ConstraintSet::builder(&schema, "acme.Payment")
            .unwrap()
            .oneof_required("shipping");

        assert!(matches!(result, Err(ConstraintError::UnknownOneof { .. })));
    }
}

mod custom_messages {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario_with("custom_messages", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Address")?
                .required("first_line")?
                .with_message("${parent.type} needs a street line.")?
                .build()])
        })?;
        Ok(scenario.step("missing", record!(schema, "acme.Address")?, |a| {
            a.violations(1).message("acme.Address needs a street line.")
        }))
    }

    #[test]
    fn test_custom_message_replaces_default() {
        scenario().unwrap().run().unwrap();
    }

    #[test]
    fn test_unsupported_placeholder_is_rejected() {
        let schema = fixtures::schema().unwrap();
        let result = ConstraintSet::builder(&schema, "acme.Address")
            .unwrap()
            .required("first_line")
            .unwrap()
            .with_message("Needs ${goes.companion}.");

        assert!(matches!(
            result,
            Err(ConstraintError::UnsupportedPlaceholder { .. })
        ));
    }

    #[test]
    fn test_message_needs_a_constraint() {
        let schema = fixtures::schema().unwrap();
        let result = ConstraintSet::builder(&schema, "acme.Address")
            .unwrap()
            .with_message("Orphan.");

        assert!(matches!(result, Err(ConstraintError::MessageWithoutConstraint)));
    }
}
