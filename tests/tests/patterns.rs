//! Pattern integration tests.

use vouch_constraint::{ConstraintError, ConstraintSet, PatternModifiers};
use vouch_tests::prelude::*;

mod zip_codes {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("zip_codes")?;
        Ok(scenario
            .step(
                "five_digits",
                record!(schema, "acme.Address", first_line: "1 Main St", zip: "12345")?,
                |a| a.valid(),
            )
            .step(
                "letters",
                record!(schema, "acme.Address", first_line: "1 Main St", zip: "1234a")?,
                |a| {
                    a.violations(1)
                        .paths(["zip"])
                        .value("zip", "\"1234a\"")
                        .message("The field `acme.Address.zip` of the type `string` must match the regular expression `\\d{5}` (modifiers: []). The passed value: `1234a`.")
                },
            )
            .step(
                "too_long",
                record!(schema, "acme.Address", first_line: "1 Main St", zip: "123456")?,
                |a| a.violations(1).paths(["zip"]),
            )
            .step(
                "unset_zip_is_skipped",
                record!(schema, "acme.Address", first_line: "1 Main St")?,
                |a| a.valid(),
            ))
    }

    #[test]
    fn test_pattern_matches_whole_value() {
        scenario().unwrap().run().unwrap();
    }
}

mod partial_matches {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario_with("partial_matches", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Contact")?
                .pattern("email", "a.c", PatternModifiers::default())?
                .pattern("phone", "a.c", PatternModifiers::default().partial())?
                .build()])
        })?;
        Ok(scenario
            .step(
                "strict_exact",
                record!(schema, "acme.Contact", email: "abc")?,
                |a| a.valid(),
            )
            .step(
                "strict_embedded",
                record!(schema, "acme.Contact", email: "xxabcxx")?,
                |a| a.violations(1).paths(["email"]),
            )
            .step(
                "partial_embedded",
                record!(schema, "acme.Contact", phone: "xxabcxx")?,
                |a| a.valid(),
            )
            .step(
                "partial_absent",
                record!(schema, "acme.Contact", phone: "xyz")?,
                |a| a.violations(1).paths(["phone"]),
            ))
    }

    #[test]
    fn test_partial_match_modifier() {
        scenario().unwrap().run().unwrap();
    }
}

mod modifiers {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario_with("modifiers", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Contact")?
                .pattern("email", "abc", PatternModifiers::default().case_insensitive())?
                .pattern("country", "^[A-Z]{2}$", PatternModifiers::default().multiline().partial())?
                .pattern("phone", "1.2", PatternModifiers::default().dot_all())?
                .build()])
        })?;
        Ok(scenario
            .step(
                "upper_case",
                record!(schema, "acme.Contact", email: "ABC")?,
                |a| a.valid(),
            )
            .step(
                "code_on_second_line",
                record!(schema, "acme.Contact", country: "unknown\nDE")?,
                |a| a.valid(),
            )
            .step(
                "newline_matches_dot",
                record!(schema, "acme.Contact", phone: "1\n2")?,
                |a| a.valid(),
            )
            .step(
                "case_insensitive_mismatch",
                record!(schema, "acme.Contact", email: "ABD")?,
                |a| {
                    a.violations(1)
                        .message("The field `acme.Contact.email` of the type `string` must match the regular expression `abc` (modifiers: [case_insensitive]). The passed value: `ABD`.")
                },
            ))
    }

    #[test]
    fn test_modifiers_change_matching() {
        scenario().unwrap().run().unwrap();
    }
}

mod repeated_strings {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario_with("repeated_strings", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Contact")?
                .pattern("tags", "[a-z]+", PatternModifiers::default())?
                .build()])
        })?;
        Ok(scenario.step(
            "default_elements_skipped",
            record!(schema, "acme.Contact", tags: vec!["ok", "", "BAD"])?,
            |a| a.violations(1).value("tags", "\"BAD\""),
        ))
    }

    #[test]
    fn test_each_non_default_element_is_matched() {
        scenario().unwrap().run().unwrap();
    }
}

#[test]
fn test_invalid_pattern_is_a_definition_error() {
    let schema = fixtures::schema().unwrap();
    let result = ConstraintSet::builder(&schema, "acme.Address")
        .unwrap()
        .pattern("zip", "(", PatternModifiers::default());

    assert!(matches!(result, Err(ConstraintError::InvalidPattern { .. })));
}

#[test]
fn test_pattern_needs_string_field() {
    let schema = fixtures::schema().unwrap();
    let result = ConstraintSet::builder(&schema, "acme.Reading")
        .unwrap()
        .pattern("value", "\\d+", PatternModifiers::default());

    assert!(matches!(result, Err(ConstraintError::InapplicableField { .. })));
}
