//! Repeated and map field integration tests.

use vouch_constraint::ConstraintSet;
use vouch_tests::prelude::*;

mod distinct_tags {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("distinct_tags")?;
        Ok(scenario
            .step(
                "unique",
                record!(schema, "acme.Contact", email: "a@acme.io", tags: vec!["a", "b", "c"])?,
                |a| a.valid(),
            )
            .step(
                "duplicates",
                record!(schema, "acme.Contact", email: "a@acme.io", tags: vec!["a", "b", "a", "c", "b"])?,
                |a| {
                    a.violations(1)
                        .paths(["tags"])
                        .value("tags", "[\"a\", \"b\"]")
                },
            ))
    }

    #[test]
    fn test_duplicates_reported_once_in_first_seen_order() {
        scenario().unwrap().run().unwrap();
    }
}

mod distinct_scores {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("distinct_scores")?;
        let unique = schema
            .record("acme.Contact")?
            .set("email", "a@acme.io")?
            .set_map("scores", [("math", 1i32), ("art", 2i32)])?
            .build();
        let repeated = schema
            .record("acme.Contact")?
            .set("email", "a@acme.io")?
            .set_map("scores", [("math", 1i32), ("art", 1i32), ("gym", 3i32)])?
            .build();
        Ok(scenario
            .step("unique_values", unique, |a| a.valid())
            .step("repeated_values", repeated, |a| {
                a.violations(1)
                    .value("scores", "[1]")
                    .message("The field `acme.Contact.scores` of the type `map<string, int32>` must not contain duplicates. The duplicates found: [1].")
            }))
    }

    #[test]
    fn test_map_values_are_compared() {
        scenario().unwrap().run().unwrap();
    }
}

mod distinct_numbers {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario_with("distinct_numbers", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Reading")?
                .distinct("samples")?
                .build()])
        })?;
        Ok(scenario.step(
            "duplicates",
            record!(schema, "acme.Reading", samples: vec![1i32, 2i32, 1i32, 3i32, 2i32])?,
            |a| a.violations(1).value("samples", "[1, 2]"),
        ))
    }

    #[test]
    fn test_numeric_duplicates() {
        scenario().unwrap().run().unwrap();
    }
}

mod non_empty {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario_with("non_empty", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Contact")?
                .required_collection("tags")?
                .build()])
        })?;
        Ok(scenario
            .step("empty", record!(schema, "acme.Contact")?, |a| {
                a.violations(1).paths(["tags"])
            })
            .step(
                "only_default_element",
                record!(schema, "acme.Contact", tags: vec![""])?,
                |a| a.valid(),
            ))
    }

    #[test]
    fn test_required_collection_needs_an_element() {
        scenario().unwrap().run().unwrap();
    }
}

#[test]
fn test_distinct_needs_collection() {
    let schema = fixtures::schema().unwrap();

    assert!(ConstraintSet::builder(&schema, "acme.Contact")
        .unwrap()
        .distinct("email")
        .is_err());
    assert!(ConstraintSet::builder(&schema, "acme.Contact")
        .unwrap()
        .required_collection("email")
        .is_err());
}
