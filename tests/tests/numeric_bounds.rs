//! Numeric range integration tests.
//!
//! Literal and field-reference bounds over the metrics types.

use vouch_constraint::{ConstraintError, ConstraintSet};
use vouch_tests::prelude::*;

mod literal_ranges {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("literal_ranges")?;
        Ok(scenario
            .step("empty_reading", record!(schema, "acme.Reading")?, |a| a.valid())
            .step(
                "samples_on_bounds",
                record!(schema, "acme.Reading", samples: vec![0i32, 100i32])?,
                |a| a.valid(),
            )
            .step(
                "samples_outside",
                record!(schema, "acme.Reading", samples: vec![0i32, 101i32, 50i32, -1i32])?,
                |a| {
                    a.violations(2)
                        .paths(["samples", "samples"])
                        .message("The field `acme.Reading.samples` must be [0..100]. The passed value: `101`.")
                        .message("The field `acme.Reading.samples` must be [0..100]. The passed value: `-1`.")
                },
            )
            .step("ratio_at_upper", record!(schema, "acme.Reading", ratio: 1.0f64)?, |a| a.valid())
            .step("ratio_above", record!(schema, "acme.Reading", ratio: 1.5f64)?, |a| {
                a.violations(1).value("ratio", "1.5")
            })
            .step("ratio_nan", record!(schema, "acme.Reading", ratio: f64::NAN)?, |a| {
                a.violations(1).value("ratio", "NaN")
            }))
    }

    #[test]
    fn test_literal_ranges_check_every_element() {
        scenario().unwrap().run().unwrap();
    }
}

mod reference_ranges {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("reference_ranges")?;
        let limits = record!(schema, "acme.Limits", low: 10i32, high: 20i32, budget: 500i64)?;
        Ok(scenario
            .step(
                "value_at_low",
                record!(schema, "acme.Reading", value: 10i32, limits: limits.clone())?,
                |a| a.valid(),
            )
            .step(
                "value_at_high",
                record!(schema, "acme.Reading", value: 20i32, limits: limits.clone())?,
                |a| a.valid(),
            )
            .step(
                "value_above",
                record!(schema, "acme.Reading", value: 21i32, limits: limits.clone())?,
                |a| {
                    a.violations(1)
                        .paths(["value"])
                        .message("The field `acme.Reading.value` must be [limits.low..limits.high]. The passed value: `21`.")
                },
            )
            .step(
                "total_within_budget",
                record!(schema, "acme.Reading", value: 15i32, total: 500i64, limits: limits.clone())?,
                |a| a.valid(),
            )
            .step(
                "total_over_budget",
                record!(schema, "acme.Reading", value: 15i32, total: 501i64, limits: limits.clone())?,
                |a| a.violations(1).value("total", "501"),
            )
            .step(
                "unset_limits_read_as_zero",
                record!(schema, "acme.Reading", value: 1i32)?,
                |a| a.violations(1).paths(["value"]),
            ))
    }

    #[test]
    fn test_reference_bounds_follow_sibling_fields() {
        scenario().unwrap().run().unwrap();
    }
}

mod exclusive_bounds {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario("exclusive_bounds")?;
        Ok(scenario
            .step(
                "zero_amount",
                record!(schema, "acme.Payment", amount: 0i64, card: "4111")?,
                |a| {
                    a.violations(1)
                        .message("The field `acme.Payment.amount` must be > 0. The passed value: `0`.")
                },
            )
            .step(
                "positive_amount",
                record!(schema, "acme.Payment", amount: 1i64, card: "4111")?,
                |a| a.valid(),
            ))
    }

    #[test]
    fn test_exclusive_lower_bound() {
        scenario().unwrap().run().unwrap();
    }
}

mod widening {
    use super::*;

    pub fn scenario() -> ScenarioResult<Scenario> {
        let (schema, scenario) = fixtures::scenario_with("widening", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Reading")?
                .max("total", "value", false)?
                .build()])
        })?;
        Ok(scenario
            .step(
                "int32_bound_on_int64_field",
                record!(schema, "acme.Reading", value: 7i32, total: 7i64)?,
                |a| a.valid(),
            )
            .step(
                "int32_bound_exceeded",
                record!(schema, "acme.Reading", value: 7i32, total: 8i64)?,
                |a| a.violations(1).value("total", "8"),
            ))
    }

    #[test]
    fn test_narrow_reference_widens_to_field_kind() {
        scenario().unwrap().run().unwrap();
    }

    #[test]
    fn test_wide_reference_on_narrow_field_is_rejected() {
        let (schema, scenario) = fixtures::scenario_with("narrowing", |schema| {
            Ok(vec![ConstraintSet::builder(schema, "acme.Reading")?
                .max("value", "total", false)?
                .build()])
        })
        .unwrap();

        scenario
            .step(
                "int64_bound_on_int32_field",
                record!(schema, "acme.Reading", value: 7i32, total: 8i64).unwrap(),
                |a| a.error("cannot be compared"),
            )
            .run()
            .unwrap();
    }
}

mod definitions {
    use super::*;

    #[test]
    fn test_malformed_ranges_are_rejected() {
        let schema = fixtures::schema().unwrap();
        let builder = || ConstraintSet::builder(&schema, "acme.Reading").unwrap();

        assert!(matches!(
            builder().range("samples", "[10..1]"),
            Err(ConstraintError::InvertedRange { .. })
        ));
        assert!(matches!(
            builder().range("samples", "0..1"),
            Err(ConstraintError::MalformedRange { .. })
        ));
        assert!(matches!(
            builder().range("value", "[0..value]"),
            Err(ConstraintError::SelfReference { .. })
        ));
        assert!(matches!(
            builder().range("value", "[0..limits]"),
            Err(ConstraintError::NonNumericReference { .. })
        ));
        assert!(matches!(
            builder().range("value", "[0..limits.missing]"),
            Err(ConstraintError::UnknownField { .. })
        ));
        assert!(matches!(
            builder().min("value", "", false),
            Err(ConstraintError::EmptyBound { .. })
        ));
    }

    #[test]
    fn test_range_needs_numeric_field() {
        let schema = fixtures::schema().unwrap();
        let result = ConstraintSet::builder(&schema, "acme.Contact")
            .unwrap()
            .range("email", "[0..1]");

        assert!(matches!(result, Err(ConstraintError::InapplicableField { .. })));
    }
}
