use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::CarryError;
use crate::types::*;
use crate::waterfall::{compute_waterfall, WaterfallField, WaterfallInputs, WaterfallMetric};
use crate::CarryResult;

/// Upper bound on sweep points per variable.
pub const MAX_SWEEP_POINTS: usize = 1_000;

/// Input for a 2-way waterfall sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallSensitivityInput {
    /// Base case; swept fields are overwritten per grid point
    #[serde(default)]
    pub base_inputs: WaterfallInputs,
    /// First variable to sweep (rows). `name` must be a waterfall input field.
    pub variable_1: SensitivityVariable,
    /// Second variable to sweep (columns)
    pub variable_2: SensitivityVariable,
    /// Result figure reported in each cell
    #[serde(default)]
    pub output_metric: WaterfallMetric,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: String,
    /// Matrix[i][j] = output when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j].
    /// `None` where the evaluation failed; the reason is in the warnings.
    pub matrix: Vec<Vec<Option<Decimal>>>,
    /// Base case output value, `None` if that cell failed
    pub base_case_value: Option<Decimal>,
    /// Position of the base case in the matrix (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> CarryResult<Vec<Decimal>> {
    let invalid = |reason: String| CarryError::InvalidInput {
        field: format!("variable:{}", var.name),
        reason,
    };
    if var.step <= Decimal::ZERO {
        return Err(invalid("Step must be positive".into()));
    }
    if var.min > var.max {
        return Err(invalid("Min must be <= max".into()));
    }
    let span = var
        .max
        .checked_sub(var.min)
        .ok_or_else(|| invalid("Range from min to max is too wide to represent".into()))?;
    let too_many = || invalid(format!("Sweep exceeds {MAX_SWEEP_POINTS} points; widen the step"));
    // Stepped points are floor(span / step) + 1, before max is appended
    let steps = span.checked_div(var.step).ok_or_else(too_many)?.floor();
    if steps >= Decimal::from(MAX_SWEEP_POINTS) {
        return Err(too_many());
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        // Past Decimal::MAX is past max as well
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }
    if values.len() > MAX_SWEEP_POINTS {
        return Err(too_many());
    }

    Ok(values)
}

/// Midpoint of a sweep range, computed without leaving [min, max].
fn midpoint(var: &SensitivityVariable) -> CarryResult<Decimal> {
    var.max
        .checked_sub(var.min)
        .and_then(|span| var.min.checked_add(span / dec!(2)))
        .ok_or_else(|| CarryError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Range from min to max is too wide to represent".into(),
        })
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Evaluate a 2-way sensitivity grid using a provided computation function.
///
/// `eval_fn` receives (variable_1_value, variable_2_value) and returns the
/// output metric. Cells whose evaluation fails are recorded as warnings and
/// hold `None`.
pub fn evaluate_sensitivity<F>(
    variable_1: &SensitivityVariable,
    variable_2: &SensitivityVariable,
    output_metric: &str,
    eval_fn: F,
) -> CarryResult<ComputationOutput<SensitivityOutput>>
where
    F: Fn(Decimal, Decimal) -> CarryResult<Decimal>,
{
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let v1_values = generate_sweep_values(variable_1)?;
    let v2_values = generate_sweep_values(variable_2)?;

    let mut matrix = Vec::with_capacity(v1_values.len());

    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            match eval_fn(*v1, *v2) {
                Ok(val) => row.push(Some(val)),
                Err(e) => {
                    debug!(%v1, %v2, error = %e, "sensitivity cell failed");
                    warnings.push(format!("Evaluation failed at ({v1}, {v2}): {e}"));
                    row.push(None);
                }
            }
        }
        matrix.push(row);
    }

    let base_row = closest_index(&v1_values, midpoint(variable_1)?);
    let base_col = closest_index(&v2_values, midpoint(variable_2)?);
    let base_case_value = matrix[base_row][base_col];

    let output = SensitivityOutput {
        variable_1_name: variable_1.name.clone(),
        variable_2_name: variable_2.name.clone(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: output_metric.to_string(),
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Sensitivity Analysis (Evaluated)",
        &serde_json::json!({
            "variable_1": variable_1.name,
            "variable_2": variable_2.name,
            "output_metric": output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Sweep two waterfall inputs around a base case and report one result metric.
pub fn evaluate_waterfall_sensitivity(
    input: &WaterfallSensitivityInput,
) -> CarryResult<ComputationOutput<SensitivityOutput>> {
    let field_1: WaterfallField = input.variable_1.name.parse()?;
    let field_2: WaterfallField = input.variable_2.name.parse()?;
    if field_1 == field_2 {
        return Err(CarryError::InvalidInput {
            field: "variable_2".into(),
            reason: format!("Both sweep variables are '{field_1}'"),
        });
    }

    let metric = input.output_metric;
    evaluate_sensitivity(
        &input.variable_1,
        &input.variable_2,
        metric.as_str(),
        |v1, v2| {
            let mut inputs = input.base_inputs.clone();
            field_1.set(&mut inputs, v1);
            field_2.set(&mut inputs, v2);
            let out = compute_waterfall(&inputs)?;
            Ok(out.result.metric(metric))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn var(name: &str, min: Decimal, max: Decimal, step: Decimal) -> SensitivityVariable {
        SensitivityVariable {
            name: name.into(),
            min,
            max,
            step,
        }
    }

    fn proceeds_by_carry() -> WaterfallSensitivityInput {
        WaterfallSensitivityInput {
            base_inputs: WaterfallInputs::default(),
            variable_1: var(
                "total_proceeds",
                dec!(40_000_000),
                dec!(60_000_000),
                dec!(5_000_000),
            ),
            variable_2: var("carry_rate", dec!(10), dec!(30), dec!(10)),
            output_metric: WaterfallMetric::GpDistribution,
        }
    }

    #[test]
    fn test_grid_dimensions_and_base_case() {
        let result = evaluate_waterfall_sensitivity(&proceeds_by_carry()).unwrap();
        let out = &result.result;

        // 40, 45, 50, 55, 60 => 5 rows; 10, 20, 30 => 3 cols
        assert_eq!(out.variable_1_values.len(), 5);
        assert_eq!(out.variable_2_values.len(), 3);
        assert_eq!(out.matrix.len(), 5);
        assert_eq!(out.matrix[0].len(), 3);

        // Midpoint = 50M proceeds, 20% carry: the reference case
        assert_eq!(out.base_case_position, (2, 1));
        assert_eq!(out.base_case_value, Some(dec!(1_600_000)));
        assert_eq!(out.output_metric, "gp_distribution");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_gp_distribution_rises_with_proceeds_and_carry() {
        let result = evaluate_waterfall_sensitivity(&proceeds_by_carry()).unwrap();
        let m = &result.result.matrix;
        for col in 0..3 {
            for row in 1..5 {
                assert!(m[row][col] >= m[row - 1][col]);
            }
        }
        for row in m {
            assert!(row[2] >= row[1] && row[1] >= row[0]);
        }
        // 40M proceeds less 2M fees never returns capital
        assert_eq!(m[0][0], Some(Decimal::ZERO));
    }

    #[test]
    fn test_invalid_cells_become_warnings() {
        let input = WaterfallSensitivityInput {
            variable_2: var("carry_rate", dec!(80), dec!(100), dec!(10)),
            ..proceeds_by_carry()
        };
        let result = evaluate_waterfall_sensitivity(&input).unwrap();
        // carry_rate = 100 fails validation in every row
        assert_eq!(result.warnings.len(), 5);
        for row in &result.result.matrix {
            assert!(row[0].is_some() && row[1].is_some());
            assert_eq!(row[2], None);
        }
    }

    #[test]
    fn test_failed_cell_is_distinct_from_zero_result() {
        // 40M proceeds at 10% carry pays the GP nothing; 100% carry fails
        let input = WaterfallSensitivityInput {
            variable_2: var("carry_rate", dec!(10), dec!(100), dec!(90)),
            ..proceeds_by_carry()
        };
        let result = evaluate_waterfall_sensitivity(&input).unwrap();
        let m = &result.result.matrix;
        assert_eq!(m[0][0], Some(Decimal::ZERO));
        assert_eq!(m[0][1], None);

        let json = serde_json::to_value(&result.result).unwrap();
        assert!(json["matrix"][0][1].is_null());
        assert!(!json["matrix"][0][0].is_null());
    }

    #[test]
    fn test_failed_base_case_has_no_value() {
        let result = evaluate_sensitivity(
            &var("a", dec!(1), dec!(3), dec!(1)),
            &var("b", dec!(1), dec!(3), dec!(1)),
            "ratio",
            |a, b| {
                if a == dec!(2) && b == dec!(2) {
                    Err(CarryError::DivisionByZero {
                        context: "test".into(),
                    })
                } else {
                    Ok(a / b)
                }
            },
        )
        .unwrap();
        assert_eq!(result.result.base_case_position, (1, 1));
        assert_eq!(result.result.base_case_value, None);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_max_included_when_step_overshoots() {
        let values = generate_sweep_values(&var("x", dec!(0), dec!(10), dec!(4))).unwrap();
        assert_eq!(values, vec![dec!(0), dec!(4), dec!(8), dec!(10)]);
    }

    #[test]
    fn test_invalid_step() {
        let input = WaterfallSensitivityInput {
            variable_1: var("total_proceeds", dec!(1), dec!(2), dec!(0)),
            ..proceeds_by_carry()
        };
        assert!(evaluate_waterfall_sensitivity(&input).is_err());
    }

    #[test]
    fn test_min_above_max() {
        let err = generate_sweep_values(&var("x", dec!(5), dec!(1), dec!(1))).unwrap_err();
        assert!(matches!(err, CarryError::InvalidInput { .. }));
    }

    #[test]
    fn test_too_many_points() {
        let err = generate_sweep_values(&var("x", dec!(0), dec!(1), dec!(0.0001))).unwrap_err();
        assert!(err.to_string().contains("widen the step"));
    }

    #[test]
    fn test_sweep_cap_is_exact() {
        let values = generate_sweep_values(&var("x", dec!(0), dec!(999), dec!(1))).unwrap();
        assert_eq!(values.len(), MAX_SWEEP_POINTS);

        // 1,000 stepped points plus the appended max
        let err = generate_sweep_values(&var("x", dec!(0), dec!(999.5), dec!(1))).unwrap_err();
        assert!(err.to_string().contains("widen the step"));

        let err = generate_sweep_values(&var("x", dec!(0), dec!(1000), dec!(1))).unwrap_err();
        assert!(err.to_string().contains("widen the step"));
    }

    #[test]
    fn test_sweep_near_decimal_max_stops_at_max() {
        let huge_step = dec!(1_000_000_000_000_000_000_000_000_000);
        let top = var("total_proceeds", Decimal::MAX - dec!(10), Decimal::MAX, huge_step);
        let values = generate_sweep_values(&top).unwrap();
        assert_eq!(values, vec![Decimal::MAX - dec!(10), Decimal::MAX]);

        let input = WaterfallSensitivityInput {
            variable_1: top,
            ..proceeds_by_carry()
        };
        let result = evaluate_waterfall_sensitivity(&input).unwrap();
        let out = &result.result;
        assert_eq!(out.matrix.len(), 2);
        let failed = out.matrix.iter().flatten().filter(|c| c.is_none()).count();
        assert_eq!(result.warnings.len(), failed);
    }

    #[test]
    fn test_unrepresentable_range_is_rejected() {
        let huge_step = dec!(1_000_000_000_000_000_000_000_000_000);
        let err = generate_sweep_values(&var("x", Decimal::MIN, Decimal::MAX, huge_step)).unwrap_err();
        match err {
            CarryError::InvalidInput { field, .. } => assert_eq!(field, "variable:x"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_variable() {
        let input = WaterfallSensitivityInput {
            variable_1: var("irr", dec!(1), dec!(2), dec!(1)),
            ..proceeds_by_carry()
        };
        match evaluate_waterfall_sensitivity(&input) {
            Err(CarryError::InvalidInput { field, .. }) => assert_eq!(field, "variable"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_same_variable_twice() {
        let input = WaterfallSensitivityInput {
            variable_2: var("total_proceeds", dec!(1), dec!(2), dec!(1)),
            ..proceeds_by_carry()
        };
        assert!(evaluate_waterfall_sensitivity(&input).is_err());
    }

    #[test]
    fn test_generic_evaluator() {
        let result = evaluate_sensitivity(
            &var("a", dec!(1), dec!(3), dec!(1)),
            &var("b", dec!(1), dec!(2), dec!(1)),
            "product",
            |a, b| Ok(a * b),
        )
        .unwrap();
        assert_eq!(result.result.matrix[2][1], Some(dec!(6)));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "variable_1": { "name": "hurdle_rate", "min": "6", "max": "10", "step": "2" },
            "variable_2": { "name": "management_fees", "min": "0", "max": "2000000", "step": "1000000" }
        }"#;
        let input: WaterfallSensitivityInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.output_metric, WaterfallMetric::GpDistribution);
        assert_eq!(input.base_inputs, WaterfallInputs::default());
        let result = evaluate_waterfall_sensitivity(&input).unwrap();
        assert_eq!(result.result.matrix.len(), 3);
    }
}
