use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Used inside the engine.
pub type Rate = Decimal;

/// Whole-number percentages (8 = 8%). Used on input and output surfaces.
pub type Percent = Decimal;

/// Multiples (e.g., 1.16x of contributed capital)
pub type Multiple = Decimal;

/// Convert a whole-number percentage to a decimal rate.
pub fn percent_to_rate(pct: Percent) -> Rate {
    pct / Decimal::ONE_HUNDRED
}

/// Convert a decimal rate back to a whole-number percentage.
pub fn rate_to_percent(rate: Rate) -> Percent {
    rate * Decimal::ONE_HUNDRED
}

/// Sensitivity variable specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityVariable {
    pub name: String,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_rate_conversion() {
        assert_eq!(percent_to_rate(dec!(8)), dec!(0.08));
        assert_eq!(percent_to_rate(dec!(20)), dec!(0.2));
        assert_eq!(rate_to_percent(dec!(0.16)), dec!(16));
    }

    #[test]
    fn test_with_metadata_envelope() {
        let out = with_metadata(
            "test",
            &serde_json::json!({ "a": "1" }),
            vec!["w".into()],
            42,
            dec!(1.5),
        );
        assert_eq!(out.methodology, "test");
        assert_eq!(out.assumptions["a"], "1");
        assert_eq!(out.warnings, vec!["w".to_string()]);
        assert_eq!(out.metadata.computation_time_us, 42);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
