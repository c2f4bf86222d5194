use clap::Args;
use serde_json::Value;

use carry_core::sensitivity::{self, WaterfallSensitivityInput};
use carry_core::waterfall::{WaterfallInputs, WaterfallMetric};
use carry_core::SensitivityVariable;

use crate::input;

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "total_proceeds:40000000:60000000:5000000")
    #[arg(long, allow_hyphen_values = true)]
    pub var1: String,

    /// Second sensitivity variable in format name:min:max:step
    /// (e.g. "carry_rate:10:30:5")
    #[arg(long, allow_hyphen_values = true)]
    pub var2: String,

    /// Result figure reported in each cell: lp_distribution, gp_distribution,
    /// lp_return, gp_catchup, carry_distribution, lp_multiple
    #[arg(long, default_value = "gp_distribution")]
    pub metric: String,

    /// Path to JSON or YAML file with base case waterfall inputs
    #[arg(long)]
    pub input: Option<String>,
}

fn parse_sens_var(spec: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    Ok(SensitivityVariable {
        name: parts[0].to_string(),
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base_inputs: WaterfallInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        WaterfallInputs::default()
    };

    let output_metric: WaterfallMetric = args.metric.parse()?;
    let sens_input = WaterfallSensitivityInput {
        base_inputs,
        variable_1: parse_sens_var(&args.var1)?,
        variable_2: parse_sens_var(&args.var2)?,
        output_metric,
    };

    let result = sensitivity::evaluate_waterfall_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_sens_var() {
        let var = parse_sens_var("hurdle_rate:6:10:0.5").unwrap();
        assert_eq!(var.name, "hurdle_rate");
        assert_eq!(var.min, dec!(6));
        assert_eq!(var.max, dec!(10));
        assert_eq!(var.step, dec!(0.5));
    }

    #[test]
    fn test_parse_sens_var_negative_bound() {
        let var = parse_sens_var("hurdle_rate:-2:4:2").unwrap();
        assert_eq!(var.min, dec!(-2));
    }

    #[test]
    fn test_parse_sens_var_rejects_bad_spec() {
        assert!(parse_sens_var("carry_rate:10:30").is_err());
        assert!(parse_sens_var("carry_rate:ten:30:5").is_err());
    }
}
