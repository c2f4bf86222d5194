//! American (deal-by-deal) LP/GP distribution waterfall.

pub mod engine;
pub mod inputs;
pub mod results;

pub use engine::WaterfallEngine;
pub use inputs::{WaterfallField, WaterfallInputs};
pub use results::{Tier, TierResult, WaterfallCalculations, WaterfallMetric, WaterfallResults};

use rust_decimal::Decimal;
use std::time::Instant;
use tracing::{info, warn};

use crate::types::*;
use crate::CarryResult;

/// Validate the inputs, run the four tiers and wrap the results in the
/// standard output envelope.
pub fn compute_waterfall(
    inputs: &WaterfallInputs,
) -> CarryResult<ComputationOutput<WaterfallResults>> {
    let start = Instant::now();

    inputs.validate()?;
    let results = WaterfallEngine::compute(inputs)?;

    let warnings = collect_warnings(inputs, &results);
    for w in &warnings {
        warn!("{w}");
    }
    info!(
        lp_distribution = %results.lp_distribution,
        gp_distribution = %results.gp_distribution,
        "waterfall computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "American Distribution Waterfall (deal-by-deal, full GP catch-up)",
        &serde_json::json!({
            "total_proceeds": inputs.total_proceeds.to_string(),
            "lp_contribution": inputs.lp_contribution.to_string(),
            "hurdle_rate_pct": inputs.hurdle_rate.to_string(),
            "carry_rate_pct": inputs.carry_rate.to_string(),
            "catchup_rate_pct": inputs.catchup_rate.to_string(),
            "management_fees": inputs.management_fees.to_string(),
        }),
        warnings,
        elapsed,
        results,
    ))
}

fn collect_warnings(inputs: &WaterfallInputs, results: &WaterfallResults) -> Vec<String> {
    let mut warnings = Vec::new();

    if inputs.catchup_rate != Decimal::ONE_HUNDRED {
        warnings.push(format!(
            "Catch-up rate of {}% is not applied; full (100%) GP catch-up assumed",
            inputs.catchup_rate
        ));
    }
    if results.calculations.net_proceeds < inputs.lp_contribution {
        warnings.push(format!(
            "Net proceeds {} do not return LP capital of {}; no preferred return or carry paid",
            results.calculations.net_proceeds, inputs.lp_contribution
        ));
    }

    warnings
}
