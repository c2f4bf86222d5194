use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use carry_core::waterfall::{self, WaterfallInputs};

use crate::input;

/// Arguments for the waterfall distribution
#[derive(Args, Default)]
pub struct WaterfallArgs {
    /// Path to JSON or YAML input file; individual flags override its values
    #[arg(long)]
    pub input: Option<String>,

    /// Gross distributable proceeds
    #[arg(long)]
    pub total_proceeds: Option<Decimal>,

    /// Capital contributed by the LP
    #[arg(long)]
    pub lp_contribution: Option<Decimal>,

    /// Preferred return hurdle, percent (8 = 8%)
    #[arg(long, allow_hyphen_values = true)]
    pub hurdle_rate: Option<Decimal>,

    /// GP carried interest, percent (20 = 20%)
    #[arg(long)]
    pub carry_rate: Option<Decimal>,

    /// GP catch-up, percent. Recorded only; full catch-up is always applied
    #[arg(long)]
    pub catchup_rate: Option<Decimal>,

    /// Fees deducted before distribution
    #[arg(long)]
    pub management_fees: Option<Decimal>,
}

impl WaterfallArgs {
    /// Layer any flags that were given over `base`.
    fn apply_to(&self, base: WaterfallInputs) -> WaterfallInputs {
        WaterfallInputs {
            total_proceeds: self.total_proceeds.unwrap_or(base.total_proceeds),
            lp_contribution: self.lp_contribution.unwrap_or(base.lp_contribution),
            hurdle_rate: self.hurdle_rate.unwrap_or(base.hurdle_rate),
            carry_rate: self.carry_rate.unwrap_or(base.carry_rate),
            catchup_rate: self.catchup_rate.unwrap_or(base.catchup_rate),
            management_fees: self.management_fees.unwrap_or(base.management_fees),
        }
    }
}

/// Base case from `--input`, else piped stdin, else the reference defaults,
/// with any flags layered on top.
fn resolve_inputs(args: &WaterfallArgs) -> Result<WaterfallInputs, Box<dyn std::error::Error>> {
    let base: WaterfallInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        WaterfallInputs::default()
    };
    Ok(args.apply_to(base))
}

pub fn run_waterfall(args: WaterfallArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wf_input = resolve_inputs(&args)?;
    debug!(?wf_input, "waterfall inputs resolved");

    let result = waterfall::compute_waterfall(&wf_input)?;
    Ok(serde_json::to_value(result)?)
}
