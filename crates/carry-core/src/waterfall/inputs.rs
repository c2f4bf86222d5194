use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CarryError;
use crate::types::*;
use crate::CarryResult;

/// Input for a single-event American (deal-by-deal) distribution waterfall.
///
/// Rates are whole-number percentages: `hurdle_rate = 8` means an 8%
/// preferred return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallInputs {
    /// Gross distributable proceeds from the investment
    pub total_proceeds: Money,
    /// Capital contributed by the Limited Partner
    pub lp_contribution: Money,
    /// Preferred return owed to the LP before the GP participates
    pub hurdle_rate: Percent,
    /// GP carried interest on profit above the hurdle
    pub carry_rate: Percent,
    /// Catch-up percentage. Recorded but not applied: the catch-up tier
    /// always brings the GP fully up to `carry_rate`.
    #[serde(default = "default_catchup_rate")]
    pub catchup_rate: Percent,
    /// Fees deducted before any distribution
    #[serde(default)]
    pub management_fees: Money,
}

fn default_catchup_rate() -> Percent {
    dec!(100)
}

impl Default for WaterfallInputs {
    fn default() -> Self {
        WaterfallInputs {
            total_proceeds: dec!(50_000_000),
            lp_contribution: dec!(40_000_000),
            hurdle_rate: dec!(8),
            carry_rate: dec!(20),
            catchup_rate: default_catchup_rate(),
            management_fees: dec!(2_000_000),
        }
    }
}

impl WaterfallInputs {
    /// Reject inputs the engine cannot distribute meaningfully.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(&self) -> CarryResult<()> {
        if self.total_proceeds < Decimal::ZERO {
            return Err(CarryError::invalid(
                "total_proceeds",
                "Total proceeds cannot be negative",
            ));
        }
        if self.lp_contribution <= Decimal::ZERO {
            return Err(CarryError::invalid(
                "lp_contribution",
                "LP contribution must be positive",
            ));
        }
        if self.carry_rate < Decimal::ZERO || self.carry_rate >= Decimal::ONE_HUNDRED {
            return Err(CarryError::invalid(
                "carry_rate",
                "Carry rate must be at least 0 and below 100",
            ));
        }
        if self.management_fees < Decimal::ZERO {
            return Err(CarryError::invalid(
                "management_fees",
                "Management fees cannot be negative",
            ));
        }
        Ok(())
    }

    /// Proceeds left after management fees. Not floored at zero.
    pub fn net_proceeds(&self) -> CarryResult<Money> {
        self.total_proceeds
            .checked_sub(self.management_fees)
            .ok_or_else(|| CarryError::Overflow {
                context: "net proceeds".into(),
            })
    }
}

/// Addressable numeric fields of [`WaterfallInputs`], used by sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterfallField {
    TotalProceeds,
    LpContribution,
    HurdleRate,
    CarryRate,
    CatchupRate,
    ManagementFees,
}

impl WaterfallField {
    pub const ALL: [WaterfallField; 6] = [
        WaterfallField::TotalProceeds,
        WaterfallField::LpContribution,
        WaterfallField::HurdleRate,
        WaterfallField::CarryRate,
        WaterfallField::CatchupRate,
        WaterfallField::ManagementFees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaterfallField::TotalProceeds => "total_proceeds",
            WaterfallField::LpContribution => "lp_contribution",
            WaterfallField::HurdleRate => "hurdle_rate",
            WaterfallField::CarryRate => "carry_rate",
            WaterfallField::CatchupRate => "catchup_rate",
            WaterfallField::ManagementFees => "management_fees",
        }
    }

    pub fn get(&self, inputs: &WaterfallInputs) -> Decimal {
        match self {
            WaterfallField::TotalProceeds => inputs.total_proceeds,
            WaterfallField::LpContribution => inputs.lp_contribution,
            WaterfallField::HurdleRate => inputs.hurdle_rate,
            WaterfallField::CarryRate => inputs.carry_rate,
            WaterfallField::CatchupRate => inputs.catchup_rate,
            WaterfallField::ManagementFees => inputs.management_fees,
        }
    }

    pub fn set(&self, inputs: &mut WaterfallInputs, value: Decimal) {
        let slot = match self {
            WaterfallField::TotalProceeds => &mut inputs.total_proceeds,
            WaterfallField::LpContribution => &mut inputs.lp_contribution,
            WaterfallField::HurdleRate => &mut inputs.hurdle_rate,
            WaterfallField::CarryRate => &mut inputs.carry_rate,
            WaterfallField::CatchupRate => &mut inputs.catchup_rate,
            WaterfallField::ManagementFees => &mut inputs.management_fees,
        };
        *slot = value;
    }
}

impl fmt::Display for WaterfallField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaterfallField {
    type Err = CarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaterfallField::ALL
            .iter()
            .find(|f| f.as_str() == s)
            .copied()
            .ok_or_else(|| {
                CarryError::invalid(
                    "variable",
                    format!(
                        "Unknown waterfall input '{s}' (expected one of: {})",
                        WaterfallField::ALL.map(|f| f.as_str()).join(", ")
                    ),
                )
            })
    }
}
