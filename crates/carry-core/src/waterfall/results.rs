use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CarryError;
use crate::types::*;

/// The four tiers of an American waterfall, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// LP contributed capital comes back first
    ReturnOfCapital,
    /// LP preferred return up to the hurdle
    PreferredReturn,
    /// GP catch-up to its target share of profit
    GpCatchUp,
    /// Residual split at the carry rate
    CarrySplit,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::ReturnOfCapital => "Return of Capital",
            Tier::PreferredReturn => "Preferred Return",
            Tier::GpCatchUp => "GP Catch-Up",
            Tier::CarrySplit => "Carry Split",
        }
    }
}

/// Result for a single waterfall tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierResult {
    pub tier: Tier,
    /// Total amount distributed in this tier
    pub amount: Money,
    pub to_lp: Money,
    pub to_gp: Money,
    /// Proceeds remaining after this tier
    pub remaining: Money,
}

/// Breakdown block of intermediate figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallCalculations {
    /// Proceeds after management fees
    pub net_proceeds: Money,
    /// LP total return over contributed capital, whole-number percent
    pub lp_return: Percent,
    /// Dollars paid to the GP in the catch-up tier
    pub gp_catchup: Money,
    /// GP share of the residual carry split
    pub carry_distribution: Money,
}

/// Full waterfall distribution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallResults {
    /// Net proceeds distributed across both parties
    pub total_distribution: Money,
    pub lp_distribution: Money,
    pub gp_distribution: Money,
    /// Echo of the input carry rate (percent)
    pub carry_rate: Percent,
    /// Echo of the input hurdle rate (percent)
    pub hurdle_rate: Percent,
    /// LP contribution grown by the hurdle; the LP total reached before catch-up starts
    pub catchup_threshold: Money,
    pub calculations: WaterfallCalculations,
    /// Per-tier breakdown in execution order
    pub tiers: Vec<TierResult>,
    /// LP distribution as a multiple of contributed capital
    pub lp_multiple: Multiple,
    /// GP share of net proceeds (decimal)
    pub gp_pct_of_total: Rate,
    /// LP share of net proceeds (decimal)
    pub lp_pct_of_total: Rate,
}

impl WaterfallResults {
    pub fn tier(&self, tier: Tier) -> Option<&TierResult> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Read a single headline figure.
    pub fn metric(&self, metric: WaterfallMetric) -> Decimal {
        match metric {
            WaterfallMetric::LpDistribution => self.lp_distribution,
            WaterfallMetric::GpDistribution => self.gp_distribution,
            WaterfallMetric::LpReturn => self.calculations.lp_return,
            WaterfallMetric::GpCatchup => self.calculations.gp_catchup,
            WaterfallMetric::CarryDistribution => self.calculations.carry_distribution,
            WaterfallMetric::LpMultiple => self.lp_multiple,
        }
    }
}

/// Headline outputs a sensitivity grid can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterfallMetric {
    LpDistribution,
    #[default]
    GpDistribution,
    LpReturn,
    GpCatchup,
    CarryDistribution,
    LpMultiple,
}

impl WaterfallMetric {
    pub const ALL: [WaterfallMetric; 6] = [
        WaterfallMetric::LpDistribution,
        WaterfallMetric::GpDistribution,
        WaterfallMetric::LpReturn,
        WaterfallMetric::GpCatchup,
        WaterfallMetric::CarryDistribution,
        WaterfallMetric::LpMultiple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaterfallMetric::LpDistribution => "lp_distribution",
            WaterfallMetric::GpDistribution => "gp_distribution",
            WaterfallMetric::LpReturn => "lp_return",
            WaterfallMetric::GpCatchup => "gp_catchup",
            WaterfallMetric::CarryDistribution => "carry_distribution",
            WaterfallMetric::LpMultiple => "lp_multiple",
        }
    }
}

impl fmt::Display for WaterfallMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaterfallMetric {
    type Err = CarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaterfallMetric::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| {
                CarryError::invalid(
                    "output_metric",
                    format!(
                        "Unknown metric '{s}' (expected one of: {})",
                        WaterfallMetric::ALL.map(|m| m.as_str()).join(", ")
                    ),
                )
            })
    }
}
