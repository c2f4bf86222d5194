use rust_decimal::Decimal;
use tracing::debug;

use super::inputs::WaterfallInputs;
use super::results::{Tier, TierResult, WaterfallCalculations, WaterfallResults};
use crate::error::CarryError;
use crate::types::*;
use crate::CarryResult;

/// Four-tier American waterfall over a single pool of proceeds.
///
/// Tiers run strictly in order and each one draws only from what the
/// previous tiers left behind:
///
/// 1. return of LP capital,
/// 2. LP preferred return up to the hurdle,
/// 3. GP catch-up until the GP holds `carry_rate` of tier 2 + 3 profit,
/// 4. residual split at `carry_rate`.
///
/// The engine trusts its inputs. Call [`WaterfallInputs::validate`] first, or
/// go through [`super::compute_waterfall`] which does.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterfallEngine;

impl WaterfallEngine {
    pub fn compute(inputs: &WaterfallInputs) -> CarryResult<WaterfallResults> {
        let carry = percent_to_rate(inputs.carry_rate);
        let hurdle = percent_to_rate(inputs.hurdle_rate);
        let lp_capital = inputs.lp_contribution;

        let net_proceeds = inputs.net_proceeds()?;
        let mut tiers: Vec<TierResult> = Vec::with_capacity(4);

        // Tier 1
        let return_of_capital = net_proceeds.min(lp_capital);
        let mut remaining = checked(
            net_proceeds.checked_sub(return_of_capital),
            "return of capital",
        )?;
        tiers.push(TierResult {
            tier: Tier::ReturnOfCapital,
            amount: return_of_capital,
            to_lp: return_of_capital,
            to_gp: Decimal::ZERO,
            remaining,
        });

        // Tier 2
        let hurdle_amount = checked(
            Decimal::ONE
                .checked_add(hurdle)
                .and_then(|growth| lp_capital.checked_mul(growth)),
            "hurdle amount",
        )?;
        let preferred_cap = checked(hurdle_amount.checked_sub(lp_capital), "preferred return")?;
        let preferred_return = remaining.min(preferred_cap).max(Decimal::ZERO);
        remaining = checked(remaining.checked_sub(preferred_return), "preferred return")?;
        tiers.push(TierResult {
            tier: Tier::PreferredReturn,
            amount: preferred_return,
            to_lp: preferred_return,
            to_gp: Decimal::ZERO,
            remaining,
        });

        // Tier 3: size the catch-up so GP / (LP pref + GP catch-up) == carry
        let lp_profit_share = checked(Decimal::ONE.checked_sub(carry), "GP catch-up target")?;
        if lp_profit_share.is_zero() {
            return Err(CarryError::DivisionByZero {
                context: "GP catch-up target (carry_rate of 100% leaves no LP profit share)"
                    .into(),
            });
        }
        let catchup_target = checked(
            preferred_return
                .checked_mul(carry)
                .and_then(|gp_profit| gp_profit.checked_div(lp_profit_share)),
            "GP catch-up target",
        )?;
        let gp_catchup = remaining.min(catchup_target);
        remaining = checked(remaining.checked_sub(gp_catchup), "GP catch-up")?;
        tiers.push(TierResult {
            tier: Tier::GpCatchUp,
            amount: gp_catchup,
            to_lp: Decimal::ZERO,
            to_gp: gp_catchup,
            remaining,
        });

        // Tier 4
        let gp_carry_share = checked(remaining.checked_mul(carry), "carry split")?;
        let lp_carry_share = checked(remaining.checked_sub(gp_carry_share), "carry split")?;
        tiers.push(TierResult {
            tier: Tier::CarrySplit,
            amount: remaining,
            to_lp: lp_carry_share,
            to_gp: gp_carry_share,
            remaining: Decimal::ZERO,
        });

        for t in &tiers {
            debug!(
                tier = t.tier.label(),
                amount = %t.amount,
                to_lp = %t.to_lp,
                to_gp = %t.to_gp,
                remaining = %t.remaining,
                "waterfall tier distributed"
            );
        }

        let lp_distribution = checked(
            return_of_capital
                .checked_add(preferred_return)
                .and_then(|lp| lp.checked_add(lp_carry_share)),
            "LP distribution",
        )?;
        let gp_distribution = checked(gp_catchup.checked_add(gp_carry_share), "GP distribution")?;

        let lp_multiple = lp_distribution
            .checked_div(lp_capital)
            .ok_or_else(|| CarryError::DivisionByZero {
                context: "LP return (lp_contribution is zero)".into(),
            })?;
        let lp_return = checked(
            lp_multiple
                .checked_sub(Decimal::ONE)
                .and_then(|gain| gain.checked_mul(Decimal::ONE_HUNDRED)),
            "LP return",
        )?;

        let (gp_pct_of_total, lp_pct_of_total) = if net_proceeds.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (
                checked(gp_distribution.checked_div(net_proceeds), "GP share of total")?,
                checked(lp_distribution.checked_div(net_proceeds), "LP share of total")?,
            )
        };

        Ok(WaterfallResults {
            total_distribution: net_proceeds,
            lp_distribution,
            gp_distribution,
            carry_rate: inputs.carry_rate,
            hurdle_rate: inputs.hurdle_rate,
            catchup_threshold: hurdle_amount,
            calculations: WaterfallCalculations {
                net_proceeds,
                lp_return,
                gp_catchup,
                carry_distribution: gp_carry_share,
            },
            tiers,
            lp_multiple,
            gp_pct_of_total,
            lp_pct_of_total,
        })
    }
}

/// Map a failed checked operation to an overflow error naming the step.
fn checked(value: Option<Decimal>, context: &str) -> CarryResult<Decimal> {
    value.ok_or_else(|| CarryError::Overflow {
        context: context.into(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
