//! Uniswap V2 AMM math with exact integer calculations
//!
//! Mirrors the router's `getAmountOut`/`getAmountIn` rounding bit for bit so
//! quotes and settlement agree. Intermediate products are widened to 256
//! bits; results that do not fit back into an `Amount` are reported as
//! overflow rather than truncated.

use flashloan_types::{Address, Amount, FlashLoanError, BPS_DENOMINATOR};
use primitive_types::U256;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("Input amount must be positive")]
    ZeroAmount,

    #[error("Insufficient liquidity: reserves {reserve_in}/{reserve_out}")]
    InsufficientLiquidity { reserve_in: Amount, reserve_out: Amount },

    #[error("Requested output {amount_out} exceeds reserve {reserve_out}")]
    ExcessiveOutput { amount_out: Amount, reserve_out: Amount },

    #[error("Fee of {fee_bps} bps is out of range")]
    InvalidFee { fee_bps: u32 },

    #[error("Arithmetic overflow in AMM calculation")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, AmmError>;

impl AmmError {
    /// Lift into the engine taxonomy for a swap that was to yield `asset_out`
    pub fn into_flash_loan_error(self, asset_out: Address, requested: Amount) -> FlashLoanError {
        match self {
            AmmError::ZeroAmount => FlashLoanError::InvalidAmount {
                amount: 0,
                reason: "swap input must be positive".to_string(),
            },
            AmmError::InsufficientLiquidity { reserve_out, .. }
            | AmmError::ExcessiveOutput { reserve_out, .. } => {
                FlashLoanError::InsufficientLiquidity {
                    asset: asset_out,
                    requested,
                    available: reserve_out,
                }
            }
            AmmError::InvalidFee { fee_bps } => FlashLoanError::InvalidConfiguration {
                reason: format!("swap fee of {fee_bps} bps is out of range"),
            },
            AmmError::Overflow => FlashLoanError::ArithmeticOverflow {
                context: "AMM calculation",
            },
        }
    }
}

/// Pool reserves and fee structure for V2 AMMs, oriented for one swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2PoolState {
    pub reserve_in: Amount,
    pub reserve_out: Amount,
    pub fee_bps: u32, // Fee in basis points (30 = 0.3%)
}

/// V2 AMM math functions
pub struct V2Math;

impl V2Math {
    /// Calculate exact output amount using the x*y=k formula
    ///
    /// `amount_in * (10000 - fee) * reserve_out / (reserve_in * 10000 + amount_in * (10000 - fee))`,
    /// rounded down. With a 30 bps fee this is the router's 997/1000 formula.
    pub fn get_amount_out(
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
        fee_bps: u32,
    ) -> Result<Amount> {
        if amount_in == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reserve_in,
                reserve_out,
            });
        }
        let fee_multiplier = Self::fee_multiplier(fee_bps)?;

        let amount_in_with_fee = mul(U256::from(amount_in), fee_multiplier)?;
        let numerator = mul(amount_in_with_fee, U256::from(reserve_out))?;
        let denominator = mul(U256::from(reserve_in), U256::from(BPS_DENOMINATOR))?
            .checked_add(amount_in_with_fee)
            .ok_or(AmmError::Overflow)?;

        narrow(numerator / denominator)
    }

    /// Calculate required input amount for desired output (reverse calculation)
    pub fn get_amount_in(
        amount_out: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
        fee_bps: u32,
    ) -> Result<Amount> {
        if amount_out == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::InsufficientLiquidity {
                reserve_in,
                reserve_out,
            });
        }
        if amount_out >= reserve_out {
            return Err(AmmError::ExcessiveOutput {
                amount_out,
                reserve_out,
            });
        }
        let fee_multiplier = Self::fee_multiplier(fee_bps)?;

        let numerator = mul(
            mul(U256::from(reserve_in), U256::from(amount_out))?,
            U256::from(BPS_DENOMINATOR),
        )?;
        let denominator = mul(U256::from(reserve_out - amount_out), fee_multiplier)?;

        // Add 1 to round up (ensures sufficient input)
        narrow(numerator / denominator)?
            .checked_add(1)
            .ok_or(AmmError::Overflow)
    }

    /// Chain `get_amount_out` across consecutive pools, returning every hop
    ///
    /// The first element is `amount_in`, the last is the final output, the
    /// same layout as the router's `getAmountsOut`.
    pub fn get_amounts_out(amount_in: Amount, pools: &[V2PoolState]) -> Result<Vec<Amount>> {
        let mut amounts = Vec::with_capacity(pools.len() + 1);
        amounts.push(amount_in);
        let mut current = amount_in;
        for pool in pools {
            current =
                Self::get_amount_out(current, pool.reserve_in, pool.reserve_out, pool.fee_bps)?;
            amounts.push(current);
        }
        Ok(amounts)
    }

    /// Reduce `amount` by `slippage_bps`, rounding down
    pub fn apply_slippage(amount: Amount, slippage_bps: u32) -> Result<Amount> {
        let keep = Self::fee_multiplier(slippage_bps)?;
        narrow(mul(U256::from(amount), keep)? / U256::from(BPS_DENOMINATOR))
    }

    /// Calculate price impact of a trade as a percentage
    ///
    /// Diagnostic only; feeds log lines, never settlement.
    pub fn calculate_price_impact(
        amount_in: Amount,
        reserve_in: Amount,
        reserve_out: Amount,
    ) -> Result<Decimal> {
        let amount_out = Self::get_amount_out(amount_in, reserve_in, reserve_out, 0)?;

        let reserve_in_dec = to_decimal(reserve_in)?;
        let reserve_out_dec = to_decimal(reserve_out)?;
        let new_reserve_in = checked(reserve_in_dec.checked_add(to_decimal(amount_in)?))?;
        let new_reserve_out = checked(reserve_out_dec.checked_sub(to_decimal(amount_out)?))?;

        // Current price (before trade)
        let price_before = checked(reserve_out_dec.checked_div(reserve_in_dec))?;
        // Price after trade
        let price_after = checked(new_reserve_out.checked_div(new_reserve_in))?;

        let moved = checked(price_before.checked_sub(price_after))?.abs();
        checked(checked(moved.checked_div(price_before))?.checked_mul(dec!(100)))
    }

    fn fee_multiplier(fee_bps: u32) -> Result<U256> {
        let fee = Amount::from(fee_bps);
        if fee >= BPS_DENOMINATOR {
            return Err(AmmError::InvalidFee { fee_bps });
        }
        Ok(U256::from(BPS_DENOMINATOR - fee))
    }
}

#[inline]
fn checked(value: Option<Decimal>) -> Result<Decimal> {
    value.ok_or(AmmError::Overflow)
}

#[inline]
fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(AmmError::Overflow)
}

#[inline]
fn narrow(value: U256) -> Result<Amount> {
    if value > U256::from(Amount::MAX) {
        return Err(AmmError::Overflow);
    }
    Ok(value.low_u128())
}

fn to_decimal(value: Amount) -> Result<Decimal> {
    Decimal::from_u128(value).ok_or(AmmError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const E18: Amount = 1_000_000_000_000_000_000;

    #[test]
    fn test_v2_output_matches_router_formula() {
        // 100 tokens in, 1000:2000 reserves, 0.3% fee
        let output = V2Math::get_amount_out(100, 1000, 2000, 30).unwrap();
        // 100*997*2000 / (1000*1000 + 100*997) = 199_400_000 / 1_099_700 = 181.32…
        assert_eq!(output, 181);
    }

    #[test]
    fn test_v2_output_with_18_decimals() {
        let output =
            V2Math::get_amount_out(100 * E18, 1_000_000 * E18, 1_000_000 * E18, 30).unwrap();
        assert!(output < 100 * E18);
        assert!(output > 99 * E18);
    }

    #[test]
    fn test_input_amount_round_trips_output() {
        let amount_in = V2Math::get_amount_in(181, 1000, 2000, 30).unwrap();
        let amount_out = V2Math::get_amount_out(amount_in, 1000, 2000, 30).unwrap();
        assert!(amount_out >= 181);
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        assert_eq!(V2Math::get_amount_out(0, 1, 1, 30), Err(AmmError::ZeroAmount));
        assert!(matches!(
            V2Math::get_amount_out(1, 0, 1, 30),
            Err(AmmError::InsufficientLiquidity { .. })
        ));
        assert!(matches!(
            V2Math::get_amount_in(2000, 1000, 2000, 30),
            Err(AmmError::ExcessiveOutput { .. })
        ));
        assert_eq!(
            V2Math::get_amount_out(1, 1, 1, 10_000),
            Err(AmmError::InvalidFee { fee_bps: 10_000 })
        );
    }

    #[test]
    fn test_multi_hop_amounts() {
        let pools = [
            V2PoolState {
                reserve_in: 1000,
                reserve_out: 2000,
                fee_bps: 30,
            },
            V2PoolState {
                reserve_in: 2000,
                reserve_out: 1000,
                fee_bps: 30,
            },
        ];
        let amounts = V2Math::get_amounts_out(100, &pools).unwrap();
        assert_eq!(amounts.len(), 3);
        assert_eq!(amounts[0], 100);
        assert_eq!(amounts[1], 181);
        // Round trip through two fee-charging pools loses value
        assert!(amounts[2] < 100);
    }

    #[test]
    fn test_apply_slippage() {
        assert_eq!(V2Math::apply_slippage(10_000, 50).unwrap(), 9_950);
        assert_eq!(V2Math::apply_slippage(1, 50).unwrap(), 0);
    }

    #[test]
    fn test_price_impact() {
        let impact = V2Math::calculate_price_impact(100, 1000, 2000).unwrap();

        // Large trade should have noticeable impact
        assert!(impact > dec!(0));
        assert!(impact < dec!(20)); // But not extreme for 10% of reserves
    }

    #[test]
    fn test_price_impact_past_decimal_range_is_an_error() {
        let huge: Amount = 1 << 95;

        let result = V2Math::calculate_price_impact(huge, huge, huge);

        assert!(matches!(result, Err(AmmError::Overflow)));
    }

    #[test]
    fn test_conversion_into_flash_loan_error() {
        let dai = Address::from_low_u64(7);
        let err = AmmError::InsufficientLiquidity {
            reserve_in: 0,
            reserve_out: 0,
        }
        .into_flash_loan_error(dai, 100);
        assert_eq!(
            err,
            FlashLoanError::InsufficientLiquidity {
                asset: dai,
                requested: 100,
                available: 0
            }
        );
        assert_eq!(
            AmmError::Overflow.into_flash_loan_error(dai, 1),
            FlashLoanError::ArithmeticOverflow {
                context: "AMM calculation"
            }
        );
    }
}
