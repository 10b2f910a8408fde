//! Pool trait definitions for a unified AMM interface

use crate::v2_math::{Result, V2Math, V2PoolState};
use flashloan_types::Amount;

/// Unified pool interface for swap calculations
pub trait AmmPool {
    /// Calculate output amount for given input
    fn get_amount_out(&self, amount_in: Amount) -> Result<Amount>;

    /// Calculate required input for desired output
    fn get_amount_in(&self, amount_out: Amount) -> Result<Amount>;

    /// Get current reserves as (in, out)
    fn get_liquidity(&self) -> (Amount, Amount);

    /// Get fee tier
    fn get_fee_bps(&self) -> u32;
}

impl AmmPool for V2PoolState {
    fn get_amount_out(&self, amount_in: Amount) -> Result<Amount> {
        V2Math::get_amount_out(amount_in, self.reserve_in, self.reserve_out, self.fee_bps)
    }

    fn get_amount_in(&self, amount_out: Amount) -> Result<Amount> {
        V2Math::get_amount_in(amount_out, self.reserve_in, self.reserve_out, self.fee_bps)
    }

    fn get_liquidity(&self) -> (Amount, Amount) {
        (self.reserve_in, self.reserve_out)
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }
}
