//! Strategies run while the engine holds borrowed funds
//!
//! A strategy gets the unit of work's ledger and the engine's swap venue,
//! and reports how much of the borrowed asset it ended up with. It never
//! repays; the engine checks and authorizes repayment afterwards.

use crate::adapters::{AssetLedgerAdapter, SwapVenueAdapter};
use crate::{log_execution, log_profit};
use flashloan_amm::V2Math;
use flashloan_config::{StrategyConfig, StrategyKind};
use flashloan_ledger::TokenLedger;
use flashloan_types::{
    Address, Amount, FlashLoanError, LoanCallback, Result, StrategyResult, BPS_DENOMINATOR,
};
use serde::{Deserialize, Serialize};

/// Everything a strategy may touch during the callback
pub struct StrategyContext<'a> {
    pub ledger: &'a mut dyn TokenLedger,
    /// Account holding the borrowed funds
    pub engine: Address,
    pub swap_venue: &'a SwapVenueAdapter,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        ledger: &'a mut dyn TokenLedger,
        engine: Address,
        swap_venue: &'a SwapVenueAdapter,
    ) -> Self {
        Self {
            ledger,
            engine,
            swap_venue,
        }
    }

    /// Engine balance of `asset` inside the unit of work
    pub fn balance_of(&self, asset: Address) -> Amount {
        AssetLedgerAdapter::new(asset, self.engine).holding(&*self.ledger)
    }
}

/// Core strategy trait that every callback strategy implements
pub trait Strategy: Send + Sync {
    /// Strategy name for identification
    fn name(&self) -> &'static str;

    /// Use the borrowed funds described by `callback`
    fn execute(
        &self,
        ctx: &mut StrategyContext<'_>,
        callback: &LoanCallback,
    ) -> Result<StrategyResult>;
}

/// Build the strategy a configuration asks for
pub fn from_config(config: &StrategyConfig) -> Result<Box<dyn Strategy>> {
    match config.kind {
        StrategyKind::PassThrough => Ok(Box::new(PassThrough)),
        StrategyKind::RoundTrip => {
            let intermediate = config.intermediate_asset.ok_or_else(|| {
                FlashLoanError::invalid_configuration(
                    "round_trip strategy requires an intermediate asset",
                )
            })?;
            Ok(Box::new(RoundTripArbitrage::new(
                intermediate,
                config.max_slippage_bps,
            )?))
        }
    }
}

/// Holds the borrowed funds and does nothing with them
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Strategy for PassThrough {
    fn name(&self) -> &'static str {
        "pass_through"
    }

    fn execute(
        &self,
        _ctx: &mut StrategyContext<'_>,
        callback: &LoanCallback,
    ) -> Result<StrategyResult> {
        log_execution!("Pass-through holding {} of {}", callback.amount, callback.asset);
        Ok(StrategyResult {
            asset: callback.asset,
            amount_obtained: callback.amount,
        })
    }
}

/// Parameters carried opaquely through the pool for a round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTripParams {
    pub intermediate_asset: Address,
    /// Per-leg tolerance below the quote, in basis points
    pub max_slippage_bps: u32,
    /// Explicit minimum for the final leg, overriding the derived one
    pub min_final_out: Option<Amount>,
}

impl RoundTripParams {
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| FlashLoanError::InvalidStrategyParams {
            reason: e.to_string(),
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| FlashLoanError::InvalidStrategyParams {
            reason: e.to_string(),
        })
    }

    fn validate(&self, borrowed: Address) -> Result<()> {
        if self.intermediate_asset.is_zero() || self.intermediate_asset == borrowed {
            return Err(FlashLoanError::InvalidStrategyParams {
                reason: format!(
                    "intermediate asset {} cannot be used to round-trip {}",
                    self.intermediate_asset, borrowed
                ),
            });
        }
        if Amount::from(self.max_slippage_bps) >= BPS_DENOMINATOR {
            return Err(FlashLoanError::InvalidStrategyParams {
                reason: format!("slippage of {} bps is out of range", self.max_slippage_bps),
            });
        }
        if self.min_final_out == Some(0) {
            return Err(FlashLoanError::InvalidStrategyParams {
                reason: "final minimum output must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Borrowed asset → intermediate asset → borrowed asset through the swap venue
#[derive(Debug, Clone, Copy)]
pub struct RoundTripArbitrage {
    defaults: RoundTripParams,
}

impl RoundTripArbitrage {
    pub fn new(intermediate_asset: Address, max_slippage_bps: u32) -> Result<Self> {
        if intermediate_asset.is_zero() {
            return Err(FlashLoanError::invalid_configuration(
                "round trip intermediate asset is the zero address",
            ));
        }
        Ok(Self {
            defaults: RoundTripParams {
                intermediate_asset,
                max_slippage_bps,
                min_final_out: None,
            },
        })
    }

    pub fn defaults(&self) -> RoundTripParams {
        self.defaults
    }

    /// Quote minus tolerance, never below one base unit
    fn min_output(quote: Amount, slippage_bps: u32) -> Result<Amount> {
        let bounded = V2Math::apply_slippage(quote, slippage_bps).map_err(|e| {
            FlashLoanError::InvalidStrategyParams {
                reason: e.to_string(),
            }
        })?;
        Ok(bounded.max(1))
    }

    fn leg(
        ctx: &mut StrategyContext<'_>,
        asset_in: Address,
        asset_out: Address,
        amount_in: Amount,
        slippage_bps: u32,
        explicit_min: Option<Amount>,
    ) -> Result<Amount> {
        let quote = ctx
            .swap_venue
            .quote(&*ctx.ledger, asset_in, asset_out, amount_in)?;
        let min_out = match explicit_min {
            Some(min) => min,
            None => Self::min_output(quote, slippage_bps)?,
        };
        ctx.swap_venue
            .swap(&mut *ctx.ledger, asset_in, asset_out, amount_in, min_out)
    }
}

impl Strategy for RoundTripArbitrage {
    fn name(&self) -> &'static str {
        "round_trip_arbitrage"
    }

    fn execute(
        &self,
        ctx: &mut StrategyContext<'_>,
        callback: &LoanCallback,
    ) -> Result<StrategyResult> {
        let params = if callback.params.is_empty() {
            self.defaults
        } else {
            RoundTripParams::decode(&callback.params)?
        };
        params.validate(callback.asset)?;

        let asset = callback.asset;
        let via = params.intermediate_asset;
        log_execution!(
            "Round trip {} → {} → {} with {} borrowed",
            asset,
            via,
            asset,
            callback.amount
        );

        let intermediate = Self::leg(
            ctx,
            asset,
            via,
            callback.amount,
            params.max_slippage_bps,
            None,
        )?;
        let returned = Self::leg(
            ctx,
            via,
            asset,
            intermediate,
            params.max_slippage_bps,
            params.min_final_out,
        )?;

        if returned > callback.amount {
            log_profit!("Round trip gained {} of {}", returned - callback.amount, asset);
        }
        Ok(StrategyResult {
            asset,
            amount_obtained: returned,
        })
    }
}
