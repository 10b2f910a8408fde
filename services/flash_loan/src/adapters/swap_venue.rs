//! Swap Venue Adapter
//!
//! Uniswap V2 style single-hop swaps for one trading account. Every swap
//! carries a non-zero minimum output, approves the router for exactly the
//! input, and measures what actually arrived instead of trusting the
//! router's return value.

use super::AssetLedgerAdapter;
use crate::protocols::{SwapFactory, SwapRouter};
use crate::{log_metrics, log_swap};
use flashloan_amm::V2Math;
use flashloan_ledger::TokenLedger;
use flashloan_types::{checked_sub, Address, Amount, FlashLoanError, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct SwapVenueAdapter {
    router: Arc<dyn SwapRouter>,
    factory: Arc<dyn SwapFactory>,
    /// Account swaps are made from and delivered to
    account: Address,
}

impl SwapVenueAdapter {
    /// Fails when the router does not trade through `factory`
    pub fn new(
        router: Arc<dyn SwapRouter>,
        factory: Arc<dyn SwapFactory>,
        account: Address,
    ) -> Result<Self> {
        if router.factory() != factory.address() {
            return Err(FlashLoanError::invalid_configuration(format!(
                "swap router {} trades through factory {}, not {}",
                router.address(),
                router.factory(),
                factory.address()
            )));
        }
        Ok(Self {
            router,
            factory,
            account,
        })
    }

    pub fn router_address(&self) -> Address {
        self.router.address()
    }

    pub fn factory_address(&self) -> Address {
        self.factory.address()
    }

    /// Direct path from `asset_in` to `asset_out`
    pub fn route(&self, asset_in: Address, asset_out: Address) -> Result<[Address; 2]> {
        let no_route = FlashLoanError::NoSwapRoute {
            token_in: asset_in,
            token_out: asset_out,
        };
        if asset_in == asset_out {
            return Err(no_route);
        }
        match self.factory.get_pair(asset_in, asset_out) {
            Some(_) => Ok([asset_in, asset_out]),
            None => Err(no_route),
        }
    }

    /// Expected output of swapping `amount_in` at current reserves
    pub fn quote(
        &self,
        ledger: &dyn TokenLedger,
        asset_in: Address,
        asset_out: Address,
        amount_in: Amount,
    ) -> Result<Amount> {
        let path = self.route(asset_in, asset_out)?;
        let amounts = self.router.get_amounts_out(ledger, amount_in, &path)?;
        let amount_out = amounts.last().copied().unwrap_or(0);

        self.log_price_impact(ledger, asset_in, asset_out, amount_in);
        debug!(%asset_in, %asset_out, amount_in, amount_out, "Swap quote");
        Ok(amount_out)
    }

    /// Swap exactly `amount_in`, failing unless at least `min_amount_out` arrives
    pub fn swap(
        &self,
        ledger: &mut dyn TokenLedger,
        asset_in: Address,
        asset_out: Address,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> Result<Amount> {
        if amount_in == 0 {
            return Err(FlashLoanError::invalid_amount(
                amount_in,
                "swap input must be greater than zero",
            ));
        }
        if min_amount_out == 0 {
            return Err(FlashLoanError::invalid_amount(
                min_amount_out,
                "minimum swap output must be non-zero",
            ));
        }
        let path = self.route(asset_in, asset_out)?;

        let input = AssetLedgerAdapter::new(asset_in, self.account);
        let output = AssetLedgerAdapter::new(asset_out, self.account);
        let before = output.holding(ledger);

        input.approve(ledger, self.router.address(), amount_in)?;
        self.router.swap_exact_tokens_for_tokens(
            ledger,
            self.account,
            amount_in,
            min_amount_out,
            &path,
            self.account,
        )?;

        let realized = checked_sub(output.holding(ledger), before, "swap output")?;
        if realized < min_amount_out {
            return Err(FlashLoanError::SlippageExceeded {
                min_amount_out,
                actual: realized,
            });
        }

        log_swap!(
            "Swapped {} of {} for {} of {} (min {})",
            amount_in,
            asset_in,
            realized,
            asset_out,
            min_amount_out
        );
        Ok(realized)
    }

    fn log_price_impact(
        &self,
        ledger: &dyn TokenLedger,
        asset_in: Address,
        asset_out: Address,
        amount_in: Amount,
    ) {
        let Some(pair) = self.factory.get_pair(asset_in, asset_out) else {
            return;
        };
        let reserve_in = ledger.balance_of(asset_in, pair);
        let reserve_out = ledger.balance_of(asset_out, pair);
        match V2Math::calculate_price_impact(amount_in, reserve_in, reserve_out) {
            Ok(impact) => log_metrics!("Price impact {}% on pair {}", impact.round_dp(4), pair),
            Err(e) => debug!(%pair, error = %e, "Price impact unavailable"),
        }
    }
}
