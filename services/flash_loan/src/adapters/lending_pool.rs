//! Lending Pool Adapter
//!
//! Resolves the active pool through the addresses provider on every call,
//! the way Aave integrations read `ADDRESSES_PROVIDER.getPool()`, and hides
//! the pool trait behind three operations the engine needs.

use crate::protocols::{FlashLoanReceiver, LendingPool, PoolAddressesProvider};
use flashloan_ledger::TokenLedger;
use flashloan_types::{Address, Amount, FlashLoanError, Result, BPS_DENOMINATOR};
use std::sync::Arc;
use tracing::debug;

/// Aave V3 flash loan premium: `amount * bps / 10_000`, rounded half up
pub fn flash_loan_premium(amount: Amount, premium_bps: u32) -> Result<Amount> {
    let scaled = amount
        .checked_mul(Amount::from(premium_bps))
        .and_then(|value| value.checked_add(BPS_DENOMINATOR / 2))
        .ok_or(FlashLoanError::ArithmeticOverflow {
            context: "flash loan premium",
        })?;
    Ok(scaled / BPS_DENOMINATOR)
}

#[derive(Clone)]
pub struct LendingPoolAdapter {
    provider: Arc<dyn PoolAddressesProvider>,
}

impl LendingPoolAdapter {
    pub fn new(provider: Arc<dyn PoolAddressesProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_address(&self) -> Address {
        self.provider.address()
    }

    pub fn pool(&self) -> Arc<dyn LendingPool> {
        self.provider.pool()
    }

    pub fn pool_address(&self) -> Address {
        self.pool().address()
    }

    /// Lendable amount of `asset`, `None` when the pool does not list it
    pub fn available_liquidity(&self, ledger: &dyn TokenLedger, asset: Address) -> Option<Amount> {
        self.pool().available_liquidity(ledger, asset)
    }

    pub fn premium_for(&self, amount: Amount) -> Result<Amount> {
        flash_loan_premium(amount, self.pool().flash_loan_premium_bps())
    }

    /// Borrow `amount` of `asset` on behalf of `receiver`
    ///
    /// `receiver` is also the initiator. Returns after the pool has run the
    /// callback and collected repayment; pool failures surface unchanged.
    pub fn initiate(
        &self,
        ledger: &mut dyn TokenLedger,
        receiver: &dyn FlashLoanReceiver,
        asset: Address,
        amount: Amount,
        params: &[u8],
    ) -> Result<()> {
        let pool = self.pool();
        debug!(
            pool = %pool.address(),
            %asset,
            amount,
            params_len = params.len(),
            "Initiating flashLoanSimple"
        );
        pool.flash_loan_simple(ledger, receiver.address(), receiver, asset, amount, params)
    }
}
