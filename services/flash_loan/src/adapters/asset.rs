//! Asset Ledger Adapter
//!
//! One fungible asset seen from one holder. Thin wrapper over
//! `TokenLedger` with no business logic; failures come back as
//! `InsufficientBalance` or `TransferFailed`.

use flashloan_ledger::TokenLedger;
use flashloan_types::{Address, Amount, Result};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetLedgerAdapter {
    asset: Address,
    holder: Address,
}

impl AssetLedgerAdapter {
    pub fn new(asset: Address, holder: Address) -> Self {
        Self { asset, holder }
    }

    pub fn asset(&self) -> Address {
        self.asset
    }

    pub fn holder(&self) -> Address {
        self.holder
    }

    pub fn balance_of(&self, ledger: &dyn TokenLedger, account: Address) -> Amount {
        ledger.balance_of(self.asset, account)
    }

    /// The holder's own balance
    pub fn holding(&self, ledger: &dyn TokenLedger) -> Amount {
        self.balance_of(ledger, self.holder)
    }

    pub fn transfer(
        &self,
        ledger: &mut dyn TokenLedger,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        trace!(asset = %self.asset, from = %self.holder, %to, amount, "Asset transfer");
        ledger.transfer(self.asset, self.holder, to, amount)?;
        Ok(())
    }

    /// Set the allowance `spender` may pull from the holder
    pub fn approve(
        &self,
        ledger: &mut dyn TokenLedger,
        spender: Address,
        amount: Amount,
    ) -> Result<()> {
        trace!(asset = %self.asset, owner = %self.holder, %spender, amount, "Asset approval");
        ledger.approve(self.asset, self.holder, spender, amount)?;
        Ok(())
    }

    pub fn allowance(&self, ledger: &dyn TokenLedger, spender: Address) -> Amount {
        ledger.allowance(self.asset, self.holder, spender)
    }
}
