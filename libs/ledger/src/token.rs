//! Token ledger capability
//!
//! ERC20-shaped operations over every asset at once. The EVM's implicit
//! `msg.sender` is explicit here: callers pass their own address as `from`
//! (or `owner`, or `spender`). Object safe, so protocols take
//! `&mut dyn TokenLedger` and never see the concrete overlay.

use crate::LedgerError;
use flashloan_types::{Address, Amount};

pub trait TokenLedger {
    fn balance_of(&self, asset: Address, account: Address) -> Amount;

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Amount;

    /// Move `amount` from `from` to `to`
    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Set (not add to) the allowance `owner` grants `spender`
    fn approve(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Spend `spender`'s allowance to move `amount` from `from` to `to`
    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}
