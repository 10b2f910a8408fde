//! Committed ledger state
//!
//! `Ledger` only changes through `mint` (genesis funding) and `transact`.
//! Zero entries are pruned on commit so two ledgers holding the same
//! balances compare equal regardless of history.

use crate::transaction::{PendingWrites, Receipt, Transaction};
use crate::LedgerError;
use flashloan_types::{Address, Amount};
use std::collections::HashMap;
use tracing::debug;

pub(crate) type BalanceKey = (Address, Address);
pub(crate) type AllowanceKey = (Address, Address, Address);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// (asset, account) → balance
    balances: HashMap<BalanceKey, Amount>,
    /// (asset, owner, spender) → allowance
    allowances: HashMap<AllowanceKey, Amount>,
    /// Total minted per asset
    supplies: HashMap<Address, Amount>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, asset: Address, account: Address) -> Amount {
        self.balances.get(&(asset, account)).copied().unwrap_or(0)
    }

    pub fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self, asset: Address) -> Amount {
        self.supplies.get(&asset).copied().unwrap_or(0)
    }

    /// Create `amount` of `asset` out of thin air for `to`
    ///
    /// Genesis funding for fixtures; never reachable from a unit of work.
    pub fn mint(&mut self, asset: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        if asset.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "asset" });
        }
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "recipient" });
        }
        let supply = self
            .total_supply(asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { asset, account: to })?;
        let balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { asset, account: to })?;

        self.supplies.insert(asset, supply);
        self.balances.insert((asset, to), balance);
        Ok(())
    }

    /// Single transfer wrapped in its own unit of work
    pub fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Receipt<()>, LedgerError> {
        self.transact(|tx| {
            use crate::TokenLedger;
            tx.transfer(asset, from, to, amount)
        })
    }

    /// Run `f` as one all-or-nothing unit of work
    ///
    /// Every write `f` performs lands in a `Transaction` overlay. `Ok`
    /// commits the overlay and returns the value with the ordered effect
    /// journal; `Err` drops the overlay and leaves `self` exactly as it was.
    pub fn transact<T, E, F>(&mut self, f: F) -> Result<Receipt<T>, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
    {
        let (value, pending) = {
            let mut tx = Transaction::new(self);
            match f(&mut tx) {
                Ok(value) => (value, tx.into_pending()),
                Err(error) => {
                    debug!(
                        discarded_effects = tx.effects().len(),
                        "Unit of work failed, discarding overlay"
                    );
                    return Err(error);
                }
            }
        };

        let effects = self.apply(pending);
        debug!(committed_effects = effects.len(), "Unit of work committed");
        Ok(Receipt { value, effects })
    }

    fn apply(&mut self, pending: PendingWrites) -> Vec<crate::Effect> {
        for (key, balance) in pending.balances {
            if balance == 0 {
                self.balances.remove(&key);
            } else {
                self.balances.insert(key, balance);
            }
        }
        for (key, allowance) in pending.allowances {
            if allowance == 0 {
                self.allowances.remove(&key);
            } else {
                self.allowances.insert(key, allowance);
            }
        }
        pending.effects
    }
}
