//! Unit-of-work overlay
//!
//! Reads fall through to the committed `Ledger`; writes land in the overlay
//! and in an ordered effect journal. Nothing here can mutate the base.

use crate::state::{AllowanceKey, BalanceKey, Ledger};
use crate::{LedgerError, TokenLedger};
use flashloan_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Observable state change recorded by a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Transfer {
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approval {
        asset: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    },
}

/// Value returned by a committed unit of work plus everything it did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    pub value: T,
    pub effects: Vec<Effect>,
}

impl<T> Receipt<T> {
    pub fn transfers(&self) -> impl Iterator<Item = &Effect> {
        self.effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Transfer { .. }))
    }
}

pub(crate) struct PendingWrites {
    pub balances: HashMap<BalanceKey, Amount>,
    pub allowances: HashMap<AllowanceKey, Amount>,
    pub effects: Vec<Effect>,
}

pub struct Transaction<'a> {
    base: &'a Ledger,
    balances: HashMap<BalanceKey, Amount>,
    allowances: HashMap<AllowanceKey, Amount>,
    effects: Vec<Effect>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(base: &'a Ledger) -> Self {
        Self {
            base,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            effects: Vec::new(),
        }
    }

    /// Effects recorded so far, in execution order
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub(crate) fn into_pending(self) -> PendingWrites {
        PendingWrites {
            balances: self.balances,
            allowances: self.allowances,
            effects: self.effects,
        }
    }

    fn debit_credit(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if asset.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "asset" });
        }
        if from.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "sender" });
        }
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "recipient" });
        }

        let from_balance = self.balance_of(asset, from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                account: from,
                required: amount,
                available: from_balance,
            });
        }

        // Self-transfer still records the effect but leaves balances alone
        if from != to {
            let to_balance = self
                .balance_of(asset, to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow { asset, account: to })?;
            self.balances.insert((asset, from), from_balance - amount);
            self.balances.insert((asset, to), to_balance);
        }

        trace!(%asset, %from, %to, amount, "transfer");
        self.effects.push(Effect::Transfer {
            asset,
            from,
            to,
            amount,
        });
        Ok(())
    }
}

impl TokenLedger for Transaction<'_> {
    fn balance_of(&self, asset: Address, account: Address) -> Amount {
        self.balances
            .get(&(asset, account))
            .copied()
            .unwrap_or_else(|| self.base.balance_of(asset, account))
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or_else(|| self.base.allowance(asset, owner, spender))
    }

    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.debit_credit(asset, from, to, amount)
    }

    fn approve(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if asset.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "asset" });
        }
        if owner.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "owner" });
        }
        if spender.is_zero() {
            return Err(LedgerError::ZeroAddress { role: "spender" });
        }

        self.allowances.insert((asset, owner, spender), amount);
        trace!(%asset, %owner, %spender, amount, "approve");
        self.effects.push(Effect::Approval {
            asset,
            owner,
            spender,
            amount,
        });
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(asset, from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                required: amount,
                available: allowance,
            });
        }

        self.debit_credit(asset, from, to, amount)?;
        self.allowances
            .insert((asset, from, spender), allowance - amount);
        Ok(())
    }
}
