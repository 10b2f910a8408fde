//! Loan records exchanged between the engine, the lending pool and strategies
//!
//! None of these are persisted: a `LoanRequest` lives in the engine's phase
//! marker between request and callback, a `LoanCallback` exists for the
//! duration of the callback, and the rest are reported back inside the
//! committed receipt.

use crate::{Address, FlashLoanError, Result};
use serde::{Deserialize, Serialize};

/// Token amount in base units (18 decimals for DAI)
pub type Amount = u128;

/// Basis point denominator (10_000 = 100%)
pub const BPS_DENOMINATOR: Amount = 10_000;

#[inline]
pub fn checked_add(a: Amount, b: Amount, context: &'static str) -> Result<Amount> {
    a.checked_add(b)
        .ok_or(FlashLoanError::ArithmeticOverflow { context })
}

#[inline]
pub fn checked_sub(a: Amount, b: Amount, context: &'static str) -> Result<Amount> {
    a.checked_sub(b)
        .ok_or(FlashLoanError::ArithmeticOverflow { context })
}

/// Entry point invocation: who asked to borrow what
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub asset: Address,
    pub amount: Amount,
    pub initiator: Address,
}

/// What the lending pool hands the receiver alongside the borrowed funds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCallback {
    pub asset: Address,
    pub amount: Amount,
    /// Fee owed on top of `amount`
    pub premium: Amount,
    /// Account that called the pool's flash loan entry point
    pub initiator: Address,
    /// Opaque strategy parameters, passed through the pool untouched
    pub params: Vec<u8>,
}

impl LoanCallback {
    pub fn new(
        asset: Address,
        amount: Amount,
        premium: Amount,
        initiator: Address,
        params: Vec<u8>,
    ) -> Self {
        Self {
            asset,
            amount,
            premium,
            initiator,
            params,
        }
    }

    /// Exact repayment obligation: `amount + premium`
    pub fn repayment_due(&self) -> Result<Amount> {
        checked_add(self.amount, self.premium, "repayment due")
    }
}

/// Output of a strategy run, denominated in the borrowed asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub asset: Address,
    pub amount_obtained: Amount,
}

/// Approval that lets the pool pull `amount` of `asset` from the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentAuthorization {
    pub asset: Address,
    pub spender: Address,
    pub amount: Amount,
}
