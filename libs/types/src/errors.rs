//! Error taxonomy for the borrow → execute → repay sequence
//!
//! Every failure anywhere in a loan aborts the whole unit of work. There is
//! no local recovery, so a single flat enum is enough: the variant tells the
//! caller why nothing happened.

use crate::{Address, Amount};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlashLoanError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlashLoanError {
    /// Asset is the zero address or not listed by the lending pool
    #[error("Invalid asset {asset}")]
    InvalidAsset { asset: Address },

    /// Amount is zero or exceeds what the pool can lend
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Amount, reason: String },

    /// Entry point invoked by an account without permission
    #[error("Caller {caller} is not authorized")]
    UnauthorizedCaller { caller: Address },

    /// Callback invoked by someone other than the registered lending pool
    #[error("Callback from untrusted caller {caller}, expected {expected}")]
    UntrustedCaller { caller: Address, expected: Address },

    /// Callback that does not correspond to a loan this engine requested
    #[error("Unexpected flash loan callback: {reason}")]
    UnexpectedCallback { reason: String },

    /// Strategy left less than amount + premium in the engine
    #[error("Insufficient funds to repay flash loan: required {required}, available {available}")]
    InsufficientRepaymentFunds { required: Amount, available: Amount },

    /// Realized swap output fell below the minimum acceptable output
    #[error("Slippage exceeded: minimum output {min_amount_out}, actual {actual}")]
    SlippageExceeded { min_amount_out: Amount, actual: Amount },

    /// Token movement rejected by the ledger for a reason other than balance
    #[error("Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// Sender balance too low for a transfer
    #[error("Insufficient balance of {asset} for {account}: required {required}, available {available}")]
    InsufficientBalance {
        asset: Address,
        account: Address,
        required: Amount,
        available: Amount,
    },

    /// Pool or pair cannot supply the requested amount
    #[error("Insufficient liquidity for {asset}: requested {requested}, available {available}")]
    InsufficientLiquidity {
        asset: Address,
        requested: Amount,
        available: Amount,
    },

    /// Entry point called again while a loan is in flight
    #[error("Reentrant flash loan request detected")]
    ReentrancyDetected,

    /// Receiver callback reported failure without raising an error
    #[error("Flash loan receiver {receiver} rejected the operation")]
    CallbackRejected { receiver: Address },

    /// Swap factory has no pair for the requested route
    #[error("No swap route from {token_in} to {token_out}")]
    NoSwapRoute { token_in: Address, token_out: Address },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    /// Opaque strategy parameters could not be decoded
    #[error("Invalid strategy parameters: {reason}")]
    InvalidStrategyParams { reason: String },

    /// Engine constructed with inconsistent protocol wiring
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl FlashLoanError {
    pub fn invalid_amount(amount: Amount, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            amount,
            reason: reason.into(),
        }
    }

    pub fn unexpected_callback(reason: impl Into<String>) -> Self {
        Self::UnexpectedCallback {
            reason: reason.into(),
        }
    }

    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
