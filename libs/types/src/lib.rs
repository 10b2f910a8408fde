//! # Flash Loan Types
//!
//! Shared vocabulary for every crate in the workspace.
//!
//! ## Contents
//!
//! - **Addresses**: 20-byte account and token identifiers with hex text form
//! - **Amounts**: unsigned token base units with checked arithmetic helpers
//! - **Loan Records**: `LoanRequest`, `LoanCallback`, `StrategyResult`,
//!   `RepaymentAuthorization`
//! - **Errors**: the single `FlashLoanError` taxonomy every failure in a
//!   borrow → execute → repay sequence is reported through
//!
//! ## Quick Start
//!
//! ```rust
//! use flashloan_types::{Address, LoanCallback};
//!
//! let dai: Address = "0x6B175474E89094C44Da98b954EedeAC495271d0F".parse().unwrap();
//! let engine = Address::from_low_u64(1);
//!
//! let callback = LoanCallback::new(dai, 100, 1, engine, Vec::new());
//! assert_eq!(callback.repayment_due().unwrap(), 101);
//! ```

pub mod address;
pub mod errors;
pub mod loan;

pub use address::{Address, AddressError};
pub use errors::{FlashLoanError, Result};
pub use loan::{
    checked_add, checked_sub, Amount, LoanCallback, LoanRequest, RepaymentAuthorization,
    StrategyResult, BPS_DENOMINATOR,
};
