//! # Flash Loan Engine
//!
//! ## Purpose
//!
//! Executes a flash loan as one atomic unit of work: request a loan from an
//! Aave V3 style lending pool, receive the pool's callback, run a strategy
//! with the borrowed funds through a Uniswap V2 style swap venue, and
//! authorize repayment of amount + premium before the callback returns. Any
//! failure discards every effect, including transfers already made.
//!
//! ## Integration Points
//!
//! - **Ledger**: `flashloan_ledger::Ledger` provides the all-or-nothing
//!   unit of work; protocols see it as `&mut dyn TokenLedger`
//! - **Protocols**: `protocols` capability traits for the pool registry,
//!   the pool, the swap router and the swap factory
//! - **Strategies**: `strategy::Strategy` implementations run inside the
//!   callback
//! - **Configuration**: `flashloan_config::EngineConfig` fixes the protocol
//!   addresses for the engine's lifetime
//!
//! ## Quick Start
//!
//! ```rust
//! use flashloan_config::constants::tokens::{DAI, ONE_TOKEN_18};
//! use flashloan_engine::testing::{accounts, Fixture};
//!
//! let mut fixture = Fixture::new().unwrap();
//! fixture.fund_pool(DAI, 1_000 * ONE_TOKEN_18).unwrap();
//! fixture.fund_engine(DAI, 100 * ONE_TOKEN_18).unwrap();
//!
//! let engine = fixture.engine.clone();
//! let receipt = engine
//!     .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 100 * ONE_TOKEN_18)
//!     .unwrap();
//!
//! // 0.05% of 100 DAI
//! assert_eq!(receipt.value.premium, ONE_TOKEN_18 / 20);
//! assert_eq!(fixture.engine_balance(DAI), 100 * ONE_TOKEN_18 - receipt.value.premium);
//! ```

pub mod adapters;
pub mod engine;
pub mod logging;
pub mod protocols;
pub mod strategy;
pub mod testing;

pub use engine::{FlashLoanEngine, LoanOutcome, LoanPhase};
pub use protocols::{
    FlashLoanReceiver, LendingPool, PoolAddressesProvider, Protocols, SwapFactory, SwapRouter,
};
pub use strategy::{PassThrough, RoundTripArbitrage, RoundTripParams, Strategy, StrategyContext};

pub use flashloan_ledger::{Effect, Ledger, Receipt, TokenLedger};
pub use flashloan_types::{Address, Amount, FlashLoanError, Result};
