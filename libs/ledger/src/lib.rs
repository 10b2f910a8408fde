//! # Flash Loan Ledger - Journaled Token State
//!
//! ## Purpose
//!
//! In-memory fungible token ledger (balances and allowances for any number of
//! assets) whose only write path is a unit of work: effects accumulate in a
//! `Transaction` overlay and are committed as a whole, or dropped as a whole.
//! This is the transactional boundary that makes a flash loan atomic.
//!
//! ## Architecture Role
//!
//! ```text
//! Ledger::transact(|tx| ...)
//!       ↓
//! Transaction overlay ← TokenLedger calls from engine, pool, swap venue
//!       ↓
//! Ok(value)  → pending writes applied, Receipt { value, effects }
//! Err(error) → overlay dropped, committed state untouched
//! ```
//!
//! Protocol balances (pool liquidity, pair reserves) live in the same
//! ledger under the protocol's own address, so discarding the overlay also
//! rewinds every swap and loan disbursement.

pub mod error;
pub mod state;
pub mod token;
pub mod transaction;

pub use error::LedgerError;
pub use state::Ledger;
pub use token::TokenLedger;
pub use transaction::{Effect, Receipt, Transaction};
