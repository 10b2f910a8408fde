//! # Flash Loan AMM Library - Constant Product Swap Math
//!
//! ## Purpose
//!
//! Exact Uniswap V2 arithmetic for the swap venue: integer `get_amount_out`
//! and `get_amount_in` matching the router's on-chain rounding, multi-hop
//! quoting along a path of pools, and `Decimal` price-impact diagnostics for
//! logging.
//!
//! ## Integration Points
//!
//! - **Swap Venue Adapter**: price impact diagnostics on every quote
//! - **Reference Venue**: settlement math for constant product pairs
//! - **Strategies**: minimum-output bounds derived from quotes
//!
//! Settlement math never touches floating point or `Decimal`; `Decimal` only
//! feeds log lines.

pub mod pool_traits;
pub mod v2_math;

pub use pool_traits::AmmPool;
pub use v2_math::{AmmError, V2Math, V2PoolState};

pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
