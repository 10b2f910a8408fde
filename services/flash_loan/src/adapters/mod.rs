//! Adapters between the engine and the external protocols
//!
//! - `asset`: one asset held by one account
//! - `lending_pool`: registry-resolved Aave V3 style pool
//! - `swap_venue`: Uniswap V2 style router and factory

pub mod asset;
pub mod lending_pool;
pub mod swap_venue;

pub use asset::AssetLedgerAdapter;
pub use lending_pool::{flash_loan_premium, LendingPoolAdapter};
pub use swap_venue::SwapVenueAdapter;
