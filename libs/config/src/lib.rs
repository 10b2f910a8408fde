//! # Flash Loan Engine Configuration
//!
//! Configuration loading and well-known constants for the flash loan engine.
//!
//! ## Features
//!
//! - **Protocol Constants**: Aave V3 registry, Uniswap V2 router/factory and
//!   DAI addresses on Ethereum mainnet
//! - **Engine Configuration**: protocol addresses, access control, strategy
//!   selection and settlement policy, loaded from TOML with `FLASHLOAN__*`
//!   environment overrides
//!
//! ## Usage
//!
//! ```rust
//! use flashloan_config::{constants, EngineConfig};
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.lending_pool_provider, constants::protocols::AAVE_V3_POOL_ADDRESSES_PROVIDER);
//! assert!(config.validate().is_ok());
//! ```

pub mod constants;
pub mod engine_config;

pub use engine_config::{
    load_config, AccessConfig, EngineConfig, SettlementConfig, StrategyConfig, StrategyKind,
};
