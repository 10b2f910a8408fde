//! Engine Configuration Module
//!
//! Loads the flash loan engine's configuration from a TOML file layered
//! under `FLASHLOAN__*` environment variable overrides, e.g.
//! `FLASHLOAN__SETTLEMENT__SWEEP_PROFIT_TO_INITIATOR=true`.
//!
//! Configuration is immutable once an engine is built from it.

use crate::constants::{defaults, protocols};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use flashloan_types::{Address, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Registry that resolves the active lending pool
    pub lending_pool_provider: Address,
    /// Swap venue router
    pub swap_router: Address,
    /// Swap venue pair factory
    pub swap_factory: Address,
    pub access: AccessConfig,
    pub strategy: StrategyConfig,
    pub settlement: SettlementConfig,
}

/// Who may invoke the loan entry point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// When false (default) any account may request a loan
    pub restricted: bool,
    /// Accounts besides the owner allowed in when restricted
    pub allowed_callers: Vec<Address>,
}

/// Which strategy runs inside the callback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Hold the borrowed funds and repay
    #[default]
    PassThrough,
    /// Borrowed asset → intermediate asset → borrowed asset
    RoundTrip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    /// Intermediate asset for round trips
    pub intermediate_asset: Option<Address>,
    /// Per-leg slippage tolerance in basis points (e.g., 50 = 0.5%)
    pub max_slippage_bps: u32,
}

/// What happens to funds above the pre-loan balance after repayment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Forward profit to the loan initiator instead of keeping it
    pub sweep_profit_to_initiator: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lending_pool_provider: protocols::AAVE_V3_POOL_ADDRESSES_PROVIDER,
            swap_router: protocols::UNISWAP_V2_ROUTER,
            swap_factory: protocols::UNISWAP_V2_FACTORY,
            access: AccessConfig::default(),
            strategy: StrategyConfig::default(),
            settlement: SettlementConfig::default(),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::PassThrough,
            intermediate_asset: None,
            max_slippage_bps: defaults::MAX_SLIPPAGE_BPS,
        }
    }
}

impl EngineConfig {
    /// Build a configuration around explicit protocol addresses
    pub fn with_protocols(
        lending_pool_provider: Address,
        swap_router: Address,
        swap_factory: Address,
    ) -> Self {
        Self {
            lending_pool_provider,
            swap_router,
            swap_factory,
            ..Self::default()
        }
    }

    /// Load from `path` with `FLASHLOAN__*` environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env_prefix(path, defaults::ENV_PREFIX)
    }

    /// Load from `path` with `<prefix>__*` environment overrides
    pub fn load_with_env_prefix(path: &Path, env_prefix: &str) -> Result<Self> {
        info!("Loading engine config: {:?}", path);

        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let engine_config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        engine_config.validate()?;
        debug!(?engine_config, "Engine config loaded");
        Ok(engine_config)
    }

    /// Parse a TOML document without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let engine_config: Self =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        engine_config.validate()?;
        Ok(engine_config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let protocols = [
            ("lending_pool_provider", self.lending_pool_provider),
            ("swap_router", self.swap_router),
            ("swap_factory", self.swap_factory),
        ];
        for (name, address) in protocols {
            if address.is_zero() {
                bail!("{} must be a non-zero address", name);
            }
        }
        if self.swap_router == self.swap_factory {
            bail!("swap_router and swap_factory must be distinct contracts");
        }

        if self.access.allowed_callers.iter().any(Address::is_zero) {
            bail!("access.allowed_callers must not contain the zero address");
        }

        if u128::from(self.strategy.max_slippage_bps) >= BPS_DENOMINATOR {
            bail!(
                "strategy.max_slippage_bps must be below {}, got {}",
                BPS_DENOMINATOR,
                self.strategy.max_slippage_bps
            );
        }
        if self.strategy.kind == StrategyKind::RoundTrip {
            match self.strategy.intermediate_asset {
                Some(asset) if !asset.is_zero() => {}
                _ => bail!("round_trip strategy requires a non-zero intermediate_asset"),
            }
        }

        Ok(())
    }

    /// Whether `caller` may invoke the entry point of an engine owned by `owner`
    pub fn is_caller_allowed(&self, caller: Address, owner: Address) -> bool {
        !self.access.restricted || caller == owner || self.access.allowed_callers.contains(&caller)
    }
}

/// Convenience function to load configuration from a file path
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
    EngineConfig::load(path.as_ref())
}
