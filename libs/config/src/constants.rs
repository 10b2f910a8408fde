//! Well-known addresses and protocol defaults
//!
//! Ethereum mainnet deployments the engine is configured against by default.

use flashloan_types::Address;

/// Protocol contract addresses
pub mod protocols {
    use super::Address;

    /// Aave V3 PoolAddressesProvider (resolves the active Pool)
    pub const AAVE_V3_POOL_ADDRESSES_PROVIDER: Address = Address::new([
        0x2f, 0x39, 0xd2, 0x18, 0x13, 0x3a, 0xfa, 0xb8, 0xf2, 0xb8, 0x19, 0xb1, 0x06, 0x6c, 0x7e,
        0x43, 0x4a, 0xd9, 0x4e, 0x9e,
    ]);

    /// Uniswap V2 Router02
    pub const UNISWAP_V2_ROUTER: Address = Address::new([
        0x7a, 0x25, 0x0d, 0x56, 0x30, 0xb4, 0xcf, 0x53, 0x97, 0x39, 0xdf, 0x2c, 0x5d, 0xac, 0xb4,
        0xc6, 0x59, 0xf2, 0x48, 0x8d,
    ]);

    /// Uniswap V2 Factory
    pub const UNISWAP_V2_FACTORY: Address = Address::new([
        0x5c, 0x69, 0xbe, 0xe7, 0x01, 0xef, 0x81, 0x4a, 0x2b, 0x6a, 0x3e, 0xdd, 0x4b, 0x16, 0x52,
        0xcb, 0x9c, 0xc5, 0xaa, 0x6f,
    ]);
}

/// Token addresses
pub mod tokens {
    use super::Address;

    /// DAI stablecoin (18 decimals)
    pub const DAI: Address = Address::new([
        0x6b, 0x17, 0x54, 0x74, 0xe8, 0x90, 0x94, 0xc4, 0x4d, 0xa9, 0x8b, 0x95, 0x4e, 0xed, 0xea,
        0xc4, 0x95, 0x27, 0x1d, 0x0f,
    ]);

    /// Large DAI holder used to pre-fund the engine in mainnet fork runs
    pub const DAI_WHALE: Address = Address::new([
        0xd1, 0x66, 0x8f, 0xb5, 0xf6, 0x90, 0xc5, 0x9a, 0xb4, 0xb0, 0xca, 0xba, 0xd0, 0xf8, 0xc1,
        0x61, 0x78, 0x95, 0x05, 0x2b,
    ]);

    /// One whole token at 18 decimals
    pub const ONE_TOKEN_18: u128 = 1_000_000_000_000_000_000;
}

/// Flash loan and swap defaults
pub mod defaults {
    /// Aave V3 flash loan premium (0.05%)
    pub const FLASH_LOAN_PREMIUM_BPS: u32 = 5;

    /// Uniswap V2 swap fee (0.3%)
    pub const SWAP_FEE_BPS: u32 = 30;

    /// Per-leg slippage tolerance for round-trip strategies (0.5%)
    pub const MAX_SLIPPAGE_BPS: u32 = 50;

    /// Environment variable prefix for configuration overrides
    pub const ENV_PREFIX: &str = "FLASHLOAN";
}
