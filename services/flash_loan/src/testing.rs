//! In-memory protocol doubles and fixtures
//!
//! The mocks keep all funds in the shared `Ledger` under their own
//! addresses, so pool liquidity and pair reserves roll back together with
//! everything else when a unit of work is discarded.

use crate::adapters::flash_loan_premium;
use crate::engine::FlashLoanEngine;
use crate::protocols::{
    FlashLoanReceiver, LendingPool, PoolAddressesProvider, Protocols, SwapFactory, SwapRouter,
};
use crate::strategy::Strategy;
use flashloan_amm::{AmmPool, V2PoolState};
use flashloan_config::{constants, EngineConfig};
use flashloan_ledger::{Ledger, TokenLedger};
use flashloan_types::{Address, Amount, FlashLoanError, LoanCallback, Result};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Well-known fixture accounts
pub mod accounts {
    use flashloan_types::Address;

    pub const AAVE_POOL: Address = Address::new([
        0x87, 0x87, 0x0b, 0xca, 0x3f, 0x3f, 0xd6, 0x33, 0x5c, 0x3f, 0x4c, 0xe8, 0x39, 0x2d, 0x69,
        0x35, 0x0b, 0x4f, 0xa4, 0xe2,
    ]);

    pub fn engine() -> Address {
        Address::from_low_u64(0xe1)
    }

    pub fn owner() -> Address {
        Address::from_low_u64(0x0a)
    }

    pub fn user() -> Address {
        Address::from_low_u64(0x0b)
    }

    pub fn attacker() -> Address {
        Address::from_low_u64(0xbad)
    }

    pub fn weth() -> Address {
        Address::from_low_u64(0xeeee)
    }

    pub fn usdc() -> Address {
        Address::from_low_u64(0xcccc)
    }
}

/// Initialize tracing for tests (safe to call from every test)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashloan_engine=debug,warn".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Aave V3 style pool lending straight out of its ledger balance
pub struct MockLendingPool {
    address: Address,
    premium_bps: u32,
    listed: RwLock<HashSet<Address>>,
    /// Initiator reported to the receiver instead of the real one
    reported_initiator: RwLock<Option<Address>>,
}

impl MockLendingPool {
    pub fn new(address: Address, premium_bps: u32) -> Self {
        Self {
            address,
            premium_bps,
            listed: RwLock::new(HashSet::new()),
            reported_initiator: RwLock::new(None),
        }
    }

    pub fn list_asset(&self, asset: Address) {
        self.listed.write().insert(asset);
    }

    pub fn report_initiator(&self, initiator: Option<Address>) {
        *self.reported_initiator.write() = initiator;
    }

    fn is_listed(&self, asset: Address) -> bool {
        self.listed.read().contains(&asset)
    }
}

impl LendingPool for MockLendingPool {
    fn address(&self) -> Address {
        self.address
    }

    fn flash_loan_premium_bps(&self) -> u32 {
        self.premium_bps
    }

    fn available_liquidity(&self, ledger: &dyn TokenLedger, asset: Address) -> Option<Amount> {
        self.is_listed(asset)
            .then(|| ledger.balance_of(asset, self.address))
    }

    fn flash_loan_simple(
        &self,
        ledger: &mut dyn TokenLedger,
        initiator: Address,
        receiver: &dyn FlashLoanReceiver,
        asset: Address,
        amount: Amount,
        params: &[u8],
    ) -> Result<()> {
        if !self.is_listed(asset) {
            return Err(FlashLoanError::InvalidAsset { asset });
        }
        let available = ledger.balance_of(asset, self.address);
        if amount > available {
            return Err(FlashLoanError::InsufficientLiquidity {
                asset,
                requested: amount,
                available,
            });
        }

        let premium = flash_loan_premium(amount, self.premium_bps)?;
        ledger.transfer(asset, self.address, receiver.address(), amount)?;

        let initiator = self.reported_initiator.read().unwrap_or(initiator);
        let callback = LoanCallback::new(asset, amount, premium, initiator, params.to_vec());
        if !receiver.execute_operation(ledger, self.address, &callback)? {
            return Err(FlashLoanError::CallbackRejected {
                receiver: receiver.address(),
            });
        }

        let due = callback.repayment_due()?;
        ledger.transfer_from(asset, self.address, receiver.address(), self.address, due)?;
        debug!(%asset, amount, premium, "Mock pool collected repayment");
        Ok(())
    }
}

pub struct MockPoolAddressesProvider {
    address: Address,
    pool: RwLock<Arc<dyn LendingPool>>,
}

impl MockPoolAddressesProvider {
    pub fn new(address: Address, pool: Arc<dyn LendingPool>) -> Self {
        Self {
            address,
            pool: RwLock::new(pool),
        }
    }

    /// Point the registry at a different pool
    pub fn set_pool(&self, pool: Arc<dyn LendingPool>) {
        *self.pool.write() = pool;
    }
}

impl PoolAddressesProvider for MockPoolAddressesProvider {
    fn address(&self) -> Address {
        self.address
    }

    fn pool(&self) -> Arc<dyn LendingPool> {
        self.pool.read().clone()
    }
}

/// Uniswap V2 style pair registry
pub struct MockSwapFactory {
    address: Address,
    pairs: RwLock<HashMap<(Address, Address), Address>>,
}

impl MockSwapFactory {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pairs: RwLock::new(HashMap::new()),
        }
    }

    /// Register `pair` for both token orders
    pub fn create_pair(&self, token_a: Address, token_b: Address, pair: Address) {
        let mut pairs = self.pairs.write();
        pairs.insert((token_a, token_b), pair);
        pairs.insert((token_b, token_a), pair);
    }
}

impl SwapFactory for MockSwapFactory {
    fn address(&self) -> Address {
        self.address
    }

    fn get_pair(&self, token_a: Address, token_b: Address) -> Option<Address> {
        self.pairs.read().get(&(token_a, token_b)).copied()
    }
}

/// Runs inside every swap before any funds move
pub type SwapHook = Arc<dyn Fn(&mut dyn TokenLedger) -> Result<()> + Send + Sync>;

/// Uniswap V2 style router over constant product pairs
///
/// Reserves are the pairs' ledger balances.
pub struct MockSwapRouter {
    address: Address,
    factory: Arc<MockSwapFactory>,
    fee_bps: u32,
    /// Withheld from the final delivery, to model a fee-on-transfer token
    delivery_shortfall: RwLock<Amount>,
    hook: RwLock<Option<SwapHook>>,
}

impl MockSwapRouter {
    pub fn new(address: Address, factory: Arc<MockSwapFactory>, fee_bps: u32) -> Self {
        Self {
            address,
            factory,
            fee_bps,
            delivery_shortfall: RwLock::new(0),
            hook: RwLock::new(None),
        }
    }

    pub fn set_delivery_shortfall(&self, amount: Amount) {
        *self.delivery_shortfall.write() = amount;
    }

    pub fn set_hook(&self, hook: SwapHook) {
        *self.hook.write() = Some(hook);
    }

    fn pair_for(&self, token_in: Address, token_out: Address) -> Result<Address> {
        self.factory
            .get_pair(token_in, token_out)
            .ok_or(FlashLoanError::NoSwapRoute { token_in, token_out })
    }
}

impl SwapRouter for MockSwapRouter {
    fn address(&self) -> Address {
        self.address
    }

    fn factory(&self) -> Address {
        self.factory.address()
    }

    fn get_amounts_out(
        &self,
        ledger: &dyn TokenLedger,
        amount_in: Amount,
        path: &[Address],
    ) -> Result<Vec<Amount>> {
        if path.len() < 2 {
            return Err(FlashLoanError::invalid_amount(amount_in, "swap path needs two tokens"));
        }
        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        let mut current = amount_in;
        for hop in path.windows(2) {
            let pair = self.pair_for(hop[0], hop[1])?;
            let state = V2PoolState {
                reserve_in: ledger.balance_of(hop[0], pair),
                reserve_out: ledger.balance_of(hop[1], pair),
                fee_bps: self.fee_bps,
            };
            current = state
                .get_amount_out(current)
                .map_err(|e| e.into_flash_loan_error(hop[1], current))?;
            amounts.push(current);
        }
        Ok(amounts)
    }

    fn swap_exact_tokens_for_tokens(
        &self,
        ledger: &mut dyn TokenLedger,
        caller: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: Address,
    ) -> Result<Vec<Amount>> {
        let hook = self.hook.read().clone();
        if let Some(hook) = hook {
            (hook.as_ref())(&mut *ledger)?;
        }

        let amounts = self.get_amounts_out(&*ledger, amount_in, path)?;
        let amount_out = amounts.last().copied().unwrap_or(0);
        if amount_out < amount_out_min {
            return Err(FlashLoanError::SlippageExceeded {
                min_amount_out: amount_out_min,
                actual: amount_out,
            });
        }

        let first_pair = self.pair_for(path[0], path[1])?;
        ledger.transfer_from(path[0], self.address, caller, first_pair, amount_in)?;

        let hops = path.len() - 1;
        for i in 0..hops {
            let pair = self.pair_for(path[i], path[i + 1])?;
            let mut out = amounts[i + 1];
            let recipient = if i + 1 < hops {
                self.pair_for(path[i + 1], path[i + 2])?
            } else {
                out = out.saturating_sub(*self.delivery_shortfall.read());
                to
            };
            ledger.transfer(path[i + 1], pair, recipient, out)?;
        }
        debug!(amount_in, amount_out, hops, "Mock router swap");
        Ok(amounts)
    }
}

/// Engine wired to mock protocols at the default (mainnet) addresses
pub struct Fixture {
    pub ledger: Ledger,
    pub pool: Arc<MockLendingPool>,
    pub provider: Arc<MockPoolAddressesProvider>,
    pub factory: Arc<MockSwapFactory>,
    pub router: Arc<MockSwapRouter>,
    pub engine: Arc<FlashLoanEngine>,
}

impl Fixture {
    /// Default config, pass-through strategy, DAI listed with no liquidity
    pub fn new() -> Result<Self> {
        let config = EngineConfig::default();
        let strategy = crate::strategy::from_config(&config.strategy)?;
        Self::with_config(config, strategy)
    }

    pub fn with_config(config: EngineConfig, strategy: Box<dyn Strategy>) -> Result<Self> {
        let pool = Arc::new(MockLendingPool::new(
            accounts::AAVE_POOL,
            constants::defaults::FLASH_LOAN_PREMIUM_BPS,
        ));
        pool.list_asset(constants::tokens::DAI);

        let provider = Arc::new(MockPoolAddressesProvider::new(
            config.lending_pool_provider,
            pool.clone(),
        ));
        let factory = Arc::new(MockSwapFactory::new(config.swap_factory));
        let router = Arc::new(MockSwapRouter::new(
            config.swap_router,
            factory.clone(),
            constants::defaults::SWAP_FEE_BPS,
        ));

        let protocols = Protocols::new(provider.clone(), router.clone(), factory.clone());
        let engine = Arc::new(FlashLoanEngine::new(
            accounts::engine(),
            accounts::owner(),
            config,
            protocols,
            strategy,
        )?);

        Ok(Self {
            ledger: Ledger::new(),
            pool,
            provider,
            factory,
            router,
            engine,
        })
    }

    pub fn fund(&mut self, asset: Address, account: Address, amount: Amount) -> Result<()> {
        self.ledger.mint(asset, account, amount)?;
        Ok(())
    }

    /// Seed the pool with lendable `asset` (listing it if needed)
    pub fn fund_pool(&mut self, asset: Address, amount: Amount) -> Result<()> {
        self.pool.list_asset(asset);
        self.fund(asset, accounts::AAVE_POOL, amount)
    }

    pub fn fund_engine(&mut self, asset: Address, amount: Amount) -> Result<()> {
        self.fund(asset, accounts::engine(), amount)
    }

    /// Create a pair at `pair` holding the given reserves
    pub fn add_pair(
        &mut self,
        pair: Address,
        token_a: Address,
        reserve_a: Amount,
        token_b: Address,
        reserve_b: Amount,
    ) -> Result<()> {
        self.factory.create_pair(token_a, token_b, pair);
        self.fund(token_a, pair, reserve_a)?;
        self.fund(token_b, pair, reserve_b)
    }

    pub fn balance(&self, asset: Address, account: Address) -> Amount {
        self.ledger.balance_of(asset, account)
    }

    pub fn engine_balance(&self, asset: Address) -> Amount {
        self.engine.balance_of(&self.ledger, asset)
    }

    pub fn pool_balance(&self, asset: Address) -> Amount {
        self.balance(asset, accounts::AAVE_POOL)
    }
}
