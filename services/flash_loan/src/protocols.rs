//! External protocol capabilities
//!
//! The engine never talks to a concrete lending pool or swap venue. It sees
//! these traits, shaped after Aave V3 (`IPoolAddressesProvider`, `IPool`,
//! `IFlashLoanSimpleReceiver`) and Uniswap V2 (`IUniswapV2Router02`,
//! `IUniswapV2Factory`). Every call that moves funds receives the unit of
//! work's `TokenLedger` and the address the call is made from.

use flashloan_ledger::TokenLedger;
use flashloan_types::{Address, Amount, LoanCallback, Result};
use std::sync::Arc;

/// Registry resolving the active lending pool
pub trait PoolAddressesProvider: Send + Sync {
    fn address(&self) -> Address;

    fn pool(&self) -> Arc<dyn LendingPool>;
}

pub trait LendingPool: Send + Sync {
    fn address(&self) -> Address;

    /// Flash loan fee in basis points of the borrowed amount
    fn flash_loan_premium_bps(&self) -> u32;

    /// How much of `asset` the pool can lend right now, `None` if unlisted
    fn available_liquidity(&self, ledger: &dyn TokenLedger, asset: Address) -> Option<Amount>;

    /// Lend `amount` of `asset` to `receiver` for the duration of one callback
    ///
    /// Transfers the funds, invokes `receiver.execute_operation` with
    /// `initiator` and `params`, then pulls back `amount + premium`. Returns
    /// only after the callback has completed.
    fn flash_loan_simple(
        &self,
        ledger: &mut dyn TokenLedger,
        initiator: Address,
        receiver: &dyn FlashLoanReceiver,
        asset: Address,
        amount: Amount,
        params: &[u8],
    ) -> Result<()>;
}

/// Contract the lending pool calls back into
pub trait FlashLoanReceiver: Send + Sync {
    fn address(&self) -> Address;

    /// Handle borrowed funds; `Ok(true)` means repayment is authorized
    fn execute_operation(
        &self,
        ledger: &mut dyn TokenLedger,
        caller: Address,
        callback: &LoanCallback,
    ) -> Result<bool>;
}

pub trait SwapFactory: Send + Sync {
    fn address(&self) -> Address;

    /// Pair contract trading `token_a` against `token_b`, in either order
    fn get_pair(&self, token_a: Address, token_b: Address) -> Option<Address>;
}

pub trait SwapRouter: Send + Sync {
    fn address(&self) -> Address;

    /// Factory whose pairs this router trades through
    fn factory(&self) -> Address;

    /// Output at every hop of `path` for `amount_in`, first element is `amount_in`
    fn get_amounts_out(
        &self,
        ledger: &dyn TokenLedger,
        amount_in: Amount,
        path: &[Address],
    ) -> Result<Vec<Amount>>;

    /// Swap exactly `amount_in` of `path[0]` for at least `amount_out_min` of
    /// the last token in `path`, delivered to `to`
    ///
    /// Pulls the input from `caller` with `transfer_from`, so `caller` must
    /// have approved the router beforehand.
    fn swap_exact_tokens_for_tokens(
        &self,
        ledger: &mut dyn TokenLedger,
        caller: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: Address,
    ) -> Result<Vec<Amount>>;
}

/// The three external protocols an engine is wired to
#[derive(Clone)]
pub struct Protocols {
    pub pool_provider: Arc<dyn PoolAddressesProvider>,
    pub swap_router: Arc<dyn SwapRouter>,
    pub swap_factory: Arc<dyn SwapFactory>,
}

impl Protocols {
    pub fn new(
        pool_provider: Arc<dyn PoolAddressesProvider>,
        swap_router: Arc<dyn SwapRouter>,
        swap_factory: Arc<dyn SwapFactory>,
    ) -> Self {
        Self {
            pool_provider,
            swap_router,
            swap_factory,
        }
    }
}
