//! # Flash Loan Engine - Atomic Borrow, Execute, Repay
//!
//! ## Purpose
//!
//! Borrows an asset from a lending pool, runs a strategy with the borrowed
//! funds through a swap venue, and authorizes repayment of amount + premium
//! before control returns to the pool. The whole sequence is one unit of
//! work on the ledger: it commits as a whole or leaves no trace.
//!
//! ## Architecture Role
//!
//! ```text
//! request_flash_loan ──► validate ──► Requested ──► pool.flash_loan_simple
//!                                                          │
//!        execute_operation ◄──────── callback ─────────────┘
//!               │
//!        Executing ──► strategy ──► balance ≥ due? ──► approve pool
//!               │
//!        pool pulls amount + premium ──► sweep profit? ──► Idle
//! ```
//!
//! ## Phase Marker
//!
//! The only state held across the pool round trip is a `LoanPhase` behind a
//! `parking_lot::Mutex`. The lock is never held across an external call.
//! The entry point claims the marker before anything else (a second claim
//! fails with `ReentrancyDetected`) and a guard returns it to `Idle` on every
//! exit path. The callback turns `Requested` into `Executing` on entry,
//! whatever happens next, so a request can be satisfied at most once.

use crate::adapters::{AssetLedgerAdapter, LendingPoolAdapter, SwapVenueAdapter};
use crate::protocols::{FlashLoanReceiver, Protocols};
use crate::strategy::{Strategy, StrategyContext};
use crate::{log_callback, log_error, log_guard, log_loan, log_profit, log_repay, log_success};
use flashloan_config::EngineConfig;
use flashloan_ledger::{Ledger, Receipt, TokenLedger};
use flashloan_types::{
    Address, Amount, FlashLoanError, LoanCallback, LoanRequest,
    RepaymentAuthorization, Result, StrategyResult,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where the engine is in the borrow → execute → repay sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoanPhase {
    #[default]
    Idle,
    /// Loan requested from the pool, callback not yet received
    Requested(LoanRequest),
    /// Callback in progress
    Executing(LoanRequest),
}

/// What a committed loan did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOutcome {
    pub request: LoanRequest,
    pub premium: Amount,
    pub strategy: StrategyResult,
    pub repayment: RepaymentAuthorization,
    /// Amount forwarded to the initiator after repayment
    pub profit_swept: Amount,
}

/// Callback results handed back to the entry point
#[derive(Debug, Clone, Copy)]
struct CallbackReport {
    premium: Amount,
    strategy: StrategyResult,
    repayment: RepaymentAuthorization,
}

/// Returns the phase marker to `Idle` when dropped
struct PhaseGuard<'a> {
    phase: &'a Mutex<LoanPhase>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase.lock() = LoanPhase::Idle;
    }
}

pub struct FlashLoanEngine {
    address: Address,
    owner: Address,
    config: EngineConfig,
    lending_pool: LendingPoolAdapter,
    swap_venue: SwapVenueAdapter,
    strategy: Box<dyn Strategy>,
    phase: Mutex<LoanPhase>,
    report: Mutex<Option<CallbackReport>>,
}

impl FlashLoanEngine {
    /// Wire an engine at `address` to the protocols named in `config`
    ///
    /// Each protocol object must sit at its configured, non-zero address.
    pub fn new(
        address: Address,
        owner: Address,
        config: EngineConfig,
        protocols: Protocols,
        strategy: Box<dyn Strategy>,
    ) -> Result<Self> {
        if address.is_zero() {
            return Err(FlashLoanError::invalid_configuration(
                "engine address is the zero address",
            ));
        }
        if owner.is_zero() {
            return Err(FlashLoanError::invalid_configuration(
                "owner is the zero address",
            ));
        }

        let wired = [
            (
                "lending pool provider",
                config.lending_pool_provider,
                protocols.pool_provider.address(),
            ),
            (
                "swap router",
                config.swap_router,
                protocols.swap_router.address(),
            ),
            (
                "swap factory",
                config.swap_factory,
                protocols.swap_factory.address(),
            ),
        ];
        for (name, configured, actual) in wired {
            if configured.is_zero() {
                return Err(FlashLoanError::invalid_configuration(format!(
                    "{name} address is the zero address"
                )));
            }
            if configured != actual {
                return Err(FlashLoanError::invalid_configuration(format!(
                    "{name} is configured as {configured} but wired to {actual}"
                )));
            }
        }

        let swap_venue =
            SwapVenueAdapter::new(protocols.swap_router, protocols.swap_factory, address)?;

        info!(
            engine = %address,
            %owner,
            provider = %config.lending_pool_provider,
            router = %config.swap_router,
            strategy = strategy.name(),
            "Flash loan engine initialized"
        );

        Ok(Self {
            address,
            owner,
            config,
            lending_pool: LendingPoolAdapter::new(protocols.pool_provider),
            swap_venue,
            strategy,
            phase: Mutex::new(LoanPhase::Idle),
            report: Mutex::new(None),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Current phase marker, for diagnostics
    pub fn phase(&self) -> LoanPhase {
        *self.phase.lock()
    }

    /// Engine holding of `asset` in committed state
    pub fn balance_of(&self, ledger: &Ledger, asset: Address) -> Amount {
        ledger.balance_of(asset, self.address)
    }

    /// Borrow `amount` of `asset`, run the strategy, repay, all or nothing
    pub fn request_flash_loan(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        asset: Address,
        amount: Amount,
    ) -> Result<Receipt<LoanOutcome>> {
        self.request_flash_loan_with_params(ledger, caller, asset, amount, &[])
    }

    /// `request_flash_loan` with explicit strategy parameters
    pub fn request_flash_loan_with_params(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        asset: Address,
        amount: Amount,
        params: &[u8],
    ) -> Result<Receipt<LoanOutcome>> {
        let result = ledger.transact(|tx| self.execute_request(tx, caller, asset, amount, params));

        match &result {
            Ok(receipt) => log_success!(
                "Flash loan of {} {} settled: premium {}, {} effects committed",
                amount,
                asset,
                receipt.value.premium,
                receipt.effects.len()
            ),
            Err(e) => log_error!("Flash loan of {} {} discarded: {}", amount, asset, e),
        }
        result
    }

    /// Run the request sequence inside an already open unit of work
    ///
    /// Commit or rollback is the caller's business. This is also the path a
    /// nested call from inside a callback takes.
    pub fn execute_request(
        &self,
        ledger: &mut dyn TokenLedger,
        caller: Address,
        asset: Address,
        amount: Amount,
        params: &[u8],
    ) -> Result<LoanOutcome> {
        let request = LoanRequest {
            asset,
            amount,
            initiator: caller,
        };
        let _guard = self.claim(request)?;

        self.validate_request(&*ledger, &request)?;

        let holding = AssetLedgerAdapter::new(asset, self.address);
        let balance_before = holding.holding(&*ledger);

        log_loan!(
            "Requesting flash loan of {} {} for {} from pool {}",
            amount,
            asset,
            caller,
            self.lending_pool.pool_address()
        );
        self.report.lock().take();
        self.lending_pool.initiate(ledger, self, asset, amount, params)?;

        let report = self.report.lock().take().ok_or_else(|| {
            FlashLoanError::unexpected_callback("lending pool returned without calling back")
        })?;

        let balance_after = holding.holding(&*ledger);
        let profit = balance_after.saturating_sub(balance_before);
        let mut profit_swept = 0;
        if self.config.settlement.sweep_profit_to_initiator && profit > 0 && caller != self.address
        {
            holding.transfer(ledger, caller, profit)?;
            profit_swept = profit;
            log_profit!("Swept {} {} profit to {}", profit, asset, caller);
        }

        Ok(LoanOutcome {
            request,
            premium: report.premium,
            strategy: report.strategy,
            repayment: report.repayment,
            profit_swept,
        })
    }

    /// Owner-only sweep of the engine's entire `asset` holding to `to`
    pub fn withdraw(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        asset: Address,
        to: Address,
    ) -> Result<Receipt<Amount>> {
        if caller != self.owner {
            log_guard!("Withdrawal by non-owner {} refused", caller);
            return Err(FlashLoanError::UnauthorizedCaller { caller });
        }
        if asset.is_zero() {
            return Err(FlashLoanError::InvalidAsset { asset });
        }

        ledger.transact(|tx| {
            let holding = AssetLedgerAdapter::new(asset, self.address);
            let amount = holding.holding(&*tx);
            if amount > 0 {
                holding.transfer(tx, to, amount)?;
            }
            info!(%asset, %to, amount, "Engine funds withdrawn");
            Ok(amount)
        })
    }

    /// Take the marker for `request`, failing if a loan is already in flight
    fn claim(&self, request: LoanRequest) -> Result<PhaseGuard<'_>> {
        let mut phase = self.phase.lock();
        if *phase != LoanPhase::Idle {
            log_guard!("Reentrant flash loan request while {:?}", *phase);
            return Err(FlashLoanError::ReentrancyDetected);
        }
        *phase = LoanPhase::Requested(request);
        Ok(PhaseGuard { phase: &self.phase })
    }

    fn validate_request(&self, ledger: &dyn TokenLedger, request: &LoanRequest) -> Result<()> {
        if !self.config.is_caller_allowed(request.initiator, self.owner) {
            log_guard!("Flash loan request by unauthorized {}", request.initiator);
            return Err(FlashLoanError::UnauthorizedCaller {
                caller: request.initiator,
            });
        }

        if request.asset.is_zero() {
            return Err(FlashLoanError::InvalidAsset {
                asset: request.asset,
            });
        }
        let available = self
            .lending_pool
            .available_liquidity(ledger, request.asset)
            .ok_or(FlashLoanError::InvalidAsset {
                asset: request.asset,
            })?;

        if request.amount == 0 {
            return Err(FlashLoanError::invalid_amount(
                request.amount,
                "amount must be greater than zero",
            ));
        }
        if request.amount > available {
            return Err(FlashLoanError::invalid_amount(
                request.amount,
                format!("exceeds available liquidity of {available}"),
            ));
        }
        Ok(())
    }

    /// Swap a `Requested` marker for `Executing`, returning the request, or
    /// the phase found instead
    fn enter_callback(&self) -> std::result::Result<LoanRequest, LoanPhase> {
        let mut phase = self.phase.lock();
        match *phase {
            LoanPhase::Requested(request) => {
                *phase = LoanPhase::Executing(request);
                Ok(request)
            }
            other => Err(other),
        }
    }
}

impl FlashLoanReceiver for FlashLoanEngine {
    fn address(&self) -> Address {
        self.address
    }

    fn execute_operation(
        &self,
        ledger: &mut dyn TokenLedger,
        caller: Address,
        callback: &LoanCallback,
    ) -> Result<bool> {
        let marker = self.enter_callback();

        let pool = self.lending_pool.pool_address();
        if caller != pool {
            log_guard!("Callback from untrusted {}, pool is {}", caller, pool);
            return Err(FlashLoanError::UntrustedCaller {
                caller,
                expected: pool,
            });
        }

        let request = match marker {
            Ok(request) => request,
            Err(LoanPhase::Executing(_)) => {
                log_guard!("Replayed callback from pool {}", pool);
                return Err(FlashLoanError::unexpected_callback(
                    "callback already delivered for this loan",
                ));
            }
            Err(_) => {
                log_guard!("Unsolicited callback from pool {}", pool);
                return Err(FlashLoanError::unexpected_callback("no flash loan was requested"));
            }
        };
        if request.asset != callback.asset || request.amount != callback.amount {
            return Err(FlashLoanError::unexpected_callback(format!(
                "callback for {} {} does not match requested {} {}",
                callback.amount, callback.asset, request.amount, request.asset
            )));
        }
        if callback.initiator != self.address {
            return Err(FlashLoanError::unexpected_callback(format!(
                "loan initiated by {}, not by this engine",
                callback.initiator
            )));
        }

        let repayment_due = callback.repayment_due()?;
        log_callback!(
            "Callback for {} {}: premium {}, repayment due {}",
            callback.amount,
            callback.asset,
            callback.premium,
            repayment_due
        );

        let strategy = {
            let mut ctx = StrategyContext::new(&mut *ledger, self.address, &self.swap_venue);
            self.strategy.execute(&mut ctx, callback)?
        };

        let holding = AssetLedgerAdapter::new(callback.asset, self.address);
        let available = holding.holding(&*ledger);
        if available < repayment_due {
            log_guard!(
                "Cannot repay {} {}: holding {}",
                repayment_due,
                callback.asset,
                available
            );
            return Err(FlashLoanError::InsufficientRepaymentFunds {
                required: repayment_due,
                available,
            });
        }

        holding.approve(ledger, pool, repayment_due)?;
        log_repay!("Approved pool {} to pull {} {}", pool, repayment_due, callback.asset);
        debug!(
            strategy = self.strategy.name(),
            obtained = strategy.amount_obtained,
            surplus = available - repayment_due,
            "Callback complete"
        );

        *self.report.lock() = Some(CallbackReport {
            premium: callback.premium,
            strategy,
            repayment: RepaymentAuthorization {
                asset: callback.asset,
                spender: pool,
                amount: repayment_due,
            },
        });
        Ok(true)
    }
}
