//! End-to-end flash loan scenarios against the mock protocols
//!
//! Every failing scenario also checks that the committed ledger is exactly
//! what it was before the request.

use flashloan_amm::V2Math;
use flashloan_config::constants::tokens::{DAI, DAI_WHALE, ONE_TOKEN_18};
use flashloan_config::{EngineConfig, StrategyKind};
use flashloan_engine::strategy::{self, Strategy, StrategyContext};
use flashloan_engine::testing::{accounts, init_tracing, Fixture, SwapHook};
use flashloan_engine::{
    Address, Amount, Effect, FlashLoanError, FlashLoanReceiver, LendingPool, LoanPhase,
    RoundTripParams, TokenLedger,
};
use flashloan_types::{LoanCallback, StrategyResult};
use std::sync::Arc;

const E18: Amount = ONE_TOKEN_18;
const POOL_LIQUIDITY: Amount = 1_000_000 * E18;
const PAIR_DAI: Amount = 1_000_000 * E18;
const PAIR_WETH: Amount = 500 * E18;

fn dai_weth_pair() -> Address {
    Address::from_low_u64(0xd0e0)
}

fn pass_through_fixture() -> Fixture {
    init_tracing();
    let mut fixture = Fixture::new().unwrap();
    fixture.fund_pool(DAI, POOL_LIQUIDITY).unwrap();
    fixture
}

fn round_trip_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.strategy.kind = StrategyKind::RoundTrip;
    config.strategy.intermediate_asset = Some(accounts::weth());
    config
}

fn round_trip_fixture() -> Fixture {
    init_tracing();
    let config = round_trip_config();
    let strategy = strategy::from_config(&config.strategy).unwrap();
    let mut fixture = Fixture::with_config(config, strategy).unwrap();
    fixture.fund_pool(DAI, POOL_LIQUIDITY).unwrap();
    fixture
        .add_pair(dai_weth_pair(), DAI, PAIR_DAI, accounts::weth(), PAIR_WETH)
        .unwrap();
    fixture
}

/// DAI returned by borrowing `amount` and swapping DAI → WETH → DAI
fn expected_round_trip(amount: Amount) -> Amount {
    let weth_out = V2Math::get_amount_out(amount, PAIR_DAI, PAIR_WETH, 30).unwrap();
    V2Math::get_amount_out(weth_out, PAIR_WETH - weth_out, PAIR_DAI + amount, 30).unwrap()
}

#[test]
fn test_prefunded_pass_through_pays_premium() {
    let mut fixture = pass_through_fixture();
    // Prefund from the holder, the way a forked mainnet would
    fixture.fund(DAI, DAI_WHALE, 100 * E18).unwrap();
    fixture
        .ledger
        .transfer(DAI, DAI_WHALE, accounts::engine(), 100 * E18)
        .unwrap();
    assert_eq!(fixture.balance(DAI, DAI_WHALE), 0);
    let engine = fixture.engine.clone();

    let receipt = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 100 * E18)
        .unwrap();

    let outcome = receipt.value;
    assert_eq!(outcome.premium, 5 * E18 / 100);
    assert_eq!(outcome.strategy.amount_obtained, 100 * E18);
    assert_eq!(outcome.repayment.spender, accounts::AAVE_POOL);
    assert_eq!(outcome.repayment.amount, 100 * E18 + 5 * E18 / 100);
    assert_eq!(outcome.profit_swept, 0);

    // 99.95 DAI left, pool earned 0.05 DAI
    assert_eq!(fixture.engine_balance(DAI), 9_995 * E18 / 100);
    assert_eq!(fixture.pool_balance(DAI), POOL_LIQUIDITY + 5 * E18 / 100);
    assert_eq!(
        fixture
            .ledger
            .allowance(DAI, accounts::engine(), accounts::AAVE_POOL),
        0
    );

    assert_eq!(
        receipt.effects,
        vec![
            Effect::Transfer {
                asset: DAI,
                from: accounts::AAVE_POOL,
                to: accounts::engine(),
                amount: 100 * E18,
            },
            Effect::Approval {
                asset: DAI,
                owner: accounts::engine(),
                spender: accounts::AAVE_POOL,
                amount: outcome.repayment.amount,
            },
            Effect::Transfer {
                asset: DAI,
                from: accounts::engine(),
                to: accounts::AAVE_POOL,
                amount: outcome.repayment.amount,
            },
        ]
    );
    assert_eq!(engine.phase(), LoanPhase::Idle);
}

#[test]
fn test_without_prefunding_premium_cannot_be_repaid() {
    let mut fixture = pass_through_fixture();
    let engine = fixture.engine.clone();
    let before = fixture.ledger.clone();

    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 100 * E18)
        .unwrap_err();

    assert_eq!(
        err,
        FlashLoanError::InsufficientRepaymentFunds {
            required: 100 * E18 + 5 * E18 / 100,
            available: 100 * E18,
        }
    );
    assert_eq!(fixture.ledger, before);
    assert_eq!(engine.phase(), LoanPhase::Idle);
}

#[test]
fn test_amount_beyond_liquidity_is_invalid() {
    let mut fixture = pass_through_fixture();
    fixture.fund_engine(DAI, 100 * E18).unwrap();
    let engine = fixture.engine.clone();
    let before = fixture.ledger.clone();

    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, POOL_LIQUIDITY + 1)
        .unwrap_err();

    assert!(matches!(
        err,
        FlashLoanError::InvalidAmount { amount, .. } if amount == POOL_LIQUIDITY + 1
    ));
    assert_eq!(fixture.ledger, before);
}

#[test]
fn test_pool_rejects_loan_beyond_liquidity() {
    let mut fixture = pass_through_fixture();
    let engine = fixture.engine.clone();
    let pool = fixture.pool.clone();
    let before = fixture.ledger.clone();

    let err = fixture
        .ledger
        .transact(|tx| {
            pool.flash_loan_simple(
                tx,
                engine.address(),
                engine.as_ref(),
                DAI,
                POOL_LIQUIDITY + 1,
                &[],
            )
        })
        .unwrap_err();

    assert_eq!(
        err,
        FlashLoanError::InsufficientLiquidity {
            asset: DAI,
            requested: POOL_LIQUIDITY + 1,
            available: POOL_LIQUIDITY,
        }
    );
    assert_eq!(fixture.ledger, before);
}

#[test]
fn test_request_validation() {
    let mut fixture = pass_through_fixture();
    let engine = fixture.engine.clone();
    let before = fixture.ledger.clone();

    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 0)
        .unwrap_err();
    assert!(matches!(err, FlashLoanError::InvalidAmount { amount: 0, .. }));

    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), Address::ZERO, E18)
        .unwrap_err();
    assert_eq!(err, FlashLoanError::InvalidAsset { asset: Address::ZERO });

    // Not listed by the pool
    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), accounts::usdc(), E18)
        .unwrap_err();
    assert_eq!(
        err,
        FlashLoanError::InvalidAsset {
            asset: accounts::usdc()
        }
    );

    assert_eq!(fixture.ledger, before);
}

#[test]
fn test_restricted_access() {
    init_tracing();
    let friend = Address::from_low_u64(0xf1);
    let mut config = EngineConfig::default();
    config.access.restricted = true;
    config.access.allowed_callers.push(friend);
    let strategy = strategy::from_config(&config.strategy).unwrap();

    let mut fixture = Fixture::with_config(config, strategy).unwrap();
    fixture.fund_pool(DAI, POOL_LIQUIDITY).unwrap();
    fixture.fund_engine(DAI, 10 * E18).unwrap();
    let engine = fixture.engine.clone();

    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, E18)
        .unwrap_err();
    assert_eq!(
        err,
        FlashLoanError::UnauthorizedCaller {
            caller: accounts::user()
        }
    );

    engine
        .request_flash_loan(&mut fixture.ledger, accounts::owner(), DAI, E18)
        .unwrap();
    engine
        .request_flash_loan(&mut fixture.ledger, friend, DAI, E18)
        .unwrap();
}

#[test]
fn test_round_trip_settles_through_swap_venue() {
    let mut fixture = round_trip_fixture();
    fixture.fund_engine(DAI, 100 * E18).unwrap();
    let engine = fixture.engine.clone();

    let receipt = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 100 * E18)
        .unwrap();

    let returned = expected_round_trip(100 * E18);
    let premium = receipt.value.premium;
    assert_eq!(receipt.value.strategy.amount_obtained, returned);
    assert_eq!(
        fixture.engine_balance(DAI),
        100 * E18 + returned - (100 * E18 + premium)
    );
    assert_eq!(fixture.engine_balance(accounts::weth()), 0);
    // Pair keeps the DAI the round trip lost to fees
    assert_eq!(
        fixture.balance(DAI, dai_weth_pair()),
        PAIR_DAI + 100 * E18 - returned
    );
    assert_eq!(fixture.pool_balance(DAI), POOL_LIQUIDITY + premium);
}

#[test]
fn test_round_trip_slippage_rolls_back_everything() {
    let mut fixture = round_trip_fixture();
    fixture.fund_engine(DAI, 100 * E18).unwrap();
    let engine = fixture.engine.clone();
    let before = fixture.ledger.clone();

    let params = RoundTripParams {
        intermediate_asset: accounts::weth(),
        max_slippage_bps: 50,
        min_final_out: Some(100 * E18),
    }
    .encode()
    .unwrap();

    let err = engine
        .request_flash_loan_with_params(
            &mut fixture.ledger,
            accounts::user(),
            DAI,
            100 * E18,
            &params,
        )
        .unwrap_err();

    assert_eq!(
        err,
        FlashLoanError::SlippageExceeded {
            min_amount_out: 100 * E18,
            actual: expected_round_trip(100 * E18),
        }
    );
    assert_eq!(fixture.ledger, before);
    assert_eq!(engine.phase(), LoanPhase::Idle);
}

#[test]
fn test_garbage_strategy_params_rejected() {
    let mut fixture = round_trip_fixture();
    fixture.fund_engine(DAI, 100 * E18).unwrap();
    let engine = fixture.engine.clone();
    let before = fixture.ledger.clone();

    let err = engine
        .request_flash_loan_with_params(&mut fixture.ledger, accounts::user(), DAI, E18, &[1, 2, 3])
        .unwrap_err();

    assert!(matches!(err, FlashLoanError::InvalidStrategyParams { .. }));
    assert_eq!(fixture.ledger, before);
}

#[test]
fn test_missing_route_fails_the_loan() {
    init_tracing();
    let config = round_trip_config();
    let strategy = strategy::from_config(&config.strategy).unwrap();
    let mut fixture = Fixture::with_config(config, strategy).unwrap();
    fixture.fund_pool(DAI, POOL_LIQUIDITY).unwrap();
    fixture.fund_engine(DAI, 100 * E18).unwrap();
    let engine = fixture.engine.clone();

    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, E18)
        .unwrap_err();

    assert_eq!(
        err,
        FlashLoanError::NoSwapRoute {
            token_in: DAI,
            token_out: accounts::weth(),
        }
    );
}

#[test]
fn test_nested_request_during_callback_is_reentrancy() {
    let mut fixture = round_trip_fixture();
    fixture.fund_engine(DAI, 100 * E18).unwrap();
    let engine = fixture.engine.clone();
    let before = fixture.ledger.clone();

    let weak = Arc::downgrade(&fixture.engine);
    let hook: SwapHook = Arc::new(move |ledger: &mut dyn TokenLedger| {
        match weak.upgrade() {
            Some(engine) => engine
                .execute_request(ledger, accounts::attacker(), DAI, E18, &[])
                .map(|_| ()),
            None => Ok(()),
        }
    });
    fixture.router.set_hook(hook);

    let err = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 100 * E18)
        .unwrap_err();

    assert_eq!(err, FlashLoanError::ReentrancyDetected);
    assert_eq!(fixture.ledger, before);
    assert_eq!(engine.phase(), LoanPhase::Idle);
}

/// Pulls a pre-approved rebate from a sponsor into the engine
struct SponsoredRebate {
    sponsor: Address,
    rebate: Amount,
}

impl Strategy for SponsoredRebate {
    fn name(&self) -> &'static str {
        "sponsored_rebate"
    }

    fn execute(
        &self,
        ctx: &mut StrategyContext<'_>,
        callback: &LoanCallback,
    ) -> flashloan_engine::Result<StrategyResult> {
        ctx.ledger.transfer_from(
            callback.asset,
            ctx.engine,
            self.sponsor,
            ctx.engine,
            self.rebate,
        )?;
        Ok(StrategyResult {
            asset: callback.asset,
            amount_obtained: callback.amount + self.rebate,
        })
    }
}

#[test]
fn test_profit_is_swept_to_initiator() {
    init_tracing();
    let sponsor = Address::from_low_u64(0x5050);
    let mut config = EngineConfig::default();
    config.settlement.sweep_profit_to_initiator = true;
    let strategy = Box::new(SponsoredRebate {
        sponsor,
        rebate: E18,
    });

    let mut fixture = Fixture::with_config(config, strategy).unwrap();
    fixture.fund_pool(DAI, POOL_LIQUIDITY).unwrap();
    fixture.fund_engine(DAI, 10 * E18).unwrap();
    fixture.fund(DAI, sponsor, E18).unwrap();
    fixture
        .ledger
        .transact(|tx| tx.approve(DAI, sponsor, accounts::engine(), E18))
        .unwrap();
    let engine = fixture.engine.clone();

    let receipt = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 100 * E18)
        .unwrap();

    // 1 DAI rebate minus 0.05 DAI premium
    let profit = E18 - 5 * E18 / 100;
    assert_eq!(receipt.value.profit_swept, profit);
    assert_eq!(fixture.balance(DAI, accounts::user()), profit);
    assert_eq!(fixture.engine_balance(DAI), 10 * E18);
}

#[test]
fn test_profit_stays_in_engine_by_default() {
    init_tracing();
    let sponsor = Address::from_low_u64(0x5050);
    let strategy = Box::new(SponsoredRebate {
        sponsor,
        rebate: E18,
    });

    let mut fixture = Fixture::with_config(EngineConfig::default(), strategy).unwrap();
    fixture.fund_pool(DAI, POOL_LIQUIDITY).unwrap();
    fixture.fund(DAI, sponsor, E18).unwrap();
    fixture
        .ledger
        .transact(|tx| tx.approve(DAI, sponsor, accounts::engine(), E18))
        .unwrap();
    let engine = fixture.engine.clone();

    let receipt = engine
        .request_flash_loan(&mut fixture.ledger, accounts::user(), DAI, 100 * E18)
        .unwrap();

    assert_eq!(receipt.value.profit_swept, 0);
    assert_eq!(fixture.engine_balance(DAI), E18 - 5 * E18 / 100);
    assert_eq!(fixture.balance(DAI, accounts::user()), 0);
}

#[test]
fn test_withdraw_is_owner_only() {
    let mut fixture = pass_through_fixture();
    fixture.fund_engine(DAI, 7 * E18).unwrap();
    let engine = fixture.engine.clone();

    let err = engine
        .withdraw(&mut fixture.ledger, accounts::attacker(), DAI, accounts::attacker())
        .unwrap_err();
    assert_eq!(
        err,
        FlashLoanError::UnauthorizedCaller {
            caller: accounts::attacker()
        }
    );
    assert_eq!(fixture.engine_balance(DAI), 7 * E18);

    let receipt = engine
        .withdraw(&mut fixture.ledger, accounts::owner(), DAI, accounts::owner())
        .unwrap();
    assert_eq!(receipt.value, 7 * E18);
    assert_eq!(fixture.engine_balance(DAI), 0);
    assert_eq!(fixture.balance(DAI, accounts::owner()), 7 * E18);
}

/// Receiver that declines every loan without raising an error
struct DecliningReceiver;

impl FlashLoanReceiver for DecliningReceiver {
    fn address(&self) -> Address {
        Address::from_low_u64(0xdec)
    }

    fn execute_operation(
        &self,
        _ledger: &mut dyn TokenLedger,
        _caller: Address,
        _callback: &LoanCallback,
    ) -> flashloan_engine::Result<bool> {
        Ok(false)
    }
}

#[test]
fn test_pool_reports_declined_callback() {
    let mut fixture = pass_through_fixture();
    let pool = fixture.pool.clone();
    let before = fixture.ledger.clone();

    let err = fixture
        .ledger
        .transact(|tx| {
            pool.flash_loan_simple(tx, accounts::user(), &DecliningReceiver, DAI, E18, &[])
        })
        .unwrap_err();

    assert_eq!(
        err,
        FlashLoanError::CallbackRejected {
            receiver: Address::from_low_u64(0xdec)
        }
    );
    assert_eq!(fixture.ledger, before);
}

#[test]
fn test_engine_built_from_toml_config() {
    init_tracing();
    let config = EngineConfig::from_toml_str(
        r#"
[strategy]
kind = "round_trip"
intermediate_asset = "0x000000000000000000000000000000000000eeee"
max_slippage_bps = 30

[settlement]
sweep_profit_to_initiator = false
"#,
    )
    .unwrap();
    let strategy = strategy::from_config(&config.strategy).unwrap();
    let fixture = Fixture::with_config(config, strategy).unwrap();

    assert_eq!(fixture.engine.strategy_name(), "round_trip_arbitrage");
    assert_eq!(
        fixture.engine.config().strategy.intermediate_asset,
        Some(accounts::weth())
    );
}
