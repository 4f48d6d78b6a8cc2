//! Farm Timelock Tests
//!
//! The timelock owns the ledger; controller calls go through queue -> wait -> execute.

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::*;

use farm_casper::ledger::{FarmLedger, FarmLedgerHostRef, FarmLedgerInitArgs, LedgerError};
use farm_casper::timelock::{
    ActionKind, ActionStatus, FarmTimelock, FarmTimelockHostRef, FarmTimelockInitArgs,
    TimelockError, DAY_MS, GRACE_PERIOD_MS, MINIMUM_DELAY_MS,
};
use farm_casper::tokens::{LpToken, LpTokenInitArgs, RewardToken, RewardTokenInitArgs};

const HEIGHT_MS: u64 = 1000;

// ==========================================
// Helper: Deploy contracts
// ==========================================

fn deploy_contracts(env: &HostEnv) -> (FarmLedgerHostRef, FarmTimelockHostRef) {
    let owner = env.get_account(0);
    env.set_caller(owner);

    let mut reward = RewardToken::deploy(
        env,
        RewardTokenInitArgs {
            symbol: "FARM".to_string(),
            name: "Farm Reward".to_string(),
        },
    );
    let now_height = env.block_time() / HEIGHT_MS;
    let mut ledger = FarmLedger::deploy(
        env,
        FarmLedgerInitArgs {
            reward_token: reward.address(),
            dev: env.get_account(4),
            reward_per_height: U256::from(1_000u64),
            start_height: now_height,
            bonus_end_height: now_height,
            bonus_multiplier: 1,
            height_interval_ms: HEIGHT_MS,
        },
    );
    reward.transfer_ownership(ledger.address());

    let timelock = FarmTimelock::deploy(
        env,
        FarmTimelockInitArgs {
            ledger: ledger.address(),
            delay: MINIMUM_DELAY_MS,
        },
    );
    ledger.transfer_ownership(timelock.address());
    (ledger, timelock)
}

fn eta(env: &HostEnv) -> u64 {
    env.block_time() + MINIMUM_DELAY_MS
}

// ==========================================
// Queue and execute
// ==========================================

#[test]
fn test_queued_add_pool_runs_after_delay() {
    let env = odra_test::env();
    let (ledger, mut timelock) = deploy_contracts(&env);
    let token = env.get_account(7);

    let id = timelock.queue_add_pool(50, token, false, eta(&env));
    assert_eq!(id, 0);
    assert_eq!(timelock.action_count(), 1);
    let action = timelock.action(id);
    assert_eq!(action.kind, ActionKind::AddPool);
    assert_eq!(action.status, ActionStatus::Queued);

    // Anyone may execute, but not before the eta
    env.set_caller(env.get_account(3));
    assert_eq!(timelock.try_execute(id), Err(TimelockError::NotReady.into()));
    assert_eq!(ledger.pool_length(), 0);

    env.advance_block_time(MINIMUM_DELAY_MS);
    timelock.execute(id);
    assert_eq!(ledger.pool_length(), 1);
    assert_eq!(ledger.pool_info(0).staked_token, token);
    assert_eq!(ledger.total_weight(), 50);
    assert_eq!(timelock.action(id).status, ActionStatus::Executed);

    assert_eq!(timelock.try_execute(id), Err(TimelockError::NotQueued.into()));
}

#[test]
fn test_queued_controller_actions() {
    let env = odra_test::env();
    let (ledger, mut timelock) = deploy_contracts(&env);
    let (migrator, new_owner) = (env.get_account(6), env.get_account(5));
    // Reweighting settles the pool, so it needs a real staked token
    let lp = LpToken::deploy(
        &env,
        LpTokenInitArgs {
            symbol: "FLP".to_string(),
            name: "Farm LP".to_string(),
            token_a: env.get_account(8),
            token_b: env.get_account(9),
            initial_supply: U256::from(1_000u64),
        },
    );

    let add = timelock.queue_add_pool(50, lp.address(), false, eta(&env));
    let reweight = timelock.queue_set_weight(0, 80, true, eta(&env) + DAY_MS);
    let set_migrator = timelock.queue_set_migrator(Some(migrator), eta(&env));
    let hand_over = timelock.queue_transfer_ownership(new_owner, eta(&env) + DAY_MS);

    env.advance_block_time(MINIMUM_DELAY_MS);
    timelock.execute(add);
    timelock.execute(set_migrator);
    assert_eq!(ledger.migrator(), Some(migrator));

    env.advance_block_time(DAY_MS);
    timelock.execute(reweight);
    assert_eq!(ledger.total_weight(), 80);

    timelock.execute(hand_over);
    assert_eq!(ledger.owner(), Some(new_owner));
}

#[test]
fn test_eta_must_respect_delay() {
    let env = odra_test::env();
    let (_ledger, mut timelock) = deploy_contracts(&env);
    assert_eq!(
        timelock.try_queue_add_pool(50, env.get_account(7), false, eta(&env) - 1),
        Err(TimelockError::EtaTooSoon.into())
    );
    assert_eq!(timelock.action_count(), 0);
}

#[test]
fn test_stale_action_cannot_run() {
    let env = odra_test::env();
    let (ledger, mut timelock) = deploy_contracts(&env);
    let id = timelock.queue_add_pool(50, env.get_account(7), false, eta(&env));

    env.advance_block_time(MINIMUM_DELAY_MS + GRACE_PERIOD_MS + 1);
    assert_eq!(timelock.try_execute(id), Err(TimelockError::Stale.into()));
    assert_eq!(ledger.pool_length(), 0);
}

#[test]
fn test_cancelled_action_cannot_run() {
    let env = odra_test::env();
    let (ledger, mut timelock) = deploy_contracts(&env);
    let id = timelock.queue_add_pool(50, env.get_account(7), false, eta(&env));

    env.set_caller(env.get_account(1));
    assert_eq!(timelock.try_cancel(id), Err(TimelockError::Unauthorized.into()));

    env.set_caller(env.get_account(0));
    timelock.cancel(id);
    assert_eq!(timelock.action(id).status, ActionStatus::Cancelled);

    env.advance_block_time(MINIMUM_DELAY_MS);
    assert_eq!(timelock.try_execute(id), Err(TimelockError::NotQueued.into()));
    assert_eq!(ledger.pool_length(), 0);
}

#[test]
fn test_ledger_rejects_previous_owner() {
    let env = odra_test::env();
    let (mut ledger, timelock) = deploy_contracts(&env);
    assert_eq!(ledger.owner(), Some(timelock.address()));
    assert_eq!(
        ledger.try_add_pool(50, env.get_account(7), false),
        Err(LedgerError::Unauthorized.into())
    );
}

// ==========================================
// Admin
// ==========================================

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_queue_requires_admin() {
    let env = odra_test::env();
    let (_ledger, mut timelock) = deploy_contracts(&env);
    env.set_caller(env.get_account(1));
    timelock.queue_add_pool(50, env.get_account(7), false, eta(&env));
}

#[test]
fn test_admin_handover_is_two_step() {
    let env = odra_test::env();
    let (alice, bob) = (env.get_account(1), env.get_account(2));
    let (_ledger, mut timelock) = deploy_contracts(&env);

    timelock.set_pending_admin(alice);
    assert_eq!(timelock.pending_admin(), Some(alice));
    assert_eq!(timelock.admin(), Some(env.get_account(0)));

    env.set_caller(bob);
    assert_eq!(timelock.try_accept_admin(), Err(TimelockError::Unauthorized.into()));

    env.set_caller(alice);
    timelock.accept_admin();
    assert_eq!(timelock.admin(), Some(alice));
    assert_eq!(timelock.pending_admin(), None);

    // The new admin can queue, the old one cannot
    timelock.queue_add_pool(50, env.get_account(7), false, eta(&env));
    env.set_caller(env.get_account(0));
    assert_eq!(
        timelock.try_queue_add_pool(50, env.get_account(7), false, eta(&env)),
        Err(TimelockError::Unauthorized.into())
    );
}

#[test]
#[should_panic]
fn test_delay_below_minimum_is_rejected() {
    let env = odra_test::env();
    FarmTimelock::deploy(
        &env,
        FarmTimelockInitArgs {
            ledger: env.get_account(7),
            delay: DAY_MS,
        },
    );
}
