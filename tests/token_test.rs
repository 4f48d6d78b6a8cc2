//! Reward and LP Token Tests

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::*;

use farm_casper::tokens::{
    AssetPair, LpToken, LpTokenHostRef, LpTokenInitArgs, RewardToken, RewardTokenHostRef,
    RewardTokenInitArgs, TokenError,
};

fn deploy_reward(env: &HostEnv) -> RewardTokenHostRef {
    env.set_caller(env.get_account(0));
    RewardToken::deploy(
        env,
        RewardTokenInitArgs {
            symbol: "FARM".to_string(),
            name: "Farm Reward".to_string(),
        },
    )
}

fn deploy_lp(env: &HostEnv) -> LpTokenHostRef {
    env.set_caller(env.get_account(0));
    LpToken::deploy(
        env,
        LpTokenInitArgs {
            symbol: "FLP".to_string(),
            name: "Farm LP".to_string(),
            token_a: env.get_account(8),
            token_b: env.get_account(9),
            initial_supply: U256::from(1_000u64),
        },
    )
}

// ==========================================
// RewardToken
// ==========================================

#[test]
fn test_reward_token_metadata() {
    let env = odra_test::env();
    let reward = deploy_reward(&env);
    assert_eq!(reward.symbol(), "FARM".to_string());
    assert_eq!(reward.name(), "Farm Reward".to_string());
    assert_eq!(reward.decimals(), 18);
    assert_eq!(reward.total_supply(), U256::zero());
    assert_eq!(reward.owner(), Some(env.get_account(0)));
}

#[test]
fn test_only_owner_mints_reward() {
    let env = odra_test::env();
    let (alice, ledger) = (env.get_account(1), env.get_account(2));
    let mut reward = deploy_reward(&env);

    reward.mint(alice, U256::from(50u64));
    assert_eq!(reward.balance_of(alice), U256::from(50u64));

    reward.transfer_ownership(ledger);
    assert_eq!(reward.owner(), Some(ledger));
    assert_eq!(
        reward.try_mint(alice, U256::from(1u64)),
        Err(TokenError::Unauthorized.into())
    );

    env.set_caller(ledger);
    reward.mint(alice, U256::from(25u64));
    assert_eq!(reward.total_supply(), U256::from(75u64));
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_reward_ownership_transfer_requires_owner() {
    let env = odra_test::env();
    let mut reward = deploy_reward(&env);
    env.set_caller(env.get_account(1));
    reward.transfer_ownership(env.get_account(1));
}

// ==========================================
// LpToken
// ==========================================

#[test]
fn test_lp_token_reports_pair() {
    let env = odra_test::env();
    let lp = deploy_lp(&env);
    assert_eq!(
        lp.pair(),
        AssetPair {
            token_a: env.get_account(8),
            token_b: env.get_account(9),
        }
    );
    assert_eq!(lp.balance_of(env.get_account(0)), U256::from(1_000u64));
    assert_eq!(lp.minter(), Some(env.get_account(0)));
}

#[test]
fn test_lp_mint_by_minter() {
    let env = odra_test::env();
    let (alice, migrator) = (env.get_account(1), env.get_account(2));
    let mut lp = deploy_lp(&env);

    lp.set_minter(migrator);
    assert_eq!(
        lp.try_mint(alice, U256::from(5u64)),
        Err(TokenError::Unauthorized.into())
    );

    env.set_caller(migrator);
    lp.mint(alice, U256::from(30u64));
    assert_eq!(lp.balance_of(alice), U256::from(30u64));
    assert_eq!(lp.total_supply(), U256::from(1_030u64));
}

#[test]
fn test_lp_transfer_from_uses_allowance() {
    let env = odra_test::env();
    let (owner, spender, recipient) = (env.get_account(0), env.get_account(1), env.get_account(2));
    let mut lp = deploy_lp(&env);

    lp.approve(spender, U256::from(100u64));
    assert_eq!(lp.allowance(owner, spender), U256::from(100u64));

    env.set_caller(spender);
    lp.transfer_from(owner, recipient, U256::from(60u64));
    assert_eq!(lp.balance_of(recipient), U256::from(60u64));
    assert_eq!(lp.allowance(owner, spender), U256::from(40u64));
    assert!(lp.try_transfer_from(owner, recipient, U256::from(41u64)).is_err());
}
