//! Livenet deploy and demo binary for the farm ledger.
//!
//! Run with:
//! - Deploy only:           FARM_LIVENET_MODE=deploy cargo run --bin farm_livenet --features=livenet
//! - Deploy + demo:         FARM_LIVENET_MODE=deploy_and_demo cargo run --bin farm_livenet --features=livenet
//! - Demo on existing:      FARM_LIVENET_MODE=demo FARM_EXISTING_LEDGER=... FARM_EXISTING_REWARD=... FARM_EXISTING_LP=... cargo run ...
//! - Query position:        FARM_LIVENET_MODE=query FARM_EXISTING_LEDGER=... FARM_EXISTING_REWARD=... FARM_EXISTING_LP=... cargo run ...
//!
//! Required environment variables (Odra livenet):
//! - ODRA_CASPER_LIVENET_SECRET_KEY_PATH
//! - ODRA_CASPER_LIVENET_NODE_ADDRESS
//! - ODRA_CASPER_LIVENET_EVENTS_URL
//! - ODRA_CASPER_LIVENET_CHAIN_NAME
//!
//! Optional:
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS_TOKEN    (motes)
//! - ODRA_CASPER_LIVENET_DEPLOY_GAS_LEDGER   (motes)
//! - ODRA_CASPER_LIVENET_CALL_GAS            (motes)
//! - FARM_REWARD_PER_HEIGHT                  (default: 100 tokens, 18 decimals)
//! - FARM_START_HEIGHT                       (default: current height)
//! - FARM_BONUS_END_HEIGHT                   (default: start + 10_000)
//! - FARM_BONUS_MULTIPLIER                   (default: 10)
//! - FARM_HEIGHT_INTERVAL_MS                 (default: 16_384, one Casper block)
//! - FARM_POOL_WEIGHT                        (default: 1000)
//! - FARM_DEMO_DEPOSIT                       (default: 100 LP tokens)
//! - FARM_EXISTING_REWARD / FARM_EXISTING_LP / FARM_EXISTING_LEDGER
//!   (64-hex or formatted "hash-..."/"contract-package-...")

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef, HostRefLoader};
use odra::prelude::*;

use farm_casper::ledger::{FarmLedger, FarmLedgerHostRef, FarmLedgerInitArgs};
use farm_casper::tokens::{
    LpToken, LpTokenHostRef, LpTokenInitArgs, RewardToken, RewardTokenHostRef,
    RewardTokenInitArgs,
};

const DEFAULT_DEPLOY_GAS_TOKEN_MOTES: u64 = 450_000_000_000; // 450 CSPR
const DEFAULT_DEPLOY_GAS_LEDGER_MOTES: u64 = 600_000_000_000; // 600 CSPR
const DEFAULT_CALL_GAS_MOTES: u64 = 50_000_000_000; // 50 CSPR

const DEFAULT_HEIGHT_INTERVAL_MS: u64 = 16_384;
const TOKEN_UNIT: u64 = 1_000_000_000_000_000_000; // 1e18

struct FarmParams {
    reward_per_height: U256,
    start_height: Option<u64>,
    bonus_end_height: Option<u64>,
    bonus_multiplier: u64,
    height_interval_ms: u64,
    pool_weight: u64,
    demo_deposit: U256,
}

impl FarmParams {
    fn from_env() -> Self {
        Self {
            reward_per_height: U256::from(read_u64_env("FARM_REWARD_PER_HEIGHT", 100))
                * U256::from(TOKEN_UNIT),
            start_height: read_optional_u64_env("FARM_START_HEIGHT"),
            bonus_end_height: read_optional_u64_env("FARM_BONUS_END_HEIGHT"),
            bonus_multiplier: read_u64_env("FARM_BONUS_MULTIPLIER", 10),
            height_interval_ms: read_u64_env("FARM_HEIGHT_INTERVAL_MS", DEFAULT_HEIGHT_INTERVAL_MS),
            pool_weight: read_u64_env("FARM_POOL_WEIGHT", 1000),
            demo_deposit: U256::from(read_u64_env("FARM_DEMO_DEPOSIT", 100)) * U256::from(TOKEN_UNIT),
        }
    }
}

fn main() {
    println!("============================================");
    println!("  Farm Ledger - Livenet");
    println!("============================================\n");

    let env = odra_casper_livenet_env::env();

    let mode = std::env::var("FARM_LIVENET_MODE").unwrap_or_else(|_| "deploy".to_string());
    let should_deploy = mode == "deploy" || mode == "deploy_and_demo";
    let should_demo = mode == "demo" || mode == "deploy_and_demo";
    let should_query = mode == "query";

    let deploy_gas_token = read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS_TOKEN", DEFAULT_DEPLOY_GAS_TOKEN_MOTES);
    let deploy_gas_ledger = read_u64_env("ODRA_CASPER_LIVENET_DEPLOY_GAS_LEDGER", DEFAULT_DEPLOY_GAS_LEDGER_MOTES);
    let call_gas = read_u64_env("ODRA_CASPER_LIVENET_CALL_GAS", DEFAULT_CALL_GAS_MOTES);
    let params = FarmParams::from_env();

    println!("[INFO] Mode: {}", mode);
    println!("[INFO] Caller: {:?}", env.caller());
    println!(
        "[INFO] Gas (motes): deploy_token={}, deploy_ledger={}, calls={}",
        deploy_gas_token, deploy_gas_ledger, call_gas
    );
    println!();

    let (reward, mut lp, mut ledger) = if should_deploy {
        deploy_farm(&env, &params, deploy_gas_token, deploy_gas_ledger, call_gas)
    } else {
        load_farm(&env, &mode)
    };

    if should_demo {
        run_demo(&env, &params, &mut ledger, &mut lp, &reward, call_gas);
    }

    if should_query {
        let user = env.caller();
        let position = ledger.position_of(0, user);
        println!(
            "FARM_POSITION_JSON={{\"pool_id\":0,\"amount\":\"{}\",\"reward_debt\":\"{}\",\"pending\":\"{}\",\"reward_balance\":\"{}\",\"current_height\":{},\"user\":\"{:?}\"}}",
            position.amount,
            position.reward_debt,
            ledger.pending_reward(0, user),
            reward.balance_of(user),
            ledger.current_height(),
            user
        );
        return;
    }

    output_deploy_json(reward.address(), lp.address(), ledger.address());
}

fn deploy_farm(
    env: &HostEnv,
    params: &FarmParams,
    deploy_gas_token: u64,
    deploy_gas_ledger: u64,
    call_gas: u64,
) -> (RewardTokenHostRef, LpTokenHostRef, FarmLedgerHostRef) {
    let caller = env.caller();

    // ==========================================
    // Step 1: Reward and LP tokens
    // ==========================================
    println!("[STEP 1] Deploying reward token...");
    env.set_gas(deploy_gas_token);
    let mut reward = RewardToken::deploy(
        env,
        RewardTokenInitArgs {
            symbol: "FARM".to_string(),
            name: "Farm Reward".to_string(),
        },
    );
    println!("[OK] Reward token deployed at: {:?}", reward.address());

    println!("[STEP 1] Deploying LP token...");
    env.set_gas(deploy_gas_token);
    let lp = LpToken::deploy(
        env,
        LpTokenInitArgs {
            symbol: "FLP".to_string(),
            name: "Farm LP".to_string(),
            token_a: reward.address(),
            token_b: caller,
            initial_supply: params.demo_deposit * U256::from(10u64),
        },
    );
    println!("[OK] LP token deployed at: {:?}", lp.address());
    println!();

    // ==========================================
    // Step 2: Ledger
    // ==========================================
    let now_height = env.block_time() / params.height_interval_ms.max(1);
    let start_height = params.start_height.unwrap_or(now_height);
    let bonus_end_height = params.bonus_end_height.unwrap_or(start_height + 10_000);

    println!("[STEP 2] Deploying farm ledger...");
    println!(
        "     reward_per_height={}, start={}, bonus_end={}, bonus_x={}, interval_ms={}",
        params.reward_per_height,
        start_height,
        bonus_end_height,
        params.bonus_multiplier,
        params.height_interval_ms
    );
    env.set_gas(deploy_gas_ledger);
    let mut ledger = FarmLedger::deploy(
        env,
        FarmLedgerInitArgs {
            reward_token: reward.address(),
            dev: caller,
            reward_per_height: params.reward_per_height,
            start_height,
            bonus_end_height,
            bonus_multiplier: params.bonus_multiplier,
            height_interval_ms: params.height_interval_ms,
        },
    );
    println!("[OK] Ledger deployed at: {:?}", ledger.address());
    println!();

    // ==========================================
    // Step 3: Hand minting to the ledger (must succeed before any accrual)
    // ==========================================
    println!("[STEP 3] Transferring reward token ownership to ledger...");
    env.set_gas(call_gas);
    reward.transfer_ownership(ledger.address());
    println!("[OK] Reward token owner: {:?}", reward.owner());
    println!();

    // ==========================================
    // Step 4: First pool
    // ==========================================
    println!("[STEP 4] Adding LP pool with weight {}...", params.pool_weight);
    env.set_gas(call_gas);
    ledger.add_pool(params.pool_weight, lp.address(), false);
    println!("[OK] Pools: {}", ledger.pool_length());
    println!();

    (reward, lp, ledger)
}

fn load_farm(env: &HostEnv, mode: &str) -> (RewardTokenHostRef, LpTokenHostRef, FarmLedgerHostRef) {
    println!("[STEP 1] Reusing existing farm contracts...");
    let reward = RewardToken::load(env, existing_address("FARM_EXISTING_REWARD", mode));
    let lp = LpToken::load(env, existing_address("FARM_EXISTING_LP", mode));
    let ledger = FarmLedger::load(env, existing_address("FARM_EXISTING_LEDGER", mode));
    println!("[OK] Reward: {:?}", reward.address());
    println!("[OK] LP:     {:?}", lp.address());
    println!("[OK] Ledger: {:?}", ledger.address());
    println!();
    (reward, lp, ledger)
}

fn run_demo(
    env: &HostEnv,
    params: &FarmParams,
    ledger: &mut FarmLedgerHostRef,
    lp: &mut LpTokenHostRef,
    reward: &RewardTokenHostRef,
    call_gas: u64,
) {
    let caller = env.caller();

    println!("[DEMO 1] Approving {} LP for the ledger...", params.demo_deposit);
    env.set_gas(call_gas);
    lp.approve(ledger.address(), params.demo_deposit);
    println!("[OK] Allowance: {}", lp.allowance(caller, ledger.address()));

    println!("[DEMO 2] Depositing into pool 0...");
    env.set_gas(call_gas);
    ledger.deposit(0, params.demo_deposit);
    print_position_info(ledger, caller, reward);

    println!("[DEMO 3] Harvesting (zero deposit)...");
    env.set_gas(call_gas);
    ledger.deposit(0, U256::zero());
    print_position_info(ledger, caller, reward);
}

fn print_position_info(ledger: &FarmLedgerHostRef, user: Address, reward: &RewardTokenHostRef) {
    let position = ledger.position_of(0, user);
    let pool = ledger.pool_info(0);
    println!("     locked: {}", position.amount);
    println!("     reward_debt: {}", position.reward_debt);
    println!("     pending: {}", ledger.pending_reward(0, user));
    println!("     pool weight: {} / {}", pool.accrual.weight, ledger.total_weight());
    println!("     pool last_settled_height: {}", pool.accrual.last_settled_height);
    println!("     current_height: {}", ledger.current_height());
    println!("     user reward balance: {}", reward.balance_of(user));
    println!();
}

fn read_u64_env(name: &str, default_value: u64) -> u64 {
    read_optional_u64_env(name).unwrap_or(default_value)
}

fn read_optional_u64_env(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().replace('_', "").parse::<u64>().ok())
}

fn existing_address(var: &str, mode: &str) -> Address {
    let raw = std::env::var(var).unwrap_or_else(|_| panic!("{} must be set for mode={}", var, mode));
    parse_contract_address(&raw).unwrap_or_else(|err| panic!("{}: {}", var, err))
}

fn output_deploy_json(reward_addr: Address, lp_addr: Address, ledger_addr: Address) {
    let chain_name =
        std::env::var("ODRA_CASPER_LIVENET_CHAIN_NAME").unwrap_or_else(|_| "casper-test".to_string());
    let node_url = std::env::var("ODRA_CASPER_LIVENET_NODE_ADDRESS")
        .unwrap_or_else(|_| "https://node.testnet.casper.network".to_string());

    println!(
        r#"FARM_DEPLOY_JSON={{"chain_name":"{}","node_url":"{}","reward_token":"{}","lp_token":"{}","ledger":"{}","deployed_at":"{}"}}"#,
        chain_name,
        node_url,
        reward_addr.to_formatted_string(),
        lp_addr.to_formatted_string(),
        ledger_addr.to_formatted_string(),
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
}

/// Accepts a bare 64-hex hash or one prefixed with
/// `hash-`, `contract-package-`, `package-` or `account-hash-`.
fn parse_contract_address(raw: &str) -> Result<Address, String> {
    use odra::casper_types::account::AccountHash;
    use odra::casper_types::contracts::ContractPackageHash;

    fn decode_hex_32(s: &str) -> Result<[u8; 32], String> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("expected 64 hex chars, got {}", s));
        }
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|e| e.to_string())?;
        }
        Ok(out)
    }

    let trimmed = raw.trim();
    if let Some(hex) = trimmed.strip_prefix("account-hash-") {
        return Ok(Address::Account(AccountHash::new(decode_hex_32(hex)?)));
    }
    let hex = ["contract-package-", "package-", "hash-"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    Ok(Address::Contract(ContractPackageHash::new(decode_hex_32(hex)?)))
}
