//! Farm Ledger Contract
//!
//! Multi-pool staking ledger with a per-height reward emission on Casper.
//! - Depositors lock a staked (LP) token into a pool and earn the reward token
//! - Emission is split across pools by weight and within a pool by stake
//! - Every mutating call settles the target pool to the current height first
//! - The owner registers and reweights pools and configures the migrator
//!
//! ## Units
//! - height: block time in ms divided by `height_interval_ms`
//! - amounts: token units (U256)
//! - `acc_reward_per_share`: scaled by 1e12
//!
//! ## Atomicity
//! Settlement mints before the user-level transfer runs. A revert later in the
//! same call undoes those mints together with everything else.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::accrual::{capped_payout, PoolAccrual, Position, Settlement};
use crate::emission::EmissionSchedule;
use crate::external::{MigratorContractRef, RewardMintContractRef, StakedAssetContractRef};

// ==========================================
// Events
// ==========================================

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct Deposited {
        pub user: Address,
        pub pool_id: u32,
        pub amount: U256,
    }

    #[odra::event]
    pub struct Withdrawn {
        pub user: Address,
        pub pool_id: u32,
        pub amount: U256,
    }

    #[odra::event]
    pub struct EmergencyWithdrawn {
        pub user: Address,
        pub pool_id: u32,
        pub amount: U256,
    }

    #[odra::event]
    pub struct RewardPaid {
        pub user: Address,
        pub pool_id: u32,
        pub amount: U256,
    }

    /// Custody held less than the reward owed; only `paid` went out.
    #[odra::event]
    pub struct RewardShortfall {
        pub user: Address,
        pub pool_id: u32,
        pub owed: U256,
        pub paid: U256,
    }

    #[odra::event]
    pub struct PoolSettled {
        pub pool_id: u32,
        pub from_height: u64,
        pub to_height: u64,
        pub pool_reward: U256,
        pub dev_reward: U256,
    }

    #[odra::event]
    pub struct PoolAdded {
        pub pool_id: u32,
        pub staked_token: Address,
        pub weight: u64,
    }

    #[odra::event]
    pub struct PoolWeightSet {
        pub pool_id: u32,
        pub old_weight: u64,
        pub new_weight: u64,
    }

    #[odra::event]
    pub struct MigratorSet {
        pub migrator: Option<Address>,
    }

    #[odra::event]
    pub struct PoolMigrated {
        pub pool_id: u32,
        pub old_token: Address,
        pub new_token: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct DevSet {
        pub old_dev: Address,
        pub new_dev: Address,
    }

    #[odra::event]
    pub struct OwnershipTransferred {
        pub previous_owner: Address,
        pub new_owner: Address,
    }
}

// ==========================================
// Types
// ==========================================

/// A registered pool: its staked token and accrual state
#[odra::odra_type]
pub struct PoolInfo {
    pub staked_token: Address,
    pub accrual: PoolAccrual,
}

// ==========================================
// Errors
// ==========================================

#[odra::odra_error]
pub enum LedgerError {
    InsufficientBalance = 1,
    InsufficientAllowance = 2,
    Unauthorized = 3,
    NoMigratorConfigured = 4,
    MigrationRejected = 5,
    UnknownPool = 6,
    InvalidConfiguration = 7,
}

// ==========================================
// Contract
// ==========================================

#[odra::module(
    events = [
        events::Deposited,
        events::Withdrawn,
        events::EmergencyWithdrawn,
        events::RewardPaid,
        events::RewardShortfall,
        events::PoolSettled,
        events::PoolAdded,
        events::PoolWeightSet,
        events::MigratorSet,
        events::PoolMigrated,
        events::DevSet,
        events::OwnershipTransferred
    ],
    errors = LedgerError
)]
pub struct FarmLedger {
    // Collaborators
    reward_token: Var<Address>,
    migrator: Var<Option<Address>>,

    // Emission config
    schedule: Var<EmissionSchedule>,
    height_interval_ms: Var<u64>,

    // Pool registry
    pools: Mapping<u32, PoolInfo>,
    pool_count: Var<u32>,
    total_weight: Var<u64>,

    // Per-(pool, user) positions
    positions: Mapping<(u32, Address), Position>,

    // Roles
    owner: Var<Address>,
    dev: Var<Address>,
}

#[odra::module]
impl FarmLedger {
    // ==========================================
    // Initialization
    // ==========================================

    /// Initialize the ledger. The caller becomes the owner.
    ///
    /// The ledger must be made owner of `reward_token` before any pool
    /// accrues, otherwise settlement reverts on mint.
    pub fn init(
        &mut self,
        reward_token: Address,
        dev: Address,
        reward_per_height: U256,
        start_height: u64,
        bonus_end_height: u64,
        bonus_multiplier: u64,
        height_interval_ms: u64,
    ) {
        if height_interval_ms == 0 || bonus_multiplier == 0 {
            self.env().revert(LedgerError::InvalidConfiguration);
        }
        self.reward_token.set(reward_token);
        self.migrator.set(None);
        self.schedule.set(EmissionSchedule {
            reward_per_height,
            start_height,
            bonus_end_height,
            bonus_multiplier,
        });
        self.height_interval_ms.set(height_interval_ms);
        self.pool_count.set(0);
        self.total_weight.set(0);
        self.owner.set(self.env().caller());
        self.dev.set(dev);
    }

    // ==========================================
    // Depositor Functions
    // ==========================================

    /// Lock `amount` of the pool's staked token and harvest pending reward.
    /// A zero amount only harvests.
    pub fn deposit(&mut self, pool_id: u32, amount: U256) {
        let caller = self.env().caller();
        let pool = self.pool(pool_id);
        let pool = self.settle_pool(pool_id, pool);
        let acc = pool.accrual.acc_reward_per_share;

        let key = (pool_id, caller);
        let mut position = self.positions.get(&key).unwrap_or_default();
        if !position.amount.is_zero() {
            self.pay_reward(caller, pool_id, position.pending(acc));
        }
        if !amount.is_zero() {
            self.pull_stake(pool.staked_token, caller, amount);
            position.amount += amount;
        }
        position.checkpoint(acc);
        self.positions.set(&key, position);

        self.env().emit_event(events::Deposited {
            user: caller,
            pool_id,
            amount,
        });
    }

    /// Unlock `amount` and harvest pending reward.
    pub fn withdraw(&mut self, pool_id: u32, amount: U256) {
        let caller = self.env().caller();
        let pool = self.pool(pool_id);

        let key = (pool_id, caller);
        let mut position = self.positions.get(&key).unwrap_or_default();
        if amount > position.amount {
            self.env().revert(LedgerError::InsufficientBalance);
        }

        let pool = self.settle_pool(pool_id, pool);
        let acc = pool.accrual.acc_reward_per_share;
        self.pay_reward(caller, pool_id, position.pending(acc));
        if !amount.is_zero() {
            position.amount -= amount;
            self.push_stake(pool.staked_token, caller, amount);
        }
        position.checkpoint(acc);
        self.positions.set(&key, position);

        self.env().emit_event(events::Withdrawn {
            user: caller,
            pool_id,
            amount,
        });
    }

    /// Return the caller's whole stake without settling or paying reward.
    /// Unclaimed reward is forfeited. Never calls the reward token.
    pub fn emergency_withdraw(&mut self, pool_id: u32) {
        let caller = self.env().caller();
        let pool = self.pool(pool_id);

        let key = (pool_id, caller);
        let amount = self.positions.get(&key).unwrap_or_default().amount;
        self.positions.set(&key, Position::default());
        if !amount.is_zero() {
            self.push_stake(pool.staked_token, caller, amount);
        }

        self.env().emit_event(events::EmergencyWithdrawn {
            user: caller,
            pool_id,
            amount,
        });
    }

    /// Settle one pool to the current height
    pub fn update_pool(&mut self, pool_id: u32) {
        let pool = self.pool(pool_id);
        self.settle_pool(pool_id, pool);
    }

    /// Settle every pool to the current height
    pub fn mass_update_pools(&mut self) {
        let count = self.pool_count.get_or_default();
        for pool_id in 0..count {
            self.update_pool(pool_id);
        }
    }

    // ==========================================
    // Pool Registry (owner only)
    // ==========================================

    /// Register a new pool. Accrual starts at the current height (or the
    /// emission start if later). `with_update` settles every existing pool
    /// before the total weight changes.
    pub fn add_pool(&mut self, weight: u64, staked_token: Address, with_update: bool) {
        self.require_owner();
        if with_update {
            self.mass_update_pools();
        }

        let total_weight = self
            .total_weight
            .get_or_default()
            .checked_add(weight)
            .unwrap_or_else(|| self.env().revert(LedgerError::InvalidConfiguration));

        let pool_id = self.pool_count.get_or_default();
        let start = self.schedule().initial_height(self.current_height());
        self.pools.set(
            &pool_id,
            PoolInfo {
                staked_token,
                accrual: PoolAccrual::new(weight, start),
            },
        );
        self.pool_count.set(pool_id + 1);
        self.total_weight.set(total_weight);

        self.env().emit_event(events::PoolAdded {
            pool_id,
            staked_token,
            weight,
        });
    }

    /// Change a pool's weight. The pool is settled first so the new weight
    /// only applies from the current height on.
    pub fn set_weight(&mut self, pool_id: u32, weight: u64, with_update: bool) {
        self.require_owner();
        if with_update {
            self.mass_update_pools();
        } else {
            self.update_pool(pool_id);
        }

        let mut pool = self.pool(pool_id);
        let old_weight = pool.accrual.weight;
        let total = self
            .total_weight
            .get_or_default()
            .checked_sub(old_weight)
            .and_then(|rest| rest.checked_add(weight))
            .unwrap_or_else(|| self.env().revert(LedgerError::InvalidConfiguration));
        self.total_weight.set(total);
        pool.accrual.weight = weight;
        self.pools.set(&pool_id, pool);

        self.env().emit_event(events::PoolWeightSet {
            pool_id,
            old_weight,
            new_weight: weight,
        });
    }

    /// Set or clear the migrator
    pub fn set_migrator(&mut self, migrator: Option<Address>) {
        self.require_owner();
        self.migrator.set(migrator);
        self.env().emit_event(events::MigratorSet { migrator });
    }

    /// Hand the owner role to another address (only owner)
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        let previous_owner = self.require_owner();
        self.owner.set(new_owner);
        self.env().emit_event(events::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
    }

    /// Rotate the dev beneficiary (only the current dev)
    pub fn set_dev(&mut self, new_dev: Address) {
        let caller = self.env().caller();
        let old_dev = self.dev_address();
        if caller != old_dev {
            self.env().revert(LedgerError::Unauthorized);
        }
        self.dev.set(new_dev);
        self.env().emit_event(events::DevSet { old_dev, new_dev });
    }

    // ==========================================
    // Migration
    // ==========================================

    /// Move a pool's whole stake to the token the migrator hands back.
    ///
    /// Positions are denominated in staked units, not in a token identity,
    /// so they stay valid against the new token unchanged.
    pub fn migrate(&mut self, pool_id: u32) {
        let migrator = match self.migrator.get_or_default() {
            Some(migrator) => migrator,
            None => self.env().revert(LedgerError::NoMigratorConfigured),
        };
        let pool = self.pool(pool_id);
        let mut pool = self.settle_pool(pool_id, pool);

        let self_address = self.env().self_address();
        let old_token = pool.staked_token;
        let mut old_asset = StakedAssetContractRef::new(self.env().clone(), old_token);
        let amount = old_asset.balance_of(self_address);
        let old_pair = old_asset.pair();
        old_asset.approve(migrator, amount);

        let mut migrator_ref = MigratorContractRef::new(self.env().clone(), migrator);
        let new_token = migrator_ref.migrate(old_token, amount);
        if new_token == old_token {
            self.env().revert(LedgerError::MigrationRejected);
        }

        // Reject before the swap is written: a mismatched pool is unrecoverable
        let new_asset = StakedAssetContractRef::new(self.env().clone(), new_token);
        if !old_pair.same_assets(&new_asset.pair()) {
            self.env().revert(LedgerError::MigrationRejected);
        }
        if new_asset.balance_of(self_address) < amount {
            self.env().revert(LedgerError::MigrationRejected);
        }

        pool.staked_token = new_token;
        self.pools.set(&pool_id, pool);

        self.env().emit_event(events::PoolMigrated {
            pool_id,
            old_token,
            new_token,
            amount,
        });
    }

    // ==========================================
    // View Functions
    // ==========================================

    /// Reward `user` would harvest from `pool_id` at the current height
    pub fn pending_reward(&self, pool_id: u32, user: Address) -> U256 {
        let pool = self.pool(pool_id);
        let position = self.positions.get(&(pool_id, user)).unwrap_or_default();
        let acc = pool.accrual.projected_acc(
            self.current_height(),
            self.staked_supply(pool.staked_token),
            &self.schedule(),
            self.total_weight.get_or_default(),
        );
        position.pending(acc)
    }

    pub fn pool_info(&self, pool_id: u32) -> PoolInfo {
        self.pool(pool_id)
    }

    pub fn position_of(&self, pool_id: u32, user: Address) -> Position {
        self.positions.get(&(pool_id, user)).unwrap_or_default()
    }

    pub fn pool_length(&self) -> u32 {
        self.pool_count.get_or_default()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight.get_or_default()
    }

    /// Current height as read from the block time
    pub fn current_height(&self) -> u64 {
        let interval = self.height_interval_ms.get_or_default();
        if interval == 0 {
            return 0;
        }
        self.env().get_block_time() / interval
    }

    pub fn height_interval_ms(&self) -> u64 {
        self.height_interval_ms.get_or_default()
    }

    pub fn schedule(&self) -> EmissionSchedule {
        self.schedule
            .get()
            .unwrap_or_else(|| self.env().revert(LedgerError::InvalidConfiguration))
    }

    /// Total reward emitted across all pools in `[from, to)`
    pub fn emission_between(&self, from: u64, to: u64) -> U256 {
        self.schedule().emission(from, to)
    }

    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token.get()
    }

    pub fn migrator(&self) -> Option<Address> {
        self.migrator.get_or_default()
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    pub fn dev(&self) -> Option<Address> {
        self.dev.get()
    }

    // ==========================================
    // Internal Functions
    // ==========================================

    fn require_owner(&self) -> Address {
        let caller = self.env().caller();
        if self.owner.get() != Some(caller) {
            self.env().revert(LedgerError::Unauthorized);
        }
        caller
    }

    fn pool(&self, pool_id: u32) -> PoolInfo {
        self.pools
            .get(&pool_id)
            .unwrap_or_else(|| self.env().revert(LedgerError::UnknownPool))
    }

    fn reward_token_address(&self) -> Address {
        self.reward_token
            .get()
            .unwrap_or_else(|| self.env().revert(LedgerError::InvalidConfiguration))
    }

    fn dev_address(&self) -> Address {
        self.dev
            .get()
            .unwrap_or_else(|| self.env().revert(LedgerError::InvalidConfiguration))
    }

    /// Ledger's own balance of a staked token
    fn staked_supply(&self, staked_token: Address) -> U256 {
        StakedAssetContractRef::new(self.env().clone(), staked_token).balance_of(self.env().self_address())
    }

    /// Bring `pool` to the current height, mint its reward and store it.
    fn settle_pool(&mut self, pool_id: u32, mut pool: PoolInfo) -> PoolInfo {
        let height = self.current_height();
        if height <= pool.accrual.last_settled_height {
            return pool;
        }

        let staked_supply = self.staked_supply(pool.staked_token);
        let schedule = self.schedule();
        let total_weight = self.total_weight.get_or_default();
        if let Some(settlement) =
            pool.accrual
                .settle(height, staked_supply, &schedule, total_weight)
        {
            self.mint_settlement(pool_id, &settlement);
        }
        self.pools.set(&pool_id, pool.clone());
        pool
    }

    /// Dev share and pool reward are two separate mints; both grow supply.
    fn mint_settlement(&mut self, pool_id: u32, settlement: &Settlement) {
        let mut reward = RewardMintContractRef::new(self.env().clone(), self.reward_token_address());
        if !settlement.dev_reward.is_zero() {
            reward.mint(self.dev_address(), settlement.dev_reward);
        }
        reward.mint(self.env().self_address(), settlement.pool_reward);

        self.env().emit_event(events::PoolSettled {
            pool_id,
            from_height: settlement.from_height,
            to_height: settlement.to_height,
            pool_reward: settlement.pool_reward,
            dev_reward: settlement.dev_reward,
        });
    }

    /// Pay `owed` from custody, capped at what custody holds.
    fn pay_reward(&mut self, user: Address, pool_id: u32, owed: U256) {
        if owed.is_zero() {
            return;
        }
        let mut reward = RewardMintContractRef::new(self.env().clone(), self.reward_token_address());
        let custody = reward.balance_of(self.env().self_address());
        let (paid, shortfall) = capped_payout(owed, custody);
        if !paid.is_zero() {
            reward.transfer(user, paid);
        }
        if !shortfall.is_zero() {
            self.env().emit_event(events::RewardShortfall {
                user,
                pool_id,
                owed,
                paid,
            });
        }
        self.env().emit_event(events::RewardPaid {
            user,
            pool_id,
            amount: paid,
        });
    }

    /// transferIn: move `amount` of `staked_token` from `from` into custody
    fn pull_stake(&self, staked_token: Address, from: Address, amount: U256) {
        let self_address = self.env().self_address();
        let mut asset = StakedAssetContractRef::new(self.env().clone(), staked_token);
        if asset.allowance(from, self_address) < amount {
            self.env().revert(LedgerError::InsufficientAllowance);
        }
        if asset.balance_of(from) < amount {
            self.env().revert(LedgerError::InsufficientBalance);
        }
        asset.transfer_from(from, self_address, amount);
    }

    /// transferOut: move `amount` of `staked_token` from custody to `to`
    fn push_stake(&self, staked_token: Address, to: Address, amount: U256) {
        let mut asset = StakedAssetContractRef::new(self.env().clone(), staked_token);
        if asset.balance_of(self.env().self_address()) < amount {
            self.env().revert(LedgerError::InsufficientBalance);
        }
        asset.transfer(to, amount);
    }
}
