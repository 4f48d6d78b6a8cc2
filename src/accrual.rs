//! Accumulated-reward-per-share bookkeeping
//!
//! Plain state transitions used by the ledger contract. A pool tracks how many
//! reward units one staked unit has earned since creation (`acc_reward_per_share`,
//! scaled by [`ACC_REWARD_PRECISION`]); a position remembers the part of that
//! it has already been paid (`reward_debt`). Pending reward is the difference.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::emission::EmissionSchedule;

/// Scale applied to `acc_reward_per_share` to survive integer division.
pub const ACC_REWARD_PRECISION: u128 = 1_000_000_000_000;

/// Dev beneficiary receives `pool_reward / DEV_DIVISOR` on top of the pool reward.
pub const DEV_DIVISOR: u64 = 10;

/// Per-pool accrual state.
#[odra::odra_type]
#[derive(Default)]
pub struct PoolAccrual {
    /// Relative share of the global emission
    pub weight: u64,
    /// Height through which the pool has been settled
    pub last_settled_height: u64,
    /// Reward units per staked unit, scaled by `ACC_REWARD_PRECISION`
    pub acc_reward_per_share: U256,
}

/// A depositor's locked amount and reward baseline within one pool.
#[odra::odra_type]
#[derive(Default)]
pub struct Position {
    pub amount: U256,
    pub reward_debt: U256,
}

/// Reward produced by one settlement of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub from_height: u64,
    pub to_height: u64,
    /// Minted to ledger custody and distributed to depositors
    pub pool_reward: U256,
    /// Minted separately to the dev beneficiary
    pub dev_reward: U256,
}

fn precision() -> U256 {
    U256::from(ACC_REWARD_PRECISION)
}

impl PoolAccrual {
    pub fn new(weight: u64, start_height: u64) -> Self {
        Self {
            weight,
            last_settled_height: start_height,
            acc_reward_per_share: U256::zero(),
        }
    }

    /// This pool's slice of the emission between its last settlement and `height`.
    ///
    /// Truncates toward zero; the remainder stays unminted.
    pub fn reward_until(&self, height: u64, schedule: &EmissionSchedule, total_weight: u64) -> U256 {
        if total_weight == 0 || self.weight == 0 {
            return U256::zero();
        }
        schedule.emission(self.last_settled_height, height) * U256::from(self.weight)
            / U256::from(total_weight)
    }

    /// `acc_reward_per_share` as settlement at `height` would leave it.
    pub fn projected_acc(
        &self,
        height: u64,
        staked_supply: U256,
        schedule: &EmissionSchedule,
        total_weight: u64,
    ) -> U256 {
        if height <= self.last_settled_height || staked_supply.is_zero() {
            return self.acc_reward_per_share;
        }
        let reward = self.reward_until(height, schedule, total_weight);
        self.acc_reward_per_share + reward * precision() / staked_supply
    }

    /// Brings the pool up to `height`.
    ///
    /// Returns the amounts to mint, or `None` when nothing accrues: the pool is
    /// already settled at `height`, holds no stake, or has no emission share.
    /// An empty pool still advances `last_settled_height`, so the interval it
    /// sat empty is never paid out later.
    pub fn settle(
        &mut self,
        height: u64,
        staked_supply: U256,
        schedule: &EmissionSchedule,
        total_weight: u64,
    ) -> Option<Settlement> {
        if height <= self.last_settled_height {
            return None;
        }
        let from_height = self.last_settled_height;
        let pool_reward = if staked_supply.is_zero() {
            U256::zero()
        } else {
            self.reward_until(height, schedule, total_weight)
        };
        self.last_settled_height = height;
        if pool_reward.is_zero() {
            return None;
        }
        self.acc_reward_per_share += pool_reward * precision() / staked_supply;
        Some(Settlement {
            from_height,
            to_height: height,
            pool_reward,
            dev_reward: pool_reward / U256::from(DEV_DIVISOR),
        })
    }
}

impl Position {
    /// Everything this position has earned against `acc`, paid or not.
    pub fn accrued(&self, acc_reward_per_share: U256) -> U256 {
        self.amount * acc_reward_per_share / precision()
    }

    /// Reward earned since the last checkpoint.
    ///
    /// `acc_reward_per_share` never decreases, so this cannot underflow for an
    /// acc at or after the one the debt was taken against.
    pub fn pending(&self, acc_reward_per_share: U256) -> U256 {
        self.accrued(acc_reward_per_share) - self.reward_debt
    }

    /// Marks everything accrued so far as accounted for.
    pub fn checkpoint(&mut self, acc_reward_per_share: U256) {
        self.reward_debt = self.accrued(acc_reward_per_share);
    }
}

/// Splits `owed` into what custody can cover and the shortfall.
pub fn capped_payout(owed: U256, custody_balance: U256) -> (U256, U256) {
    if owed <= custody_balance {
        (owed, U256::zero())
    } else {
        (custody_balance, owed - custody_balance)
    }
}
