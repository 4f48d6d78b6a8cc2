//! Farm x Casper: Multi-pool Staking Ledger (Odra)
//!
//! This crate implements an emission-scheduled staking farm on Casper using the Odra framework.
//! - FarmLedger: pools of staked LP tokens earning a per-height reward emission
//! - RewardToken / LpToken: CEP-18 reward asset and staked asset
//! - LpMigrator: moves a pool's stake to a replacement LP token
//! - RewardVault: share vault for the reward token
//! - FarmTimelock: delayed owner of the ledger

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

pub mod accrual;
pub mod emission;
pub mod external;
pub mod ledger;
pub mod migrator;
pub mod timelock;
pub mod tokens;
pub mod vault;
