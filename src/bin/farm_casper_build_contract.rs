//! Build contract binary for Odra WASM generation
//!
//! Compiled to WASM only; pulls in every farm contract so their entry points are exported.

#![cfg_attr(target_arch = "wasm32", no_std)]
#![cfg_attr(target_arch = "wasm32", no_main)]

#[cfg(target_arch = "wasm32")]
extern crate odra_casper_wasm_env;

#[cfg(target_arch = "wasm32")]
use farm_casper::ledger::FarmLedger;
#[cfg(target_arch = "wasm32")]
use farm_casper::migrator::LpMigrator;
#[cfg(target_arch = "wasm32")]
use farm_casper::timelock::FarmTimelock;
#[cfg(target_arch = "wasm32")]
use farm_casper::tokens::{LpToken, RewardToken};
#[cfg(target_arch = "wasm32")]
use farm_casper::vault::RewardVault;
#[cfg(target_arch = "wasm32")]
use odra_casper_wasm_env as _;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    panic!("farm_casper_build_contract is intended to be built for wasm32-unknown-unknown only");
}
