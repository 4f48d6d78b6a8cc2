//! External contract interfaces the farm depends on
//!
//! The ledger only talks to its collaborators through these traits, so any
//! contract exposing the same entry points can stand in:
//! - `RewardMint`: reward token, the ledger must be allowed to mint
//! - `StakedAsset`: CEP-18 staked token that also reports its asset pair
//! - `Migrator`: moves a pool's stake from an old LP token to a new one
//! - `FungibleAsset`: plain CEP-18 subset, used by the reward vault

use odra::casper_types::U256;
use odra::prelude::*;

use crate::tokens::AssetPair;

/// Reward token as seen by the ledger
#[odra::external_contract]
pub trait RewardMint {
    /// Create `amount` new units for `to`
    fn mint(&mut self, to: Address, amount: U256);

    fn balance_of(&self, owner: Address) -> U256;

    fn transfer(&mut self, recipient: Address, amount: U256);
}

/// Staked (LP) token of a pool
#[odra::external_contract]
pub trait StakedAsset {
    fn balance_of(&self, owner: Address) -> U256;

    fn allowance(&self, owner: Address, spender: Address) -> U256;

    fn transfer(&mut self, recipient: Address, amount: U256);

    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);

    fn approve(&mut self, spender: Address, amount: U256);

    /// Underlying assets the token represents
    fn pair(&self) -> AssetPair;
}

/// Pool token migrator
#[odra::external_contract]
pub trait Migrator {
    /// Take `amount` of `old_token` from the caller (already approved) and
    /// credit the caller with an equivalent position in a new token.
    ///
    /// # Returns
    /// Address of the new token
    fn migrate(&mut self, old_token: Address, amount: U256) -> Address;
}

/// Plain CEP-18 token
#[odra::external_contract]
pub trait FungibleAsset {
    fn balance_of(&self, owner: Address) -> U256;

    fn allowance(&self, owner: Address, spender: Address) -> U256;

    fn transfer(&mut self, recipient: Address, amount: U256);

    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
}
