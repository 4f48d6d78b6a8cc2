//! CEP-18 tokens: reward token and LP (staked) token
//!
//! - RewardToken: only the owner mints; the farm ledger becomes the owner
//! - LpToken: staked asset carrying its underlying pair; only the minter mints

use odra::casper_types::U256;
use odra::prelude::*;
use odra_modules::cep18::events::{Burn, Mint, SetAllowance, Transfer, TransferFrom};
use odra_modules::cep18_token::Cep18;

/// Additional token events
pub mod events {
    use odra::prelude::*;

    #[odra::event]
    pub struct OwnershipTransferred {
        pub previous_owner: Option<Address>,
        pub new_owner: Address,
    }

    #[odra::event]
    pub struct MinterSet {
        pub old_minter: Option<Address>,
        pub new_minter: Address,
    }
}

/// Errors for token operations (aligned with CEP-18 codes where applicable)
#[odra::odra_error]
pub enum TokenError {
    InsufficientBalance = 60001,
    InsufficientAllowance = 60002,
    CannotTargetSelfUser = 60003,
    Unauthorized = 60004,
    NotInitialized = 60005,
}

/// The two assets an LP token represents.
#[odra::odra_type]
pub struct AssetPair {
    pub token_a: Address,
    pub token_b: Address,
}

impl AssetPair {
    /// Same underlying assets, in either order.
    pub fn same_assets(&self, other: &AssetPair) -> bool {
        (self.token_a == other.token_a && self.token_b == other.token_b)
            || (self.token_a == other.token_b && self.token_b == other.token_a)
    }
}

/// Reward token: mintable only by its owner
#[odra::module(
    events = [
        Mint,
        Burn,
        SetAllowance,
        Transfer,
        TransferFrom,
        events::OwnershipTransferred
    ],
    errors = TokenError
)]
pub struct RewardToken {
    token: SubModule<Cep18>,
    owner: Var<Address>,
}

#[odra::module]
impl RewardToken {
    /// Initialize the token; the deployer becomes the owner
    pub fn init(&mut self, symbol: String, name: String) {
        self.token.init(symbol, name, 18u8, U256::zero());
        let owner = self.env().caller();
        self.owner.set(owner);
        self.env().emit_event(events::OwnershipTransferred {
            previous_owner: None,
            new_owner: owner,
        });
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    /// Hand ownership (and minting) to another address (only owner)
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        let previous_owner = self.require_owner();
        self.owner.set(new_owner);
        self.env().emit_event(events::OwnershipTransferred {
            previous_owner: Some(previous_owner),
            new_owner,
        });
    }

    /// Mint tokens (only owner)
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_owner();
        self.token.raw_mint(&to, &amount);
    }

    pub fn name(&self) -> String {
        self.token.name()
    }

    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    fn require_owner(&self) -> Address {
        let caller = self.env().caller();
        if self.owner.get() != Some(caller) {
            self.env().revert(TokenError::Unauthorized);
        }
        caller
    }
}

/// LP token: the staked asset of a farm pool
#[odra::module(
    events = [
        Mint,
        SetAllowance,
        Transfer,
        TransferFrom,
        events::MinterSet
    ],
    errors = TokenError
)]
pub struct LpToken {
    token: SubModule<Cep18>,
    pair: Var<AssetPair>,
    minter: Var<Address>,
}

#[odra::module]
impl LpToken {
    /// Initialize the token; `initial_supply` goes to the deployer, who is
    /// also the first minter
    pub fn init(
        &mut self,
        symbol: String,
        name: String,
        token_a: Address,
        token_b: Address,
        initial_supply: U256,
    ) {
        self.token.init(symbol, name, 18u8, initial_supply);
        self.pair.set(AssetPair { token_a, token_b });
        let minter = self.env().caller();
        self.minter.set(minter);
        self.env().emit_event(events::MinterSet {
            old_minter: None,
            new_minter: minter,
        });
    }

    /// Underlying assets of this LP token
    pub fn pair(&self) -> AssetPair {
        self.pair
            .get()
            .unwrap_or_else(|| self.env().revert(TokenError::NotInitialized))
    }

    pub fn minter(&self) -> Option<Address> {
        self.minter.get()
    }

    /// Set new minter (only current minter)
    pub fn set_minter(&mut self, new_minter: Address) {
        let old_minter = self.require_minter();
        self.minter.set(new_minter);
        self.env().emit_event(events::MinterSet {
            old_minter: Some(old_minter),
            new_minter,
        });
    }

    /// Mint tokens (only minter)
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_minter();
        self.token.raw_mint(&to, &amount);
    }

    pub fn name(&self) -> String {
        self.token.name()
    }

    pub fn symbol(&self) -> String {
        self.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.token.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.token.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.token.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.token.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.token.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.token.approve(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.token.transfer_from(&owner, &recipient, &amount);
    }

    fn require_minter(&self) -> Address {
        let caller = self.env().caller();
        if self.minter.get() != Some(caller) {
            self.env().revert(TokenError::Unauthorized);
        }
        caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_comparison_ignores_order() {
        let env = odra_test::env();
        let a = env.get_account(1);
        let b = env.get_account(2);
        let c = env.get_account(3);

        let ab = AssetPair { token_a: a, token_b: b };
        let ba = AssetPair { token_a: b, token_b: a };
        let ac = AssetPair { token_a: a, token_b: c };

        assert!(ab.same_assets(&ba));
        assert!(ab.same_assets(&ab));
        assert!(!ab.same_assets(&ac));
    }
}
