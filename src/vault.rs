//! Reward Vault Contract
//!
//! Stake the reward token for vault shares (a CEP-18 token). Reward tokens
//! sent straight to the vault raise the value of every share.
//!
//! ## Share math
//! - enter: `shares = amount * total_shares / vault_balance` (1:1 when empty)
//! - leave: `amount = shares * vault_balance / total_shares`
//!
//! Both round down in favour of the vault.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;
use odra_modules::cep18::events::{Burn, Mint, SetAllowance, Transfer, TransferFrom};
use odra_modules::cep18_token::Cep18;

use crate::external::FungibleAssetContractRef;

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct Entered {
        pub user: Address,
        pub amount: U256,
        pub shares: U256,
    }

    #[odra::event]
    pub struct Left {
        pub user: Address,
        pub shares: U256,
        pub amount: U256,
    }
}

#[odra::odra_error]
pub enum VaultError {
    InsufficientBalance = 201,
    InsufficientAllowance = 202,
    InsufficientShares = 203,
    NotInitialized = 204,
}

#[odra::module(
    events = [
        Mint,
        Burn,
        SetAllowance,
        Transfer,
        TransferFrom,
        events::Entered,
        events::Left
    ],
    errors = VaultError
)]
pub struct RewardVault {
    shares: SubModule<Cep18>,
    reward_token: Var<Address>,
}

#[odra::module]
impl RewardVault {
    pub fn init(&mut self, reward_token: Address, symbol: String, name: String) {
        self.shares.init(symbol, name, 18u8, U256::zero());
        self.reward_token.set(reward_token);
    }

    // ==========================================
    // Staking
    // ==========================================

    /// Lock `amount` of the reward token and receive shares
    pub fn enter(&mut self, amount: U256) {
        let caller = self.env().caller();
        let self_address = self.env().self_address();
        let mut reward = FungibleAssetContractRef::new(self.env().clone(), self.reward_token_address());

        if reward.allowance(caller, self_address) < amount {
            self.env().revert(VaultError::InsufficientAllowance);
        }
        if reward.balance_of(caller) < amount {
            self.env().revert(VaultError::InsufficientBalance);
        }

        let held = reward.balance_of(self_address);
        let total_shares = self.shares.total_supply();
        let minted = if total_shares.is_zero() || held.is_zero() {
            amount
        } else {
            amount * total_shares / held
        };

        self.shares.raw_mint(&caller, &minted);
        reward.transfer_from(caller, self_address, amount);

        self.env().emit_event(events::Entered {
            user: caller,
            amount,
            shares: minted,
        });
    }

    /// Burn `shares` and receive their slice of the vault balance
    pub fn leave(&mut self, shares: U256) {
        let caller = self.env().caller();
        if self.shares.balance_of(&caller) < shares {
            self.env().revert(VaultError::InsufficientShares);
        }
        let total_shares = self.shares.total_supply();
        if total_shares.is_zero() {
            return;
        }

        let mut reward = FungibleAssetContractRef::new(self.env().clone(), self.reward_token_address());
        let held = reward.balance_of(self.env().self_address());
        let amount = shares * held / total_shares;

        self.shares.raw_burn(&caller, &shares);
        if !amount.is_zero() {
            reward.transfer(caller, amount);
        }

        self.env().emit_event(events::Left {
            user: caller,
            shares,
            amount,
        });
    }

    // ==========================================
    // View Functions
    // ==========================================

    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token.get()
    }

    /// Reward tokens currently backing all shares
    pub fn vault_balance(&self) -> U256 {
        FungibleAssetContractRef::new(self.env().clone(), self.reward_token_address())
            .balance_of(self.env().self_address())
    }

    // ==========================================
    // Share token (CEP-18)
    // ==========================================

    pub fn name(&self) -> String {
        self.shares.name()
    }

    pub fn symbol(&self) -> String {
        self.shares.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.shares.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.shares.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.shares.balance_of(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.shares.allowance(&owner, &spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.shares.transfer(&recipient, &amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        self.shares.approve(&spender, &amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.shares.transfer_from(&owner, &recipient, &amount);
    }

    fn reward_token_address(&self) -> Address {
        self.reward_token
            .get()
            .unwrap_or_else(|| self.env().revert(VaultError::NotInitialized))
    }
}
