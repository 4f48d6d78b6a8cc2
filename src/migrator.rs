//! LP Migrator Contract
//!
//! Moves a farm pool's stake from an old LP token to its replacement.
//! - Only the farm ledger may call `migrate`, and not before `not_before`
//! - The owner registers which new LP token replaces which old one
//! - The old LP is escrowed here; the same amount of new LP is minted to the
//!   ledger, so this contract must be the new token's minter

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::external::StakedAssetContractRef;
use crate::tokens::LpTokenContractRef;

pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct RouteSet {
        pub old_token: Address,
        pub new_token: Address,
    }

    #[odra::event]
    pub struct Migrated {
        pub old_token: Address,
        pub new_token: Address,
        pub amount: U256,
    }
}

#[odra::odra_error]
pub enum MigratorError {
    Unauthorized = 101,
    TooEarly = 102,
    UnknownRoute = 103,
}

#[odra::module(events = [events::RouteSet, events::Migrated], errors = MigratorError)]
pub struct LpMigrator {
    ledger: Var<Address>,
    owner: Var<Address>,
    /// Block time (ms) before which `migrate` reverts
    not_before: Var<u64>,
    /// old LP token -> new LP token
    routes: Mapping<Address, Address>,
}

#[odra::module]
impl LpMigrator {
    pub fn init(&mut self, ledger: Address, not_before: u64) {
        self.ledger.set(ledger);
        self.not_before.set(not_before);
        self.owner.set(self.env().caller());
    }

    /// Register the replacement for `old_token` (only owner)
    pub fn set_route(&mut self, old_token: Address, new_token: Address) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(MigratorError::Unauthorized);
        }
        self.routes.set(&old_token, new_token);
        self.env().emit_event(events::RouteSet {
            old_token,
            new_token,
        });
    }

    pub fn route_of(&self, old_token: Address) -> Option<Address> {
        self.routes.get(&old_token)
    }

    pub fn ledger(&self) -> Option<Address> {
        self.ledger.get()
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    pub fn not_before(&self) -> u64 {
        self.not_before.get_or_default()
    }

    /// Escrow `amount` of `old_token` from the ledger and mint the same amount
    /// of the routed new token back to it.
    pub fn migrate(&mut self, old_token: Address, amount: U256) -> Address {
        let caller = self.env().caller();
        if self.ledger.get() != Some(caller) {
            self.env().revert(MigratorError::Unauthorized);
        }
        if self.env().get_block_time() < self.not_before.get_or_default() {
            self.env().revert(MigratorError::TooEarly);
        }
        let new_token = self
            .routes
            .get(&old_token)
            .unwrap_or_else(|| self.env().revert(MigratorError::UnknownRoute));

        let mut old_asset = StakedAssetContractRef::new(self.env().clone(), old_token);
        old_asset.transfer_from(caller, self.env().self_address(), amount);

        let mut new_asset = LpTokenContractRef::new(self.env().clone(), new_token);
        new_asset.mint(caller, amount);

        self.env().emit_event(events::Migrated {
            old_token,
            new_token,
            amount,
        });
        new_token
    }
}
