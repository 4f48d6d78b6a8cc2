//! Farm Timelock Contract
//!
//! Delayed owner of the farm ledger. The admin queues typed controller actions
//! with an `eta`; once the eta has passed anyone can execute them, until the
//! grace period runs out.
//!
//! ## Timing (block time, ms)
//! - queue: `eta >= now + delay`
//! - execute: `eta <= now <= eta + GRACE_PERIOD_MS`
//! - `delay` is fixed at init within `[MINIMUM_DELAY_MS, MAXIMUM_DELAY_MS]`

use odra::prelude::*;
use odra::ContractRef;

use crate::ledger::FarmLedgerContractRef;

// ==========================================
// Constants
// ==========================================

pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;
pub const GRACE_PERIOD_MS: u64 = 14 * DAY_MS;
pub const MINIMUM_DELAY_MS: u64 = 2 * DAY_MS;
pub const MAXIMUM_DELAY_MS: u64 = 30 * DAY_MS;

// ==========================================
// Events
// ==========================================

pub mod events {
    use super::ActionKind;
    use odra::prelude::*;

    #[odra::event]
    pub struct ActionQueued {
        pub action_id: u32,
        pub kind: ActionKind,
        pub eta: u64,
    }

    #[odra::event]
    pub struct ActionExecuted {
        pub action_id: u32,
        pub kind: ActionKind,
    }

    #[odra::event]
    pub struct ActionCancelled {
        pub action_id: u32,
    }

    #[odra::event]
    pub struct PendingAdminSet {
        pub pending_admin: Address,
    }

    #[odra::event]
    pub struct AdminAccepted {
        pub previous_admin: Address,
        pub new_admin: Address,
    }
}

// ==========================================
// Types
// ==========================================

/// Ledger controller call carried by a queued action
#[odra::odra_type]
#[derive(Default)]
pub enum ActionKind {
    #[default]
    AddPool = 0,
    SetWeight = 1,
    SetMigrator = 2,
    TransferOwnership = 3,
}

#[odra::odra_type]
#[derive(Default)]
pub enum ActionStatus {
    #[default]
    Queued = 0,
    Executed = 1,
    Cancelled = 2,
}

/// A queued controller action. Fields a kind does not use stay at defaults.
#[odra::odra_type]
pub struct QueuedAction {
    pub kind: ActionKind,
    pub pool_id: u32,
    pub weight: u64,
    /// Staked token (AddPool), migrator (SetMigrator) or new owner (TransferOwnership)
    pub target: Option<Address>,
    pub with_update: bool,
    pub eta: u64,
    pub status: ActionStatus,
}

// ==========================================
// Errors
// ==========================================

#[odra::odra_error]
pub enum TimelockError {
    Unauthorized = 301,
    InvalidDelay = 302,
    EtaTooSoon = 303,
    UnknownAction = 304,
    NotQueued = 305,
    NotReady = 306,
    Stale = 307,
    MissingTarget = 308,
}

// ==========================================
// Contract
// ==========================================

#[odra::module(
    events = [
        events::ActionQueued,
        events::ActionExecuted,
        events::ActionCancelled,
        events::PendingAdminSet,
        events::AdminAccepted
    ],
    errors = TimelockError
)]
pub struct FarmTimelock {
    ledger: Var<Address>,
    admin: Var<Address>,
    pending_admin: Var<Option<Address>>,
    delay: Var<u64>,
    actions: Mapping<u32, QueuedAction>,
    action_count: Var<u32>,
}

#[odra::module]
impl FarmTimelock {
    /// Initialize with the ledger it controls. The caller becomes admin.
    pub fn init(&mut self, ledger: Address, delay: u64) {
        if !(MINIMUM_DELAY_MS..=MAXIMUM_DELAY_MS).contains(&delay) {
            self.env().revert(TimelockError::InvalidDelay);
        }
        self.ledger.set(ledger);
        self.delay.set(delay);
        self.admin.set(self.env().caller());
        self.pending_admin.set(None);
        self.action_count.set(0);
    }

    // ==========================================
    // Queueing (admin only)
    // ==========================================

    pub fn queue_add_pool(
        &mut self,
        weight: u64,
        staked_token: Address,
        with_update: bool,
        eta: u64,
    ) -> u32 {
        self.queue(QueuedAction {
            kind: ActionKind::AddPool,
            pool_id: 0,
            weight,
            target: Some(staked_token),
            with_update,
            eta,
            status: ActionStatus::Queued,
        })
    }

    pub fn queue_set_weight(&mut self, pool_id: u32, weight: u64, with_update: bool, eta: u64) -> u32 {
        self.queue(QueuedAction {
            kind: ActionKind::SetWeight,
            pool_id,
            weight,
            target: None,
            with_update,
            eta,
            status: ActionStatus::Queued,
        })
    }

    /// `None` clears the ledger's migrator
    pub fn queue_set_migrator(&mut self, migrator: Option<Address>, eta: u64) -> u32 {
        self.queue(QueuedAction {
            kind: ActionKind::SetMigrator,
            pool_id: 0,
            weight: 0,
            target: migrator,
            with_update: false,
            eta,
            status: ActionStatus::Queued,
        })
    }

    pub fn queue_transfer_ownership(&mut self, new_owner: Address, eta: u64) -> u32 {
        self.queue(QueuedAction {
            kind: ActionKind::TransferOwnership,
            pool_id: 0,
            weight: 0,
            target: Some(new_owner),
            with_update: false,
            eta,
            status: ActionStatus::Queued,
        })
    }

    /// Drop a queued action (only admin)
    pub fn cancel(&mut self, action_id: u32) {
        self.require_admin();
        let mut action = self.queued(action_id);
        action.status = ActionStatus::Cancelled;
        self.actions.set(&action_id, action);
        self.env().emit_event(events::ActionCancelled { action_id });
    }

    // ==========================================
    // Execution
    // ==========================================

    /// Run a queued action against the ledger. Callable by anyone inside the
    /// execution window.
    pub fn execute(&mut self, action_id: u32) {
        let mut action = self.queued(action_id);
        if let Err(error) = check_window(action.eta, self.env().get_block_time()) {
            self.env().revert(error);
        }

        let kind = action.kind.clone();
        let mut ledger = FarmLedgerContractRef::new(self.env().clone(), self.ledger_address());
        match &kind {
            ActionKind::AddPool => {
                let staked_token = self.require_target(&action);
                ledger.add_pool(action.weight, staked_token, action.with_update);
            }
            ActionKind::SetWeight => {
                ledger.set_weight(action.pool_id, action.weight, action.with_update);
            }
            ActionKind::SetMigrator => {
                ledger.set_migrator(action.target);
            }
            ActionKind::TransferOwnership => {
                let new_owner = self.require_target(&action);
                ledger.transfer_ownership(new_owner);
            }
        }

        action.status = ActionStatus::Executed;
        self.actions.set(&action_id, action);
        self.env().emit_event(events::ActionExecuted { action_id, kind });
    }

    // ==========================================
    // Admin handover
    // ==========================================

    /// Nominate the next admin (only admin)
    pub fn set_pending_admin(&mut self, pending_admin: Address) {
        self.require_admin();
        self.pending_admin.set(Some(pending_admin));
        self.env()
            .emit_event(events::PendingAdminSet { pending_admin });
    }

    /// Take over as admin (only the pending admin)
    pub fn accept_admin(&mut self) {
        let caller = self.env().caller();
        if self.pending_admin.get_or_default() != Some(caller) {
            self.env().revert(TimelockError::Unauthorized);
        }
        let previous_admin = self.admin_address();
        self.admin.set(caller);
        self.pending_admin.set(None);
        self.env().emit_event(events::AdminAccepted {
            previous_admin,
            new_admin: caller,
        });
    }

    // ==========================================
    // View Functions
    // ==========================================

    pub fn admin(&self) -> Option<Address> {
        self.admin.get()
    }

    pub fn pending_admin(&self) -> Option<Address> {
        self.pending_admin.get_or_default()
    }

    pub fn ledger(&self) -> Option<Address> {
        self.ledger.get()
    }

    pub fn delay(&self) -> u64 {
        self.delay.get_or_default()
    }

    pub fn action_count(&self) -> u32 {
        self.action_count.get_or_default()
    }

    pub fn action(&self, action_id: u32) -> QueuedAction {
        self.actions
            .get(&action_id)
            .unwrap_or_else(|| self.env().revert(TimelockError::UnknownAction))
    }

    // ==========================================
    // Internal Functions
    // ==========================================

    fn queue(&mut self, action: QueuedAction) -> u32 {
        self.require_admin();
        let earliest = self
            .env()
            .get_block_time()
            .saturating_add(self.delay.get_or_default());
        if action.eta < earliest {
            self.env().revert(TimelockError::EtaTooSoon);
        }

        let action_id = self.action_count.get_or_default();
        let kind = action.kind.clone();
        let eta = action.eta;
        self.actions.set(&action_id, action);
        self.action_count.set(action_id + 1);

        self.env().emit_event(events::ActionQueued {
            action_id,
            kind,
            eta,
        });
        action_id
    }

    /// Load an action that is still waiting to run
    fn queued(&self, action_id: u32) -> QueuedAction {
        let action = self.action(action_id);
        if action.status != ActionStatus::Queued {
            self.env().revert(TimelockError::NotQueued);
        }
        action
    }

    fn require_target(&self, action: &QueuedAction) -> Address {
        action
            .target
            .unwrap_or_else(|| self.env().revert(TimelockError::MissingTarget))
    }

    fn require_admin(&self) {
        if self.admin.get() != Some(self.env().caller()) {
            self.env().revert(TimelockError::Unauthorized);
        }
    }

    fn admin_address(&self) -> Address {
        self.admin
            .get()
            .unwrap_or_else(|| self.env().revert(TimelockError::Unauthorized))
    }

    fn ledger_address(&self) -> Address {
        self.ledger
            .get()
            .unwrap_or_else(|| self.env().revert(TimelockError::Unauthorized))
    }
}

/// An action with `eta` may run at `now` only inside `[eta, eta + GRACE_PERIOD_MS]`.
fn check_window(eta: u64, now: u64) -> Result<(), TimelockError> {
    if now < eta {
        return Err(TimelockError::NotReady);
    }
    if now > eta.saturating_add(GRACE_PERIOD_MS) {
        return Err(TimelockError::Stale);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_opens_at_eta_and_closes_after_grace() {
        let eta = 10 * DAY_MS;
        assert!(matches!(check_window(eta, eta - 1), Err(TimelockError::NotReady)));
        assert!(check_window(eta, eta).is_ok());
        assert!(check_window(eta, eta + GRACE_PERIOD_MS).is_ok());
        assert!(matches!(
            check_window(eta, eta + GRACE_PERIOD_MS + 1),
            Err(TimelockError::Stale)
        ));
    }

    #[test]
    fn window_end_saturates_near_u64_max() {
        let eta = u64::MAX - DAY_MS;
        assert!(check_window(eta, u64::MAX).is_ok());
    }
}
