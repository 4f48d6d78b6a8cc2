//! Emission schedule
//!
//! Converts an interval of heights into emitted reward units. Heights before
//! `bonus_end_height` are weighted by `bonus_multiplier`, later heights by 1.
//! Nothing is emitted before `start_height`.

use odra::casper_types::U256;
use odra::prelude::*;

/// Per-height emission parameters, fixed at ledger init.
#[odra::odra_type]
pub struct EmissionSchedule {
    /// Reward units emitted per height at 1x
    pub reward_per_height: U256,
    /// First height that emits
    pub start_height: u64,
    /// Heights strictly below this emit at `bonus_multiplier`
    pub bonus_end_height: u64,
    /// Bonus weight, 1 disables the bonus
    pub bonus_multiplier: u64,
}

impl EmissionSchedule {
    /// Weighted number of heights in `[from, to)`.
    ///
    /// Returns zero for an empty or inverted interval. An interval that
    /// straddles `bonus_end_height` is split so neither side loses its rate.
    pub fn multiplier(&self, from: u64, to: u64) -> U256 {
        if to <= from {
            return U256::zero();
        }
        let bonus = U256::from(self.bonus_multiplier);
        if to <= self.bonus_end_height {
            U256::from(to - from) * bonus
        } else if from >= self.bonus_end_height {
            U256::from(to - from)
        } else {
            U256::from(self.bonus_end_height - from) * bonus
                + U256::from(to - self.bonus_end_height)
        }
    }

    /// Reward units emitted across all pools in `[from, to)`.
    pub fn emission(&self, from: u64, to: u64) -> U256 {
        let from = from.max(self.start_height);
        self.multiplier(from, to) * self.reward_per_height
    }

    /// Height a newly registered pool starts accruing from.
    pub fn initial_height(&self, now: u64) -> u64 {
        now.max(self.start_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(start: u64, bonus_end: u64, bonus: u64) -> EmissionSchedule {
        EmissionSchedule {
            reward_per_height: U256::from(100u64),
            start_height: start,
            bonus_end_height: bonus_end,
            bonus_multiplier: bonus,
        }
    }

    #[test]
    fn multiplier_inside_bonus_window() {
        let s = schedule(0, 1000, 10);
        assert_eq!(s.multiplier(100, 105), U256::from(50u64));
        assert_eq!(s.multiplier(995, 1000), U256::from(50u64));
    }

    #[test]
    fn multiplier_after_bonus_window() {
        let s = schedule(0, 600, 10);
        assert_eq!(s.multiplier(600, 605), U256::from(5u64));
        assert_eq!(s.multiplier(700, 710), U256::from(10u64));
    }

    #[test]
    fn multiplier_straddling_bonus_end_is_split() {
        let s = schedule(0, 600, 10);
        // 10 bonus heights + 5 base heights
        assert_eq!(s.multiplier(590, 605), U256::from(105u64));
        assert_eq!(
            s.multiplier(590, 605),
            s.multiplier(590, 600) + s.multiplier(600, 605)
        );
    }

    #[test]
    fn empty_or_inverted_interval_is_zero() {
        let s = schedule(0, 600, 10);
        assert_eq!(s.multiplier(10, 10), U256::zero());
        assert_eq!(s.multiplier(20, 10), U256::zero());
    }

    #[test]
    fn emission_before_start_is_clamped() {
        let s = schedule(100, 1000, 10);
        assert_eq!(s.emission(0, 100), U256::zero());
        assert_eq!(s.emission(90, 101), U256::from(1000u64));
        assert_eq!(s.emission(100, 105), U256::from(5000u64));
    }

    #[test]
    fn initial_height_never_precedes_start() {
        let s = schedule(100, 1000, 10);
        assert_eq!(s.initial_height(10), 100);
        assert_eq!(s.initial_height(250), 250);
    }
}
