//! Currency ledger and base health pool.

use lane_defence_core::{Gold, Health};

/// Currency counter. Callers check affordability before debiting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Economy {
    gold: Gold,
}

impl Economy {
    pub(crate) fn new(gold: Gold) -> Self {
        Self { gold }
    }

    pub(crate) fn gold(&self) -> Gold {
        self.gold
    }

    pub(crate) fn can_afford(&self, price: Gold) -> bool {
        self.gold >= price
    }

    pub(crate) fn credit(&mut self, amount: Gold) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub(crate) fn debit(&mut self, amount: Gold) {
        self.gold = self.gold.saturating_sub(amount);
    }
}

/// Health pool drained by leaking enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Base {
    health: Health,
    max_health: Health,
    fallen: bool,
}

impl Base {
    pub(crate) fn new(max_health: Health) -> Self {
        Self {
            health: max_health,
            max_health,
            fallen: false,
        }
    }

    pub(crate) fn health(&self) -> Health {
        self.health
    }

    pub(crate) fn max_health(&self) -> Health {
        self.max_health
    }

    /// Removes health, clamped at zero.
    ///
    /// Returns `true` only for the hit that first brings the base to zero.
    pub(crate) fn decrease(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        if self.health.is_zero() && !self.fallen {
            self.fallen = true;
            return true;
        }
        false
    }
}
