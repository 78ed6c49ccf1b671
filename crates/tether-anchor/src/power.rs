//! Connectivity bookkeeping for an anchor.

use serde::{Deserialize, Serialize};

/// Default grace period, in ticks, before a disconnected anchor lets go.
pub const DEFAULT_GRACE_TICKS: u32 = 200;

/// Connectivity and activation state of an anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerState {
    /// Bulk activation has run since the last relocation
    pub initialized: bool,
    /// Ticks elapsed while disconnected
    pub powerless_ticks: u32,
    /// Live network connectivity
    pub active: bool,
}

impl PowerState {
    /// Record a connectivity change.
    ///
    /// Returns true if the anchor just came back online; the powerless
    /// counter restarts from zero in that case.
    pub fn set_active(&mut self, active: bool) -> bool {
        let reconnected = active && !self.active;
        self.active = active;
        if reconnected {
            self.powerless_ticks = 0;
        }
        reconnected
    }

    /// Count ticks spent without connectivity.
    pub fn accumulate(&mut self, elapsed: u32) {
        self.powerless_ticks = self.powerless_ticks.saturating_add(elapsed);
    }

    /// Whether the grace period has run out.
    pub fn grace_expired(&self, grace_ticks: u32) -> bool {
        self.powerless_ticks > grace_ticks
    }
}
