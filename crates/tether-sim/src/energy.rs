//! Idle energy accounting.

use std::collections::HashMap;

use tracing::trace;

use tether_anchor::EnergyAccountor;
use tether_topology::OwnerId;

/// Idle usage reported by each device.
#[derive(Debug, Clone, Default)]
pub struct EnergyLedger {
    usage: HashMap<OwnerId, u64>,
}

impl EnergyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last idle usage reported by `owner`, zero if none.
    pub fn usage(&self, owner: &OwnerId) -> u64 {
        self.usage.get(owner).copied().unwrap_or(0)
    }

    /// Idle draw of every device together.
    pub fn total(&self) -> u64 {
        self.usage.values().sum()
    }

    /// Forget a device that left the grid.
    pub fn remove(&mut self, owner: &OwnerId) -> Option<u64> {
        self.usage.remove(owner)
    }
}

impl EnergyAccountor for EnergyLedger {
    fn set_idle_usage(&mut self, owner: &OwnerId, usage: u64) {
        if self.usage.insert(*owner, usage) != Some(usage) {
            trace!("{} idle usage now {}", owner, usage);
        }
    }
}
