//! Region Force-Loading Reconciler
//!
//! An anchor node keeps the regions its network occupies loaded, whether or
//! not anyone is nearby, and pays an idle cost for doing so.
//!
//! # Core Insight
//!
//! The anchor does not own the truth. The network's membership does. The
//! anchor only owns a **holding set** and repeatedly drives it towards the
//! membership:
//!
//! ```text
//! holding' = holding - (holding - required) + (required - holding)
//! ```
//!
//! Membership events apply the same correction one region at a time. A
//! missed event is harmless: the next scheduled diff catches it.
//!
//! # Lifecycle
//!
//! 1. Boot: registered with the scheduler, nothing held
//! 2. First connected tick: bulk activation forces every required region
//! 3. Steady state: fast path plus periodic diff
//! 4. Disconnected: keep everything for a grace period, then release all
//! 5. Relocated: hold a square around the new home until the network returns
//! 6. Removed: release everything, ignore anything that follows
//!
//! # Cost
//!
//! Holding `n` regions costs `base + n(n+1)/2` per tick.

mod anchor;
mod config;
mod cost;
mod device;
mod error;
mod holding;
mod membership;
mod power;
mod replica;
mod schedule;
mod services;
mod settings;
mod sync;

#[cfg(test)]
mod testing;

pub use anchor::Anchor;
pub use config::{AnchorConfig, DEFAULT_RELOCATION_RADIUS};
pub use cost::{idle_cost, DEFAULT_BASE_IDLE_COST};
pub use device::AnchorDevice;
pub use error::{Error, Result};
pub use holding::HoldingSet;
pub use membership::{MembershipEvent, RequiredRegions};
pub use power::{PowerState, DEFAULT_GRACE_TICKS};
pub use replica::AnchorReplica;
pub use schedule::{StateReason, TickRateModulation, TickingRequest, DEFAULT_TICK_INTERVAL};
pub use services::{
    DeviceAlerts, EnergyAccountor, MembershipSource, OverlayHooks, RegionLoader, Services,
};
pub use settings::{AnchorSettings, YesNo};
pub use sync::SyncPacket;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_line_up() {
        assert_eq!(DEFAULT_BASE_IDLE_COST, 80);
        assert_eq!(DEFAULT_GRACE_TICKS, 200);
        assert_eq!(DEFAULT_RELOCATION_RADIUS, 4);
        assert_eq!(idle_cost(DEFAULT_BASE_IDLE_COST, 2), 83);
    }
}
