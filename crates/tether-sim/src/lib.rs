//! Tether Reference Host
//!
//! Everything an anchor needs from its surroundings, in one process:
//!
//! - **TicketStore**: per-owner region tickets, persisted across restarts
//! - **NetworkStatistics**: node counts per region, membership events on zero crossings
//! - **MembershipBus**: explicit list of anchors listening for those events
//! - **EnergyLedger**: idle draw per device
//! - **TickManager**: interval scheduling with sleep and wake-up
//! - **OverlayRegistry**: highlighted areas of display replicas
//!
//! [`World`] ties them together around a single network.
//!
//! # Usage
//!
//! ```ignore
//! let mut world = World::new(WorldConfig::default().with_start_powered(true));
//! let anchor = world.place_anchor(NodePos::new(0, 64, 0))?;
//! world.add_node(NodePos::new(20, 64, 0))?;
//! world.run(20)?;
//! ```

mod energy;
mod error;
mod events;
mod loader;
mod network;
mod overlay;
mod ticker;
mod world;

pub use energy::EnergyLedger;
pub use error::{Error, Result};
pub use events::SimEvent;
pub use loader::{TicketRecord, TicketSnapshot, TicketStore};
pub use network::{MembershipBus, NetworkStatistics};
pub use overlay::OverlayRegistry;
pub use ticker::TickManager;
pub use world::{AnchorRecord, World, WorldConfig, WorldSnapshot};

#[cfg(test)]
mod tests {
    use super::*;
    use tether_topology::{LevelId, NodePos, RegionCoord};

    #[test]
    fn anchor_keeps_its_network_loaded() {
        let mut world = World::new(WorldConfig::default().with_start_powered(true));
        let owner = world.place_anchor(NodePos::new(0, 64, 0)).unwrap();
        for i in 1..=4 {
            world.add_node(NodePos::new(i * 16, 64, 0)).unwrap();
        }
        world.run(40).unwrap();

        assert_eq!(world.anchor(&owner).unwrap().count_loaded_regions(), 5);
        for x in 0..=4 {
            assert!(world.loader().is_loaded(LevelId::OVERWORLD, RegionCoord::new(x, 0)));
        }
        // 80 + 5 * 6 / 2
        assert_eq!(world.energy().total(), 95);
    }
}
