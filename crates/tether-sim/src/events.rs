//! Host event log.

use serde::{Deserialize, Serialize};

use tether_anchor::{MembershipEvent, TickRateModulation};
use tether_topology::{NodePos, OwnerId};

/// Something that happened in the world, stamped with its tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A plain network node was placed
    NodeAdded { pos: NodePos, tick: u64 },

    /// A plain network node was removed
    NodeRemoved { pos: NodePos, tick: u64 },

    /// An anchor was placed and attached to the network
    AnchorPlaced { owner: OwnerId, tick: u64 },

    /// An anchor was destroyed
    AnchorRemoved { owner: OwnerId, tick: u64 },

    /// An anchor was moved through a spatial transfer
    AnchorRelocated { from: OwnerId, to: OwnerId, tick: u64 },

    /// The network gained or lost power
    PowerChanged { powered: bool, tick: u64 },

    /// Network membership crossed zero for a region
    Membership { event: MembershipEvent, tick: u64 },

    /// An anchor ran its scheduled reconciliation
    AnchorTicked {
        owner: OwnerId,
        elapsed: u32,
        held: usize,
        next: TickRateModulation,
        tick: u64,
    },
}

impl SimEvent {
    /// Tick the event happened at.
    pub fn tick(&self) -> u64 {
        match self {
            SimEvent::NodeAdded { tick, .. }
            | SimEvent::NodeRemoved { tick, .. }
            | SimEvent::AnchorPlaced { tick, .. }
            | SimEvent::AnchorRemoved { tick, .. }
            | SimEvent::AnchorRelocated { tick, .. }
            | SimEvent::PowerChanged { tick, .. }
            | SimEvent::Membership { tick, .. }
            | SimEvent::AnchorTicked { tick, .. } => *tick,
        }
    }
}
