//! Authoritative → display replica synchronization packet.
//!
//! Wire layout (bincode): `connected`, `display_overlay`, then the held
//! regions packed to `i64` only when the overlay is on. Replicas use the
//! regions for display; they never reconcile against them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tether_topology::RegionCoord;

use crate::error::Result;

/// State an authoritative anchor streams to its display replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPacket {
    /// Live connectivity of the anchor
    pub connected: bool,
    /// Whether the overlay is enabled
    pub display_overlay: bool,
    /// Packed held regions; present only with the overlay on
    pub regions: Option<Vec<i64>>,
}

impl SyncPacket {
    /// Build a packet. `regions` is dropped unless the overlay is on.
    pub fn new<'a, I>(connected: bool, display_overlay: bool, regions: I) -> Self
    where
        I: IntoIterator<Item = &'a RegionCoord>,
    {
        let regions = display_overlay.then(|| regions.into_iter().map(RegionCoord::pack).collect());
        Self {
            connected,
            display_overlay,
            regions,
        }
    }

    /// Unpacked held regions (empty without the overlay).
    pub fn region_set(&self) -> HashSet<RegionCoord> {
        self.regions
            .iter()
            .flatten()
            .map(|&packed| RegionCoord::unpack(packed))
            .collect()
    }

    /// Encode for the wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the wire.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_omitted_without_overlay() {
        let held = [RegionCoord::new(1, 1)];
        let packet = SyncPacket::new(true, false, held.iter());
        assert_eq!(packet.regions, None);
        assert!(packet.region_set().is_empty());
    }

    #[test]
    fn regions_carried_with_overlay() {
        let held = [RegionCoord::new(1, 1), RegionCoord::new(-4, 9)];
        let packet = SyncPacket::new(false, true, held.iter());
        let set = packet.region_set();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&RegionCoord::new(-4, 9)));
    }

    #[test]
    fn wire_trip() {
        let held = [RegionCoord::new(3, -3)];
        let packet = SyncPacket::new(true, true, held.iter());
        let bytes = packet.encode().unwrap();
        assert_eq!(SyncPacket::decode(&bytes).unwrap(), packet);
    }

    #[test]
    fn truncated_packet_fails() {
        let packet = SyncPacket::new(true, true, [RegionCoord::new(3, -3)].iter());
        let bytes = packet.encode().unwrap();
        assert!(SyncPacket::decode(&bytes[..bytes.len() - 1]).is_err());
    }
}
