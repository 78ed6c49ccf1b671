//! Ticket-based region loader.
//!
//! A region stays loaded while at least one owner holds a ticket on it.
//! Tickets are per owner, so two anchors covering the same region never
//! release each other's hold.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tether_anchor::RegionLoader;
use tether_topology::{LevelId, OwnerId, RegionCoord};

/// One persisted ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketRecord {
    pub level: LevelId,
    pub owner: OwnerId,
    /// Packed region coordinate
    pub region: i64,
}

/// Persisted form of a [`TicketStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub tickets: Vec<TicketRecord>,
}

/// Region loader keyed by owner tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketStore {
    levels: HashMap<LevelId, HashMap<RegionCoord, BTreeSet<OwnerId>>>,
    per_owner: HashMap<OwnerId, usize>,
    max_per_owner: Option<usize>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of tickets a single owner may hold.
    #[must_use]
    pub fn with_limit(mut self, max_per_owner: usize) -> Self {
        self.max_per_owner = Some(max_per_owner);
        self
    }

    /// Make a level loadable. Tickets on unknown levels are refused.
    pub fn add_level(&mut self, level: LevelId) {
        self.levels.entry(level).or_default();
    }

    pub fn has_level(&self, level: LevelId) -> bool {
        self.levels.contains_key(&level)
    }

    /// Whether anyone holds `coord` loaded.
    pub fn is_loaded(&self, level: LevelId, coord: RegionCoord) -> bool {
        self.levels
            .get(&level)
            .is_some_and(|regions| regions.contains_key(&coord))
    }

    /// Owners holding a ticket on `coord`.
    pub fn holders(&self, level: LevelId, coord: RegionCoord) -> Vec<OwnerId> {
        self.levels
            .get(&level)
            .and_then(|regions| regions.get(&coord))
            .map(|owners| owners.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of loaded regions in `level`.
    pub fn loaded_count(&self, level: LevelId) -> usize {
        self.levels.get(&level).map_or(0, HashMap::len)
    }

    /// Regions `owner` holds a ticket on.
    pub fn tickets_of(&self, owner: &OwnerId) -> HashSet<RegionCoord> {
        self.levels
            .get(&owner.level)
            .map(|regions| {
                regions
                    .iter()
                    .filter(|(_, owners)| owners.contains(owner))
                    .map(|(coord, _)| *coord)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn ticket_count(&self, owner: &OwnerId) -> usize {
        self.per_owner.get(owner).copied().unwrap_or(0)
    }

    fn force(&mut self, level: LevelId, owner: &OwnerId, coord: RegionCoord) -> bool {
        let held = self.ticket_count(owner);
        let limit = self.max_per_owner;
        let Some(regions) = self.levels.get_mut(&level) else {
            warn!("refusing ticket for {} on unknown {}", owner, level);
            return false;
        };

        if regions.get(&coord).is_some_and(|owners| owners.contains(owner)) {
            return true;
        }
        if limit.is_some_and(|max| held >= max) {
            debug!("{} reached its ticket limit, refusing {}", owner, coord);
            return false;
        }

        regions.entry(coord).or_default().insert(*owner);
        *self.per_owner.entry(*owner).or_default() += 1;
        true
    }

    fn release(&mut self, level: LevelId, owner: &OwnerId, coord: RegionCoord) -> bool {
        let Some(regions) = self.levels.get_mut(&level) else {
            return false;
        };

        let Some(owners) = regions.get_mut(&coord) else {
            return true;
        };
        if owners.remove(owner) {
            if owners.is_empty() {
                regions.remove(&coord);
            }
            if let Some(count) = self.per_owner.get_mut(owner) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.per_owner.remove(owner);
                }
            }
        }
        true
    }

    /// Every ticket, sorted for stable output.
    pub fn snapshot(&self) -> TicketSnapshot {
        let mut tickets: Vec<_> = self
            .levels
            .iter()
            .flat_map(|(level, regions)| {
                regions.iter().flat_map(move |(coord, owners)| {
                    owners.iter().map(move |owner| TicketRecord {
                        level: *level,
                        owner: *owner,
                        region: coord.pack(),
                    })
                })
            })
            .collect();
        tickets.sort();
        TicketSnapshot { tickets }
    }

    /// Reload persisted tickets.
    ///
    /// Tickets whose owner fails `validate` are dropped. Returns the surviving
    /// tickets so their owners can re-adopt them.
    pub fn restore<F>(&mut self, snapshot: &TicketSnapshot, validate: F) -> Vec<(OwnerId, RegionCoord)>
    where
        F: Fn(&OwnerId) -> bool,
    {
        let mut restored = Vec::new();
        for ticket in &snapshot.tickets {
            let coord = RegionCoord::unpack(ticket.region);
            if !validate(&ticket.owner) {
                debug!("dropping ticket of vanished owner {} on {}", ticket.owner, coord);
                continue;
            }

            let owners = self
                .levels
                .entry(ticket.level)
                .or_default()
                .entry(coord)
                .or_default();
            if owners.insert(ticket.owner) {
                *self.per_owner.entry(ticket.owner).or_default() += 1;
                restored.push((ticket.owner, coord));
            }
        }
        restored
    }
}

impl RegionLoader for TicketStore {
    fn force_region(&mut self, owner: &OwnerId, coord: RegionCoord) -> bool {
        self.force(owner.level, owner, coord)
    }

    fn release_region(&mut self, owner: &OwnerId, coord: RegionCoord) -> bool {
        self.release(owner.level, owner, coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_topology::NodePos;

    fn owner(x: i64) -> OwnerId {
        OwnerId::new(LevelId::OVERWORLD, NodePos::new(x, 64, 0))
    }

    fn store() -> TicketStore {
        let mut store = TicketStore::new();
        store.add_level(LevelId::OVERWORLD);
        store
    }

    #[test]
    fn shared_region_survives_one_release() {
        let mut store = store();
        let coord = RegionCoord::new(2, 3);

        assert!(store.force_region(&owner(0), coord));
        assert!(store.force_region(&owner(1), coord));
        assert!(store.release_region(&owner(0), coord));

        assert!(store.is_loaded(LevelId::OVERWORLD, coord));
        assert_eq!(store.holders(LevelId::OVERWORLD, coord), vec![owner(1)]);

        assert!(store.release_region(&owner(1), coord));
        assert!(!store.is_loaded(LevelId::OVERWORLD, coord));
        assert_eq!(store.loaded_count(LevelId::OVERWORLD), 0);
    }

    #[test]
    fn forcing_twice_counts_once() {
        let mut store = store();
        store.force_region(&owner(0), RegionCoord::ORIGIN);
        store.force_region(&owner(0), RegionCoord::ORIGIN);
        assert_eq!(store.ticket_count(&owner(0)), 1);
    }

    #[test]
    fn unknown_level_refuses_both_ways() {
        let mut store = TicketStore::new();
        let elsewhere = OwnerId::new(LevelId(3), NodePos::ORIGIN);
        assert!(!store.force_region(&elsewhere, RegionCoord::ORIGIN));
        assert!(!store.release_region(&elsewhere, RegionCoord::ORIGIN));
    }

    #[test]
    fn limit_refuses_extra_tickets() {
        let mut store = store().with_limit(2);
        assert!(store.force_region(&owner(0), RegionCoord::new(0, 0)));
        assert!(store.force_region(&owner(0), RegionCoord::new(1, 0)));
        assert!(!store.force_region(&owner(0), RegionCoord::new(2, 0)));
        // Re-forcing a held region is not a new ticket
        assert!(store.force_region(&owner(0), RegionCoord::new(1, 0)));
        // Other owners are unaffected
        assert!(store.force_region(&owner(1), RegionCoord::new(2, 0)));

        store.release_region(&owner(0), RegionCoord::new(0, 0));
        assert!(store.force_region(&owner(0), RegionCoord::new(2, 0)));
    }

    #[test]
    fn snapshot_restore_drops_vanished_owners() {
        let mut store = store();
        store.force_region(&owner(0), RegionCoord::new(0, 0));
        store.force_region(&owner(0), RegionCoord::new(-1, 5));
        store.force_region(&owner(9), RegionCoord::new(7, 7));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.tickets.len(), 3);

        let json = serde_json::to_string(&snapshot).unwrap();
        let snapshot: TicketSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = TicketStore::new();
        let mut survivors = restored.restore(&snapshot, |o| *o == owner(0));
        survivors.sort();

        assert_eq!(
            survivors,
            vec![
                (owner(0), RegionCoord::new(-1, 5)),
                (owner(0), RegionCoord::new(0, 0)),
            ]
        );
        assert!(restored.has_level(LevelId::OVERWORLD));
        assert!(!restored.is_loaded(LevelId::OVERWORLD, RegionCoord::new(7, 7)));
        assert_eq!(restored.tickets_of(&owner(0)).len(), 2);
        assert_eq!(restored.ticket_count(&owner(0)), 2);
    }
}
