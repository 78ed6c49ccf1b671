//! A single-network world hosting anchors.
//!
//! The world owns every collaborator an anchor needs (ticket loader, network
//! statistics, energy ledger and tick scheduler), wires membership events to
//! subscribed anchors and streams sync packets to display replicas.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tether_anchor::{
    Anchor, AnchorConfig, AnchorDevice, AnchorReplica, MembershipEvent, MembershipSource,
    Services, StateReason, SyncPacket,
};
use tether_topology::{LevelId, NodePos, OwnerId};

use crate::energy::EnergyLedger;
use crate::error::{Error, Result};
use crate::events::SimEvent;
use crate::loader::{TicketSnapshot, TicketStore};
use crate::network::{MembershipBus, NetworkStatistics};
use crate::overlay::OverlayRegistry;
use crate::ticker::TickManager;

/// World configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldConfig {
    /// Level every node and anchor lives in
    pub level: LevelId,
    /// Configuration handed to every anchor
    pub anchor: AnchorConfig,
    /// Ticket cap per owner, unlimited if `None`
    pub max_tickets_per_owner: Option<usize>,
    /// Whether the network starts with power
    pub start_powered: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            level: LevelId::OVERWORLD,
            anchor: AnchorConfig::default(),
            max_tickets_per_owner: None,
            start_powered: false,
        }
    }
}

impl WorldConfig {
    /// Anchor settings from the environment plus `TETHER_MAX_TICKETS`.
    pub fn from_env() -> Result<Self> {
        let anchor = AnchorConfig::from_env()?;
        let max_tickets_per_owner = match std::env::var("TETHER_MAX_TICKETS") {
            Ok(raw) => Some(raw.trim().parse().map_err(|e| {
                tether_anchor::Error::InvalidConfig(format!("TETHER_MAX_TICKETS={raw:?}: {e}"))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            anchor,
            max_tickets_per_owner,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_start_powered(mut self, powered: bool) -> Self {
        self.start_powered = powered;
        self
    }
}

/// Persisted anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub owner: OwnerId,
    /// Output of [`Anchor::save`]
    pub data: String,
}

/// Persisted world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub powered: bool,
    /// Every node, anchors included
    pub nodes: Vec<NodePos>,
    pub anchors: Vec<AnchorRecord>,
    pub tickets: TicketSnapshot,
}

/// Collaborators shared by every anchor.
#[derive(Debug, Default)]
struct Host {
    loader: TicketStore,
    network: NetworkStatistics,
    energy: EnergyLedger,
    ticker: TickManager,
}

impl Host {
    fn services(&mut self) -> Services<'_> {
        let membership: Option<&dyn MembershipSource> = Some(&self.network);
        Services::new(
            &mut self.loader,
            membership,
            &mut self.energy,
            &mut self.ticker,
        )
    }
}

/// Simulated world with one network.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    tick: u64,
    host: Host,
    bus: MembershipBus,
    overlay: OverlayRegistry,
    nodes: BTreeSet<NodePos>,
    anchors: BTreeMap<OwnerId, Anchor>,
    replicas: BTreeMap<OwnerId, AnchorReplica>,
    events: Vec<SimEvent>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let mut loader = match config.max_tickets_per_owner {
            Some(max) => TicketStore::new().with_limit(max),
            None => TicketStore::new(),
        };
        loader.add_level(config.level);

        let mut network = NetworkStatistics::new();
        network.set_powered(config.start_powered);

        Self {
            config,
            tick: 0,
            host: Host {
                loader,
                network,
                ..Host::default()
            },
            bus: MembershipBus::new(),
            overlay: OverlayRegistry::new(),
            nodes: BTreeSet::new(),
            anchors: BTreeMap::new(),
            replicas: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_powered(&self) -> bool {
        self.host.network.is_powered()
    }

    pub fn anchor(&self, owner: &OwnerId) -> Option<&Anchor> {
        self.anchors.get(owner)
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.values()
    }

    pub fn replica(&self, owner: &OwnerId) -> Option<&AnchorReplica> {
        self.replicas.get(owner)
    }

    pub fn loader(&self) -> &TicketStore {
        &self.host.loader
    }

    pub fn network(&self) -> &NetworkStatistics {
        &self.host.network
    }

    pub fn energy(&self) -> &EnergyLedger {
        &self.host.energy
    }

    pub fn ticker(&self) -> &TickManager {
        &self.host.ticker
    }

    pub fn overlay(&self) -> &OverlayRegistry {
        &self.overlay
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn owner_at(&self, pos: NodePos) -> OwnerId {
        OwnerId::new(self.config.level, pos)
    }

    // --- Topology ---

    /// Place a plain network node.
    pub fn add_node(&mut self, pos: NodePos) -> Result<()> {
        if !self.nodes.insert(pos) {
            return Err(Error::Occupied(pos));
        }
        self.events.push(SimEvent::NodeAdded {
            pos,
            tick: self.tick,
        });

        let event = self.host.network.add_node(self.config.level, pos);
        self.dispatch(event);
        Ok(())
    }

    /// Remove a plain network node.
    pub fn remove_node(&mut self, pos: NodePos) -> Result<()> {
        if self.anchors.contains_key(&self.owner_at(pos)) {
            return Err(Error::AnchorNode(pos));
        }
        if !self.nodes.remove(&pos) {
            return Err(Error::UnknownNode(pos));
        }
        self.events.push(SimEvent::NodeRemoved {
            pos,
            tick: self.tick,
        });

        let event = self.host.network.remove_node(self.config.level, pos);
        self.dispatch(event);
        Ok(())
    }

    /// Power the network up or down.
    pub fn set_powered(&mut self, powered: bool) {
        if !self.host.network.set_powered(powered) {
            return;
        }
        info!("network power {}", if powered { "up" } else { "down" });
        self.events.push(SimEvent::PowerChanged {
            powered,
            tick: self.tick,
        });

        for anchor in self.anchors.values_mut() {
            anchor.on_node_state_changed(StateReason::Power, powered, &mut self.host.ticker);
        }
    }

    fn dispatch(&mut self, event: Option<MembershipEvent>) {
        let Some(event) = event else {
            return;
        };
        debug!("membership {:?}", event);
        self.events.push(SimEvent::Membership {
            event,
            tick: self.tick,
        });

        for owner in self.bus.subscribers() {
            if let Some(anchor) = self.anchors.get_mut(owner) {
                anchor.on_membership_event(event, &mut self.host.services());
            }
        }
    }

    // --- Anchors ---

    /// Place an anchor on an empty position and attach it to the network.
    pub fn place_anchor(&mut self, pos: NodePos) -> Result<OwnerId> {
        if self.nodes.contains(&pos) {
            return Err(Error::Occupied(pos));
        }
        let owner = self.owner_at(pos);
        self.nodes.insert(pos);
        self.attach(Anchor::new(owner, self.config.anchor.clone()));
        self.events.push(SimEvent::AnchorPlaced {
            owner,
            tick: self.tick,
        });

        let event = self.host.network.add_node(self.config.level, pos);
        self.dispatch(event);
        Ok(owner)
    }

    fn attach(&mut self, mut anchor: Anchor) {
        let owner = *anchor.owner();
        self.host.ticker.register(owner, anchor.ticking_request());
        self.bus.subscribe(owner);
        anchor.on_node_state_changed(
            StateReason::Boot,
            self.host.network.is_powered(),
            &mut self.host.ticker,
        );
        self.replicas.insert(owner, AnchorReplica::new(owner));
        self.anchors.insert(owner, anchor);
    }

    /// Destroy an anchor, releasing everything it holds.
    pub fn remove_anchor(&mut self, owner: &OwnerId) -> Result<()> {
        self.detach(owner)?;
        self.events.push(SimEvent::AnchorRemoved {
            owner: *owner,
            tick: self.tick,
        });
        Ok(())
    }

    fn detach(&mut self, owner: &OwnerId) -> Result<()> {
        let anchor = self
            .anchors
            .remove(owner)
            .ok_or(Error::UnknownAnchor(*owner))?;

        AnchorDevice::from(anchor).set_removed(&mut self.host.services(), &mut self.overlay);
        if let Some(replica) = self.replicas.remove(owner) {
            AnchorDevice::from(replica).set_removed(&mut self.host.services(), &mut self.overlay);
        }

        self.bus.unsubscribe(owner);
        self.host.ticker.unregister(owner);
        self.host.energy.remove(owner);
        self.nodes.remove(&owner.pos);

        let event = self.host.network.remove_node(owner.level, owner.pos);
        self.dispatch(event);
        Ok(())
    }

    /// Move an anchor through a spatial transfer.
    ///
    /// Settings travel with it; held regions do not. The anchor at the new
    /// position bridges the square around its home region until the network
    /// comes back.
    pub fn relocate_anchor(&mut self, from: &OwnerId, to: NodePos) -> Result<OwnerId> {
        let data = self
            .anchors
            .get(from)
            .ok_or(Error::UnknownAnchor(*from))?
            .save()?;
        if self.nodes.contains(&to) {
            return Err(Error::Occupied(to));
        }

        self.detach(from)?;

        let owner = self.owner_at(to);
        let mut anchor = Anchor::new(owner, self.config.anchor.clone());
        anchor.load_settings(&data)?;
        self.nodes.insert(to);
        self.attach(anchor);

        let event = self.host.network.add_node(self.config.level, to);
        self.dispatch(event);

        if let Some(anchor) = self.anchors.get_mut(&owner) {
            anchor.done_moving(&mut self.host.services());
        }

        self.events.push(SimEvent::AnchorRelocated {
            from: *from,
            to: owner,
            tick: self.tick,
        });
        Ok(owner)
    }

    /// Toggle an anchor's display overlay.
    pub fn set_display_overlay(&mut self, owner: &OwnerId, enabled: bool) -> Result<bool> {
        let anchor = self
            .anchors
            .get_mut(owner)
            .ok_or(Error::UnknownAnchor(*owner))?;
        Ok(anchor.set_display_overlay(enabled))
    }

    // --- Time ---

    /// Advance one tick: run every due anchor, then sync replicas. Returns
    /// the number of anchors that ran.
    pub fn step(&mut self) -> Result<usize> {
        self.tick += 1;
        self.host.ticker.advance_to(self.tick);

        let due = self.host.ticker.due();
        for (owner, elapsed) in &due {
            let Some(anchor) = self.anchors.get_mut(owner) else {
                continue;
            };
            let next = anchor.tick(*elapsed, &mut self.host.services());
            self.host.ticker.reschedule(owner, next);
            self.events.push(SimEvent::AnchorTicked {
                owner: *owner,
                elapsed: *elapsed,
                held: anchor.count_loaded_regions(),
                next,
                tick: self.tick,
            });
        }

        self.sync_replicas()?;
        Ok(due.len())
    }

    /// Advance `ticks` ticks.
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Push pending sync packets through the wire codec to each replica.
    /// Returns how many replicas changed.
    pub fn sync_replicas(&mut self) -> Result<usize> {
        let mut changed = 0;
        for (owner, anchor) in self.anchors.iter_mut() {
            let Some(packet) = anchor.take_sync_packet() else {
                continue;
            };
            let bytes = packet.encode()?;
            let packet = SyncPacket::decode(&bytes)?;

            if let Some(replica) = self.replicas.get_mut(owner) {
                if replica.apply(&packet, &mut self.overlay) {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    // --- Persistence ---

    pub fn snapshot(&self) -> Result<WorldSnapshot> {
        let anchors = self
            .anchors
            .values()
            .map(|anchor| {
                Ok(AnchorRecord {
                    owner: *anchor.owner(),
                    data: anchor.save()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WorldSnapshot {
            tick: self.tick,
            powered: self.is_powered(),
            nodes: self.nodes.iter().copied().collect(),
            anchors,
            tickets: self.host.loader.snapshot(),
        })
    }

    /// Save the world as JSON.
    pub fn save(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot()?)?)
    }

    /// Rebuild a world from [`save`](Self::save) output.
    ///
    /// Anchors come back uninitialized and re-adopt the tickets the loader
    /// still has for them. Tickets of anchors that no longer exist are
    /// dropped.
    pub fn restore(config: WorldConfig, data: &str) -> Result<Self> {
        let snapshot: WorldSnapshot = serde_json::from_str(data)?;
        let mut world = World::new(config.with_start_powered(snapshot.powered));
        world.tick = snapshot.tick;
        world.host.ticker.advance_to(snapshot.tick);

        for pos in &snapshot.nodes {
            world.nodes.insert(*pos);
            world.host.network.add_node(world.config.level, *pos);
        }

        for record in &snapshot.anchors {
            let mut anchor = Anchor::new(record.owner, world.config.anchor.clone());
            anchor.load_settings(&record.data)?;
            world.attach(anchor);
        }

        let anchors = &world.anchors;
        let restored = world
            .host
            .loader
            .restore(&snapshot.tickets, |owner| anchors.contains_key(owner));
        for (owner, coord) in restored {
            if let Some(anchor) = world.anchors.get_mut(&owner) {
                anchor.register_region(coord, &mut world.host.energy);
            }
        }

        info!(
            "restored {} nodes and {} anchors at tick {}",
            world.nodes.len(),
            world.anchors.len(),
            world.tick
        );
        Ok(world)
    }
}
