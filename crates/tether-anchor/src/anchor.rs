//! The region force-loading reconciler.
//!
//! An [`Anchor`] keeps every region its network requires pinned with the
//! loader, under its own [`OwnerId`], and lets go of regions the network no
//! longer needs.
//!
//! # Two paths
//!
//! - **Fast path**: membership events force or release a single region the
//!   moment the network changes.
//! - **Diff**: every scheduled tick compares the holding set against the
//!   network's full requirement and repairs any drift in both directions.
//!
//! The fast path is an optimisation. A missed event is corrected by the next
//! diff.
//!
//! # Scheduling
//!
//! The anchor sleeps whenever it is connected and has nothing pending. A
//! connectivity change or a fast-path removal wakes it. While disconnected it
//! keeps ticking so the grace countdown advances; once more than
//! `grace_ticks` have passed offline it releases everything and goes back to
//! sleep.

use tracing::{debug, info, trace, warn};

use tether_topology::{LevelId, OwnerId, RegionCoord, Square};

use crate::config::AnchorConfig;
use crate::cost::idle_cost;
use crate::error::Result;
use crate::holding::HoldingSet;
use crate::membership::MembershipEvent;
use crate::power::PowerState;
use crate::schedule::{StateReason, TickRateModulation, TickingRequest};
use crate::services::{DeviceAlerts, EnergyAccountor, Services};
use crate::settings::AnchorSettings;
use crate::sync::SyncPacket;

/// Authoritative region reconciler for one anchor node.
#[derive(Debug, Clone)]
pub struct Anchor {
    owner: OwnerId,
    config: AnchorConfig,
    holding: HoldingSet,
    power: PowerState,
    settings: AnchorSettings,
    /// Holding the post-relocation square; steady-state diff deferred
    relocating: bool,
    removed: bool,
    needs_sync: bool,
    needs_save: bool,
}

impl Anchor {
    /// Create an anchor holding nothing.
    pub fn new(owner: OwnerId, config: AnchorConfig) -> Self {
        Self {
            owner,
            config,
            holding: HoldingSet::new(),
            power: PowerState::default(),
            settings: AnchorSettings::default(),
            relocating: false,
            removed: false,
            needs_sync: false,
            needs_save: false,
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Level this anchor loads regions in.
    pub fn level(&self) -> LevelId {
        self.owner.level
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Registration to hand to the host scheduler.
    pub fn ticking_request(&self) -> TickingRequest {
        self.config.ticking
    }

    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Live network connectivity.
    pub fn is_active(&self) -> bool {
        self.power.active
    }

    /// Whether the post-relocation square is still being held.
    pub fn is_relocating(&self) -> bool {
        self.relocating
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn loaded_regions(&self) -> &HoldingSet {
        &self.holding
    }

    pub fn count_loaded_regions(&self) -> usize {
        self.holding.len()
    }

    /// Idle cost for the current holding.
    pub fn idle_cost(&self) -> u64 {
        idle_cost(self.config.base_idle_cost, self.holding.len())
    }

    // --- Settings and persistence ---

    pub fn settings(&self) -> AnchorSettings {
        self.settings
    }

    /// Toggle the display overlay. Returns true if the setting changed.
    pub fn set_display_overlay(&mut self, enabled: bool) -> bool {
        let value = enabled.into();
        if self.settings.display_overlay == value {
            return false;
        }
        self.settings.display_overlay = value;
        self.mark_for_update();
        self.needs_save = true;
        true
    }

    /// Persisted form of this anchor.
    pub fn save(&self) -> Result<String> {
        self.settings.to_json()
    }

    /// Restore persisted settings. Held regions come back separately through
    /// [`register_region`](Self::register_region).
    pub fn load_settings(&mut self, data: &str) -> Result<()> {
        self.settings = AnchorSettings::from_json(data)?;
        self.mark_for_update();
        Ok(())
    }

    /// Returns true once after any change that should be persisted.
    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_save)
    }

    // --- Replication ---

    /// Current replica state.
    pub fn sync_packet(&self) -> SyncPacket {
        SyncPacket::new(
            self.is_active(),
            self.settings.overlay_enabled(),
            self.holding.iter(),
        )
    }

    /// Replica state, if anything changed since the last call.
    pub fn take_sync_packet(&mut self) -> Option<SyncPacket> {
        std::mem::take(&mut self.needs_sync).then(|| self.sync_packet())
    }

    fn mark_for_update(&mut self) {
        self.needs_sync = true;
    }

    // --- Host callbacks ---

    /// Re-adopt a region the loader still holds for this owner after a
    /// restart.
    pub fn register_region(&mut self, coord: RegionCoord, energy: &mut dyn EnergyAccountor) {
        if self.holding.insert(coord) {
            trace!("{} re-registered region {}", self.owner, coord);
        }
        self.update_idle_cost(energy);
    }

    /// The anchor's node changed connectivity.
    pub fn on_node_state_changed(
        &mut self,
        reason: StateReason,
        online: bool,
        alerts: &mut dyn DeviceAlerts,
    ) {
        if self.power.set_active(online) {
            debug!("{} reconnected ({:?})", self.owner, reason);
        }

        if reason != StateReason::Boot {
            self.mark_for_update();
            alerts.alert_device(&self.owner);
        }
    }

    /// Dispatch a membership event to the fast path.
    pub fn on_membership_event(&mut self, event: MembershipEvent, services: &mut Services<'_>) {
        match event {
            MembershipEvent::RegionAdded { level, coord } => {
                self.on_region_added(level, coord, services)
            }
            MembershipEvent::RegionRemoved { level, coord } => {
                self.on_region_removed(level, coord, services)
            }
        }
    }

    /// A region became required somewhere in the network.
    pub fn on_region_added(
        &mut self,
        level: LevelId,
        coord: RegionCoord,
        services: &mut Services<'_>,
    ) {
        if level == self.level() {
            self.force(coord, services);
        }
    }

    /// A region stopped being required.
    pub fn on_region_removed(
        &mut self,
        level: LevelId,
        coord: RegionCoord,
        services: &mut Services<'_>,
    ) {
        if level == self.level() {
            self.release(coord, true, services);
            // May be able to sleep now, or have stragglers to clean up
            services.alerts.alert_device(&self.owner);
        }
    }

    /// Scheduled invocation. `elapsed` is the number of ticks since the
    /// previous one.
    pub fn tick(&mut self, elapsed: u32, services: &mut Services<'_>) -> TickRateModulation {
        if self.removed {
            return TickRateModulation::Sleep;
        }

        let online = self.power.active;

        if !self.power.initialized && online {
            self.force_all(services);
            self.power.initialized = true;
            // Bridge square stays until the next diff
            self.relocating = false;
        } else if !self.relocating {
            self.clean_up(services);
        }

        if self.power.grace_expired(self.config.grace_ticks) {
            if !online {
                info!(
                    "{} offline for {} ticks, releasing {} regions",
                    self.owner,
                    self.power.powerless_ticks,
                    self.holding.len()
                );
                self.release_all(services);
            }
            self.power.powerless_ticks = 0;
            return TickRateModulation::Sleep;
        }

        if !online {
            self.power.accumulate(elapsed);
            return TickRateModulation::Same;
        }

        TickRateModulation::Sleep
    }

    // --- Reconciliation ---

    /// Bring the holding set in line with the network's requirement.
    ///
    /// Releases held regions that are no longer required (dropping them from
    /// the set even if the loader reports failure) and forces required
    /// regions that are missing. Refused forces are retried next time.
    pub fn clean_up(&mut self, services: &mut Services<'_>) {
        let Some(required) = services.required_regions(self.level()) else {
            return;
        };

        for coord in self.holding.stale(|c| required.contains(c)) {
            self.release(coord, true, services);
        }

        for &coord in required.regions() {
            if !self.holding.contains(&coord) {
                self.force(coord, services);
            }
        }
    }

    /// Force every region the network requires.
    pub fn force_all(&mut self, services: &mut Services<'_>) {
        let Some(required) = services.required_regions(self.level()) else {
            return;
        };

        info!(
            "{} activating, network requires {} regions for {} nodes",
            self.owner,
            required.len(),
            required.total_demand()
        );

        for &coord in required.regions() {
            self.force(coord, services);
        }
    }

    /// Release every held region and empty the holding set.
    pub fn release_all(&mut self, services: &mut Services<'_>) {
        for coord in self.holding.drain() {
            if !services.loader.release_region(&self.owner, coord) {
                warn!("{} failed to release region {} during teardown", self.owner, coord);
            }
        }
        self.relocating = false;
        self.update_idle_cost(services.energy);
        self.mark_for_update();
    }

    /// Pin one region. Returns the loader's answer.
    pub fn force(&mut self, coord: RegionCoord, services: &mut Services<'_>) -> bool {
        if self.removed {
            return false;
        }

        let forced = services.loader.force_region(&self.owner, coord);
        if forced {
            if self.holding.insert(coord) {
                debug!("{} forced region {}", self.owner, coord);
            }
        } else {
            warn!("{} could not force region {}, will retry", self.owner, coord);
        }

        self.update_idle_cost(services.energy);
        self.mark_for_update();
        forced
    }

    /// Unpin one region. Returns the loader's answer.
    ///
    /// With `remove_from_set` the region leaves the holding set whatever the
    /// loader says; a leaked pin is preferred over an entry that can never be
    /// reconciled away.
    pub fn release(
        &mut self,
        coord: RegionCoord,
        remove_from_set: bool,
        services: &mut Services<'_>,
    ) -> bool {
        let released = services.loader.release_region(&self.owner, coord);
        if !released {
            warn!("{} failed to release region {}", self.owner, coord);
        }

        if remove_from_set && self.holding.remove(&coord) {
            debug!("{} released region {}", self.owner, coord);
        }

        self.update_idle_cost(services.energy);
        self.mark_for_update();
        released
    }

    // --- Lifecycle ---

    /// The anchor was just moved to its current position.
    ///
    /// Holds the square around the new home region until the network has
    /// re-formed, and arms a fresh bulk activation.
    pub fn done_moving(&mut self, services: &mut Services<'_>) {
        self.power.initialized = false;
        self.relocating = true;

        let radius = self.config.relocation_radius;
        info!(
            "{} relocated, bridging radius {} around {}",
            self.owner,
            radius,
            self.owner.home_region()
        );

        for coord in Square::around(self.owner.home_region(), radius) {
            self.force(coord, services);
        }
    }

    /// The anchor is being destroyed. Releases everything it holds.
    pub fn set_removed(&mut self, services: &mut Services<'_>) {
        if self.removed {
            return;
        }
        self.removed = true;
        info!("{} removed, releasing {} regions", self.owner, self.holding.len());
        self.release_all(services);
    }

    fn update_idle_cost(&self, energy: &mut dyn EnergyAccountor) {
        if self.removed {
            trace!("{} removed, skipping idle cost update", self.owner);
            return;
        }
        energy.set_idle_usage(&self.owner, self.idle_cost());
    }
}
