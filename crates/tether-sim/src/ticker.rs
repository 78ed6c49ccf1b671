//! Host tick scheduler.
//!
//! Devices register with a [`TickingRequest`] and are handed the number of
//! ticks since their previous call each time they come due. Their returned
//! [`TickRateModulation`] decides when they are due next:
//!
//! - `Sleep` parks a sleep-capable device until something alerts it
//! - `Same` keeps the current interval
//! - `Faster` halves the interval, down to the request's minimum

use std::collections::BTreeMap;

use tracing::trace;

use tether_anchor::{DeviceAlerts, TickRateModulation, TickingRequest};
use tether_topology::OwnerId;

#[derive(Debug, Clone, Copy)]
struct Tracked {
    request: TickingRequest,
    interval: u32,
    last_tick: u64,
    /// `None` while asleep
    next_due: Option<u64>,
}

/// Schedules registered devices against a shared tick counter.
#[derive(Debug, Clone, Default)]
pub struct TickManager {
    now: u64,
    devices: BTreeMap<OwnerId, Tracked>,
}

impl TickManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Move the clock forward. Never goes backwards.
    pub fn advance_to(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    pub fn register(&mut self, owner: OwnerId, request: TickingRequest) {
        let interval = request.initial_interval();
        let next_due = (!request.start_asleep).then_some(self.now + u64::from(interval));
        self.devices.insert(
            owner,
            Tracked {
                request,
                interval,
                last_tick: self.now,
                next_due,
            },
        );
        trace!("{} registered, interval {}", owner, interval);
    }

    pub fn unregister(&mut self, owner: &OwnerId) -> bool {
        self.devices.remove(owner).is_some()
    }

    pub fn is_registered(&self, owner: &OwnerId) -> bool {
        self.devices.contains_key(owner)
    }

    pub fn is_sleeping(&self, owner: &OwnerId) -> bool {
        self.devices
            .get(owner)
            .is_some_and(|tracked| tracked.next_due.is_none())
    }

    /// Current interval of `owner`.
    pub fn interval(&self, owner: &OwnerId) -> Option<u32> {
        self.devices.get(owner).map(|tracked| tracked.interval)
    }

    /// Devices due at the current tick, with ticks elapsed since their last
    /// call.
    pub fn due(&self) -> Vec<(OwnerId, u32)> {
        self.devices
            .iter()
            .filter(|(_, tracked)| tracked.next_due.is_some_and(|due| due <= self.now))
            .map(|(owner, tracked)| {
                let elapsed = u32::try_from(self.now - tracked.last_tick).unwrap_or(u32::MAX);
                (*owner, elapsed)
            })
            .collect()
    }

    /// Record that `owner` just ticked and schedule its next call.
    pub fn reschedule(&mut self, owner: &OwnerId, modulation: TickRateModulation) {
        let now = self.now;
        let Some(tracked) = self.devices.get_mut(owner) else {
            return;
        };
        tracked.last_tick = now;

        match modulation {
            TickRateModulation::Sleep if tracked.request.sleep_capable => {
                tracked.next_due = None;
                trace!("{} sleeping", owner);
                return;
            }
            TickRateModulation::Faster => {
                tracked.interval = (tracked.interval / 2).max(tracked.request.min_interval);
            }
            TickRateModulation::Sleep | TickRateModulation::Same => {}
        }
        tracked.next_due = Some(now + u64::from(tracked.interval));
    }
}

impl DeviceAlerts for TickManager {
    /// Make `owner` due now. A sleeping device's elapsed count restarts from
    /// the wake-up.
    fn alert_device(&mut self, owner: &OwnerId) {
        let now = self.now;
        if let Some(tracked) = self.devices.get_mut(owner) {
            if tracked.next_due.is_none() {
                tracked.last_tick = now;
                trace!("{} woken", owner);
            }
            tracked.next_due = Some(tracked.next_due.map_or(now, |due| due.min(now)));
        }
    }
}
