//! Tick scheduling contract between an anchor and its host.
//!
//! The host calls [`Anchor::tick`](crate::Anchor::tick) at the cadence named
//! by a [`TickingRequest`] and interprets the returned
//! [`TickRateModulation`]. The anchor never schedules itself; it only asks.

use serde::{Deserialize, Serialize};

/// Default anchor tick interval, in ticks.
pub const DEFAULT_TICK_INTERVAL: u32 = 20;

/// What the device wants from the scheduler after an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickRateModulation {
    /// Park the device until it is explicitly alerted.
    Sleep,
    /// Keep the current interval.
    Same,
    /// Shorten the interval (not used by anchors).
    Faster,
}

impl TickRateModulation {
    /// Whether the device stops receiving ticks until alerted.
    pub fn is_sleep(&self) -> bool {
        matches!(self, TickRateModulation::Sleep)
    }
}

impl std::fmt::Display for TickRateModulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sleep => write!(f, "Sleep"),
            Self::Same => write!(f, "Same"),
            Self::Faster => write!(f, "Faster"),
        }
    }
}

/// Registration of a device with the host scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickingRequest {
    /// Shortest interval between invocations, in ticks
    pub min_interval: u32,
    /// Longest interval between invocations, in ticks
    pub max_interval: u32,
    /// Whether the device starts out parked
    pub start_asleep: bool,
    /// Whether the device may return `Sleep` and be woken by an alert
    pub sleep_capable: bool,
}

impl Default for TickingRequest {
    fn default() -> Self {
        Self::fixed(DEFAULT_TICK_INTERVAL)
    }
}

impl TickingRequest {
    /// A fixed cadence with no jitter, awake at start, sleep-capable.
    #[must_use]
    pub const fn fixed(interval: u32) -> Self {
        Self {
            min_interval: interval,
            max_interval: interval,
            start_asleep: false,
            sleep_capable: true,
        }
    }

    /// Interval the scheduler starts out with.
    pub fn initial_interval(&self) -> u32 {
        let lo = self.min_interval.min(self.max_interval);
        let hi = self.min_interval.max(self.max_interval);
        lo + (hi - lo) / 2
    }
}

/// Why a node's connectivity state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateReason {
    /// The node's network finished booting (first state after attachment).
    Boot,
    /// The network gained or lost power.
    Power,
    /// The node gained or lost its channel.
    Channel,
    /// The node moved to a different network.
    Network,
}
