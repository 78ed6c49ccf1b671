//! Anchor tuning.

use std::str::FromStr;

use crate::cost::DEFAULT_BASE_IDLE_COST;
use crate::error::{Error, Result};
use crate::power::DEFAULT_GRACE_TICKS;
use crate::schedule::{TickingRequest, DEFAULT_TICK_INTERVAL};

/// Radius of the square loaded after a relocation.
///
/// Covers an anchor that is not centred in the moved volume without trying
/// to load the whole volume.
pub const DEFAULT_RELOCATION_RADIUS: u32 = 4;

/// Configuration shared by all anchors of a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorConfig {
    /// Idle cost of an anchor holding nothing
    pub base_idle_cost: u64,
    /// Ticks without connectivity tolerated before releasing everything
    pub grace_ticks: u32,
    /// Radius of the temporary square loaded after a relocation
    pub relocation_radius: u32,
    /// Registration with the host scheduler
    pub ticking: TickingRequest,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            base_idle_cost: DEFAULT_BASE_IDLE_COST,
            grace_ticks: DEFAULT_GRACE_TICKS,
            relocation_radius: DEFAULT_RELOCATION_RADIUS,
            ticking: TickingRequest::fixed(DEFAULT_TICK_INTERVAL),
        }
    }
}

impl AnchorConfig {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// - `TETHER_BASE_IDLE_COST`
    /// - `TETHER_GRACE_TICKS`
    /// - `TETHER_RELOCATION_RADIUS`
    /// - `TETHER_TICK_INTERVAL` (fixed cadence, must be positive)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_idle_cost = parse_var(&lookup, "TETHER_BASE_IDLE_COST")?
            .unwrap_or(defaults.base_idle_cost);
        let grace_ticks = parse_var(&lookup, "TETHER_GRACE_TICKS")?
            .unwrap_or(defaults.grace_ticks);
        let relocation_radius = parse_var(&lookup, "TETHER_RELOCATION_RADIUS")?
            .unwrap_or(defaults.relocation_radius);

        let ticking = match parse_var::<u32, _>(&lookup, "TETHER_TICK_INTERVAL")? {
            Some(0) => {
                return Err(Error::InvalidConfig(
                    "TETHER_TICK_INTERVAL must be positive".to_string(),
                ))
            }
            Some(interval) => TickingRequest::fixed(interval),
            None => defaults.ticking,
        };

        Ok(Self {
            base_idle_cost,
            grace_ticks,
            relocation_radius,
            ticking,
        })
    }

    /// Set the grace period.
    #[must_use]
    pub fn with_grace_ticks(mut self, grace_ticks: u32) -> Self {
        self.grace_ticks = grace_ticks;
        self
    }

    /// Set the base idle cost.
    #[must_use]
    pub fn with_base_idle_cost(mut self, base: u64) -> Self {
        self.base_idle_cost = base;
        self
    }

    /// Set the relocation radius.
    #[must_use]
    pub fn with_relocation_radius(mut self, radius: u32) -> Self {
        self.relocation_radius = radius;
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::InvalidConfig(format!("{key}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AnchorConfig::default();
        assert_eq!(config.base_idle_cost, 80);
        assert_eq!(config.grace_ticks, 200);
        assert_eq!(config.relocation_radius, 4);
        assert_eq!(config.ticking, TickingRequest::fixed(20));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = AnchorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AnchorConfig::default());
    }

    #[test]
    fn overrides() {
        let config = AnchorConfig::from_lookup(lookup_from(&[
            ("TETHER_BASE_IDLE_COST", "10"),
            ("TETHER_GRACE_TICKS", " 40 "),
            ("TETHER_RELOCATION_RADIUS", "2"),
            ("TETHER_TICK_INTERVAL", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_idle_cost, 10);
        assert_eq!(config.grace_ticks, 40);
        assert_eq!(config.relocation_radius, 2);
        assert_eq!(config.ticking, TickingRequest::fixed(5));
    }

    #[test]
    fn malformed_value_is_rejected() {
        let err = AnchorConfig::from_lookup(lookup_from(&[("TETHER_GRACE_TICKS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("TETHER_GRACE_TICKS")));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = AnchorConfig::from_lookup(lookup_from(&[("TETHER_TICK_INTERVAL", "0")]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn builders() {
        let config = AnchorConfig::default()
            .with_grace_ticks(10)
            .with_base_idle_cost(0)
            .with_relocation_radius(1);
        assert_eq!(config.grace_ticks, 10);
        assert_eq!(config.base_idle_cost, 0);
        assert_eq!(config.relocation_radius, 1);
    }
}
