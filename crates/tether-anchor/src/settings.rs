//! Persisted per-anchor settings.
//!
//! Only user-facing configuration is persisted. Held regions are not: the
//! loader's own ticket store hands them back through
//! [`Anchor::register_region`](crate::Anchor::register_region) on restore.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A persisted yes/no switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        value == YesNo::Yes
    }
}

/// User-configurable anchor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnchorSettings {
    /// Show held regions as an overlay on display replicas
    #[serde(default)]
    pub display_overlay: YesNo,
}

impl AnchorSettings {
    /// Whether the overlay is on.
    pub fn overlay_enabled(&self) -> bool {
        self.display_overlay.into()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_overlay_off() {
        let settings = AnchorSettings::default();
        assert_eq!(settings.display_overlay, YesNo::No);
        assert!(!settings.overlay_enabled());
    }

    #[test]
    fn json_shape() {
        let settings = AnchorSettings {
            display_overlay: YesNo::Yes,
        };
        let json = settings.to_json().unwrap();
        assert_eq!(json, r#"{"display_overlay":"Yes"}"#);
        assert_eq!(AnchorSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn missing_field_defaults() {
        let settings = AnchorSettings::from_json("{}").unwrap();
        assert_eq!(settings, AnchorSettings::default());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(AnchorSettings::from_json("not json").is_err());
    }
}
