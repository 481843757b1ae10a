//! # World Configuration
//!
//! Loaded once at startup, from TOML or from defaults.
//!
//! ```toml
//! entity_capacity = 4096
//! event_queue_capacity = 512
//! pending_warn_threshold = 2048
//! log_drain_reports = true
//! publish_despawn_events = true
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Entity storage reserved up front. Slots are still created lazily.
    pub entity_capacity: usize,
    /// Pending-event storage reserved up front.
    pub event_queue_capacity: usize,
    /// Warn when more events than this are still pending after a tick.
    pub pending_warn_threshold: usize,
    /// Log every tick's drain report at info level.
    pub log_drain_reports: bool,
    /// Publish [`EntityDespawned`](crate::EntityDespawned) on every despawn.
    ///
    /// Leave this off unless some system registers a handler for it.
    /// Unhandled events stay queued, so an unsubscribed despawn event
    /// would be rescanned on every tick.
    pub publish_despawn_events: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 1024,
            event_queue_capacity: 256,
            pending_warn_threshold: 1024,
            log_drain_reports: false,
            publish_despawn_events: false,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Config`] for malformed TOML or unknown keys,
    /// and [`WorldError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> WorldResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ConfigIo`] if the file cannot be read, otherwise
    /// the same errors as [`from_toml_str`](Self::from_toml_str).
    pub fn from_toml_file(path: impl AsRef<Path>) -> WorldResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] naming the offending key.
    pub fn validate(&self) -> WorldResult<()> {
        if self.entity_capacity > u32::MAX as usize {
            return Err(WorldError::InvalidConfig(format!(
                "entity_capacity {} exceeds the 32-bit handle index space",
                self.entity_capacity
            )));
        }
        if self.pending_warn_threshold == 0 {
            return Err(WorldError::InvalidConfig(
                "pending_warn_threshold must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = WorldConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = WorldConfig::from_toml_str(
            "entity_capacity = 4096\nlog_drain_reports = true\n",
        )
        .unwrap();
        assert_eq!(config.entity_capacity, 4096);
        assert!(config.log_drain_reports);
        assert_eq!(config.event_queue_capacity, 256);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = WorldConfig::from_toml_str("entity_capcity = 1").unwrap_err();
        assert!(matches!(err, WorldError::Config(_)));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = WorldConfig::from_toml_str("pending_warn_threshold = 0").unwrap_err();
        assert!(matches!(err, WorldError::InvalidConfig(_)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_oversized_entity_capacity_rejected() {
        let config = WorldConfig {
            entity_capacity: u32::MAX as usize + 1,
            ..WorldConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, WorldError::InvalidConfig(msg) if msg.contains("entity_capacity")));

        let at_limit = WorldConfig {
            entity_capacity: u32::MAX as usize,
            ..WorldConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("ces-world-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "event_queue_capacity = 32\npublish_despawn_events = true\n",
        )
        .unwrap();

        let loaded = WorldConfig::from_toml_file(&path);
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.event_queue_capacity, 32);
        assert!(config.publish_despawn_events);
        assert_eq!(config.entity_capacity, 1024);
    }

    #[test]
    fn test_despawn_events_off_by_default() {
        assert!(!WorldConfig::default().publish_despawn_events);
    }

    #[test]
    fn test_missing_file() {
        let err = WorldConfig::from_toml_file("/nonexistent/ces/world.toml").unwrap_err();
        assert!(matches!(err, WorldError::ConfigIo(_)));
    }
}
