//! Adaptive-lighting state registry

use std::sync::Arc;

use lumen_core::DeviceId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{KeyValueStore, StoreResult};

const KEY_PREFIX: &str = "adaptive_state_";

/// Per-device adaptive-lighting state
///
/// Written by the adaptive-control loop, read by diagnostics. Entries are
/// created lazily on first observation and never deleted; last write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// True when a human action has overridden adaptive control
    #[serde(default)]
    pub manual_override: bool,

    /// Label of the last lighting profile computed by adaptive control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_profile: Option<String>,
}

/// Registry of adaptive-lighting state on the key-value substrate
#[derive(Clone)]
pub struct AdaptiveStateRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl AdaptiveStateRegistry {
    /// Create a registry on the given substrate
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(id: &DeviceId) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }

    /// Write a device's adaptive state, overwriting unconditionally
    pub fn set(&self, id: &DeviceId, state: &DeviceState) -> StoreResult<()> {
        debug!(
            device = %id,
            manual_override = state.manual_override,
            "Writing adaptive state"
        );
        let value = serde_json::to_value(state).unwrap_or_default();
        self.store.set(&Self::key(id), value)
    }

    /// Read a device's adaptive state
    ///
    /// Malformed entries read as absent.
    pub fn get(&self, id: &DeviceId) -> StoreResult<Option<DeviceState>> {
        Ok(self
            .store
            .get(&Self::key(id))?
            .and_then(|v| serde_json::from_value(v).ok()))
    }

    /// All device identifiers with a registry entry
    pub fn device_ids(&self) -> StoreResult<Vec<DeviceId>> {
        Ok(self
            .store
            .keys()?
            .iter()
            .filter_map(|k| k.strip_prefix(KEY_PREFIX))
            .filter_map(|id| id.parse().ok())
            .collect())
    }
}
