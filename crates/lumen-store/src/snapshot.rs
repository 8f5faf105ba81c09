//! Pre-fade settings snapshots

use std::sync::Arc;

use lumen_core::DeviceId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{KeyValueStore, StoreResult};

/// Settings captured from a device immediately before a fade-out
///
/// Read by the restore routine to undo the most recent fade, however long
/// ago it happened. There is no expiry; an entry stays readable until the
/// next fade-out of the same device overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSettings {
    /// Brightness in [0, 1]
    pub dim: f64,

    /// Color temperature in [0, 1]; absent when the device has no
    /// adjustable temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Per-device snapshot storage on the key-value substrate
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    /// Create a snapshot store on the given substrate
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(id: &DeviceId) -> String {
        format!("saved_settings_{}", id)
    }

    /// Save settings for a device, overwriting any previous snapshot
    pub fn save(&self, id: &DeviceId, settings: &SavedSettings) -> StoreResult<()> {
        debug!(device = %id, dim = settings.dim, "Saving pre-fade settings");
        let value = serde_json::to_value(settings).unwrap_or_default();
        self.store.set(&Self::key(id), value)
    }

    /// Read the last saved settings for a device
    ///
    /// Malformed entries read as absent.
    pub fn read(&self, id: &DeviceId) -> StoreResult<Option<SavedSettings>> {
        Ok(self
            .store
            .get(&Self::key(id))?
            .and_then(|v| serde_json::from_value(v).ok()))
    }
}
