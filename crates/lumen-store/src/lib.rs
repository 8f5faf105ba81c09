//! Key-value state substrate and typed lighting-state stores
//!
//! This crate provides the process-wide state used by the fade coordinator
//! and diagnostics. All persistence goes through the KeyValueStore trait so
//! tests can substitute an in-memory fake and assert on exact written
//! values; MemoryStore is the default in-process implementation.
//!
//! Three typed stores are layered on the substrate:
//! - SnapshotStore: last pre-fade brightness/temperature per device
//! - FadeWindowTracker: "fade completes at" expiry timestamps per device
//! - AdaptiveStateRegistry: adaptive-mode state per device

mod fade_window;
mod registry;
mod snapshot;

pub use fade_window::{FadeDriver, FadeWindowTracker};
pub use registry::{AdaptiveStateRegistry, DeviceState};
pub use snapshot::{SavedSettings, SnapshotStore};

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the key-value substrate
///
/// A failing substrate is fatal to the invocation that hit it; none of the
/// lighting invariants can be honored without the stores.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),
}

/// The key-value substrate all lighting state is persisted through
///
/// Keys are namespaced by the typed stores as `<purpose>_<deviceId>`.
/// Values are JSON so heterogeneous entries can share one substrate.
/// Implementations must provide field-level atomicity per set; readers
/// observe either the previous or the new value, never a torn one.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under a key, or None if absent
    fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>>;

    /// Write the value under a key, overwriting unconditionally
    fn set(&self, key: &str, value: serde_json::Value) -> StoreResult<()>;

    /// All currently present keys, in no particular order
    fn keys(&self) -> StoreResult<Vec<String>>;
}

/// In-process store backed by a concurrent map
///
/// Entries live for the lifetime of the hosting process; there is no
/// expiry or teardown. Key count is bounded by device count in practice.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped for sharing
    pub fn shared() -> Arc<dyn KeyValueStore> {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    fn set(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }
}
