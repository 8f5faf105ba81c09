//! Fade window tracking
//!
//! A fade window records when an in-flight fade will have completed, as an
//! expiry timestamp in epoch milliseconds. An entry in the store does NOT
//! mean a fade is active; only `now < active_until` does. Readers must
//! always compare against the current time rather than trusting presence,
//! which is the invariant that replaced a stale-boolean bug class.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lumen_core::DeviceId;
use serde_json::json;
use tracing::debug;

use crate::{KeyValueStore, StoreResult};

/// Which actor drove a fade
///
/// The script-driven coordinator and the adaptive-control loop keep
/// independent windows per device; they are not synchronized and may
/// overlap. Consumers determining "is this device fading for any reason"
/// must query both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDriver {
    /// Fade initiated by the fade coordinator
    Script,
    /// Fade initiated by the adaptive-control loop
    Adaptive,
}

impl FadeDriver {
    fn key(self, id: &DeviceId) -> String {
        match self {
            FadeDriver::Script => format!("fade_until_{}", id),
            FadeDriver::Adaptive => format!("al_fade_until_{}", id),
        }
    }

    /// Short label for log lines and reports
    pub fn label(self) -> &'static str {
        match self {
            FadeDriver::Script => "script",
            FadeDriver::Adaptive => "adaptive",
        }
    }
}

/// Per-device fade window storage for one driver namespace
#[derive(Clone)]
pub struct FadeWindowTracker {
    store: Arc<dyn KeyValueStore>,
    driver: FadeDriver,
}

impl FadeWindowTracker {
    /// Create a tracker for the given driver namespace
    pub fn new(store: Arc<dyn KeyValueStore>, driver: FadeDriver) -> Self {
        Self { store, driver }
    }

    /// The driver namespace this tracker addresses
    pub fn driver(&self) -> FadeDriver {
        self.driver
    }

    /// Mark a fade active from now, returning the written expiry millis
    ///
    /// The buffer leaves a grace window after the hardware fade physically
    /// finishes during which restore suppression still treats the device
    /// as "was fading", covering clock skew between this process and the
    /// lighting hardware.
    pub fn mark_active(
        &self,
        id: &DeviceId,
        duration: Duration,
        buffer: Duration,
    ) -> StoreResult<i64> {
        self.mark_active_from(id, Utc::now(), duration, buffer)
    }

    /// Mark a fade active from an explicit instant
    pub fn mark_active_from(
        &self,
        id: &DeviceId,
        now: DateTime<Utc>,
        duration: Duration,
        buffer: Duration,
    ) -> StoreResult<i64> {
        let active_until =
            now.timestamp_millis() + duration.as_millis() as i64 + buffer.as_millis() as i64;
        debug!(
            device = %id,
            driver = self.driver.label(),
            active_until,
            "Marking fade window active"
        );
        self.store.set(&self.driver.key(id), json!(active_until))?;
        Ok(active_until)
    }

    /// Expire the window immediately
    ///
    /// Used when a fade is skipped because the device is already
    /// effectively off, so stale consumers don't believe a fade is
    /// pending.
    pub fn clear(&self, id: &DeviceId) -> StoreResult<()> {
        debug!(device = %id, driver = self.driver.label(), "Clearing fade window");
        self.store.set(&self.driver.key(id), json!(0))
    }

    /// Whether a fade is active at the given instant
    ///
    /// Absent and malformed entries are never active.
    pub fn is_active(&self, id: &DeviceId, now: DateTime<Utc>) -> StoreResult<bool> {
        let active_until = self
            .store
            .get(&self.driver.key(id))?
            .and_then(|v| v.as_i64());
        Ok(match active_until {
            Some(until) => now.timestamp_millis() < until,
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::TimeZone;

    fn id(s: &str) -> DeviceId {
        DeviceId::new(s).unwrap()
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_active_until_is_exact() {
        let windows = FadeWindowTracker::new(MemoryStore::shared(), FadeDriver::Script);
        let now = at(1_700_000_000_000);

        let until = windows
            .mark_active_from(&id("lamp"), now, Duration::from_secs(30), Duration::from_secs(5))
            .unwrap();

        assert_eq!(until, 1_700_000_000_000 + 30_000 + 5_000);
    }

    #[test]
    fn test_is_active_is_strict_comparison() {
        let windows = FadeWindowTracker::new(MemoryStore::shared(), FadeDriver::Script);
        let now = at(1_000_000);
        let until = windows
            .mark_active_from(&id("lamp"), now, Duration::from_secs(10), Duration::ZERO)
            .unwrap();

        assert!(windows.is_active(&id("lamp"), at(until - 1)).unwrap());
        assert!(!windows.is_active(&id("lamp"), at(until)).unwrap());
        assert!(!windows.is_active(&id("lamp"), at(until + 1)).unwrap());
    }

    #[test]
    fn test_absent_entry_is_inactive() {
        let windows = FadeWindowTracker::new(MemoryStore::shared(), FadeDriver::Script);
        assert!(!windows.is_active(&id("unknown"), Utc::now()).unwrap());
    }

    #[test]
    fn test_clear_expires_immediately() {
        let windows = FadeWindowTracker::new(MemoryStore::shared(), FadeDriver::Script);
        let now = at(5_000_000);
        windows
            .mark_active_from(&id("lamp"), now, Duration::from_secs(60), Duration::ZERO)
            .unwrap();
        windows.clear(&id("lamp")).unwrap();

        assert!(!windows.is_active(&id("lamp"), now).unwrap());
    }

    #[test]
    fn test_driver_namespaces_are_independent() {
        let store = MemoryStore::shared();
        let script = FadeWindowTracker::new(store.clone(), FadeDriver::Script);
        let adaptive = FadeWindowTracker::new(store, FadeDriver::Adaptive);
        let now = at(9_000_000);

        script
            .mark_active_from(&id("lamp"), now, Duration::from_secs(30), Duration::ZERO)
            .unwrap();

        assert!(script.is_active(&id("lamp"), now).unwrap());
        assert!(!adaptive.is_active(&id("lamp"), now).unwrap());
    }
}
