//! In-process platform used by the server binary and integration tests

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use lumen_core::{Device, DeviceId};
use tracing::trace;

use crate::{DeviceDirectory, LightControl, PlatformError, PlatformResult};

/// A timed transition accepted by the simulated platform
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub device: DeviceId,
    pub capability: String,
    pub target: f64,
    pub duration: Duration,
}

/// A platform simulation holding devices in memory
///
/// Capability writes land immediately; timed transitions are recorded and
/// then applied as if the hardware completed them instantly. Individual
/// devices can be marked as failing to exercise degraded paths.
#[derive(Default)]
pub struct SimulatedPlatform {
    devices: DashMap<DeviceId, Device>,
    /// Enumeration order, which the directory contract preserves
    order: Mutex<Vec<DeviceId>>,
    failing: DashSet<DeviceId>,
    transitions: Mutex<Vec<TransitionRecord>>,
}

impl SimulatedPlatform {
    /// Create an empty platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a device
    pub fn insert(&self, device: Device) {
        let mut order = self.order.lock().unwrap();
        if !order.contains(&device.id) {
            order.push(device.id.clone());
        }
        self.devices.insert(device.id.clone(), device);
    }

    /// Make every control call against this device fail
    pub fn fail_device(&self, id: &DeviceId) {
        self.failing.insert(id.clone());
    }

    /// All transitions accepted so far, in order
    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.transitions.lock().unwrap().clone()
    }

    fn check_controllable(&self, id: &DeviceId, capability: &str) -> PlatformResult<()> {
        if self.failing.contains(id) {
            return Err(PlatformError::RequestFailed(format!(
                "simulated failure for device {id}"
            )));
        }
        let device = self
            .devices
            .get(id)
            .ok_or_else(|| PlatformError::DeviceNotFound(id.clone()))?;
        if !device.capabilities.contains_key(capability) {
            return Err(PlatformError::CapabilityUnavailable {
                device: id.clone(),
                capability: capability.to_string(),
            });
        }
        Ok(())
    }

    fn write_value(&self, id: &DeviceId, capability: &str, value: serde_json::Value) {
        if let Some(mut device) = self.devices.get_mut(id) {
            if let Some(state) = device.capabilities.get_mut(capability) {
                state.value = value;
            }
        }
    }
}

#[async_trait]
impl DeviceDirectory for SimulatedPlatform {
    async fn device(&self, id: &DeviceId) -> PlatformResult<Option<Device>> {
        Ok(self.devices.get(id).map(|d| d.clone()))
    }

    async fn devices(&self) -> PlatformResult<Vec<Device>> {
        let order = self.order.lock().unwrap();
        Ok(order
            .iter()
            .filter_map(|id| self.devices.get(id).map(|d| d.clone()))
            .collect())
    }
}

#[async_trait]
impl LightControl for SimulatedPlatform {
    async fn set_capability(
        &self,
        id: &DeviceId,
        capability: &str,
        value: serde_json::Value,
    ) -> PlatformResult<()> {
        self.check_controllable(id, capability)?;
        trace!(device = %id, capability, %value, "Simulated capability set");
        self.write_value(id, capability, value);
        Ok(())
    }

    async fn start_transition(
        &self,
        id: &DeviceId,
        capability: &str,
        target: f64,
        duration: Duration,
    ) -> PlatformResult<()> {
        self.check_controllable(id, capability)?;
        trace!(device = %id, capability, target, ?duration, "Simulated transition");
        self.transitions.lock().unwrap().push(TransitionRecord {
            device: id.clone(),
            capability: capability.to_string(),
            target,
            duration,
        });
        // The simulated hardware completes instantly.
        self.write_value(id, capability, serde_json::json!(target));
        Ok(())
    }
}
