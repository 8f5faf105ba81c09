//! Platform seams for the lumen core
//!
//! The home-automation platform owns devices; this core only reaches it
//! through the traits defined here. DeviceDirectory answers identity and
//! capability lookups, LightControl mutates capabilities (instantaneous
//! sets and hardware-timed transitions), and Notifier is a best-effort
//! text sink. SimulatedPlatform is an in-process implementation used by
//! the server binary and integration tests.

mod simulated;

pub use simulated::{SimulatedPlatform, TransitionRecord};

use std::time::Duration;

use async_trait::async_trait;
use lumen_core::{Device, DeviceId};
use thiserror::Error;
use tracing::info;

/// Result type for platform calls
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors from the platform
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),

    #[error("capability '{capability}' unavailable on device {device}")]
    CapabilityUnavailable {
        device: DeviceId,
        capability: String,
    },

    #[error("platform request failed: {0}")]
    RequestFailed(String),
}

/// Read-only access to the platform's device directory
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Look up a single device by identifier
    async fn device(&self, id: &DeviceId) -> PlatformResult<Option<Device>>;

    /// Enumerate all devices, in the platform's enumeration order
    async fn devices(&self) -> PlatformResult<Vec<Device>>;
}

/// Capability mutation on light devices
#[async_trait]
pub trait LightControl: Send + Sync {
    /// Set a capability to a literal value, taking effect immediately
    async fn set_capability(
        &self,
        id: &DeviceId,
        capability: &str,
        value: serde_json::Value,
    ) -> PlatformResult<()>;

    /// Delegate a hardware-timed transition of a capability to a target
    /// value over the given duration
    ///
    /// Returns as soon as the transition is accepted; the fade itself
    /// proceeds asynchronously inside the lighting hardware.
    async fn start_transition(
        &self,
        id: &DeviceId,
        capability: &str,
        target: f64,
        duration: Duration,
    ) -> PlatformResult<()>;
}

/// Best-effort text notification sink
///
/// Implementations never raise; a lost notification is acceptable.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that emits through the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "lumen::notify", "{message}");
    }
}
