//! Core types for lumen
//!
//! This crate provides the fundamental types used throughout the lumen
//! adaptive-lighting core: DeviceId, Device, CapabilityState, and Context.

mod context;
mod device;
mod device_id;

pub use context::Context;
pub use device::{CapabilityState, Device};
pub use device_id::{DeviceId, DeviceIdError};

/// Device class reported by the platform for light devices
pub const CLASS_LIGHT: &str = "light";

/// Capability names used by the lighting core
///
/// These match the platform's capability identifiers; the core only ever
/// reads and writes capabilities through these names.
pub mod capability {
    /// Brightness, normalized to [0, 1]
    pub const DIM: &str = "dim";

    /// Color temperature, normalized to [0, 1] (warm to cold)
    pub const LIGHT_TEMPERATURE: &str = "light_temperature";

    /// On/off switch state
    pub const ONOFF: &str = "onoff";
}
