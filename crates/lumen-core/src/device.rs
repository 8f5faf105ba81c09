//! Read-only device view as reported by the platform

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{capability, DeviceId, CLASS_LIGHT};

/// A single capability's current state and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityState {
    /// Current value (number, bool, or string depending on the capability)
    pub value: serde_json::Value,

    /// Whether the capability can be read
    #[serde(default = "default_true")]
    pub getable: bool,

    /// Whether the capability can be written
    #[serde(default = "default_true")]
    pub setable: bool,

    /// Unit metadata, if the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CapabilityState {
    /// Create a readable/writable capability with the given value
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            value,
            getable: true,
            setable: true,
            units: None,
        }
    }
}

/// A device as seen through the platform's directory
///
/// The core never creates or destroys devices; it only reads identity and
/// zone metadata and reads/writes capability values through the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Platform-assigned identifier
    pub id: DeviceId,

    /// Display name
    pub name: String,

    /// Device class (e.g. "light", "socket", "sensor")
    pub class: String,

    /// Zone the device is assigned to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    /// Capability map keyed by capability name
    #[serde(default)]
    pub capabilities: HashMap<String, CapabilityState>,
}

impl Device {
    /// Get a capability's state by name
    pub fn capability(&self, name: &str) -> Option<&CapabilityState> {
        self.capabilities.get(name)
    }

    /// Get a capability's current value as a float, if present and numeric
    pub fn number(&self, name: &str) -> Option<f64> {
        self.capabilities.get(name).and_then(|c| c.value.as_f64())
    }

    /// Current brightness in [0, 1], if the device reports one
    pub fn dim(&self) -> Option<f64> {
        self.number(capability::DIM)
    }

    /// Current color temperature in [0, 1], if the device reports one
    pub fn light_temperature(&self) -> Option<f64> {
        self.number(capability::LIGHT_TEMPERATURE)
    }

    /// Whether this device can act as a fade target
    ///
    /// Light-capable means either the platform classifies it as a light or
    /// it exposes a dim capability (covers dimmer sockets driving bulbs).
    pub fn is_light(&self) -> bool {
        self.class == CLASS_LIGHT || self.capabilities.contains_key(capability::DIM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn light(name: &str, dim: f64) -> Device {
        let mut capabilities = HashMap::new();
        capabilities.insert(capability::DIM.to_string(), CapabilityState::new(json!(dim)));
        capabilities.insert(
            capability::ONOFF.to_string(),
            CapabilityState::new(json!(true)),
        );
        Device {
            id: DeviceId::new(format!("id-{}", name.replace(' ', "-"))).unwrap(),
            name: name.to_string(),
            class: CLASS_LIGHT.to_string(),
            zone: None,
            capabilities,
        }
    }

    #[test]
    fn test_dim_reads_capability() {
        let device = light("Desk Lamp", 0.65);
        assert_eq!(device.dim(), Some(0.65));
        assert_eq!(device.light_temperature(), None);
    }

    #[test]
    fn test_missing_capability_is_none() {
        let device = Device {
            id: DeviceId::new("bare").unwrap(),
            name: "Bare".to_string(),
            class: "sensor".to_string(),
            zone: None,
            capabilities: HashMap::new(),
        };
        assert_eq!(device.dim(), None);
        assert!(!device.is_light());
    }

    #[test]
    fn test_is_light_by_class_or_dim() {
        let by_class = light("Lamp", 0.5);
        assert!(by_class.is_light());

        let mut capabilities = HashMap::new();
        capabilities.insert(capability::DIM.to_string(), CapabilityState::new(json!(0.3)));
        let by_dim = Device {
            id: DeviceId::new("socket-1").unwrap(),
            name: "Dimmer Socket".to_string(),
            class: "socket".to_string(),
            zone: None,
            capabilities,
        };
        assert!(by_dim.is_light());
    }

    #[test]
    fn test_non_numeric_value_reads_none() {
        let mut device = light("Lamp", 0.5);
        device
            .capabilities
            .insert(capability::DIM.to_string(), CapabilityState::new(json!("dim")));
        assert_eq!(device.dim(), None);
    }
}
