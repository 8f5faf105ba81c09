//! YAML server configuration
//!
//! The config names the listen address, fade defaults, and the devices
//! the simulated platform is seeded with.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lumen_core::{capability, CapabilityState, Device, DeviceId};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the API listens on
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Fade defaults applied when a request omits them
    #[serde(default)]
    pub fade: FadeConfig,

    /// Devices the simulated platform is seeded with
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Fade timing defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FadeConfig {
    #[serde(default = "default_duration_s")]
    pub duration_s: u64,

    #[serde(default = "default_buffer_s")]
    pub buffer_s: u64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            duration_s: default_duration_s(),
            buffer_s: default_buffer_s(),
        }
    }
}

/// A device definition for the simulated platform
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub id: DeviceId,
    pub name: String,
    #[serde(default = "default_class")]
    pub class: String,
    #[serde(default)]
    pub zone: Option<String>,
    /// Initial brightness; omit for devices without a dim capability
    #[serde(default)]
    pub dim: Option<f64>,
    /// Initial color temperature; omit for devices without one
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl DeviceConfig {
    /// Build the platform device this entry describes
    pub fn into_device(self) -> Device {
        let mut capabilities = HashMap::new();
        capabilities.insert(
            capability::ONOFF.to_string(),
            CapabilityState::new(json!(self.dim.unwrap_or(0.0) > 0.0)),
        );
        if let Some(dim) = self.dim {
            capabilities.insert(capability::DIM.to_string(), CapabilityState::new(json!(dim)));
        }
        if let Some(temperature) = self.temperature {
            capabilities.insert(
                capability::LIGHT_TEMPERATURE.to_string(),
                CapabilityState::new(json!(temperature)),
            );
        }

        Device {
            id: self.id,
            name: self.name,
            class: self.class,
            zone: self.zone,
            capabilities,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!(?path, "Loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parse configuration from a YAML string
    pub fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn default_listen() -> String {
    "127.0.0.1:8321".to_string()
}

fn default_duration_s() -> u64 {
    30
}

fn default_buffer_s() -> u64 {
    5
}

fn default_class() -> String {
    lumen_core::CLASS_LIGHT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_apply() {
        let config = ServerConfig::parse("{}", Path::new("inline")).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8321");
        assert_eq!(config.fade.duration_s, 30);
        assert_eq!(config.fade.buffer_s, 5);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
listen: 0.0.0.0:9000
fade:
  duration_s: 45
  buffer_s: 10
devices:
  - id: lamp-1
    name: Desk Lamp
    zone: Office
    dim: 0.8
    temperature: 0.5
  - id: sensor-1
    name: Motion
    class: sensor
"#;
        let config = ServerConfig::parse(yaml, Path::new("inline")).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.fade.duration_s, 45);
        assert_eq!(config.devices.len(), 2);

        let device = config.devices[0].clone().into_device();
        assert_eq!(device.name, "Desk Lamp");
        assert_eq!(device.zone.as_deref(), Some("Office"));
        assert_eq!(device.dim(), Some(0.8));
        assert_eq!(device.light_temperature(), Some(0.5));
        assert!(device.is_light());

        let sensor = config.devices[1].clone().into_device();
        assert_eq!(sensor.dim(), None);
        assert!(!sensor.is_light());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = ServerConfig::parse("bogus: 1", Path::new("inline"));
        assert!(matches!(result, Err(ConfigError::ParseYaml { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen: 127.0.0.1:1234").unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.listen, "127.0.0.1:1234");
    }

    #[test]
    fn test_missing_file_errors() {
        let result = ServerConfig::load("/nonexistent/lumen.yaml");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
