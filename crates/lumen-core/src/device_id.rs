//! Device identifier type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid device identifiers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceIdError {
    #[error("device id cannot be empty")]
    Empty,

    #[error("device id contains invalid characters (must be printable ASCII without whitespace)")]
    InvalidChars,
}

/// An opaque device identifier assigned by the platform
///
/// The platform hands out identifiers as opaque tokens (typically hex
/// strings or UUIDs); the core never interprets their contents, only
/// requires them to be non-empty and free of whitespace so they can be
/// embedded in store keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new DeviceId, validating the token
    pub fn new(id: impl Into<String>) -> Result<Self, DeviceIdError> {
        let id = id.into();

        if id.is_empty() {
            return Err(DeviceIdError::Empty);
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_graphic())
        {
            return Err(DeviceIdError::InvalidChars);
        }

        Ok(Self(id))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short label for display when the full identifier is too noisy
    ///
    /// Used by diagnostics when the platform no longer knows the device
    /// and no display name is available.
    pub fn short_label(&self) -> String {
        if self.0.len() <= 8 {
            format!("device {}", self.0)
        } else {
            format!("device {}…", &self.0[..8])
        }
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = DeviceIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> String {
        id.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
