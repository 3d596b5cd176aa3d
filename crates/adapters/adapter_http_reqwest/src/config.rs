//! Device connection configuration.

use serde::Deserialize;

/// Address of the default access point of an unprovisioned device.
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";

/// Where the device lives and how long to wait for a connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Base URL of the device, e.g. `http://192.168.4.1`.
    pub base_url: String,
    /// TCP connect timeout in seconds. The overall request deadline is
    /// enforced by the API client.
    pub connect_timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DEVICE_URL.to_string(),
            connect_timeout_secs: 5,
        }
    }
}
