//! WiFi records exchanged with the device: scan results, station info and
//! credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest SSID accepted by the device, in bytes.
pub const MAX_SSID_LEN: usize = 32;
/// Longest WPA passphrase accepted by the device, in bytes.
pub const MAX_PASSWORD_LEN: usize = 63;

/// Authentication mode reported by the device scan (ESP-IDF numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthMode(pub u8);

impl AuthMode {
    pub const OPEN: AuthMode = AuthMode(0);
    pub const WPA2_PSK: AuthMode = AuthMode(3);

    /// Display name of the mode, `unknown` for values the client does not know.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "open",
            1 => "WEP",
            2 => "WPA-PSK",
            3 => "WPA2-PSK",
            4 => "WPA/WPA2-PSK",
            5 => "WPA2-Enterprise",
            6 => "WPA3-PSK",
            7 => "WPA2/WPA3-PSK",
            8 => "WAPI-PSK",
            _ => "unknown",
        }
    }

    /// Whether joining requires a password.
    #[must_use]
    pub fn requires_password(self) -> bool {
        self != Self::OPEN
    }
}

/// One access point found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    /// Network name; empty for hidden networks.
    pub ssid: String,
    /// Signal strength in dBm.
    pub rssi: i32,
    pub authmode: AuthMode,
}

impl WifiNetwork {
    /// Name to show in a network list.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.ssid.is_empty() {
            "(Hidden Network)"
        } else {
            &self.ssid
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.ssid.is_empty()
    }
}

/// Body of `GET /api/v1/wifi/scan`. Replaced wholesale on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WifiScanResult {
    #[serde(default)]
    pub networks: Vec<WifiNetwork>,
    #[serde(default)]
    pub count: usize,
}

impl WifiScanResult {
    /// The empty result shown while a fresh scan is running.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_networks(networks: Vec<WifiNetwork>) -> Self {
        let count = networks.len();
        Self { networks, count }
    }
}

/// Body of `GET /api/v1/wifi/station`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WifiStationInfo {
    /// SSID the device is associated with; empty when not connected.
    #[serde(default)]
    pub ssid: String,
}

impl WifiStationInfo {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.ssid.is_empty()
    }
}

/// Body of `POST /api/v1/wifi/credentials`. Write-only.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct WifiCredentials {
    ssid: String,
    password: String,
}

impl WifiCredentials {
    /// Validate and build credentials with the limits enforced by the device.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SsidLength`] when the SSID is empty or longer
    /// than 32 bytes, and [`ValidationError::PasswordLength`] when the password
    /// is longer than 63 bytes.
    pub fn new(
        ssid: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let ssid = ssid.into();
        let password = password.into();
        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
            return Err(ValidationError::SsidLength(ssid.len()));
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(ValidationError::PasswordLength(password.len()));
        }
        Ok(Self { ssid, password })
    }

    #[must_use]
    pub fn ssid(&self) -> &str {
        &self.ssid
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"********")
            .finish()
    }
}
