//! Device system information (`GET /api/v1/system/info`).

use serde::{Deserialize, Serialize};

/// Firmware version and chip details reported by the device.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    /// Any other field the firmware reports, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
