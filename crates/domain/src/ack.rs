//! Acknowledgements returned by the device's POST endpoints.
//!
//! The firmware is not consistent: credentials and restart answer a JSON
//! object (`{"message": "...", "success": true}`) while target updates answer
//! the plain text `targets updated`. [`DeviceAck::from_body`] accepts both.

use serde::{Deserialize, Serialize};

/// Acknowledgement of a write command.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

impl DeviceAck {
    /// Decode a 2xx response body.
    ///
    /// A JSON object yields its `message` / `success` fields; anything else
    /// (plain text, a bare JSON string, an empty body) becomes the message.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        if let Ok(ack) = serde_json::from_slice::<DeviceAck>(body) {
            return ack;
        }
        if let Ok(serde_json::Value::String(text)) = serde_json::from_slice(body) {
            return Self::from_text(&text);
        }
        Self::from_text(&String::from_utf8_lossy(body))
    }

    fn from_text(text: &str) -> Self {
        let text = text.trim();
        Self {
            message: (!text.is_empty()).then(|| text.to_string()),
            success: None,
        }
    }

    /// Whether the device explicitly reported a failure.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.success == Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_json_ack() {
        let ack = DeviceAck::from_body(br#"{"message":"credentials updated","success":true}"#);
        assert_eq!(ack.message.as_deref(), Some("credentials updated"));
        assert_eq!(ack.success, Some(true));
        assert!(!ack.is_rejected());
    }

    #[test]
    fn should_decode_plain_text_ack() {
        let ack = DeviceAck::from_body(b"targets updated");
        assert_eq!(ack.message.as_deref(), Some("targets updated"));
        assert_eq!(ack.success, None);
    }

    #[test]
    fn should_decode_empty_body() {
        assert_eq!(DeviceAck::from_body(b""), DeviceAck::default());
    }

    #[test]
    fn should_report_explicit_failure() {
        let ack = DeviceAck::from_body(br#"{"success":false}"#);
        assert!(ack.is_rejected());
    }
}
