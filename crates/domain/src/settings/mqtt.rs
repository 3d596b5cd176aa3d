//! MQTT / Home Assistant integration form.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::numeric_input_or;

/// Default MQTT broker port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// MQTT delivery guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Qos {
    /// At most once.
    #[default]
    AtMostOnce,
    /// At least once.
    AtLeastOnce,
    /// Exactly once.
    ExactlyOnce,
}

impl Qos {
    /// Clamp any integer onto the 0..=2 range.
    #[must_use]
    pub fn clamped(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Self::AtMostOnce,
            1 => Self::AtLeastOnce,
            _ => Self::ExactlyOnce,
        }
    }

    /// Apply a raw form input; empty or non-numeric input means level 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_input(input: &str) -> Self {
        Self::clamped(numeric_input_or(input, 0.0).clamp(-1.0, 3.0) as i64)
    }

    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }
}

impl TryFrom<u8> for Qos {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            other => Err(format!("invalid QoS level {other}")),
        }
    }
}

impl From<Qos> for u8 {
    fn from(qos: Qos) -> Self {
        qos.level()
    }
}

/// MQTT settings form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttSettings {
    pub enabled: bool,
    pub broker: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub base_topic: String,
    pub discovery_prefix: String,
    pub retain_messages: bool,
    pub qos: Qos,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            broker: String::new(),
            port: DEFAULT_MQTT_PORT,
            username: String::new(),
            password: String::new(),
            client_id: "thermometer".to_string(),
            base_topic: "homeassistant/sensor/thermometer".to_string(),
            discovery_prefix: "homeassistant".to_string(),
            retain_messages: true,
            qos: Qos::AtMostOnce,
        }
    }
}

impl std::fmt::Debug for MqttSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSettings")
            .field("enabled", &self.enabled)
            .field("broker", &self.broker)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("client_id", &self.client_id)
            .field("base_topic", &self.base_topic)
            .field("discovery_prefix", &self.discovery_prefix)
            .field("retain_messages", &self.retain_messages)
            .field("qos", &self.qos)
            .finish()
    }
}

impl MqttSettings {
    /// Apply the raw port input; empty, non-numeric or out-of-range input
    /// resets it to 1883.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_port_input(&mut self, input: &str) {
        let value = numeric_input_or(input, f64::from(DEFAULT_MQTT_PORT));
        self.port = if (0.0..=f64::from(u16::MAX)).contains(&value) {
            value as u16
        } else {
            DEFAULT_MQTT_PORT
        };
    }

    /// Check form invariants. A disabled integration is always valid.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MqttBrokerMissing`] or
    /// [`ValidationError::MqttPort`] for an enabled but incomplete form.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.broker.trim().is_empty() {
            return Err(ValidationError::MqttBrokerMissing);
        }
        if self.port == 0 {
            return Err(ValidationError::MqttPort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_home_assistant_topics() {
        let settings = MqttSettings::default();
        assert!(!settings.enabled);
        assert_eq!(settings.port, 1883);
        assert_eq!(settings.client_id, "thermometer");
        assert_eq!(settings.base_topic, "homeassistant/sensor/thermometer");
        assert_eq!(settings.discovery_prefix, "homeassistant");
        assert!(settings.retain_messages);
        assert_eq!(settings.qos, Qos::AtMostOnce);
    }

    #[test]
    fn should_clamp_qos_input() {
        assert_eq!(Qos::from_input("5"), Qos::ExactlyOnce);
        assert_eq!(Qos::from_input("-3"), Qos::AtMostOnce);
        assert_eq!(Qos::from_input("1"), Qos::AtLeastOnce);
        assert_eq!(Qos::from_input(""), Qos::AtMostOnce);
    }

    #[test]
    fn should_serialize_qos_as_level() {
        assert_eq!(serde_json::to_value(Qos::ExactlyOnce).unwrap(), 2);
        assert!(serde_json::from_str::<Qos>("3").is_err());
    }

    #[test]
    fn should_reset_port_on_garbage_input() {
        let mut settings = MqttSettings::default();
        settings.set_port_input("8883");
        assert_eq!(settings.port, 8883);
        settings.set_port_input("");
        assert_eq!(settings.port, 1883);
        settings.set_port_input("70000");
        assert_eq!(settings.port, 1883);
    }

    #[test]
    fn should_require_broker_when_enabled() {
        let mut settings = MqttSettings {
            enabled: true,
            ..MqttSettings::default()
        };
        assert_eq!(settings.validate(), Err(ValidationError::MqttBrokerMissing));
        settings.broker = "192.168.1.100".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn should_hide_password_in_debug_output() {
        let settings = MqttSettings {
            password: "s3cret".to_string(),
            ..MqttSettings::default()
        };
        assert!(!format!("{settings:?}").contains("s3cret"));
    }
}
