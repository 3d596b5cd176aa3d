//! Global preferences: display unit, refresh cadence, alerts and theme.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::temperature::TemperatureUnit;

use super::numeric_input_or;

/// Colour scheme of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

/// Global settings form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub temperature_unit: TemperatureUnit,
    pub update_interval_secs: u32,
    pub sound_alerts: bool,
    pub email_notifications: bool,
    pub theme: Theme,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::Celsius,
            update_interval_secs: 1,
            sound_alerts: true,
            email_notifications: false,
            theme: Theme::Light,
        }
    }
}

impl GlobalSettings {
    /// Apply the raw update-interval input; empty or non-numeric input
    /// resets it to one second.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_update_interval_input(&mut self, input: &str) {
        let value = numeric_input_or(input, 1.0).clamp(0.0, f64::from(u32::MAX));
        self.update_interval_secs = value as u32;
    }

    /// Check form invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UpdateInterval`] when the interval is
    /// outside `1..=60` seconds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=60).contains(&self.update_interval_secs) {
            return Err(ValidationError::UpdateInterval(self.update_interval_secs));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_one_second_interval() {
        let settings = GlobalSettings::default();
        assert_eq!(settings.update_interval_secs, 1);
        assert!(settings.sound_alerts);
        assert!(!settings.email_notifications);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn should_reset_interval_on_garbage_input() {
        let mut settings = GlobalSettings::default();
        settings.set_update_interval_input("30");
        assert_eq!(settings.update_interval_secs, 30);
        settings.set_update_interval_input("soon");
        assert_eq!(settings.update_interval_secs, 1);
    }

    #[test]
    fn should_reject_interval_above_one_minute() {
        let mut settings = GlobalSettings::default();
        settings.set_update_interval_input("61");
        assert_eq!(
            settings.validate(),
            Err(ValidationError::UpdateInterval(61))
        );
    }

    #[test]
    fn should_map_dark_flag_to_theme() {
        assert_eq!(Theme::from_dark(true), Theme::Dark);
        assert!(!Theme::from_dark(false).is_dark());
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}
