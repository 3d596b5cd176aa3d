//! Named thermometers with alert preferences.
//!
//! The first four entries map onto the device probes by position.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::probe::{PROBE_COUNT, ProbeId};
use crate::temperature::{TemperatureReading, TemperatureUnit};

use super::numeric_input_or;

/// Target temperatures on the form are in °F; the device works in °C.
pub const TARGET_UNIT: TemperatureUnit = TemperatureUnit::Fahrenheit;
pub const DEFAULT_TARGET: f64 = 160.0;
pub const DEFAULT_ALERT_THRESHOLD: f64 = 5.0;
pub const MIN_TARGET: f64 = 32.0;
pub const MAX_TARGET: f64 = 500.0;
pub const MIN_ALERT_THRESHOLD: f64 = 1.0;
pub const MAX_ALERT_THRESHOLD: f64 = 20.0;

/// One configured thermometer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermometerSettings {
    pub id: u32,
    pub name: String,
    /// In [`TARGET_UNIT`].
    pub target_temp: f64,
    pub alert_enabled: bool,
    pub alert_threshold: f64,
}

impl ThermometerSettings {
    /// A new thermometer with the form defaults.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: format!("Thermometer {id}"),
            target_temp: DEFAULT_TARGET,
            alert_enabled: true,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }

    fn preset(id: u32, name: &str, target_temp: f64, alert_enabled: bool) -> Self {
        Self {
            name: name.to_string(),
            target_temp,
            alert_enabled,
            ..Self::new(id)
        }
    }

    /// Apply the raw target input; empty or non-numeric input means 160.
    pub fn set_target_input(&mut self, input: &str) {
        self.target_temp = numeric_input_or(input, DEFAULT_TARGET);
    }

    /// Apply the raw threshold input; empty or non-numeric input means 5.
    pub fn set_threshold_input(&mut self, input: &str) {
        self.alert_threshold = numeric_input_or(input, DEFAULT_ALERT_THRESHOLD);
    }

    /// Check form invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`],
    /// [`ValidationError::ThermometerTarget`] or
    /// [`ValidationError::AlertThreshold`]. The threshold is only checked
    /// while alerts are enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !(MIN_TARGET..=MAX_TARGET).contains(&self.target_temp) {
            return Err(ValidationError::ThermometerTarget(self.target_temp));
        }
        if self.alert_enabled
            && !(MIN_ALERT_THRESHOLD..=MAX_ALERT_THRESHOLD).contains(&self.alert_threshold)
        {
            return Err(ValidationError::AlertThreshold(self.alert_threshold));
        }
        Ok(())
    }
}

/// Ordered list of thermometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermometerList {
    items: Vec<ThermometerSettings>,
}

impl Default for ThermometerList {
    fn default() -> Self {
        Self {
            items: vec![
                ThermometerSettings::preset(1, "Grill Station 1", 71.0, true),
                ThermometerSettings::preset(2, "Smoker Unit", 93.0, true),
                ThermometerSettings::preset(3, "Oven Probe", 74.0, false),
            ],
        }
    }
}

impl ThermometerList {
    #[must_use]
    pub fn new(items: Vec<ThermometerSettings>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[ThermometerSettings] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&ThermometerSettings> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Probe a thermometer is wired to, if it sits within the first four
    /// entries.
    #[must_use]
    pub fn probe_of(&self, id: u32) -> Option<ProbeId> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .and_then(|idx| ProbeId::try_from(idx).ok())
    }

    /// Append a thermometer with default values and return its id.
    ///
    /// Ids are never reused while the list lives, even after removals.
    pub fn add(&mut self) -> u32 {
        let id = self.items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        self.items.push(ThermometerSettings::new(id));
        id
    }

    /// Remove the thermometer with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Apply `update` to the thermometer with `id`. Returns whether it exists.
    pub fn update(&mut self, id: u32, update: impl FnOnce(&mut ThermometerSettings)) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                update(item);
                true
            }
            None => false,
        }
    }

    /// Copy device targets onto the first four entries by position,
    /// converted to [`TARGET_UNIT`].
    ///
    /// A zero target on the device leaves the local value untouched.
    pub fn sync_from_reading(&mut self, reading: &TemperatureReading) {
        let targets = reading.targets();
        for (item, probe) in self.items.iter_mut().take(PROBE_COUNT).zip(ProbeId::ALL) {
            let target = targets.get(probe);
            if target != 0.0 {
                item.target_temp = TARGET_UNIT.from_celsius(target);
            }
        }
    }
}
