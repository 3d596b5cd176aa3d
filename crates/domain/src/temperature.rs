//! Temperature readings and probe targets.
//!
//! Field names follow the device wire format (`temp_0`, `temp_0_target`, …).
//! The device has no per-probe update: targets are always written as a full
//! four-probe vector.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::probe::ProbeId;

/// Lowest target temperature accepted by the client, in °C.
pub const MIN_TARGET_CELSIUS: f64 = 0.0;
/// Highest target temperature accepted by the client, in °C.
pub const MAX_TARGET_CELSIUS: f64 = 300.0;

/// Snapshot of all probes returned by `GET /api/v1/temp/current`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub temp_0: f64,
    pub temp_1: f64,
    pub temp_2: f64,
    pub temp_3: f64,
    pub temp_0_target: f64,
    pub temp_1_target: f64,
    pub temp_2_target: f64,
    pub temp_3_target: f64,
}

impl TemperatureReading {
    /// Current temperature of `probe`.
    #[must_use]
    pub fn current(&self, probe: ProbeId) -> f64 {
        match probe.index() {
            0 => self.temp_0,
            1 => self.temp_1,
            2 => self.temp_2,
            _ => self.temp_3,
        }
    }

    /// Target temperature of `probe`.
    #[must_use]
    pub fn target(&self, probe: ProbeId) -> f64 {
        self.targets().get(probe)
    }

    /// The four targets as a writable vector.
    #[must_use]
    pub fn targets(&self) -> TemperatureTargets {
        TemperatureTargets {
            temp_0: self.temp_0_target,
            temp_1: self.temp_1_target,
            temp_2: self.temp_2_target,
            temp_3: self.temp_3_target,
        }
    }
}

/// Body of `POST /api/v1/temp/target`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureTargets {
    pub temp_0: f64,
    pub temp_1: f64,
    pub temp_2: f64,
    pub temp_3: f64,
}

impl TemperatureTargets {
    /// Target of `probe`.
    #[must_use]
    pub fn get(&self, probe: ProbeId) -> f64 {
        match probe.index() {
            0 => self.temp_0,
            1 => self.temp_1,
            2 => self.temp_2,
            _ => self.temp_3,
        }
    }

    /// Copy of `self` with only `probe`'s target replaced.
    #[must_use]
    pub fn with_probe(mut self, probe: ProbeId, value: f64) -> Self {
        let slot = match probe.index() {
            0 => &mut self.temp_0,
            1 => &mut self.temp_1,
            2 => &mut self.temp_2,
            _ => &mut self.temp_3,
        };
        *slot = value;
        self
    }

    /// Rebuild the full vector for a single-probe edit.
    ///
    /// Unchanged probes carry their last known target, or `0` when nothing
    /// has been fetched yet.
    #[must_use]
    pub fn substitute(last_known: Option<&TemperatureReading>, probe: ProbeId, value: f64) -> Self {
        last_known
            .map(TemperatureReading::targets)
            .unwrap_or_default()
            .with_probe(probe, value)
    }
}

/// Parse a target typed by the user.
///
/// # Errors
///
/// Returns [`ValidationError::TargetNotNumeric`] when the trimmed input is
/// not a finite number, and [`ValidationError::TargetOutOfRange`] when it is
/// outside `[0, 300]`.
pub fn parse_target(input: &str) -> Result<f64, ValidationError> {
    let value = input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::TargetNotNumeric {
            input: input.to_string(),
        })?;
    validate_target(value)?;
    Ok(value)
}

/// Check that `value` is an acceptable target.
///
/// # Errors
///
/// Returns [`ValidationError::TargetOutOfRange`] when `value` is outside
/// `[0, 300]` (NaN included).
pub fn validate_target(value: f64) -> Result<(), ValidationError> {
    if (MIN_TARGET_CELSIUS..=MAX_TARGET_CELSIUS).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::TargetOutOfRange {
            value,
            min: MIN_TARGET_CELSIUS,
            max: MAX_TARGET_CELSIUS,
        })
    }
}

/// Unit used to display temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a device value (always °C) into this unit.
    #[must_use]
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Convert a value in this unit into the °C the device expects.
    #[must_use]
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }

    /// Unit suffix (`C` / `F`).
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}
