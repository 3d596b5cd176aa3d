//! Client-side settings forms.
//!
//! These records live only in the client for the page session; the device
//! API has no endpoint to persist them (except thermometer targets, which map
//! onto the probe targets).

pub mod global;
pub mod mqtt;
pub mod network;
pub mod thermometer;

pub use global::{GlobalSettings, Theme};
pub use mqtt::{MqttSettings, Qos};
pub use network::WifiSettings;
pub use thermometer::{TARGET_UNIT, ThermometerList, ThermometerSettings};

/// Parse a numeric form input, falling back to `default` when the input is
/// empty or not a number.
#[must_use]
pub fn numeric_input_or(input: &str, default: f64) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}
