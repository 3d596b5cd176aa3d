//! Common error types used across the workspace.
//!
//! Each failure family has its own typed enum; [`ProbeHubError`] unifies them
//! through `#[from]` conversions so callers can use `?` across layers.

/// Top-level error for every probehub operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("device api error")]
    Api(#[from] ApiError),

    #[error("cache error")]
    Cache(#[from] CacheError),
}

/// Failure talking to the device REST API.
///
/// `Clone` so the last error of a resource can be shared with every
/// subscriber of its cache entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request path was not absolute from the site root.
    #[error("api path must start with '/': {0}")]
    InvalidPath(String),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// Network-level failure (connection refused, reset, DNS, …).
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the fixed request timeout.
    #[error("request timed out")]
    Timeout,

    /// The device answered with a non-2xx status.
    #[error("HTTP error: status {status}")]
    Status { status: u16 },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the device answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// A domain invariant was violated by user input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("target temperature is not a number: {input:?}")]
    TargetNotNumeric { input: String },

    #[error("target temperature {value} is outside [{min}, {max}]")]
    TargetOutOfRange { value: f64, min: f64, max: f64 },

    #[error("no such probe: {0}")]
    InvalidProbe(usize),

    #[error("SSID must be 1 to 32 bytes long, got {0}")]
    SsidLength(usize),

    #[error("password must be at most 63 bytes long, got {0}")]
    PasswordLength(usize),

    #[error("update interval {0}s is outside 1..=60")]
    UpdateInterval(u32),

    #[error("MQTT broker must not be empty when MQTT is enabled")]
    MqttBrokerMissing,

    #[error("MQTT port must be non-zero")]
    MqttPort,

    #[error("alert threshold {0} is outside 1..=20")]
    AlertThreshold(f64),

    #[error("thermometer target {0} is outside 32..=500")]
    ThermometerTarget(f64),

    #[error("{field} is not a valid IPv4 address: {value:?}")]
    InvalidIpv4 { field: &'static str, value: String },

    #[error("name must not be empty")]
    EmptyName,

    #[error("no such thermometer: {0}")]
    UnknownThermometer(u32),
}

/// Misuse of the response cache.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// A key was mounted with a different record type than the one already
    /// stored under it.
    #[error("cache key {key} already holds a different resource type")]
    TypeMismatch { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_status_code_of_status_error() {
        let err = ApiError::Status { status: 503 };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "HTTP error: status 503");
    }

    #[test]
    fn should_not_expose_status_for_transport_error() {
        assert_eq!(ApiError::Timeout.status(), None);
        assert_eq!(ApiError::Transport("reset".into()).status(), None);
    }

    #[test]
    fn should_convert_validation_error_into_top_level_error() {
        let err: ProbeHubError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            ProbeHubError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_convert_api_error_into_top_level_error() {
        let err: ProbeHubError = ApiError::Timeout.into();
        assert_eq!(err, ProbeHubError::Api(ApiError::Timeout));
    }
}
