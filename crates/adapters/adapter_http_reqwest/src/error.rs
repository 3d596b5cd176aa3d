//! Errors raised while building the transport.

/// The transport could not be created.
#[derive(Debug, thiserror::Error)]
pub enum TransportSetupError {
    /// The device base URL is not a valid absolute URL.
    #[error("invalid device url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The device base URL uses a scheme other than http or https.
    #[error("unsupported scheme {0:?} in device url")]
    UnsupportedScheme(String),

    /// The reqwest client could not be built.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unsupported_scheme() {
        let err = TransportSetupError::UnsupportedScheme("ftp".into());
        assert_eq!(err.to_string(), "unsupported scheme \"ftp\" in device url");
    }
}
