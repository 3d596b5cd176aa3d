//! Shared application state for axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::site::StaticSite;

/// Simulated duration of a mock WiFi scan.
pub const MOCK_SCAN_DELAY: Duration = Duration::from_secs(1);

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so only the `Arc` wrapper is cloned.
pub struct AppState {
    /// Build output served to browsers.
    pub site: Arc<StaticSite>,
    /// Answer device endpoints with canned data.
    pub mock_api: bool,
    /// How long the mock scan pretends to take.
    pub scan_delay: Duration,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            site: Arc::clone(&self.site),
            mock_api: self.mock_api,
            scan_delay: self.scan_delay,
        }
    }
}

impl AppState {
    /// Create a new application state serving `site`.
    pub fn new(site: StaticSite, mock_api: bool) -> Self {
        Self {
            site: Arc::new(site),
            mock_api,
            scan_delay: MOCK_SCAN_DELAY,
        }
    }

    /// Override the mock scan delay.
    #[must_use]
    pub fn with_scan_delay(mut self, delay: Duration) -> Self {
        self.scan_delay = delay;
        self
    }
}
