//! Local `/api/...` endpoints.
//!
//! Only paths below `/api/` belong here; a bare `/api` is a page path like
//! any other. The exported client talks to the device directly; this server only
//! answers API calls made against itself during development. Every answer
//! carries permissive CORS headers, preflight requests succeed, and with the
//! mock enabled the WiFi scan returns canned networks after a simulated delay.

use axum::extract::State;
use axum::http::Method;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router, middleware};
use serde::Serialize;

use probehub_domain::wifi::{AuthMode, WifiNetwork, WifiScanResult};

use crate::state::AppState;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Routes for every path below `/api/`, to be merged into the top-level router.
pub fn routes(mock_api: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/api/", any(fallback))
        .route("/api/{*rest}", any(fallback));
    let router = if mock_api {
        router
            .route("/api/v1/wifi/scan", any(mock_scan))
            .route("/api/wifi-scan", any(mock_scan))
    } else {
        router
    };
    router.layer(middleware::map_response(with_cors))
}

async fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "API endpoint not found",
        }),
    )
        .into_response()
}

/// Answers the scan paths whatever the method, preflight aside.
async fn mock_scan(method: Method, State(state): State<AppState>) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    tracing::debug!(delay = ?state.scan_delay, "simulating wifi scan");
    tokio::time::sleep(state.scan_delay).await;
    Json(mock_networks()).into_response()
}

/// Networks reported by the mock scan.
#[must_use]
pub fn mock_networks() -> WifiScanResult {
    let network = |ssid: &str, rssi| WifiNetwork {
        ssid: ssid.to_string(),
        rssi,
        authmode: AuthMode::WPA2_PSK,
    };
    WifiScanResult::from_networks(vec![
        network("MyHomeWiFi", -45),
        network("NeighborWiFi", -65),
        network("GuestNetwork", -70),
        network("HiddenNetwork", -80),
        network("OfficeWiFi", -55),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_mock_five_secured_networks() {
        let result = mock_networks();
        assert_eq!(result.count, 5);
        assert_eq!(result.networks[0].ssid, "MyHomeWiFi");
        assert!(
            result
                .networks
                .iter()
                .all(|network| network.authmode == AuthMode::WPA2_PSK)
        );
    }
}
