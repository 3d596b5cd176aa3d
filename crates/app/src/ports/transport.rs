//! Transport port — one HTTP exchange with the device.
//!
//! Implementations deliver the request and hand back whatever the device
//! answered. Status codes are interpreted by [`crate::api::ApiClient`], never
//! by the transport.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use probehub_domain::error::ApiError;

/// Content type sent with every request.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP verb of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path absolute from the site root, e.g. `/api/v1/temp/current`.
    pub path: String,
    /// JSON-encoded body, if any.
    pub body: Option<Vec<u8>>,
}

/// Raw answer of the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers requests to the device.
pub trait Transport {
    /// Send `request` with a `Content-Type: application/json` header.
    ///
    /// Network failures map to [`ApiError::Transport`] (or
    /// [`ApiError::Timeout`] when the underlying client gave up waiting).
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

impl<T: Transport + Send + Sync> Transport for Arc<T> {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send {
        (**self).send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_treat_only_2xx_as_success() {
        let response = |status| ApiResponse {
            status,
            body: Vec::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(199).is_success());
        assert!(!response(300).is_success());
        assert!(!response(500).is_success());
    }

    #[test]
    fn should_display_method_verbs() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Get.as_str(), "GET");
    }
}
