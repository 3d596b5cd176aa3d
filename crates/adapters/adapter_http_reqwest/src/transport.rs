//! [`Transport`] implementation backed by `reqwest`.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;

use probehub_app::ports::transport::CONTENT_TYPE_JSON;
use probehub_app::ports::{ApiRequest, ApiResponse, Method, Transport};
use probehub_domain::error::ApiError;

use crate::config::DeviceConfig;
use crate::error::TransportSetupError;

/// Sends requests to one device.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport for the device described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportSetupError`] when the base URL is invalid or the
    /// client cannot be built.
    pub fn new(config: &DeviceConfig) -> Result<Self, TransportSetupError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|err| TransportSetupError::InvalidUrl {
                url: config.base_url.clone(),
                reason: err.to_string(),
            })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TransportSetupError::UnsupportedScheme(
                base_url.scheme().to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(TransportSetupError::Client)?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(err.to_string())
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send {
        let client = self.client.clone();
        let url = self.base_url.join(&request.path);
        async move {
            let url = url.map_err(|_| ApiError::InvalidPath(request.path.clone()))?;
            tracing::trace!(method = %request.method, %url, "sending request to device");

            let mut builder = client
                .request(method(request.method), url)
                .header(CONTENT_TYPE, CONTENT_TYPE_JSON);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
            let response = builder.send().await.map_err(|err| transport_error(&err))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|err| transport_error(&err))?;
            Ok(ApiResponse {
                status,
                body: body.to_vec(),
            })
        }
    }
}
