//! Typed client for the device REST API.
//!
//! Wraps a [`Transport`] with the rules shared by every call: paths are
//! absolute from the site root, bodies are JSON, every request is bounded by
//! [`REQUEST_TIMEOUT`] and any non-2xx answer is an error. There are no
//! retries at this layer.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use probehub_domain::ack::DeviceAck;
use probehub_domain::error::ApiError;

use crate::ports::{ApiRequest, Method, Transport};

/// Fixed deadline of a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Device endpoints.
pub mod endpoints {
    pub const SYSTEM_INFO: &str = "/api/v1/system/info";
    pub const TEMPERATURE: &str = "/api/v1/temp/current";
    pub const TEMPERATURE_TARGET: &str = "/api/v1/temp/target";
    pub const WIFI_SCAN: &str = "/api/v1/wifi/scan";
    pub const WIFI_STATION: &str = "/api/v1/wifi/station";
    pub const WIFI_CREDENTIALS: &str = "/api/v1/wifi/credentials";
    pub const DEVICE_RESTART: &str = "/api/v1/device/restart";
}

/// JSON client over a [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport + Sync> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// `GET path`, decoding the body as `R`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`]: invalid path, transport failure, timeout, non-2xx
    /// status or a body that does not decode as `R`.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let body = self.request(Method::Get, path, None).await?;
        decode(&body)
    }

    /// `POST path` with a JSON body, decoding the answer as `R`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`], plus [`ApiError::Encode`] when `body`
    /// cannot be serialized.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = self.request(Method::Post, path, Some(encode(body)?)).await?;
        decode(&body)
    }

    /// `PUT path` with a JSON body, decoding the answer as `R`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::post`].
    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = self.request(Method::Put, path, Some(encode(body)?)).await?;
        decode(&body)
    }

    /// `DELETE path`, decoding the answer as `R`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let body = self.request(Method::Delete, path, None).await?;
        decode(&body)
    }

    /// `POST path` with a JSON body, reading the answer as a [`DeviceAck`].
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::post`] except that the body never fails to
    /// decode.
    pub async fn post_ack<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<DeviceAck, ApiError> {
        let body = self.request(Method::Post, path, Some(encode(body)?)).await?;
        Ok(DeviceAck::from_body(&body))
    }

    /// `POST path` without a body, reading the answer as a [`DeviceAck`].
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`] except that the body never fails to decode.
    pub async fn post_command(&self, path: &str) -> Result<DeviceAck, ApiError> {
        let body = self.request(Method::Post, path, None).await?;
        Ok(DeviceAck::from_body(&body))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ApiError> {
        if !path.starts_with('/') {
            return Err(ApiError::InvalidPath(path.to_string()));
        }
        tracing::debug!(%method, path, "sending device request");
        let request = ApiRequest {
            method,
            path: path.to_string(),
            body,
        };
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.transport.send(request))
            .await
            .map_err(|_| ApiError::Timeout)??;
        if !response.is_success() {
            tracing::debug!(%method, path, status = response.status, "device answered with an error status");
            return Err(ApiError::Status {
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|err| ApiError::Encode(err.to_string()))
}

fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, ApiError> {
    let result = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    result.map_err(|err| ApiError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use probehub_domain::temperature::{TemperatureReading, TemperatureTargets};

    use super::*;
    use crate::testing::{StubTransport, temperature_json};

    fn client(transport: &Arc<StubTransport>) -> ApiClient<Arc<StubTransport>> {
        ApiClient::new(Arc::clone(transport))
    }

    #[tokio::test]
    async fn should_decode_successful_get() {
        let transport = StubTransport::new();
        transport.reply_json(Method::Get, endpoints::TEMPERATURE, &temperature_json());

        let reading: TemperatureReading =
            client(&transport).get(endpoints::TEMPERATURE).await.unwrap();

        assert!((reading.temp_1 - 95.0).abs() < f64::EPSILON);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, None);
    }

    #[tokio::test]
    async fn should_reject_relative_path_without_sending() {
        let transport = StubTransport::new();

        let result: Result<serde_json::Value, _> = client(&transport).get("api/v1/temp").await;

        assert_eq!(result, Err(ApiError::InvalidPath("api/v1/temp".into())));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn should_map_non_2xx_to_status_error() {
        let transport = StubTransport::new();
        transport.reply_raw(Method::Get, "/api/v1/system/info", 503, "busy");

        let result: Result<serde_json::Value, _> =
            client(&transport).get(endpoints::SYSTEM_INFO).await;

        assert_eq!(result, Err(ApiError::Status { status: 503 }));
    }

    #[tokio::test]
    async fn should_answer_404_for_unknown_route() {
        let transport = StubTransport::new();

        let result: Result<serde_json::Value, _> = client(&transport).delete("/api/v1/nope").await;

        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(transport.requests()[0].method, Method::Delete);
    }

    #[tokio::test]
    async fn should_propagate_transport_error() {
        let transport = StubTransport::new();
        transport.reply(
            Method::Get,
            endpoints::WIFI_STATION,
            Err(ApiError::Transport("connection refused".into())),
        );

        let result: Result<serde_json::Value, _> =
            client(&transport).get(endpoints::WIFI_STATION).await;

        assert_eq!(
            result,
            Err(ApiError::Transport("connection refused".into()))
        );
    }

    #[tokio::test]
    async fn should_fail_decoding_unexpected_shape() {
        let transport = StubTransport::new();
        transport.reply_raw(Method::Get, endpoints::TEMPERATURE, 200, "[1, 2, 3]");

        let result: Result<TemperatureReading, _> =
            client(&transport).get(endpoints::TEMPERATURE).await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn should_decode_empty_body_as_null() {
        let transport = StubTransport::new();
        transport.reply_raw(Method::Put, "/api/v1/thing", 204, "");

        let result: Option<serde_json::Value> = client(&transport)
            .put("/api/v1/thing", &serde_json::json!({"a": 1}))
            .await
            .unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_after_ten_seconds() {
        let transport = StubTransport::new();
        transport.reply_json(Method::Get, endpoints::TEMPERATURE, &temperature_json());
        transport.delay(endpoints::TEMPERATURE, Duration::from_secs(11));

        let started = tokio::time::Instant::now();
        let result: Result<TemperatureReading, _> =
            client(&transport).get(endpoints::TEMPERATURE).await;

        assert_eq!(result, Err(ApiError::Timeout));
        assert!(started.elapsed() >= REQUEST_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test]
    async fn should_post_json_body_and_read_plain_text_ack() {
        let transport = StubTransport::new();
        transport.reply_raw(Method::Post, endpoints::TEMPERATURE_TARGET, 200, "targets updated");
        let targets = TemperatureTargets {
            temp_0: 71.0,
            temp_1: 93.0,
            temp_2: 110.0,
            temp_3: 74.0,
        };

        let ack = client(&transport)
            .post_ack(endpoints::TEMPERATURE_TARGET, &targets)
            .await
            .unwrap();

        assert_eq!(ack.message.as_deref(), Some("targets updated"));
        assert_eq!(
            transport.bodies(Method::Post, endpoints::TEMPERATURE_TARGET),
            [serde_json::json!({"temp_0": 71.0, "temp_1": 93.0, "temp_2": 110.0, "temp_3": 74.0})]
        );
    }

    #[tokio::test]
    async fn should_post_command_without_body() {
        let transport = StubTransport::new();
        transport.reply_json(
            Method::Post,
            endpoints::DEVICE_RESTART,
            &serde_json::json!({"message": "Device restarting...", "success": true}),
        );

        let ack = client(&transport)
            .post_command(endpoints::DEVICE_RESTART)
            .await
            .unwrap();

        assert_eq!(ack.success, Some(true));
        assert_eq!(transport.requests()[0].body, None);
    }

    #[tokio::test]
    async fn should_decode_typed_post_answer() {
        let transport = StubTransport::new();
        transport.reply_json(Method::Post, "/api/v1/echo", &serde_json::json!({"ok": true}));

        let answer: serde_json::Value = client(&transport)
            .post("/api/v1/echo", &serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(answer, serde_json::json!({"ok": true}));
    }
}
