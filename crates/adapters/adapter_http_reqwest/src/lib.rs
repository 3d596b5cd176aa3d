//! # probehub-adapter-http-reqwest
//!
//! Device transport — sends the API requests built by `probehub-app` to the
//! thermometer over HTTP with `reqwest`.
//!
//! ## Responsibilities
//! - Resolve request paths against the configured device base URL
//! - Attach the JSON content type and forward the body untouched
//! - Map network failures onto [`ApiError`](probehub_domain::error::ApiError)
//!
//! Status codes are returned as-is; interpreting them is the API client's job.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `probehub-app` and `probehub-domain`.

pub mod config;
pub mod error;
pub mod transport;

pub use config::DeviceConfig;
pub use error::TransportSetupError;
pub use transport::ReqwestTransport;
