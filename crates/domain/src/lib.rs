//! # probehub-domain
//!
//! Pure domain model for the probehub thermometer client.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, probe indices
//! - Define the **device records** exchanged with the thermometer API
//!   (temperature readings and targets, wifi scan/station/credentials,
//!   system info, acknowledgements)
//! - Define the **settings forms** held by the client (global, wifi,
//!   MQTT, thermometer list) together with their defaults
//! - Contain all invariant enforcement (target range, SSID length, QoS, …)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod probe;
pub mod time;

pub mod ack;
pub mod settings;
pub mod system;
pub mod temperature;
pub mod wifi;
