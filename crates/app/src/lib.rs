//! # probehub-app
//!
//! Application layer — device API client, response cache, view models and
//! **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Transport` — deliver one HTTP request to the device
//!   - `Navigator` — move the client to another page
//! - Provide the typed **API client** (`api`) with path checks, JSON
//!   encoding, the fixed request timeout and status mapping
//! - Provide the **stale-while-revalidate cache** (`cache`) and the polled
//!   device **resources** and write commands built on it (`resources`)
//! - Hold the **view models** of the dashboard and settings pages (`views`)
//!   and the shared theme (`theme`)
//!
//! ## Dependency rule
//! Depends on `probehub-domain` only (plus `tokio` for tasks, timers and
//! channels). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod api;
pub mod cache;
pub mod ports;
pub mod resources;
pub mod theme;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;
