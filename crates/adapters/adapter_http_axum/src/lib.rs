//! # probehub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum) that serves the
//! exported probehub client.
//!
//! ## Responsibilities
//! - Serve the **static build output** with extension-based content types
//!   and the client-side routing fallbacks (`/settings` →
//!   `/settings.html` → `/settings/index.html` → `/index.html`)
//! - Answer `/api/...` locally: permissive CORS, preflight, and an optional
//!   **mock WiFi scan** for development without a device
//! - Expose `/health` for liveness probes
//!
//! ## Dependency rule
//! Depends on `probehub-domain` for the records it mocks. Never leaks axum
//! types into the domain.

pub mod api;
pub mod router;
pub mod site;
pub mod state;
