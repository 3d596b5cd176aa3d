//! View models of the client pages.
//!
//! Each view mounts the resources it displays and exposes plain state for a
//! renderer to draw; user actions are methods.

pub mod dashboard;
pub mod settings;
pub mod wifi;

pub use dashboard::{ConfirmOutcome, DashboardState, DashboardView, ProbeCard, TargetEditor};
pub use settings::SettingsPage;
pub use wifi::{ConnectionState, CredentialPrompt, WifiSettingsView};
