//! WiFi page: station status, network scan and credential entry.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use probehub_domain::error::{CacheError, ProbeHubError, ValidationError};
use probehub_domain::settings::WifiSettings;
use probehub_domain::wifi::{WifiCredentials, WifiNetwork, WifiScanResult, WifiStationInfo};

use crate::cache::ResourceCache;
use crate::ports::{Navigator, Transport};
use crate::resources::{self, DeviceCommands, Resource};

/// Shortest time the scanning indicator stays on.
pub const MIN_SCAN_DURATION: Duration = Duration::from_secs(2);
/// Delay between accepted credentials and the return to the home page.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(5);

/// Station connection as shown by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    NotConnected,
    Connected(String),
    /// The user asked to pick another network.
    ChangingNetwork,
}

/// Credential prompt for a selected network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPrompt {
    pub network: WifiNetwork,
    /// Network name to join. Taken from the scan, typed in for a hidden one.
    pub ssid: String,
    pub password: String,
}

impl CredentialPrompt {
    /// Hidden networks do not broadcast a name, so the prompt asks for one.
    #[must_use]
    pub fn asks_for_ssid(&self) -> bool {
        self.network.is_hidden()
    }
}

pub struct WifiSettingsView<Tr> {
    scan: Resource<WifiScanResult, Tr>,
    station: Resource<WifiStationInfo, Tr>,
    commands: DeviceCommands<Tr>,
    navigator: Arc<dyn Navigator>,
    settings: WifiSettings,
    connection: ConnectionState,
    prompt: Option<CredentialPrompt>,
    scan_started: Option<Instant>,
}

impl<Tr: Transport + Clone + Send + Sync + 'static> WifiSettingsView<Tr> {
    /// Mount the scan and station resources. Must be called within a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypeMismatch`] if a wifi key is already used
    /// with another type.
    pub fn new(
        cache: &ResourceCache<Tr>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, CacheError> {
        Ok(Self {
            scan: resources::wifi_scan(cache)?,
            station: resources::wifi_station(cache, true)?,
            commands: cache.commands(),
            navigator,
            settings: WifiSettings::default(),
            connection: ConnectionState::NotConnected,
            prompt: None,
            scan_started: None,
        })
    }

    #[must_use]
    pub fn station(&self) -> &Resource<WifiStationInfo, Tr> {
        &self.station
    }

    #[must_use]
    pub fn scan(&self) -> &Resource<WifiScanResult, Tr> {
        &self.scan
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    #[must_use]
    pub fn settings(&self) -> &WifiSettings {
        &self.settings
    }

    /// Static-IP fields, edited in place.
    pub fn settings_mut(&mut self) -> &mut WifiSettings {
        &mut self.settings
    }

    /// Check the static-IP section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.settings.validate()
    }

    /// Adopt the SSID reported by the station resource, unless the user is
    /// picking another network or the device reports no association.
    pub fn sync_station(&mut self) {
        if self.connection == ConnectionState::ChangingNetwork {
            return;
        }
        let Some(info) = self.station.snapshot().data else {
            return;
        };
        if info.is_connected() {
            self.settings.ssid.clone_from(&info.ssid);
            self.settings.is_connected = true;
            self.connection = ConnectionState::Connected(info.ssid);
        }
    }

    /// Clear the visible list and start a fresh scan.
    pub fn trigger_scan(&mut self) {
        self.scan_started = Some(Instant::now());
        self.scan.mutate(WifiScanResult::empty(), true);
    }

    /// Scanning for at least [`MIN_SCAN_DURATION`], and for as long as the
    /// scan request is in flight.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        let held = self
            .scan_started
            .is_some_and(|started| started.elapsed() < MIN_SCAN_DURATION);
        held || self.scan.snapshot().is_validating
    }

    #[must_use]
    pub fn networks(&self) -> Vec<WifiNetwork> {
        self.scan
            .snapshot()
            .data
            .map(|result| result.networks)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&CredentialPrompt> {
        self.prompt.as_ref()
    }

    pub fn select_network(&mut self, network: WifiNetwork) {
        self.prompt = Some(CredentialPrompt {
            ssid: network.ssid.clone(),
            network,
            password: String::new(),
        });
    }

    /// Name the hidden network being joined. Ignored for a network whose
    /// SSID came from the scan.
    pub fn set_ssid(&mut self, ssid: impl Into<String>) {
        if let Some(prompt) = self.prompt.as_mut().filter(|prompt| prompt.asks_for_ssid()) {
            prompt.ssid = ssid.into();
        }
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.password = password.into();
        }
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Send the prompt's credentials.
    ///
    /// On success the page shows the new network, closes the prompt, asks
    /// the device to restart without waiting for it and navigates home after
    /// [`REDIRECT_DELAY`]. A failed restart is logged and otherwise ignored.
    /// Does nothing when no prompt is open.
    ///
    /// # Errors
    ///
    /// Returns a validation error or the error of the credential POST; the
    /// prompt stays open and nothing else happens.
    pub async fn submit_credentials(&mut self) -> Result<(), ProbeHubError> {
        let Some(prompt) = self.prompt.as_ref() else {
            return Ok(());
        };
        let credentials = WifiCredentials::new(prompt.ssid.clone(), prompt.password.clone())?;
        let ack = self.commands.set_wifi_credentials(&credentials).await?;
        tracing::info!(ssid = credentials.ssid(), message = ?ack.message, "wifi credentials accepted");

        let ssid = credentials.ssid().to_string();
        self.settings.ssid.clone_from(&ssid);
        self.settings.is_connected = true;
        self.connection = ConnectionState::Connected(ssid);
        self.prompt = None;

        let commands = self.commands.clone();
        tokio::spawn(async move {
            if let Err(err) = commands.restart_device().await {
                tracing::warn!(error = %err, "device restart request failed, ignoring");
            }
        });
        let navigator = Arc::clone(&self.navigator);
        tokio::spawn(async move {
            tokio::time::sleep(REDIRECT_DELAY).await;
            navigator.navigate("/");
        });
        Ok(())
    }

    /// Forget the current network and let the user pick another one.
    pub fn change_network(&mut self) {
        self.connection = ConnectionState::ChangingNetwork;
        self.settings.change_network();
    }
}
