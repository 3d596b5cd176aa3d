//! Settings page: global preferences, WiFi, MQTT and the thermometer list.
//!
//! Everything except thermometer targets lives in memory for the page
//! session; the device has no endpoint to store it.

use std::sync::Arc;

use probehub_domain::error::{CacheError, ProbeHubError, ValidationError};
use probehub_domain::settings::{
    GlobalSettings, MqttSettings, TARGET_UNIT, Theme, ThermometerList, ThermometerSettings,
};
use probehub_domain::temperature::{TemperatureReading, TemperatureTargets, validate_target};

use crate::cache::ResourceCache;
use crate::ports::{Navigator, Transport};
use crate::resources::{self, DeviceCommands, Resource};
use crate::theme::ThemeContext;
use crate::views::wifi::WifiSettingsView;

pub struct SettingsPage<Tr> {
    theme: ThemeContext,
    global: GlobalSettings,
    mqtt: MqttSettings,
    thermometers: ThermometerList,
    wifi: WifiSettingsView<Tr>,
    temperature: Resource<TemperatureReading, Tr>,
    commands: DeviceCommands<Tr>,
}

impl<Tr: Transport + Clone + Send + Sync + 'static> SettingsPage<Tr> {
    /// Mount the page. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypeMismatch`] if one of the page's keys is
    /// already used with another type.
    pub fn new(
        cache: &ResourceCache<Tr>,
        theme: ThemeContext,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, CacheError> {
        let global = GlobalSettings {
            theme: theme.theme(),
            ..GlobalSettings::default()
        };
        Ok(Self {
            theme,
            global,
            mqtt: MqttSettings::default(),
            thermometers: ThermometerList::default(),
            wifi: WifiSettingsView::new(cache, navigator)?,
            temperature: resources::temperature(cache)?,
            commands: cache.commands(),
        })
    }

    #[must_use]
    pub fn global(&self) -> &GlobalSettings {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut GlobalSettings {
        &mut self.global
    }

    /// Switch the theme for every page sharing the context.
    pub fn set_theme(&mut self, theme: Theme) {
        self.global.theme = theme;
        self.theme.set_theme(theme);
    }

    /// Pick up a theme switched elsewhere.
    pub fn sync_theme(&mut self) {
        self.global.theme = self.theme.theme();
    }

    #[must_use]
    pub fn mqtt(&self) -> &MqttSettings {
        &self.mqtt
    }

    pub fn mqtt_mut(&mut self) -> &mut MqttSettings {
        &mut self.mqtt
    }

    #[must_use]
    pub fn thermometers(&self) -> &ThermometerList {
        &self.thermometers
    }

    pub fn thermometers_mut(&mut self) -> &mut ThermometerList {
        &mut self.thermometers
    }

    #[must_use]
    pub fn wifi(&self) -> &WifiSettingsView<Tr> {
        &self.wifi
    }

    pub fn wifi_mut(&mut self) -> &mut WifiSettingsView<Tr> {
        &mut self.wifi
    }

    #[must_use]
    pub fn temperature(&self) -> &Resource<TemperatureReading, Tr> {
        &self.temperature
    }

    /// Copy the device targets onto the thermometer list.
    pub fn sync_from_reading(&mut self) {
        if let Some(reading) = self.temperature.snapshot().data {
            self.thermometers.sync_from_reading(&reading);
        }
    }

    /// Write one thermometer's target to the probe at its position.
    ///
    /// The form value is converted from [`TARGET_UNIT`] to °C before it is
    /// range-checked and sent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownThermometer`] for an unknown id,
    /// [`ValidationError::InvalidProbe`] when the thermometer sits past the
    /// last probe, a target range error, or the error of the POST.
    pub async fn push_target(&mut self, id: u32) -> Result<TemperatureTargets, ProbeHubError> {
        let thermometer = self
            .thermometers
            .get(id)
            .ok_or(ValidationError::UnknownThermometer(id))?;
        let probe = self.thermometers.probe_of(id).ok_or_else(|| {
            let position = self
                .thermometers
                .items()
                .iter()
                .position(|item| item.id == id)
                .unwrap_or_default();
            ValidationError::InvalidProbe(position + 1)
        })?;
        let value = TARGET_UNIT.to_celsius(thermometer.target_temp);
        validate_target(value)?;

        let last_known = self.temperature.snapshot().data;
        let targets = TemperatureTargets::substitute(last_known.as_ref(), probe, value);
        self.commands.set_targets(&targets).await?;
        if let Err(err) = self.temperature.refresh().await {
            tracing::warn!(error = %err, "failed to refresh temperature after target update");
        }
        Ok(targets)
    }

    /// Check every form on the page.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.global.validate()?;
        self.wifi.validate()?;
        self.mqtt.validate()?;
        self.thermometers
            .items()
            .iter()
            .try_for_each(ThermometerSettings::validate)
    }
}
