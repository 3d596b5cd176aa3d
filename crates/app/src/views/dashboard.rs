//! Live probe dashboard with per-probe target editing.

use probehub_domain::error::{ApiError, CacheError, ProbeHubError, ValidationError};
use probehub_domain::probe::ProbeId;
use probehub_domain::temperature::{TemperatureReading, TemperatureTargets, parse_target};

use crate::cache::ResourceCache;
use crate::ports::Transport;
use crate::resources::{self, DeviceCommands, Resource};

/// One probe as drawn on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeCard {
    pub probe: ProbeId,
    pub name: String,
    /// Current temperature rounded to the nearest degree.
    pub current: i64,
    /// Target exactly as reported by the device.
    pub target: f64,
}

impl ProbeCard {
    #[allow(clippy::cast_possible_truncation)]
    fn from_reading(reading: &TemperatureReading, probe: ProbeId) -> Self {
        Self {
            probe,
            name: probe.label(),
            current: reading.current(probe).round() as i64,
            target: reading.target(probe),
        }
    }
}

/// What the dashboard shows for the current fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// Failure banner; wins over stale data.
    Error(ApiError),
    Loading,
    Ready(Vec<ProbeCard>),
}

/// Target editor opened on one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEditor {
    pub probe: ProbeId,
    /// Pending input, as typed.
    pub input: String,
}

/// Result of confirming the target editor.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// No editor was open.
    NotEditing,
    /// The input was refused; nothing was sent and the editor stays open.
    Rejected(ValidationError),
    /// The targets were written and the editor closed.
    Applied(TemperatureTargets),
}

pub struct DashboardView<Tr> {
    temperature: Resource<TemperatureReading, Tr>,
    commands: DeviceCommands<Tr>,
    editor: Option<TargetEditor>,
}

impl<Tr: Transport + Clone + Send + Sync + 'static> DashboardView<Tr> {
    /// Mount the temperature resource. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypeMismatch`] if the temperature key is already
    /// used with another type.
    pub fn new(cache: &ResourceCache<Tr>) -> Result<Self, CacheError> {
        Ok(Self {
            temperature: resources::temperature(cache)?,
            commands: cache.commands(),
            editor: None,
        })
    }

    #[must_use]
    pub fn temperature(&self) -> &Resource<TemperatureReading, Tr> {
        &self.temperature
    }

    #[must_use]
    pub fn state(&self) -> DashboardState {
        let snapshot = self.temperature.snapshot();
        if let Some(err) = snapshot.error {
            return DashboardState::Error(err);
        }
        match snapshot.data {
            Some(reading) => DashboardState::Ready(
                ProbeId::ALL
                    .iter()
                    .map(|probe| ProbeCard::from_reading(&reading, *probe))
                    .collect(),
            ),
            None => DashboardState::Loading,
        }
    }

    #[must_use]
    pub fn editor(&self) -> Option<&TargetEditor> {
        self.editor.as_ref()
    }

    /// Open the editor on `probe`, prefilled with its current target.
    pub fn open_editor(&mut self, probe: ProbeId) {
        let input = self
            .temperature
            .snapshot()
            .data
            .map(|reading| reading.target(probe).to_string())
            .unwrap_or_default();
        self.editor = Some(TargetEditor { probe, input });
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        if let Some(editor) = self.editor.as_mut() {
            editor.input = input.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor = None;
    }

    /// Validate the pending input and write it.
    ///
    /// The four targets are rebuilt from the last known reading with only
    /// the edited probe replaced. Once the POST succeeded the temperature is
    /// refetched, and only then does the editor close.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed POST; the editor stays open.
    pub async fn confirm(&mut self) -> Result<ConfirmOutcome, ProbeHubError> {
        let Some(editor) = self.editor.as_ref() else {
            return Ok(ConfirmOutcome::NotEditing);
        };
        let value = match parse_target(&editor.input) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(probe = %editor.probe, error = %err, "target input rejected");
                return Ok(ConfirmOutcome::Rejected(err));
            }
        };
        let last_known = self.temperature.snapshot().data;
        let targets = TemperatureTargets::substitute(last_known.as_ref(), editor.probe, value);

        self.commands.set_targets(&targets).await?;
        if let Err(err) = self.temperature.refresh().await {
            tracing::warn!(error = %err, "failed to refresh temperature after target update");
        }
        self.editor = None;
        Ok(ConfirmOutcome::Applied(targets))
    }

    /// Force a refetch after a failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the fetch.
    pub async fn retry(&self) -> Result<(), ProbeHubError> {
        self.temperature.refresh().await?;
        Ok(())
    }
}
