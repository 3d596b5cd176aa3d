//! Device resources and write commands.
//!
//! A [`Resource`] is a mounted view of one cache entry: it owns the
//! background task that revalidates the entry on interval ticks, lifecycle
//! signals and error retries. The task stops once every handle is dropped.
//!
//! [`DeviceCommands`] are the write side. They never refresh a resource on
//! their own; callers refresh what they need once a write succeeded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use probehub_domain::ack::DeviceAck;
use probehub_domain::error::{ApiError, CacheError};
use probehub_domain::system::SystemInfo;
use probehub_domain::temperature::{TemperatureReading, TemperatureTargets};
use probehub_domain::wifi::{WifiCredentials, WifiScanResult, WifiStationInfo};

use crate::api::{ApiClient, endpoints};
use crate::cache::{
    Entry, Lifecycle, PollingConfig, ResourceCache, ResourceData, Revalidation, Snapshot,
    ValidatingGuard,
};
use crate::ports::Transport;

struct Mounted<T> {
    key: String,
    entry: Arc<Entry<T>>,
}

struct PollTask(JoinHandle<()>);

impl Drop for PollTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Handle on a polled cache entry. Clones share the polling task.
pub struct Resource<T, Tr> {
    cache: ResourceCache<Tr>,
    mounted: Option<Arc<Mounted<T>>>,
    receiver: watch::Receiver<Snapshot<T>>,
    _task: Option<Arc<PollTask>>,
}

impl<T, Tr> Clone for Resource<T, Tr> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            mounted: self.mounted.clone(),
            receiver: self.receiver.clone(),
            _task: self._task.clone(),
        }
    }
}

impl<T: ResourceData, Tr: Transport + Send + Sync + 'static> Resource<T, Tr> {
    /// Mount `key` on `cache`. A `None` key mounts a disabled resource that
    /// never fetches.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypeMismatch`] when `key` already holds another
    /// record type.
    pub fn mount(
        cache: &ResourceCache<Tr>,
        key: Option<&str>,
        config: PollingConfig,
    ) -> Result<Self, CacheError> {
        let Some(key) = key else {
            let (_, receiver) = watch::channel(Snapshot::default());
            return Ok(Self {
                cache: cache.clone(),
                mounted: None,
                receiver,
                _task: None,
            });
        };

        let entry = cache.entry::<T>(key)?;
        let receiver = entry.subscribe();
        let pending = config
            .revalidate_on_mount
            .then(|| entry.begin_validation());
        let mounted = Arc::new(Mounted {
            key: key.to_string(),
            entry,
        });
        let task = tokio::spawn(poll(cache.clone(), Arc::clone(&mounted), config, pending));
        Ok(Self {
            cache: cache.clone(),
            mounted: Some(mounted),
            receiver,
            _task: Some(Arc::new(PollTask(task))),
        })
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.mounted.as_ref().map(|mounted| mounted.key.as_str())
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Watch every change of the entry.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.receiver.clone()
    }

    /// Force a revalidation and wait for it. No-op on a disabled resource.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the fetch; it is also published in the
    /// snapshot.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        match &self.mounted {
            Some(mounted) => {
                self.cache
                    .revalidate_entry(&mounted.key, &mounted.entry, Revalidation::Force, None)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Start a forced revalidation without waiting for it.
    pub fn revalidate_in_background(&self) {
        let Some(mounted) = self.mounted.clone() else {
            return;
        };
        let claim = mounted.entry.begin_validation();
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(err) = cache
                .revalidate_entry(&mounted.key, &mounted.entry, Revalidation::Force, Some(claim))
                .await
            {
                tracing::debug!(key = %mounted.key, error = %err, "background revalidation failed");
            }
        });
    }

    /// Replace the cached value for every subscriber, then optionally
    /// revalidate in the background.
    pub fn mutate(&self, data: T, revalidate: bool) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        mounted.entry.set_data(data);
        if revalidate {
            self.revalidate_in_background();
        }
    }
}

async fn poll<T: ResourceData, Tr: Transport + Send + Sync + 'static>(
    cache: ResourceCache<Tr>,
    mounted: Arc<Mounted<T>>,
    config: PollingConfig,
    pending: Option<ValidatingGuard<T>>,
) {
    let mut lifecycle = cache.lifecycle_events();
    let mut ticker = (!config.refresh_interval.is_zero()).then(|| {
        let mut ticker = tokio::time::interval_at(
            Instant::now() + config.refresh_interval,
            config.refresh_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut failures = 0;
    let mut retry_at = None;

    if let Some(claim) = pending {
        let outcome = cache
            .revalidate_entry(&mounted.key, &mounted.entry, Revalidation::Dedupe, Some(claim))
            .await;
        (failures, retry_at) = schedule_retry(&config, &outcome, failures);
    }

    loop {
        // A fresh trigger starts a new retry budget.
        let retrying = tokio::select! {
            () = next_tick(ticker.as_mut()) => false,
            () = retry_due(retry_at) => {
                tracing::debug!(key = %mounted.key, failures, "retrying after error");
                true
            }
            event = lifecycle.recv() => match event {
                Ok(Lifecycle::Focus) if config.revalidate_on_focus => false,
                Ok(Lifecycle::Reconnect) if config.revalidate_on_reconnect => false,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return,
            },
        };
        if !retrying {
            failures = 0;
        }
        let outcome = cache
            .revalidate_entry(&mounted.key, &mounted.entry, Revalidation::Dedupe, None)
            .await;
        (failures, retry_at) = schedule_retry(&config, &outcome, failures);
    }
}

fn schedule_retry(
    config: &PollingConfig,
    outcome: &Result<(), ApiError>,
    failures: u32,
) -> (u32, Option<Instant>) {
    match outcome {
        Ok(()) => (0, None),
        Err(_) => {
            let failures = failures.saturating_add(1);
            let retry_at = config
                .retry_delay(failures)
                .map(|delay| Instant::now() + delay);
            (failures, retry_at)
        }
    }
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn retry_due(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// `GET /api/v1/system/info`, polled every second.
///
/// # Errors
///
/// Returns [`CacheError::TypeMismatch`] if the key was mounted with another type.
pub fn system_info<Tr: Transport + Send + Sync + 'static>(
    cache: &ResourceCache<Tr>,
) -> Result<Resource<SystemInfo, Tr>, CacheError> {
    Resource::mount(
        cache,
        Some(endpoints::SYSTEM_INFO),
        PollingConfig::polling(Duration::from_secs(1)),
    )
}

/// `GET /api/v1/temp/current`, polled every second.
///
/// # Errors
///
/// Returns [`CacheError::TypeMismatch`] if the key was mounted with another type.
pub fn temperature<Tr: Transport + Send + Sync + 'static>(
    cache: &ResourceCache<Tr>,
) -> Result<Resource<TemperatureReading, Tr>, CacheError> {
    Resource::mount(
        cache,
        Some(endpoints::TEMPERATURE),
        PollingConfig::polling(Duration::from_secs(1)),
    )
}

/// `GET /api/v1/wifi/scan`, fetched only on explicit request.
///
/// # Errors
///
/// Returns [`CacheError::TypeMismatch`] if the key was mounted with another type.
pub fn wifi_scan<Tr: Transport + Send + Sync + 'static>(
    cache: &ResourceCache<Tr>,
) -> Result<Resource<WifiScanResult, Tr>, CacheError> {
    Resource::mount(cache, Some(endpoints::WIFI_SCAN), PollingConfig::manual())
}

/// `GET /api/v1/wifi/station`, polled every five seconds while `enabled`.
///
/// # Errors
///
/// Returns [`CacheError::TypeMismatch`] if the key was mounted with another type.
pub fn wifi_station<Tr: Transport + Send + Sync + 'static>(
    cache: &ResourceCache<Tr>,
    enabled: bool,
) -> Result<Resource<WifiStationInfo, Tr>, CacheError> {
    Resource::mount(
        cache,
        enabled.then_some(endpoints::WIFI_STATION),
        PollingConfig::polling(Duration::from_secs(5)),
    )
}

/// Write commands sent to the device.
#[derive(Debug, Clone)]
pub struct DeviceCommands<Tr> {
    client: ApiClient<Tr>,
}

impl<Tr: Transport + Sync> DeviceCommands<Tr> {
    pub fn new(client: ApiClient<Tr>) -> Self {
        Self { client }
    }

    /// Write all four probe targets.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the POST, after logging it.
    pub async fn set_targets(&self, targets: &TemperatureTargets) -> Result<DeviceAck, ApiError> {
        self.client
            .post_ack(endpoints::TEMPERATURE_TARGET, targets)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "failed to set temperature targets"))
    }

    /// Store the station credentials on the device.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the POST, after logging it.
    pub async fn set_wifi_credentials(
        &self,
        credentials: &WifiCredentials,
    ) -> Result<DeviceAck, ApiError> {
        self.client
            .post_ack(endpoints::WIFI_CREDENTIALS, credentials)
            .await
            .inspect_err(|err| {
                tracing::error!(ssid = credentials.ssid(), error = %err, "failed to set wifi credentials");
            })
    }

    /// Ask the device to reboot.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the POST, after logging it.
    pub async fn restart_device(&self) -> Result<DeviceAck, ApiError> {
        self.client
            .post_command(endpoints::DEVICE_RESTART)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "failed to restart device"))
    }
}

impl<Tr: Transport + Clone + Send + Sync + 'static> ResourceCache<Tr> {
    /// Write commands sharing this cache's client.
    #[must_use]
    pub fn commands(&self) -> DeviceCommands<Tr> {
        DeviceCommands::new(self.client().clone())
    }
}
