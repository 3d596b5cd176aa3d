//! Stale-while-revalidate response cache.
//!
//! Entries are keyed by API path alone and shared by every resource mounted
//! on that path. Each entry publishes its [`Snapshot`] through a
//! `tokio::sync::watch` channel: the last successful value stays visible
//! while a revalidation runs and after it fails.
//!
//! Fetches for one key are serialised by a per-entry async lock. A
//! [`Revalidation::Dedupe`] request that had to wait for an in-flight fetch
//! coalesces with it; a [`Revalidation::Force`] request always issues its own
//! fetch once the lock is free, so it observes any write acknowledged before
//! it was made.
//!
//! `is_validating` is held up by [`ValidatingGuard`]s. A guard dropped without
//! finishing, as when its task is aborted mid-fetch, releases its claim so
//! the flag cannot stick.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, watch};

use probehub_domain::error::{ApiError, CacheError, ProbeHubError};
use probehub_domain::time::{Timestamp, now};

use crate::api::ApiClient;
use crate::ports::Transport;

/// Records that can live in the cache.
pub trait ResourceData: DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T: DeserializeOwned + Clone + Send + Sync + 'static> ResourceData for T {}

/// What consumers of a resource observe.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Last successful value.
    pub data: Option<T>,
    /// Last error, cleared by the next success.
    pub error: Option<ApiError>,
    /// A fetch for the key is in flight.
    pub is_validating: bool,
    /// When `data` was last fetched.
    pub updated_at: Option<Timestamp>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_validating: false,
            updated_at: None,
        }
    }
}

impl<T> Snapshot<T> {
    /// First fetch still pending: nothing to show yet, not even an error.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none() && self.is_validating
    }
}

/// How a revalidation treats a fetch already in flight for the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidation {
    /// Wait for the in-flight fetch and reuse its outcome.
    Dedupe,
    /// Wait for the in-flight fetch, then fetch again.
    Force,
}

/// Cache-wide lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The client regained focus.
    Focus,
    /// The network came back.
    Reconnect,
}

/// When a mounted resource revalidates on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub revalidate_on_focus: bool,
    pub revalidate_on_reconnect: bool,
    /// Period of background polling; [`Duration::ZERO`] disables it.
    pub refresh_interval: Duration,
    pub revalidate_on_mount: bool,
    /// Retries after consecutive failures before giving up until the next
    /// trigger.
    pub error_retry_count: u32,
    /// Delay before the first retry, doubled for each following one.
    pub error_retry_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            revalidate_on_focus: true,
            revalidate_on_reconnect: true,
            refresh_interval: Duration::ZERO,
            revalidate_on_mount: true,
            error_retry_count: 2,
            error_retry_interval: Duration::from_secs(5),
        }
    }
}

impl PollingConfig {
    /// Default triggers plus polling every `interval`.
    #[must_use]
    pub fn polling(interval: Duration) -> Self {
        Self {
            refresh_interval: interval,
            ..Self::default()
        }
    }

    /// Fetch only on explicit request.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            revalidate_on_focus: false,
            revalidate_on_reconnect: false,
            refresh_interval: Duration::ZERO,
            revalidate_on_mount: false,
            ..Self::default()
        }
    }

    /// Delay before retrying after `failures` consecutive failures, or `None`
    /// once the retry budget is spent.
    #[must_use]
    pub fn retry_delay(&self, failures: u32) -> Option<Duration> {
        (1..=self.error_retry_count).contains(&failures).then(|| {
            self.error_retry_interval
                .saturating_mul(1 << (failures - 1).min(16))
        })
    }
}

pub(crate) struct Entry<T> {
    state: watch::Sender<Snapshot<T>>,
    fetch_lock: tokio::sync::Mutex<()>,
    completed: AtomicU64,
    validations: AtomicUsize,
}

impl<T> Entry<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            state,
            fetch_lock: tokio::sync::Mutex::new(()),
            completed: AtomicU64::new(0),
            validations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.subscribe()
    }

    /// Raise `is_validating` until the returned guard finishes or drops.
    pub(crate) fn begin_validation(self: &Arc<Self>) -> ValidatingGuard<T> {
        // Counted under the channel lock so claims and releases publish in order.
        self.state.send_modify(|snapshot| {
            self.validations.fetch_add(1, Ordering::AcqRel);
            snapshot.is_validating = true;
        });
        ValidatingGuard {
            entry: Some(Arc::clone(self)),
        }
    }

    fn end_validation(&self, publish: impl FnOnce(&mut Snapshot<T>)) {
        self.state.send_modify(|snapshot| {
            let remaining = self.validations.fetch_sub(1, Ordering::AcqRel) - 1;
            publish(snapshot);
            snapshot.is_validating = remaining > 0;
        });
    }

    pub(crate) fn set_data(&self, data: T) {
        self.state.send_modify(|snapshot| snapshot.data = Some(data));
    }
}

/// Claim on an entry's `is_validating` flag.
#[must_use]
pub(crate) struct ValidatingGuard<T> {
    entry: Option<Arc<Entry<T>>>,
}

impl<T> ValidatingGuard<T> {
    /// Release the claim, applying `publish` in the same snapshot update.
    pub(crate) fn finish(mut self, publish: impl FnOnce(&mut Snapshot<T>)) {
        if let Some(entry) = self.entry.take() {
            entry.end_validation(publish);
        }
    }
}

impl<T> Drop for ValidatingGuard<T> {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            entry.end_validation(|_| {});
        }
    }
}

struct Inner<Tr> {
    client: ApiClient<Tr>,
    entries: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
    lifecycle: broadcast::Sender<Lifecycle>,
}

/// Shared response cache. Cloning is cheap and yields the same cache.
pub struct ResourceCache<Tr> {
    inner: Arc<Inner<Tr>>,
}

impl<Tr> Clone for ResourceCache<Tr> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Tr: Transport + Send + Sync + 'static> ResourceCache<Tr> {
    pub fn new(client: ApiClient<Tr>) -> Self {
        let (lifecycle, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Inner {
                client,
                entries: Mutex::new(HashMap::new()),
                lifecycle,
            }),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient<Tr> {
        &self.inner.client
    }

    pub(crate) fn entry<T: ResourceData>(&self, key: &str) -> Result<Arc<Entry<T>>, CacheError> {
        let erased = {
            let mut entries = self
                .inner
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                entries
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Entry::<T>::new()) as Arc<dyn Any + Send + Sync>),
            )
        };
        erased
            .downcast::<Entry<T>>()
            .map_err(|_| CacheError::TypeMismatch {
                key: key.to_string(),
            })
    }

    /// Current snapshot of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypeMismatch`] when `key` holds another type.
    pub fn snapshot<T: ResourceData>(&self, key: &str) -> Result<Snapshot<T>, CacheError> {
        Ok(self.entry::<T>(key)?.state.borrow().clone())
    }

    /// Watch every change of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypeMismatch`] when `key` holds another type.
    pub fn subscribe<T: ResourceData>(
        &self,
        key: &str,
    ) -> Result<watch::Receiver<Snapshot<T>>, CacheError> {
        Ok(self.entry::<T>(key)?.subscribe())
    }

    /// Replace the cached value of `key` locally, without fetching.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypeMismatch`] when `key` holds another type.
    pub fn mutate<T: ResourceData>(&self, key: &str, data: T) -> Result<(), CacheError> {
        self.entry::<T>(key)?.set_data(data);
        Ok(())
    }

    /// Fetch `key` from the device and publish the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeHubError::Cache`] on a type mismatch and
    /// [`ProbeHubError::Api`] when the fetch issued by this call failed. A
    /// deduplicated call reports success.
    pub async fn revalidate<T: ResourceData>(
        &self,
        key: &str,
        mode: Revalidation,
    ) -> Result<(), ProbeHubError> {
        let entry = self.entry::<T>(key)?;
        self.revalidate_entry(key, &entry, mode, None).await?;
        Ok(())
    }

    /// Fetch `key` into `entry`. A `claim` taken before this call is released
    /// here; without one, a claim is taken once the fetch lock is held.
    pub(crate) async fn revalidate_entry<T: ResourceData>(
        &self,
        key: &str,
        entry: &Arc<Entry<T>>,
        mode: Revalidation,
        claim: Option<ValidatingGuard<T>>,
    ) -> Result<(), ApiError> {
        let seen = entry.completed.load(Ordering::Acquire);
        let _lock = entry.fetch_lock.lock().await;
        if mode == Revalidation::Dedupe && entry.completed.load(Ordering::Acquire) != seen {
            tracing::trace!(key, "coalesced with in-flight fetch");
            return Ok(());
        }

        let claim = claim.unwrap_or_else(|| entry.begin_validation());
        tracing::debug!(key, ?mode, "revalidating");
        let result = self.inner.client.get::<T>(key).await;
        entry.completed.fetch_add(1, Ordering::AcqRel);

        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::debug!(key, error = %err, "revalidation failed");
                Err(err.clone())
            }
        };
        claim.finish(move |snapshot| {
            match result {
                Ok(data) => {
                    snapshot.data = Some(data);
                    snapshot.error = None;
                    snapshot.updated_at = Some(now());
                }
                Err(err) => snapshot.error = Some(err),
            }
        });
        outcome
    }

    /// Tell every mounted resource that the client regained focus.
    pub fn notify_focus(&self) {
        self.notify(Lifecycle::Focus);
    }

    /// Tell every mounted resource that the network came back.
    pub fn notify_reconnect(&self) {
        self.notify(Lifecycle::Reconnect);
    }

    fn notify(&self, event: Lifecycle) {
        // Fails only when nothing is mounted.
        let _ = self.inner.lifecycle.send(event);
    }

    #[must_use]
    pub fn lifecycle_events(&self) -> broadcast::Receiver<Lifecycle> {
        self.inner.lifecycle.subscribe()
    }
}
