//! One async function per subcommand, over any device [`Transport`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, bail};
use tokio::sync::Notify;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::WatchStream;

use probehub_app::cache::ResourceCache;
use probehub_app::ports::{Navigator, Transport};
use probehub_app::resources;
use probehub_app::views::{ConfirmOutcome, DashboardState, DashboardView, WifiSettingsView};
use probehub_domain::ack::DeviceAck;
use probehub_domain::error::ApiError;
use probehub_domain::probe::ProbeId;
use probehub_domain::system::SystemInfo;
use probehub_domain::temperature::{TemperatureTargets, TemperatureUnit};
use probehub_domain::time::Timestamp;
use probehub_domain::wifi::{AuthMode, WifiNetwork, WifiStationInfo};

use crate::render;

const SCAN_POLL: Duration = Duration::from_millis(100);

/// Print a line per fetched reading until ctrl-c.
///
/// # Errors
///
/// Fails when the temperature resource cannot be mounted or the signal
/// handler cannot be installed. Device errors are printed, not returned.
pub async fn watch<Tr>(cache: &ResourceCache<Tr>, unit: TemperatureUnit) -> anyhow::Result<()>
where
    Tr: Transport + Clone + Send + Sync + 'static,
{
    let dashboard = DashboardView::new(cache)?;
    let mut updates = WatchStream::new(dashboard.temperature().subscribe());
    let mut shown: Option<Timestamp> = None;
    let mut reported: Option<ApiError> = None;

    loop {
        tokio::select! {
            update = updates.next() => {
                let Some(snapshot) = update else { break };
                match dashboard.state() {
                    DashboardState::Error(err) => {
                        if reported.as_ref() != Some(&err) {
                            eprintln!("device error: {err}");
                            reported = Some(err);
                        }
                    }
                    DashboardState::Ready(cards) if snapshot.updated_at != shown => {
                        println!("{}", render::readings(snapshot.updated_at, &cards, unit));
                        shown = snapshot.updated_at;
                        reported = None;
                    }
                    DashboardState::Ready(_) | DashboardState::Loading => {}
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                break;
            }
        }
    }
    Ok(())
}

/// # Errors
///
/// Fails when the device cannot be reached or answers garbage.
pub async fn info<Tr>(cache: &ResourceCache<Tr>) -> anyhow::Result<SystemInfo>
where
    Tr: Transport + Clone + Send + Sync + 'static,
{
    let resource = resources::system_info(cache)?;
    resource.refresh().await?;
    resource
        .snapshot()
        .data
        .context("device returned no system information")
}

/// Write `input` as the target of `probe`, keeping the other three.
///
/// The current targets are read first so the untouched probes keep their
/// value on the device.
///
/// # Errors
///
/// Fails when the input is rejected, when the current targets cannot be read
/// or when the device refuses the write.
pub async fn set_target<Tr>(
    cache: &ResourceCache<Tr>,
    probe: ProbeId,
    input: &str,
) -> anyhow::Result<TemperatureTargets>
where
    Tr: Transport + Clone + Send + Sync + 'static,
{
    let mut dashboard = DashboardView::new(cache)?;
    dashboard
        .temperature()
        .refresh()
        .await
        .context("failed to read the current targets")?;
    dashboard.open_editor(probe);
    dashboard.set_input(input);
    match dashboard.confirm().await? {
        ConfirmOutcome::Applied(targets) => Ok(targets),
        ConfirmOutcome::Rejected(err) => Err(err.into()),
        ConfirmOutcome::NotEditing => bail!("target editor closed before confirmation"),
    }
}

/// # Errors
///
/// Fails when the device cannot be reached.
pub async fn wifi_status<Tr>(cache: &ResourceCache<Tr>) -> anyhow::Result<WifiStationInfo>
where
    Tr: Transport + Clone + Send + Sync + 'static,
{
    let station = resources::wifi_station(cache, true)?;
    station.refresh().await?;
    Ok(station.snapshot().data.unwrap_or_default())
}

/// Run a scan and wait for it, at least as long as the page would show the
/// scanning state.
///
/// # Errors
///
/// Fails when the scan request fails.
pub async fn wifi_scan<Tr>(cache: &ResourceCache<Tr>) -> anyhow::Result<Vec<WifiNetwork>>
where
    Tr: Transport + Clone + Send + Sync + 'static,
{
    let mut view = WifiSettingsView::new(cache, Arc::new(Handoff::default()))?;
    view.trigger_scan();
    while view.is_scanning() {
        tokio::time::sleep(SCAN_POLL).await;
    }
    if let Some(err) = view.scan().snapshot().error {
        return Err(err).context("wifi scan failed");
    }
    Ok(view.networks())
}

/// Store credentials, then wait until the device was asked to restart.
///
/// # Errors
///
/// Fails when the credentials are invalid or refused. A failed restart is
/// only logged.
pub async fn wifi_connect<Tr>(
    cache: &ResourceCache<Tr>,
    ssid: &str,
    password: &str,
) -> anyhow::Result<()>
where
    Tr: Transport + Clone + Send + Sync + 'static,
{
    let handoff = Arc::new(Handoff::default());
    let mut view = WifiSettingsView::new(cache, Arc::clone(&handoff) as Arc<dyn Navigator>)?;
    view.select_network(WifiNetwork {
        ssid: ssid.to_string(),
        rssi: 0,
        authmode: if password.is_empty() {
            AuthMode::OPEN
        } else {
            AuthMode::WPA2_PSK
        },
    });
    view.set_password(password);
    view.submit_credentials().await?;
    println!("credentials stored, device is restarting to join {ssid}");
    handoff.redirected.notified().await;
    Ok(())
}

/// # Errors
///
/// Fails when the request fails or the device reports a failure.
pub async fn restart<Tr>(cache: &ResourceCache<Tr>) -> anyhow::Result<DeviceAck>
where
    Tr: Transport + Clone + Send + Sync + 'static,
{
    let ack = cache.commands().restart_device().await?;
    if ack.is_rejected() {
        bail!(
            "device refused to restart: {}",
            ack.message.as_deref().unwrap_or("no reason given")
        );
    }
    Ok(ack)
}

/// Stands in for page navigation: the terminal has nowhere to go once the
/// device restarts, so it only signals that the hand-off happened.
#[derive(Debug, Default)]
struct Handoff {
    redirected: Notify,
}

impl Navigator for Handoff {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "device hand-off complete");
        self.redirected.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use probehub_adapter_http_reqwest::{DeviceConfig, ReqwestTransport};
    use probehub_app::api::ApiClient;
    use serde_json::{Value, json};

    use super::*;

    type Seen = Arc<Mutex<Vec<Value>>>;

    async fn device(router: Router) -> ResourceCache<ReqwestTransport> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let transport = ReqwestTransport::new(&DeviceConfig {
            base_url: format!("http://{addr}"),
            ..DeviceConfig::default()
        })
        .unwrap();
        ResourceCache::new(ApiClient::new(transport))
    }

    async fn current() -> Json<Value> {
        Json(json!({
            "temp_0": 63, "temp_1": 95, "temp_2": 74, "temp_3": 70,
            "temp_0_target": 71, "temp_1_target": 93,
            "temp_2_target": 74, "temp_3_target": 74
        }))
    }

    async fn store_targets(State(seen): State<Seen>, Json(body): Json<Value>) -> &'static str {
        seen.lock().unwrap().push(body);
        "targets updated"
    }

    fn thermometer(seen: &Seen) -> Router {
        Router::new()
            .route("/api/v1/temp/current", get(current))
            .route("/api/v1/temp/target", post(store_targets))
            .with_state(Arc::clone(seen))
    }

    #[tokio::test]
    async fn should_send_all_four_targets() {
        let seen = Seen::default();
        let cache = device(thermometer(&seen)).await;

        let targets = set_target(&cache, ProbeId::ALL[1], "120").await.unwrap();

        assert!((targets.temp_1 - 120.0).abs() < f64::EPSILON);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [json!({"temp_0": 71.0, "temp_1": 120.0, "temp_2": 74.0, "temp_3": 74.0})]
        );
    }

    #[tokio::test]
    async fn should_not_post_rejected_target() {
        let seen = Seen::default();
        let cache = device(thermometer(&seen)).await;

        let err = set_target(&cache, ProbeId::ALL[0], "301").await.unwrap_err();

        assert!(err.to_string().contains("outside"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_not_write_targets_when_device_is_unreadable() {
        let seen = Seen::default();
        let router = Router::new()
            .route("/api/v1/temp/target", post(store_targets))
            .with_state(Arc::clone(&seen));
        let cache = device(router).await;

        assert!(set_target(&cache, ProbeId::ALL[0], "80").await.is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_read_system_info() {
        let router = Router::new().route(
            "/api/v1/system/info",
            get(|| async { Json(json!({"version": "v5.1.2", "cores": 2})) }),
        );
        let cache = device(router).await;

        let info = info(&cache).await.unwrap();

        assert_eq!(info.version, "v5.1.2");
        assert_eq!(info.cores, Some(2));
    }

    #[tokio::test]
    async fn should_report_station_ssid() {
        let router = Router::new().route(
            "/api/v1/wifi/station",
            get(|| async { Json(json!({"ssid": "Home"})) }),
        );
        let cache = device(router).await;

        let station = wifi_status(&cache).await.unwrap();

        assert!(station.is_connected());
        assert_eq!(station.ssid, "Home");
    }

    #[tokio::test]
    async fn should_fail_when_device_refuses_restart() {
        let router = Router::new().route(
            "/api/v1/device/restart",
            post(|| async { Json(json!({"message": "busy", "success": false})) }),
        );
        let cache = device(router).await;

        let err = restart(&cache).await.unwrap_err();

        assert!(err.to_string().contains("busy"));
    }
}
