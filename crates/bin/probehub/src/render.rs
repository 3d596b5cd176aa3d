//! Plain-text rendering of device records.

use std::fmt::Write as _;

use chrono::Local;

use probehub_app::views::ProbeCard;
use probehub_domain::system::SystemInfo;
use probehub_domain::temperature::TemperatureUnit;
use probehub_domain::time::Timestamp;
use probehub_domain::wifi::{WifiNetwork, WifiStationInfo};

/// `12:04:31` in local time.
#[must_use]
pub fn clock(at: Timestamp) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// One dashboard card: `Probe 1  63°C → 71°C`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn probe(card: &ProbeCard, unit: TemperatureUnit) -> String {
    let symbol = unit.symbol();
    format!(
        "{}  {:.0}°{symbol} → {:.0}°{symbol}",
        card.name,
        unit.from_celsius(card.current as f64),
        unit.from_celsius(card.target),
    )
}

/// All cards on one line, prefixed by the fetch time.
#[must_use]
pub fn readings(at: Option<Timestamp>, cards: &[ProbeCard], unit: TemperatureUnit) -> String {
    let stamp = at.map_or_else(|| "--:--:--".to_string(), clock);
    let probes: Vec<String> = cards.iter().map(|card| probe(card, unit)).collect();
    format!("[{stamp}] {}", probes.join(" | "))
}

#[must_use]
pub fn system_info(info: &SystemInfo) -> String {
    let mut out = format!("version: {}", info.version);
    if let Some(cores) = info.cores {
        let _ = write!(out, "\ncores:   {cores}");
    }
    for (key, value) in &info.extra {
        let _ = write!(out, "\n{key}: {value}");
    }
    out
}

#[must_use]
pub fn station(info: &WifiStationInfo) -> String {
    if info.is_connected() {
        format!("connected to {}", info.ssid)
    } else {
        "not connected".to_string()
    }
}

/// Scan results, strongest signal first.
#[must_use]
pub fn networks(networks: &[WifiNetwork]) -> String {
    if networks.is_empty() {
        return "no networks found".to_string();
    }
    let mut sorted: Vec<&WifiNetwork> = networks.iter().collect();
    sorted.sort_by(|left, right| right.rssi.cmp(&left.rssi));
    sorted
        .iter()
        .map(|network| {
            format!(
                "{:<32} {:>4} dBm  {}",
                network.display_name(),
                network.rssi,
                network.authmode.name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use probehub_domain::probe::ProbeId;
    use probehub_domain::wifi::AuthMode;

    use super::*;

    fn card() -> ProbeCard {
        ProbeCard {
            probe: ProbeId::ALL[0],
            name: "Probe 1".to_string(),
            current: 100,
            target: 71.0,
        }
    }

    #[test]
    fn should_render_probe_in_celsius() {
        assert_eq!(probe(&card(), TemperatureUnit::Celsius), "Probe 1  100°C → 71°C");
    }

    #[test]
    fn should_convert_probe_to_fahrenheit() {
        assert_eq!(
            probe(&card(), TemperatureUnit::Fahrenheit),
            "Probe 1  212°F → 160°F"
        );
    }

    #[test]
    fn should_mark_missing_fetch_time() {
        let line = readings(None, &[card()], TemperatureUnit::Celsius);
        assert!(line.starts_with("[--:--:--] Probe 1"));
    }

    #[test]
    fn should_render_system_info_with_extra_fields() {
        let info: SystemInfo =
            serde_json::from_str(r#"{"version":"v5.1.2","cores":2,"model":"esp32"}"#).unwrap();
        assert_eq!(
            system_info(&info),
            "version: v5.1.2\ncores:   2\nmodel: \"esp32\""
        );
    }

    #[test]
    fn should_render_station_state() {
        assert_eq!(station(&WifiStationInfo::default()), "not connected");
        let info = WifiStationInfo {
            ssid: "Home".to_string(),
        };
        assert_eq!(station(&info), "connected to Home");
    }

    #[test]
    fn should_sort_networks_by_signal() {
        let network = |ssid: &str, rssi| WifiNetwork {
            ssid: ssid.to_string(),
            rssi,
            authmode: AuthMode::WPA2_PSK,
        };
        let rendered = networks(&[network("Far", -80), network("", -60), network("Near", -40)]);
        let names: Vec<&str> = rendered
            .lines()
            .map(|line| line.split("  ").next().unwrap_or_default().trim())
            .collect();
        assert_eq!(names, ["Near", "(Hidden Network)", "Far"]);
    }

    #[test]
    fn should_say_when_no_network_found() {
        assert_eq!(networks(&[]), "no networks found");
    }
}
