//! # probehub — terminal client
//!
//! Talks to one thermometer over its REST API: live readings, probe targets,
//! firmware information and WiFi provisioning.
//!
//! ## Dependency rule
//! Wires the `reqwest` transport into the application layer; rendering lives
//! here, behaviour lives in `probehub-app`.

mod cli;
mod commands;
mod render;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use probehub_adapter_http_reqwest::{DeviceConfig, ReqwestTransport};
use probehub_app::api::ApiClient;
use probehub_app::cache::ResourceCache;
use probehub_domain::temperature::TemperatureUnit;

use crate::cli::{Args, Command, WifiCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity);

    let transport = ReqwestTransport::new(&DeviceConfig {
        base_url: args.device.clone(),
        ..DeviceConfig::default()
    })
    .with_context(|| format!("invalid device address {}", args.device))?;
    tracing::debug!(device = %transport.base_url(), "using device");
    let cache = ResourceCache::new(ApiClient::new(transport));
    let unit = TemperatureUnit::from(args.unit);

    match args.command {
        Command::Watch => commands::watch(&cache, unit).await?,
        Command::Info => println!("{}", render::system_info(&commands::info(&cache).await?)),
        Command::SetTarget { probe, value } => {
            let targets = commands::set_target(&cache, probe, &value).await?;
            println!(
                "{} target set to {:.1}°{}",
                probe.label(),
                unit.from_celsius(targets.get(probe)),
                unit.symbol()
            );
        }
        Command::Wifi(WifiCommand::Status) => {
            println!("{}", render::station(&commands::wifi_status(&cache).await?));
        }
        Command::Wifi(WifiCommand::Scan) => {
            println!("{}", render::networks(&commands::wifi_scan(&cache).await?));
        }
        Command::Wifi(WifiCommand::Connect { ssid, password }) => {
            commands::wifi_connect(&cache, &ssid, &password).await?;
        }
        Command::Restart => {
            let ack = commands::restart(&cache).await?;
            println!("{}", ack.message.as_deref().unwrap_or("restarting"));
        }
    }
    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
