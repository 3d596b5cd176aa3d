use clap::{Parser, Subcommand, ValueEnum};

use probehub_adapter_http_reqwest::config::DEFAULT_DEVICE_URL;
use probehub_domain::probe::ProbeId;
use probehub_domain::temperature::TemperatureUnit;

/// Terminal client for probehub thermometers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the device
    #[arg(
        short = 'd',
        long = "device",
        env = "PROBEHUB_DEVICE",
        value_name = "URL",
        default_value = DEFAULT_DEVICE_URL
    )]
    pub device: String,

    /// Unit used to display temperatures
    #[arg(short = 'u', long = "unit", value_enum, default_value = "c")]
    pub unit: Unit,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream live probe readings until interrupted
    Watch,
    /// Show firmware and chip information
    Info,
    /// Set the target temperature of one probe
    SetTarget {
        /// Probe number, 1 to 4
        #[arg(value_parser = parse_probe)]
        probe: ProbeId,
        /// Target in °C, 0 to 300
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Inspect or change the device WiFi station
    #[command(subcommand)]
    Wifi(WifiCommand),
    /// Reboot the device
    Restart,
}

#[derive(Subcommand, Debug)]
pub enum WifiCommand {
    /// Show the network the device is connected to
    Status,
    /// List the access points visible to the device
    Scan,
    /// Store station credentials and restart the device
    Connect {
        ssid: String,
        #[arg(short = 'p', long = "password", default_value = "")]
        password: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    #[value(name = "c", alias = "celsius")]
    Celsius,
    #[value(name = "f", alias = "fahrenheit")]
    Fahrenheit,
}

impl From<Unit> for TemperatureUnit {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Celsius => TemperatureUnit::Celsius,
            Unit::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

fn parse_probe(input: &str) -> Result<ProbeId, String> {
    let number: usize = input
        .parse()
        .map_err(|_| format!("{input:?} is not a probe number"))?;
    ProbeId::from_number(number).map_err(|err| err.to_string())
}
