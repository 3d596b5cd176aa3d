//! WiFi form, including the advanced static-IP section.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// WiFi settings form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WifiSettings {
    pub ssid: String,
    pub is_connected: bool,
    pub static_ip: bool,
    pub ip_address: String,
    pub gateway: String,
    pub subnet: String,
    pub dns1: String,
    pub dns2: String,
}

impl WifiSettings {
    /// Forget the current network so the user can pick another one.
    pub fn change_network(&mut self) {
        self.ssid.clear();
        self.is_connected = false;
    }

    /// Check the static-IP section. Nothing is checked while DHCP is used.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIpv4`] naming the first field that
    /// does not hold a dotted-quad address. `dns2` may be left empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.static_ip {
            return Ok(());
        }
        parse_ipv4("ip_address", &self.ip_address)?;
        parse_ipv4("gateway", &self.gateway)?;
        parse_ipv4("subnet", &self.subnet)?;
        parse_ipv4("dns1", &self.dns1)?;
        if !self.dns2.trim().is_empty() {
            parse_ipv4("dns2", &self.dns2)?;
        }
        Ok(())
    }
}

fn parse_ipv4(field: &'static str, value: &str) -> Result<Ipv4Addr, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidIpv4 {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_settings() -> WifiSettings {
        WifiSettings {
            static_ip: true,
            ip_address: "192.168.1.50".into(),
            gateway: "192.168.1.1".into(),
            subnet: "255.255.255.0".into(),
            dns1: "8.8.8.8".into(),
            ..WifiSettings::default()
        }
    }

    #[test]
    fn should_skip_validation_when_using_dhcp() {
        let settings = WifiSettings {
            ip_address: "not an ip".into(),
            ..WifiSettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn should_accept_static_config_without_secondary_dns() {
        assert!(static_settings().validate().is_ok());
    }

    #[test]
    fn should_name_the_invalid_field() {
        let settings = WifiSettings {
            gateway: "192.168.1".into(),
            ..static_settings()
        };
        assert_eq!(
            settings.validate(),
            Err(ValidationError::InvalidIpv4 {
                field: "gateway",
                value: "192.168.1".into(),
            })
        );
    }

    #[test]
    fn should_validate_secondary_dns_when_present() {
        let settings = WifiSettings {
            dns2: "8.8.4.256".into(),
            ..static_settings()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::InvalidIpv4 { field: "dns2", .. })
        ));
    }

    #[test]
    fn should_clear_ssid_on_change_network() {
        let mut settings = WifiSettings {
            ssid: "Home".into(),
            is_connected: true,
            ..WifiSettings::default()
        };
        settings.change_network();
        assert!(settings.ssid.is_empty());
        assert!(!settings.is_connected);
    }
}
