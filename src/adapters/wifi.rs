//! WiFi station-mode bring-up.
//!
//! The node needs the network only to reach the broker, so bring-up is a
//! single blocking call from `main()`: configure, start, connect, wait
//! for an IP. A failure is fatal for the binary.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: credential validation only.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), CredentialError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialError::InvalidSsid);
    }
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(CredentialError::InvalidPassword);
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub use platform::connect_station;

#[cfg(target_os = "espidf")]
mod platform {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use super::validate_credentials;
    use crate::config::RevendConfig;
    use crate::error::CommsError;

    /// Join the configured access point and wait for an address.
    pub fn connect_station(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &RevendConfig,
    ) -> Result<BlockingWifi<EspWifi<'static>>, CommsError> {
        let ssid = config.wifi_ssid.as_str();
        let password = config.wifi_password.as_str();
        if let Err(e) = validate_credentials(ssid, password) {
            warn!("WiFi: {}", e);
            return Err(CommsError::WifiConnectFailed);
        }

        let driver = EspWifi::new(modem, sysloop.clone(), nvs).map_err(|e| {
            warn!("WiFi: driver init failed: {}", e);
            CommsError::WifiConnectFailed
        })?;
        let mut wifi = BlockingWifi::wrap(driver, sysloop).map_err(|_| CommsError::WifiConnectFailed)?;

        let client = ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            password: password.try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            auth_method: if password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client))
            .map_err(|_| CommsError::WifiConnectFailed)?;

        info!("WiFi: connecting to '{}'", ssid);
        wifi.start().map_err(|_| CommsError::WifiConnectFailed)?;
        wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            CommsError::WifiConnectFailed
        })?;
        wifi.wait_netif_up().map_err(|_| CommsError::WifiConnectFailed)?;

        if let Ok(ip) = wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: connected, ip={}", ip.ip);
        }
        Ok(wifi)
    }
}
