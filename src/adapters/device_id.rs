//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces the MQTT client id `revend-XX:XX:XX:XX:XX:XX` (full MAC,
//! uppercase hex). Deterministic across reboots since the MAC is burned
//! into eFuse.

use core::fmt::Write;

/// `revend-` plus 17 MAC characters.
pub type ClientIdString = heapless::String<32>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: writes exactly 6 bytes into `mac`.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn client_id(mac: &MacAddress) -> ClientIdString {
    let mut id = ClientIdString::new();
    let _ = write!(
        id,
        "revend-{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    id
}
