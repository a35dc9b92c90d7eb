//! Board identity derived from the ESP32 factory MAC address.
//!
//! The serial number reported by `getDeviceId` is the last four MAC bytes
//! read as a big-endian integer: stable across reboots and unique per
//! board.

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(all(feature = "espidf", target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the call writes exactly six bytes into `mac`.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(all(feature = "espidf", target_os = "espidf")))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn serial_number(mac: &MacAddress) -> u32 {
    u32::from_be_bytes([mac[2], mac[3], mac[4], mac[5]])
}
