use serde::{Deserialize, Serialize};

use crate::config::DeviceConfig;

/// Identity and storage capacity of a device.
///
/// `flash_used <= flash_total` holds for any value read from a device but is
/// not enforced on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Chip serial, uppercase hex
    pub serial: String,
    /// Bytes of flash in use
    pub flash_used: u32,
    /// Bytes of flash available to the firmware
    pub flash_total: u32,
    pub firmware_version: String,
}

impl DeviceInfo {
    pub fn flash_free(&self) -> u32 {
        self.flash_total.saturating_sub(self.flash_used)
    }

    pub fn flash_used_kib(&self) -> u32 {
        self.flash_used / 1024
    }

    pub fn flash_total_kib(&self) -> u32 {
        self.flash_total / 1024
    }
}

/// Secure boot posture. A snapshot, not a state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityState {
    pub secure_boot: bool,
    pub secure_lock: bool,
    pub confirmed: bool,
}

/// Everything one full read of a device returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub info: DeviceInfo,
    pub config: DeviceConfig,
    pub security: SecurityState,
}
