//! Decoders for rescue applet responses.
//!
//! Every function takes a complete response APDU, including the trailing
//! two-byte status word.

use tracing::{debug, warn};

use super::phy;
use crate::device::{DeviceInfo, DeviceStatus, SecurityState};
use crate::error::{PicoError, Result};

/// Status word of a successful command.
pub const SW_OK: u16 = 0x9000;

const SERIAL_LEN: usize = 8;
const SELECT_PAYLOAD_LEN: usize = 4 + SERIAL_LEN;
const FLASH_PAYLOAD_LEN: usize = 12;

/// Identity block returned when the rescue applet is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectResponse {
    pub mcu: u8,
    pub product: u8,
    pub firmware_version: String,
    /// Chip serial, uppercase hex
    pub serial: String,
}

/// Flash usage in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashInfo {
    pub free: u32,
    pub used: u32,
    pub total: u32,
}

/// Split a response APDU into its payload, failing on a non-success status.
pub fn split_status(resp: &[u8]) -> Result<&[u8]> {
    let Some((payload, sw)) = resp.split_last_chunk::<2>() else {
        return Err(PicoError::InvalidResponse(format!(
            "response of {} bytes has no status word",
            resp.len()
        )));
    };

    let sw = u16::from_be_bytes(*sw);
    if sw != SW_OK {
        return Err(PicoError::Status { sw });
    }
    Ok(payload)
}

/// Decode the applet selection response: `[mcu, product, major, minor, serial(8)]`.
pub fn decode_select(resp: &[u8]) -> Result<SelectResponse> {
    let payload = split_status(resp)?;
    if payload.len() < SELECT_PAYLOAD_LEN {
        return Err(PicoError::InvalidResponse(format!(
            "select response has {} bytes, expected at least {SELECT_PAYLOAD_LEN}",
            payload.len()
        )));
    }

    Ok(SelectResponse {
        mcu: payload[0],
        product: payload[1],
        firmware_version: format!("{}.{}", payload[2], payload[3]),
        serial: hex::encode_upper(&payload[4..SELECT_PAYLOAD_LEN]),
    })
}

/// Decode a flash info read: `[free, used, total, ...]` as big-endian u32.
pub fn decode_flash(resp: &[u8]) -> Result<FlashInfo> {
    let payload = split_status(resp)?;
    let Some(words) = payload.first_chunk::<FLASH_PAYLOAD_LEN>() else {
        return Err(PicoError::InvalidResponse(format!(
            "flash info has {} bytes, expected at least {FLASH_PAYLOAD_LEN}",
            payload.len()
        )));
    };

    let word = |i: usize| u32::from_be_bytes([words[i], words[i + 1], words[i + 2], words[i + 3]]);
    Ok(FlashInfo {
        free: word(0),
        used: word(4),
        total: word(8),
    })
}

/// Decode a secure boot status read: `[enabled, locked, ...]`.
///
/// Best effort: a failed or short read reports secure boot as off. The device
/// never reports `confirmed`.
pub fn decode_secure_boot(resp: &[u8]) -> SecurityState {
    match split_status(resp) {
        Ok(&[enabled, locked, ..]) => SecurityState {
            secure_boot: enabled != 0,
            secure_lock: locked != 0,
            confirmed: false,
        },
        Ok(payload) => {
            warn!(len = payload.len(), "Short secure boot response, assuming disabled");
            SecurityState::default()
        }
        Err(e) => {
            warn!(error = %e, "Secure boot status unavailable, assuming disabled");
            SecurityState::default()
        }
    }
}

/// Decode a PHY configuration read.
pub fn decode_phy(resp: &[u8]) -> Result<crate::config::DeviceConfig> {
    let payload = split_status(resp)?;
    Ok(phy::decode_config(payload))
}

/// Assemble a full [`DeviceStatus`] from the four rescue reads.
///
/// `secure` is optional because older firmware does not answer it.
pub fn decode_status(
    select: &[u8],
    flash: &[u8],
    secure: Option<&[u8]>,
    phy: &[u8],
) -> Result<DeviceStatus> {
    let identity = decode_select(select)?;
    let flash = decode_flash(flash)?;
    let config = decode_phy(phy)?;
    let security = secure.map(decode_secure_boot).unwrap_or_default();

    debug!(
        serial = %identity.serial,
        firmware = %identity.firmware_version,
        flash_used = flash.used,
        flash_total = flash.total,
        "Decoded device status"
    );

    Ok(DeviceStatus {
        info: DeviceInfo {
            serial: identity.serial,
            flash_used: flash.used,
            flash_total: flash.total,
            firmware_version: identity.firmware_version,
        },
        config,
        security,
    })
}
