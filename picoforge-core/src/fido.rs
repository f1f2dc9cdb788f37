//! FIDO2/CTAP capability metadata.
//!
//! With the `fido` feature, [`FidoInfo::from_get_info`] decodes a raw
//! `authenticatorGetInfo` response (status byte followed by a CBOR map with
//! integer keys).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Minimum PIN length an authenticator enforces when it does not report one.
pub const DEFAULT_MIN_PIN_LENGTH: u32 = 4;

/// Snapshot of an authenticator's `authenticatorGetInfo` data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FidoInfo {
    /// Supported protocol versions, e.g. `FIDO_2_0`, `FIDO_2_1`
    pub versions: Vec<String>,
    /// Supported extension identifiers
    pub extensions: Vec<String>,
    /// Authenticator model identifier, uppercase hex
    pub aaguid: String,
    pub options: BTreeMap<String, bool>,
    /// Largest CTAP message the authenticator accepts, in bytes
    pub max_msg_size: u32,
    pub pin_protocols: Vec<u32>,
    pub min_pin_length: u32,
    pub firmware_version: String,
}

impl FidoInfo {
    pub fn supports_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// State of a named option; `None` when the authenticator does not report it.
    pub fn option(&self, name: &str) -> Option<bool> {
        self.options.get(name).copied()
    }

    /// Whether a client PIN has been set on the authenticator.
    pub fn pin_set(&self) -> bool {
        self.option("clientPin").unwrap_or(false)
    }
}

#[cfg(feature = "fido")]
mod get_info {
    use std::collections::BTreeMap;

    use ciborium::Value;
    use tracing::debug;

    use super::{FidoInfo, DEFAULT_MIN_PIN_LENGTH};
    use crate::error::{PicoError, Result};

    const CTAP2_OK: u8 = 0x00;

    const KEY_VERSIONS: u8 = 0x01;
    const KEY_EXTENSIONS: u8 = 0x02;
    const KEY_AAGUID: u8 = 0x03;
    const KEY_OPTIONS: u8 = 0x04;
    const KEY_MAX_MSG_SIZE: u8 = 0x05;
    const KEY_PIN_PROTOCOLS: u8 = 0x06;
    const KEY_MIN_PIN_LENGTH: u8 = 0x0D;
    const KEY_FIRMWARE_VERSION: u8 = 0x0E;

    const AAGUID_LEN: usize = 16;

    impl FidoInfo {
        /// Decode an `authenticatorGetInfo` response.
        ///
        /// Absent optional members take their defaults: empty lists, zero
        /// message size, empty firmware version and a minimum PIN length of
        /// [`DEFAULT_MIN_PIN_LENGTH`]. Members this type does not model are
        /// ignored.
        pub fn from_get_info(resp: &[u8]) -> Result<Self> {
            let (&status, body) = resp
                .split_first()
                .ok_or_else(|| PicoError::InvalidResponse("empty getInfo response".into()))?;
            if status != CTAP2_OK {
                return Err(PicoError::Ctap(status));
            }

            let value: Value = ciborium::from_reader(body)
                .map_err(|e| PicoError::InvalidResponse(format!("getInfo is not CBOR: {e}")))?;
            let entries = value
                .into_map()
                .map_err(|_| PicoError::InvalidResponse("getInfo body is not a map".into()))?;

            let mut info = FidoInfo {
                min_pin_length: DEFAULT_MIN_PIN_LENGTH,
                ..Default::default()
            };
            let mut seen_versions = false;
            let mut seen_aaguid = false;

            for (key, val) in entries {
                let Some(key) = key.as_integer().and_then(|k| u8::try_from(k).ok()) else {
                    debug!(?key, "Skipping non-integer getInfo key");
                    continue;
                };

                match key {
                    KEY_VERSIONS => {
                        info.versions = text_array("versions", val)?;
                        seen_versions = true;
                    }
                    KEY_EXTENSIONS => info.extensions = text_array("extensions", val)?,
                    KEY_AAGUID => {
                        info.aaguid = aaguid(val)?;
                        seen_aaguid = true;
                    }
                    KEY_OPTIONS => info.options = options(val)?,
                    KEY_MAX_MSG_SIZE => info.max_msg_size = uint("maxMsgSize", &val)?,
                    KEY_PIN_PROTOCOLS => {
                        info.pin_protocols = array("pinUvAuthProtocols", val)?
                            .iter()
                            .map(|v| uint("pinUvAuthProtocols", v))
                            .collect::<Result<_>>()?;
                    }
                    KEY_MIN_PIN_LENGTH => info.min_pin_length = uint("minPINLength", &val)?,
                    KEY_FIRMWARE_VERSION => {
                        info.firmware_version = format!("0x{:X}", uint("firmwareVersion", &val)?);
                    }
                    other => debug!(key = other, "Ignoring getInfo member"),
                }
            }

            if !seen_versions {
                return Err(PicoError::InvalidResponse("getInfo has no versions".into()));
            }
            if !seen_aaguid {
                return Err(PicoError::InvalidResponse("getInfo has no aaguid".into()));
            }

            Ok(info)
        }
    }

    fn mismatch(field: &str, expected: &str) -> PicoError {
        PicoError::InvalidResponse(format!("getInfo {field}: expected {expected}"))
    }

    fn array(field: &str, val: Value) -> Result<Vec<Value>> {
        val.into_array().map_err(|_| mismatch(field, "an array"))
    }

    fn text_array(field: &str, val: Value) -> Result<Vec<String>> {
        array(field, val)?
            .into_iter()
            .map(|v| v.into_text().map_err(|_| mismatch(field, "text strings")))
            .collect()
    }

    fn uint(field: &str, val: &Value) -> Result<u32> {
        val.as_integer()
            .and_then(|i| u32::try_from(i).ok())
            .ok_or_else(|| mismatch(field, "an unsigned 32-bit integer"))
    }

    fn aaguid(val: Value) -> Result<String> {
        match val.into_bytes() {
            Ok(bytes) if bytes.len() == AAGUID_LEN => Ok(hex::encode_upper(bytes)),
            _ => Err(mismatch("aaguid", "16 bytes")),
        }
    }

    fn options(val: Value) -> Result<BTreeMap<String, bool>> {
        val.into_map()
            .map_err(|_| mismatch("options", "a map"))?
            .into_iter()
            .map(|(k, v)| match (k, v) {
                (Value::Text(name), Value::Bool(enabled)) => Ok((name, enabled)),
                _ => Err(mismatch("options", "text keys with boolean values")),
            })
            .collect()
    }
}
