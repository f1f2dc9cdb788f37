use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PicoError, Result};

/// JSON form of the data contract types.
pub trait JsonCodec: Serialize + DeserializeOwned {
    fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| PicoError::Serialization(e.to_string()))
    }

    fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PicoError::Serialization(e.to_string()))
    }

    fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PicoError::Serialization(e.to_string()))
    }
}

impl JsonCodec for crate::DeviceConfig {}
impl JsonCodec for crate::ConfigChanges {}
impl JsonCodec for crate::DeviceInfo {}
impl JsonCodec for crate::SecurityState {}
impl JsonCodec for crate::DeviceStatus {}
impl JsonCodec for crate::FidoInfo {}
