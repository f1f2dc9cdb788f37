//! Device configuration and partial configuration updates.
//!
//! [`DeviceConfig`] is the full configuration as read from a device.
//! [`ConfigChanges`] is what a caller writes back: only the fields that are
//! `Some` are sent, everything else keeps its current value on the device.
//!
//! Deserialization puts `vid`, `pid` and `ledDriver` in canonical form (four
//! uppercase hex digits, the driver's display name) so that values read from
//! JSON compare equal to values decoded from a device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PicoError, Result};

/// `ledDriver` value used when the device does not report a driver.
pub const DEFAULT_LED_DRIVER: &str = "default";

/// Mutable device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// USB vendor ID, four hex digits
    #[serde(deserialize_with = "canonical::vid")]
    pub vid: String,
    /// USB product ID, four hex digits
    #[serde(deserialize_with = "canonical::pid")]
    pub pid: String,
    /// USB product string
    pub product_name: String,
    pub led_gpio: u8,
    pub led_brightness: u8,
    /// Seconds before a pending user-presence request expires
    pub touch_timeout: u8,
    pub led_dimmable: bool,
    pub power_cycle_on_reset: bool,
    pub led_steady: bool,
    pub enable_secp256k1: bool,
    /// LED driver name, see [`LedDriver`]
    #[serde(deserialize_with = "canonical::led_driver")]
    pub led_driver: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vid: String::new(),
            pid: String::new(),
            product_name: String::new(),
            led_gpio: 0,
            led_brightness: 0,
            touch_timeout: 0,
            led_dimmable: false,
            power_cycle_on_reset: false,
            led_steady: false,
            enable_secp256k1: false,
            led_driver: DEFAULT_LED_DRIVER.to_string(),
        }
    }
}

impl DeviceConfig {
    /// Parsed LED driver, or `None` when the device reported no driver.
    pub fn led_driver(&self) -> Result<Option<LedDriver>> {
        if self.led_driver == DEFAULT_LED_DRIVER {
            return Ok(None);
        }
        self.led_driver.parse().map(Some)
    }

    /// Copy with `vid`, `pid` and `ledDriver` in canonical form.
    pub fn canonical(&self) -> Result<DeviceConfig> {
        Ok(DeviceConfig {
            vid: canonical_usb_id("vid", &self.vid)?,
            pid: canonical_usb_id("pid", &self.pid)?,
            led_driver: canonical_led_driver(&self.led_driver)?,
            ..self.clone()
        })
    }

    /// Field-wise difference between `self` (current) and `edited`.
    ///
    /// The result holds `Some` exactly for the fields whose values differ.
    /// IDs and driver names are compared in canonical form, and changed ones
    /// are reported that way. Values that do not parse are compared and
    /// reported verbatim.
    pub fn changes_to(&self, edited: &DeviceConfig) -> ConfigChanges {
        let id = |field, value: &str| {
            canonical_usb_id(field, value).unwrap_or_else(|_| value.to_string())
        };
        let driver =
            |value: &str| canonical_led_driver(value).unwrap_or_else(|_| value.to_string());

        ConfigChanges {
            vid: changed(&id("vid", &self.vid), &id("vid", &edited.vid)),
            pid: changed(&id("pid", &self.pid), &id("pid", &edited.pid)),
            product_name: changed(&self.product_name, &edited.product_name),
            led_gpio: changed(&self.led_gpio, &edited.led_gpio),
            led_brightness: changed(&self.led_brightness, &edited.led_brightness),
            touch_timeout: changed(&self.touch_timeout, &edited.touch_timeout),
            led_dimmable: changed(&self.led_dimmable, &edited.led_dimmable),
            power_cycle_on_reset: changed(&self.power_cycle_on_reset, &edited.power_cycle_on_reset),
            led_steady: changed(&self.led_steady, &edited.led_steady),
            enable_secp256k1: changed(&self.enable_secp256k1, &edited.enable_secp256k1),
            led_driver: changed(&driver(&self.led_driver), &driver(&edited.led_driver)),
        }
    }
}

fn changed<T: PartialEq + Clone>(current: &T, edited: &T) -> Option<T> {
    (current != edited).then(|| edited.clone())
}

/// Parse a USB vendor or product ID written as hex, with an optional `0x`.
pub fn parse_usb_id(field: &'static str, value: &str) -> Result<u16> {
    let digits = value.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    u16::from_str_radix(digits, 16)
        .map_err(|e| PicoError::invalid_field(field, format!("{value:?} is not a 16-bit hex id: {e}")))
}

/// Four uppercase hex digits. An empty ID stays empty.
pub fn canonical_usb_id(field: &'static str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    parse_usb_id(field, value).map(|id| format!("{id:04X}"))
}

/// The driver's display name, or `"default"`.
pub fn canonical_led_driver(value: &str) -> Result<String> {
    if value.trim() == DEFAULT_LED_DRIVER {
        return Ok(DEFAULT_LED_DRIVER.to_string());
    }
    value.parse::<LedDriver>().map(|driver| driver.to_string())
}

/// Deserializers that canonicalize on the way in.
mod canonical {
    use serde::de::Error;

    use super::*;

    fn usb_id<'de, D: Deserializer<'de>>(
        field: &'static str,
        d: D,
    ) -> std::result::Result<String, D::Error> {
        let value = String::deserialize(d)?;
        canonical_usb_id(field, &value).map_err(D::Error::custom)
    }

    pub fn vid<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
        usb_id("vid", d)
    }

    pub fn pid<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
        usb_id("pid", d)
    }

    pub fn led_driver<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
        let value = String::deserialize(d)?;
        canonical_led_driver(&value).map_err(D::Error::custom)
    }

    pub mod option {
        use super::*;

        fn usb_id<'de, D: Deserializer<'de>>(
            field: &'static str,
            d: D,
        ) -> std::result::Result<Option<String>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|value| canonical_usb_id(field, &value).map_err(D::Error::custom))
                .transpose()
        }

        pub fn vid<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
            usb_id("vid", d)
        }

        pub fn pid<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
            usb_id("pid", d)
        }

        pub fn led_driver<'de, D: Deserializer<'de>>(
            d: D,
        ) -> std::result::Result<Option<String>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|value| canonical_led_driver(&value).map_err(D::Error::custom))
                .transpose()
        }
    }
}

/// A partial configuration update.
///
/// Unknown keys are rejected when parsing, so a misspelled field is an error
/// rather than an empty update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigChanges {
    #[serde(
        default,
        deserialize_with = "canonical::option::vid",
        skip_serializing_if = "Option::is_none"
    )]
    pub vid: Option<String>,
    #[serde(
        default,
        deserialize_with = "canonical::option::pid",
        skip_serializing_if = "Option::is_none"
    )]
    pub pid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_gpio: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_timeout: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_dimmable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_cycle_on_reset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_steady: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_secp256k1: Option<bool>,
    #[serde(
        default,
        deserialize_with = "canonical::option::led_driver",
        skip_serializing_if = "Option::is_none"
    )]
    pub led_driver: Option<String>,
}

impl ConfigChanges {
    pub fn is_empty(&self) -> bool {
        self.vid.is_none()
            && self.pid.is_none()
            && self.product_name.is_none()
            && self.led_gpio.is_none()
            && self.led_brightness.is_none()
            && self.touch_timeout.is_none()
            && self.led_dimmable.is_none()
            && self.power_cycle_on_reset.is_none()
            && self.led_steady.is_none()
            && self.enable_secp256k1.is_none()
            && self.led_driver.is_none()
    }

    /// Overlay every `Some` field onto `config`.
    pub fn apply_to(&self, config: &mut DeviceConfig) {
        if let Some(vid) = &self.vid {
            config.vid = vid.clone();
        }
        if let Some(pid) = &self.pid {
            config.pid = pid.clone();
        }
        if let Some(name) = &self.product_name {
            config.product_name = name.clone();
        }
        if let Some(gpio) = self.led_gpio {
            config.led_gpio = gpio;
        }
        if let Some(brightness) = self.led_brightness {
            config.led_brightness = brightness;
        }
        if let Some(timeout) = self.touch_timeout {
            config.touch_timeout = timeout;
        }
        if let Some(dimmable) = self.led_dimmable {
            config.led_dimmable = dimmable;
        }
        if let Some(cycle) = self.power_cycle_on_reset {
            config.power_cycle_on_reset = cycle;
        }
        if let Some(steady) = self.led_steady {
            config.led_steady = steady;
        }
        if let Some(enabled) = self.enable_secp256k1 {
            config.enable_secp256k1 = enabled;
        }
        if let Some(driver) = &self.led_driver {
            config.led_driver = driver.clone();
        }
    }

    /// Names of the fields this update touches, in declaration order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("vid", self.vid.is_some()),
            ("pid", self.pid.is_some()),
            ("productName", self.product_name.is_some()),
            ("ledGpio", self.led_gpio.is_some()),
            ("ledBrightness", self.led_brightness.is_some()),
            ("touchTimeout", self.touch_timeout.is_some()),
            ("ledDimmable", self.led_dimmable.is_some()),
            ("powerCycleOnReset", self.power_cycle_on_reset.is_some()),
            ("ledSteady", self.led_steady.is_some()),
            ("enableSecp256k1", self.enable_secp256k1.is_some()),
            ("ledDriver", self.led_driver.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}

/// LED driver implementation selected in the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedDriver {
    Ws2812,
    Sk6812,
    Apa102,
    /// Driver code this build does not know by name
    Other(u8),
}

impl LedDriver {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Ws2812,
            1 => Self::Sk6812,
            2 => Self::Apa102,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Ws2812 => 0,
            Self::Sk6812 => 1,
            Self::Apa102 => 2,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for LedDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ws2812 => write!(f, "WS2812"),
            Self::Sk6812 => write!(f, "SK6812"),
            Self::Apa102 => write!(f, "APA102"),
            Self::Other(code) => write!(f, "unknown({code})"),
        }
    }
}

impl FromStr for LedDriver {
    type Err = PicoError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "WS2812" => return Ok(Self::Ws2812),
            "SK6812" => return Ok(Self::Sk6812),
            "APA102" => return Ok(Self::Apa102),
            _ => {}
        }

        let code = s
            .strip_prefix("unknown(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);
        code.parse::<u8>()
            .map(Self::from_code)
            .map_err(|_| PicoError::invalid_field("ledDriver", format!("unknown driver {s:?}")))
    }
}
