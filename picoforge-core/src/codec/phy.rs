//! Device PHY configuration blob.
//!
//! The rescue applet reads and writes hardware configuration as a flat TLV
//! list. Multi-byte integers are big-endian.

use tracing::debug;

use super::tlv::{TlvReader, TlvWriter};
use crate::config::{
    parse_usb_id, ConfigChanges, DeviceConfig, LedDriver, DEFAULT_LED_DRIVER,
};
use crate::error::{PicoError, Result};

/// Maximum USB product name length in bytes, including the NUL terminator.
pub const MAX_PRODUCT_NAME_LEN: usize = 32;

pub const TAG_VIDPID: u8 = 0x00;
pub const TAG_LED_GPIO: u8 = 0x04;
pub const TAG_LED_BRIGHTNESS: u8 = 0x05;
pub const TAG_OPTS: u8 = 0x06;
pub const TAG_UP_BTN: u8 = 0x08;
pub const TAG_USB_PRODUCT: u8 = 0x09;
pub const TAG_CURVES: u8 = 0x0A;
pub const TAG_LED_DRIVER: u8 = 0x0C;

pub const OPT_LED_DIMMABLE: u16 = 0x0002;
pub const OPT_DISABLE_POWER_RESET: u16 = 0x0004;
pub const OPT_LED_STEADY: u16 = 0x0008;

pub const CURVE_SECP256K1: u32 = 0x0000_0008;

/// Decode a PHY configuration blob.
///
/// Fields without a (well-formed) tag keep their [`DeviceConfig::default`]
/// value. Unknown tags are skipped. A product name that is not valid UTF-8
/// decodes as empty.
pub fn decode_config(data: &[u8]) -> DeviceConfig {
    let mut config = DeviceConfig::default();

    for (tag, val) in TlvReader::new(data) {
        match (tag, val) {
            (TAG_VIDPID, &[v0, v1, p0, p1]) => {
                config.vid = format!("{:04X}", u16::from_be_bytes([v0, v1]));
                config.pid = format!("{:04X}", u16::from_be_bytes([p0, p1]));
            }
            (TAG_LED_GPIO, &[gpio, ..]) => config.led_gpio = gpio,
            (TAG_LED_BRIGHTNESS, &[brightness, ..]) => config.led_brightness = brightness,
            (TAG_UP_BTN, &[timeout, ..]) => config.touch_timeout = timeout,
            (TAG_USB_PRODUCT, name) => match std::str::from_utf8(name) {
                Ok(name) => config.product_name = name.trim_matches(char::from(0)).to_string(),
                Err(e) => debug!(error = %e, "Product name is not UTF-8, leaving it empty"),
            },
            (TAG_OPTS, &[hi, lo, ..]) => {
                let opts = u16::from_be_bytes([hi, lo]);
                config.led_dimmable = opts & OPT_LED_DIMMABLE != 0;
                config.power_cycle_on_reset = opts & OPT_DISABLE_POWER_RESET == 0;
                config.led_steady = opts & OPT_LED_STEADY != 0;
            }
            (TAG_CURVES, &[b0, b1, b2, b3, ..]) => {
                let curves = u32::from_be_bytes([b0, b1, b2, b3]);
                config.enable_secp256k1 = curves & CURVE_SECP256K1 != 0;
            }
            (TAG_LED_DRIVER, &[code, ..]) => {
                config.led_driver = LedDriver::from_code(code).to_string();
            }
            (
                TAG_VIDPID | TAG_LED_GPIO | TAG_LED_BRIGHTNESS | TAG_UP_BTN | TAG_OPTS
                | TAG_CURVES | TAG_LED_DRIVER,
                _,
            ) => {
                debug!(tag, len = val.len(), "Ignoring PHY item with unexpected length");
            }
            _ => debug!(tag, len = val.len(), "Skipping unknown PHY tag"),
        }
    }

    config
}

/// Encode the TLV blob that applies `changes` on top of `current`.
///
/// Items that pack several fields (VID:PID, the options bitfield) take the
/// fields the change set leaves unset from `current`.
pub fn encode_changes(changes: &ConfigChanges, current: &DeviceConfig) -> Result<Vec<u8>> {
    let mut tlv = TlvWriter::new();

    if changes.vid.is_some() || changes.pid.is_some() {
        let vid = parse_usb_id("vid", changes.vid.as_deref().unwrap_or(&current.vid))?;
        let pid = parse_usb_id("pid", changes.pid.as_deref().unwrap_or(&current.pid))?;
        let mut val = [0u8; 4];
        val[..2].copy_from_slice(&vid.to_be_bytes());
        val[2..].copy_from_slice(&pid.to_be_bytes());
        tlv.push(TAG_VIDPID, &val)?;
    }

    if let Some(gpio) = changes.led_gpio {
        tlv.push_u8(TAG_LED_GPIO, gpio)?;
    }

    if let Some(brightness) = changes.led_brightness {
        tlv.push_u8(TAG_LED_BRIGHTNESS, brightness)?;
    }

    if let Some(timeout) = changes.touch_timeout {
        tlv.push_u8(TAG_UP_BTN, timeout)?;
    }

    if changes.led_dimmable.is_some()
        || changes.power_cycle_on_reset.is_some()
        || changes.led_steady.is_some()
    {
        let opts = options_bits(
            changes.led_dimmable.unwrap_or(current.led_dimmable),
            changes
                .power_cycle_on_reset
                .unwrap_or(current.power_cycle_on_reset),
            changes.led_steady.unwrap_or(current.led_steady),
        );
        tlv.push(TAG_OPTS, &opts.to_be_bytes())?;
    }

    if let Some(enabled) = changes.enable_secp256k1 {
        tlv.push(TAG_CURVES, &curves_bits(enabled).to_be_bytes())?;
    }

    if let Some(driver) = &changes.led_driver {
        if driver == DEFAULT_LED_DRIVER {
            return Err(PicoError::invalid_field(
                "ledDriver",
                "the firmware default cannot be written explicitly",
            ));
        }
        let driver: LedDriver = driver.parse()?;
        tlv.push_u8(TAG_LED_DRIVER, driver.code())?;
    }

    if let Some(name) = &changes.product_name {
        push_product_name(&mut tlv, name)?;
    }

    Ok(tlv.into_bytes())
}

/// Encode a complete configuration.
///
/// Unset values are left out: an empty VID:PID or product name and the
/// `"default"` LED driver. Every other field is written.
///
/// Decoding the result gives back [`DeviceConfig::canonical`] of `config`.
pub fn encode_config(config: &DeviceConfig) -> Result<Vec<u8>> {
    let has_ids = !config.vid.is_empty() || !config.pid.is_empty();
    let full = ConfigChanges {
        vid: has_ids.then(|| config.vid.clone()),
        pid: has_ids.then(|| config.pid.clone()),
        product_name: Some(config.product_name.clone()),
        led_gpio: Some(config.led_gpio),
        led_brightness: Some(config.led_brightness),
        touch_timeout: Some(config.touch_timeout),
        led_dimmable: Some(config.led_dimmable),
        power_cycle_on_reset: Some(config.power_cycle_on_reset),
        led_steady: Some(config.led_steady),
        enable_secp256k1: Some(config.enable_secp256k1),
        led_driver: (config.led_driver != DEFAULT_LED_DRIVER).then(|| config.led_driver.clone()),
    };
    encode_changes(&full, config)
}

fn options_bits(dimmable: bool, power_cycle_on_reset: bool, steady: bool) -> u16 {
    let mut opts = 0;
    if dimmable {
        opts |= OPT_LED_DIMMABLE;
    }
    if !power_cycle_on_reset {
        opts |= OPT_DISABLE_POWER_RESET;
    }
    if steady {
        opts |= OPT_LED_STEADY;
    }
    opts
}

fn curves_bits(secp256k1: bool) -> u32 {
    if secp256k1 {
        CURVE_SECP256K1
    } else {
        0
    }
}

fn push_product_name(tlv: &mut TlvWriter, name: &str) -> Result<()> {
    if name.is_empty() {
        debug!("Empty product name, leaving device value unchanged");
        return Ok(());
    }

    let len = name.len() + 1;
    if len > MAX_PRODUCT_NAME_LEN {
        return Err(PicoError::FieldTooLong {
            field: "productName",
            len,
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    let mut val = Vec::with_capacity(len);
    val.extend_from_slice(name.as_bytes());
    val.push(0x00);
    tlv.push(TAG_USB_PRODUCT, &val)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PHY blob as returned by a configured device.
    const DEVICE_BLOB: &[u8] = &[
        0x00, 0x04, 0xCA, 0xFE, 0x42, 0x42, // VID:PID
        0x04, 0x01, 0x19, // LED GPIO 25
        0x05, 0x01, 0x08, // brightness 8
        0x06, 0x02, 0x00, 0x02, // dimmable, power reset enabled
        0x08, 0x01, 0x0F, // touch timeout 15
        0x09, 0x09, b'P', b'i', b'c', b'o', b' ', b'K', b'e', b'y', 0x00, // product
        0x0A, 0x04, 0x00, 0x00, 0x00, 0x08, // secp256k1
        0x0C, 0x01, 0x01, // SK6812
    ];

    fn device_config() -> DeviceConfig {
        DeviceConfig {
            vid: "CAFE".into(),
            pid: "4242".into(),
            product_name: "Pico Key".into(),
            led_gpio: 25,
            led_brightness: 8,
            touch_timeout: 15,
            led_dimmable: true,
            power_cycle_on_reset: true,
            led_steady: false,
            enable_secp256k1: true,
            led_driver: "SK6812".into(),
        }
    }

    #[test]
    fn test_decode_device_blob() {
        assert_eq!(decode_config(DEVICE_BLOB), device_config());
    }

    #[test]
    fn test_decode_empty_blob_is_default() {
        let config = decode_config(&[]);
        assert_eq!(config, DeviceConfig::default());
        // No opts item: power cycle stays at the default
        assert!(!config.power_cycle_on_reset);
    }

    #[test]
    fn test_decode_options_bits() {
        let config = decode_config(&[TAG_OPTS, 0x02, 0x00, 0x0C]);
        assert!(!config.led_dimmable);
        assert!(!config.power_cycle_on_reset);
        assert!(config.led_steady);
    }

    #[test]
    fn test_decode_ignores_wrong_length_items() {
        let blob = [
            TAG_VIDPID, 0x02, 0x12, 0x34, // too short
            TAG_OPTS, 0x01, 0xFF, // too short
            TAG_LED_GPIO, 0x00, // empty
            0x7F, 0x02, 0xAA, 0xBB, // unknown tag
            TAG_LED_BRIGHTNESS, 0x01, 0x03,
        ];
        let config = decode_config(&blob);
        assert_eq!(config.vid, "");
        assert_eq!(config.led_gpio, 0);
        assert!(!config.led_dimmable);
        assert_eq!(config.led_brightness, 3);
    }

    #[test]
    fn test_decode_truncated_blob_keeps_prefix() {
        let truncated = &DEVICE_BLOB[..DEVICE_BLOB.len() - 2];
        let config = decode_config(truncated);
        assert_eq!(config.led_gpio, 25);
        assert_eq!(config.led_driver, DEFAULT_LED_DRIVER);
    }

    #[test]
    fn test_decode_unknown_led_driver() {
        let config = decode_config(&[TAG_LED_DRIVER, 0x01, 0x09]);
        assert_eq!(config.led_driver, "unknown(9)");
        assert_eq!(config.led_driver().unwrap(), Some(LedDriver::Other(9)));
    }

    #[test]
    fn test_encode_empty_changes() {
        let bytes = encode_changes(&ConfigChanges::default(), &device_config()).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_encode_single_pid_keeps_current_vid() {
        let changes = ConfigChanges {
            pid: Some("0001".into()),
            ..Default::default()
        };
        let bytes = encode_changes(&changes, &device_config()).unwrap();
        assert_eq!(bytes, [TAG_VIDPID, 0x04, 0xCA, 0xFE, 0x00, 0x01]);
    }

    #[test]
    fn test_encode_partial_options_keep_current_bits() {
        let changes = ConfigChanges {
            led_steady: Some(true),
            ..Default::default()
        };
        let bytes = encode_changes(&changes, &device_config()).unwrap();
        // dimmable (current) + steady (changed), power reset still enabled
        assert_eq!(bytes, [TAG_OPTS, 0x02, 0x00, 0x0A]);
    }

    #[test]
    fn test_encode_power_cycle_inverted() {
        let changes = ConfigChanges {
            power_cycle_on_reset: Some(false),
            ..Default::default()
        };
        let bytes = encode_changes(&changes, &DeviceConfig::default()).unwrap();
        assert_eq!(bytes, [TAG_OPTS, 0x02, 0x00, 0x04]);
    }

    #[test]
    fn test_encode_curves() {
        let on = ConfigChanges {
            enable_secp256k1: Some(true),
            ..Default::default()
        };
        let off = ConfigChanges {
            enable_secp256k1: Some(false),
            ..Default::default()
        };
        let current = DeviceConfig::default();
        assert_eq!(
            encode_changes(&on, &current).unwrap(),
            [TAG_CURVES, 0x04, 0x00, 0x00, 0x00, 0x08]
        );
        assert_eq!(
            encode_changes(&off, &current).unwrap(),
            [TAG_CURVES, 0x04, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_product_name_nul_terminated() {
        let changes = ConfigChanges {
            product_name: Some("Key".into()),
            ..Default::default()
        };
        let bytes = encode_changes(&changes, &DeviceConfig::default()).unwrap();
        assert_eq!(bytes, [TAG_USB_PRODUCT, 0x04, b'K', b'e', b'y', 0x00]);
    }

    #[test]
    fn test_encode_empty_product_name_skipped() {
        let changes = ConfigChanges {
            product_name: Some(String::new()),
            ..Default::default()
        };
        let bytes = encode_changes(&changes, &DeviceConfig::default()).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_encode_product_name_length_limit() {
        let fits = ConfigChanges {
            product_name: Some("x".repeat(31)),
            ..Default::default()
        };
        assert!(encode_changes(&fits, &DeviceConfig::default()).is_ok());

        let too_long = ConfigChanges {
            product_name: Some("x".repeat(32)),
            ..Default::default()
        };
        let err = encode_changes(&too_long, &DeviceConfig::default()).unwrap_err();
        assert_eq!(
            err,
            PicoError::FieldTooLong {
                field: "productName",
                len: 33,
                max: MAX_PRODUCT_NAME_LEN,
            }
        );
    }

    #[test]
    fn test_encode_rejects_bad_usb_ids() {
        for bad in ["XYZ", "10000", ""] {
            let changes = ConfigChanges {
                vid: Some(bad.into()),
                ..Default::default()
            };
            let err = encode_changes(&changes, &device_config()).unwrap_err();
            assert!(
                matches!(err, PicoError::InvalidField { field: "vid", .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_encode_accepts_prefixed_usb_id() {
        let changes = ConfigChanges {
            vid: Some("0x1050".into()),
            ..Default::default()
        };
        let bytes = encode_changes(&changes, &device_config()).unwrap();
        assert_eq!(bytes, [TAG_VIDPID, 0x04, 0x10, 0x50, 0x42, 0x42]);
    }

    #[test]
    fn test_encode_led_driver() {
        let changes = ConfigChanges {
            led_driver: Some("APA102".into()),
            ..Default::default()
        };
        let bytes = encode_changes(&changes, &device_config()).unwrap();
        assert_eq!(bytes, [TAG_LED_DRIVER, 0x01, 0x02]);

        let default = ConfigChanges {
            led_driver: Some(DEFAULT_LED_DRIVER.into()),
            ..Default::default()
        };
        assert!(encode_changes(&default, &device_config()).is_err());
    }

    #[test]
    fn test_encode_config_round_trip() {
        let config = device_config();
        let bytes = encode_config(&config).unwrap();
        assert_eq!(decode_config(&bytes), config);
    }

    #[test]
    fn test_encode_config_round_trip_non_canonical_spelling() {
        let config = DeviceConfig {
            vid: "cafe".into(),
            pid: "0x4242".into(),
            led_driver: "sk6812".into(),
            ..device_config()
        };
        let bytes = encode_config(&config).unwrap();
        assert_eq!(bytes, encode_config(&device_config()).unwrap());
        assert_eq!(decode_config(&bytes), config.canonical().unwrap());

        let json = r#"{"vid":"cafe","pid":"0x4242","productName":"Pico Key","ledGpio":25,
            "ledBrightness":8,"touchTimeout":15,"ledDimmable":true,"powerCycleOnReset":true,
            "ledSteady":false,"enableSecp256k1":true,"ledDriver":"1"}"#;
        let parsed: DeviceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(decode_config(&encode_config(&parsed).unwrap()), parsed);
    }

    #[test]
    fn test_decode_invalid_utf8_product_name_is_empty() {
        let mut blob = vec![TAG_USB_PRODUCT, 31];
        blob.extend(std::iter::repeat(0xFF).take(30));
        blob.push(0x00);
        blob.extend_from_slice(&[TAG_LED_GPIO, 0x01, 0x07]);

        let config = decode_config(&blob);
        assert_eq!(config.product_name, "");
        assert_eq!(config.led_gpio, 7);
        assert!(encode_config(&config).is_ok());
    }

    #[test]
    fn test_encode_config_unset_fields_omitted() {
        let config = decode_config(&[TAG_LED_GPIO, 0x01, 0x07]);
        let bytes = encode_config(&config).unwrap();
        let tags: Vec<u8> = TlvReader::new(&bytes).map(|(tag, _)| tag).collect();
        assert_eq!(
            tags,
            vec![TAG_LED_GPIO, TAG_LED_BRIGHTNESS, TAG_UP_BTN, TAG_OPTS, TAG_CURVES]
        );
        assert_eq!(decode_config(&bytes), config);
    }

    #[test]
    fn test_encode_config_default_driver_omitted() {
        let config = DeviceConfig {
            led_driver: DEFAULT_LED_DRIVER.into(),
            ..device_config()
        };
        let bytes = encode_config(&config).unwrap();
        assert!(TlvReader::new(&bytes).all(|(tag, _)| tag != TAG_LED_DRIVER));
        assert_eq!(decode_config(&bytes), config);
    }
}
