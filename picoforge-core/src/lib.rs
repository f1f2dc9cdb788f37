//! PicoForge Core - data contract for pico-fido security keys
//!
//! This crate describes what a pico-fido device reports about itself and what
//! a caller may write back to it:
//!
//! - [`DeviceConfig`] / [`ConfigChanges`] - hardware configuration and partial updates
//! - [`DeviceInfo`] - serial, flash usage, firmware version
//! - [`SecurityState`] - secure boot posture
//! - [`FidoInfo`] - FIDO2/CTAP capabilities
//!
//! The [`codec`] module maps raw device responses to these records and
//! encodes configuration updates. Talking to the device is left to the
//! caller.
//!
//! # Example
//!
//! ```
//! use picoforge_core::{codec, DeviceConfig};
//!
//! # fn example() -> picoforge_core::Result<()> {
//! let current = codec::decode_config(&[0x04, 0x01, 0x19, 0x05, 0x01, 0x08]);
//! assert_eq!(current.led_gpio, 25);
//!
//! let edited = DeviceConfig {
//!     led_brightness: 2,
//!     ..current.clone()
//! };
//! let changes = current.changes_to(&edited);
//! let payload = codec::encode_changes(&changes, &current)?;
//! assert_eq!(payload, [0x05, 0x01, 0x02]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod fido;
pub mod json;

pub use config::{
    canonical_led_driver, canonical_usb_id, ConfigChanges, DeviceConfig, LedDriver,
    DEFAULT_LED_DRIVER,
};
pub use device::{DeviceInfo, DeviceStatus, SecurityState};
pub use codec::phy::MAX_PRODUCT_NAME_LEN;
pub use codec::tlv::MAX_TLV_VALUE_LEN;
pub use error::{PicoError, Result};
pub use fido::FidoInfo;
pub use json::JsonCodec;
