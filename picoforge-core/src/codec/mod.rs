//! Byte-level encodings used by pico-fido devices.
//!
//! These are pure functions over captured response bytes; nothing here talks
//! to a device.
//!
//! - [`tlv`] - generic one-byte tag/length items
//! - [`phy`] - PHY configuration blob <-> [`DeviceConfig`](crate::DeviceConfig)
//! - [`rescue`] - rescue applet responses (identity, flash, secure boot)

pub mod phy;
pub mod rescue;
pub mod tlv;

pub use phy::{decode_config, encode_changes, encode_config};
pub use rescue::{decode_status, FlashInfo, SelectResponse};
pub use tlv::{TlvReader, TlvWriter};
