#![no_main]

//! Fuzz target for the PHY configuration and rescue response decoders.
//!
//! Truncated and overrunning TLV items must end decoding, never panic, and
//! whatever was decoded must go back through the encoder without panicking.
//!
//! Run with: cargo +nightly fuzz run fuzz_decode_phy

use libfuzzer_sys::fuzz_target;
use picoforge_core::codec::{self, rescue};

fuzz_target!(|data: &[u8]| {
    let config = codec::decode_config(data);
    let _ = codec::encode_config(&config);

    let _ = rescue::decode_select(data);
    let _ = rescue::decode_flash(data);
    let _ = rescue::decode_secure_boot(data);
});
