#![no_main]

//! Fuzz target for FidoInfo::from_get_info()
//!
//! Arbitrary status bytes and CBOR bodies must produce an error, not a panic.
//!
//! Run with: cargo +nightly fuzz run fuzz_get_info

use libfuzzer_sys::fuzz_target;
use picoforge_core::FidoInfo;

fuzz_target!(|data: &[u8]| {
    let _ = FidoInfo::from_get_info(data);
});
