//! Decode commands: rescue applet status and FIDO getInfo.

use anyhow::{Context, Result};
use colored::Colorize;
use picoforge_core::{codec, DeviceStatus, FidoInfo};
use tracing::info;

use super::{heading, on_off, row};
use crate::config::CliConfig;
use crate::utils::{emit_json, parse_hex_arg};

/// Execute `decode status`.
pub fn status(
    select: &str,
    flash: &str,
    secure: Option<&str>,
    phy: &str,
    config: &CliConfig,
) -> Result<()> {
    let select = parse_hex_arg("select", select)?;
    let flash = parse_hex_arg("flash", flash)?;
    let phy = parse_hex_arg("phy", phy)?;
    let secure = secure.map(|s| parse_hex_arg("secure", s)).transpose()?;

    let status = codec::decode_status(&select, &flash, secure.as_deref(), &phy)
        .context("Failed to decode device status")?;

    info!(
        serial = %status.info.serial,
        firmware = %status.info.firmware_version,
        "Decoded device status"
    );

    if config.is_json() {
        return emit_json(&status);
    }

    print_status(&status);
    Ok(())
}

/// Execute `decode fido`.
pub fn fido(response: &str, config: &CliConfig) -> Result<()> {
    let response = parse_hex_arg("response", response)?;
    let fido = FidoInfo::from_get_info(&response).context("Failed to decode getInfo response")?;

    info!(aaguid = %fido.aaguid, versions = fido.versions.len(), "Decoded FIDO info");

    if config.is_json() {
        return emit_json(&fido);
    }

    print_fido(&fido);
    Ok(())
}

fn print_status(status: &DeviceStatus) {
    let info = &status.info;
    heading("Device");
    row("Serial", &info.serial);
    row("Firmware", &info.firmware_version);
    row(
        "Flash",
        format!(
            "{} KiB used of {} KiB ({} KiB free)",
            info.flash_used_kib(),
            info.flash_total_kib(),
            info.flash_free() / 1024
        ),
    );

    let config = &status.config;
    heading("Configuration");
    row("VID:PID", format!("{}:{}", config.vid, config.pid));
    row("Product name", &config.product_name);
    row("LED GPIO", config.led_gpio);
    row("LED driver", &config.led_driver);
    row("LED brightness", config.led_brightness);
    row("LED dimmable", on_off(config.led_dimmable));
    row("LED steady", on_off(config.led_steady));
    row("Touch timeout", format!("{} s", config.touch_timeout));
    row("Power cycle on reset", on_off(config.power_cycle_on_reset));
    row("secp256k1", on_off(config.enable_secp256k1));

    let security = &status.security;
    heading("Security");
    row("Secure boot", on_off(security.secure_boot));
    let lock = if security.secure_lock {
        "locked".yellow()
    } else {
        "unlocked".normal()
    };
    row("Secure lock", lock);
}

fn print_fido(fido: &FidoInfo) {
    heading("FIDO2");
    row("AAGUID", &fido.aaguid);
    row("Firmware", &fido.firmware_version);
    row("Versions", fido.versions.join(", "));
    row("Extensions", fido.extensions.join(", "));
    row(
        "PIN protocols",
        fido.pin_protocols
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    );
    row("Min PIN length", fido.min_pin_length);
    row("Max message size", format!("{} bytes", fido.max_msg_size));
    row("PIN set", if fido.pin_set() { "yes".green() } else { "no".yellow() });

    heading("Options");
    for (name, enabled) in &fido.options {
        row(name, if *enabled { "true".green() } else { "false".normal() });
    }
}
