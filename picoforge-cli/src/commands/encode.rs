//! Encode command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use picoforge_core::{codec, DeviceConfig};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::utils::{emit_json, load_changes, load_config};

#[derive(Serialize)]
struct EncodeOutput {
    fields: Vec<&'static str>,
    payload: String,
}

/// Execute the encode command.
pub fn execute(changes_path: &Path, current_path: Option<&Path>, config: &CliConfig) -> Result<()> {
    let changes = load_changes(changes_path)?;

    let current = match current_path {
        Some(path) => load_config(path)?,
        None => {
            if changes.led_dimmable.is_some()
                || changes.led_steady.is_some()
                || changes.power_cycle_on_reset.is_some()
            {
                warn!("No current configuration given, unset option flags are written as defaults");
            }
            DeviceConfig::default()
        }
    };

    let payload = codec::encode_changes(&changes, &current)
        .context("Failed to encode configuration changes")?;
    let payload_hex = hex::encode_upper(&payload);

    info!(
        fields = ?changes.changed_fields(),
        payload_bytes = payload.len(),
        "Encoded configuration changes"
    );

    if config.is_json() {
        return emit_json(&EncodeOutput {
            fields: changes.changed_fields(),
            payload: payload_hex,
        });
    }

    println!("{payload_hex}");
    Ok(())
}
