//! Diff command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use picoforge_core::{codec, ConfigChanges, DeviceConfig};
use serde::Serialize;
use tracing::{info, warn};

use super::{heading, row};
use crate::config::CliConfig;
use crate::utils::{emit_json, load_config};

#[derive(Serialize)]
struct DiffOutput<'a> {
    changes: &'a ConfigChanges,
    /// Write payload, uppercase hex
    payload: String,
}

/// Execute the diff command.
pub fn execute(current_path: &Path, edited_path: &Path, config: &CliConfig) -> Result<()> {
    let current = load_config(current_path)?;
    let edited = load_config(edited_path)?;

    let changes = current.changes_to(&edited);
    let payload = codec::encode_changes(&changes, &current)
        .context("Failed to encode configuration changes")?;

    if changes.is_empty() {
        warn!("No configuration changes to apply");
    } else {
        info!(
            fields = ?changes.changed_fields(),
            payload_bytes = payload.len(),
            "Computed configuration changes"
        );
    }

    if config.is_json() {
        return emit_json(&DiffOutput {
            changes: &changes,
            payload: hex::encode_upper(&payload),
        });
    }

    if changes.is_empty() {
        println!("{}", "No changes to apply".yellow());
        return Ok(());
    }

    print_changes(&current, &edited, &changes)?;
    heading("Payload");
    row("TLV", hex::encode_upper(&payload));
    Ok(())
}

fn print_changes(current: &DeviceConfig, edited: &DeviceConfig, changes: &ConfigChanges) -> Result<()> {
    let before = serde_json::to_value(current).context("Failed to serialize configuration")?;
    let after = serde_json::to_value(edited).context("Failed to serialize configuration")?;

    let fields = changes.changed_fields();
    heading(&format!("Changes ({})", fields.len()));
    for field in fields {
        row(
            field,
            format!(
                "{} {} {}",
                before[field].to_string().red(),
                "->".dimmed(),
                after[field].to_string().green()
            ),
        );
    }
    Ok(())
}
