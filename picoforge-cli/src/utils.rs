//! Common utility functions shared across CLI commands.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use picoforge_core::{ConfigChanges, DeviceConfig, DeviceStatus, JsonCodec};
use serde::Serialize;
use tracing::debug;

/// Parse a hex argument. `@FILE` reads the hex text from a file.
///
/// Whitespace, `:` separators and a leading `0x` are ignored.
pub fn parse_hex_arg(name: &str, arg: &str) -> Result<Vec<u8>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {name} file: {path}"))?,
        None => arg.to_string(),
    };

    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();

    let bytes = hex::decode(&digits).with_context(|| format!("Invalid hex for {name}"))?;
    debug!(arg = name, bytes = bytes.len(), "Parsed hex argument");
    Ok(bytes)
}

fn read_text(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))
}

/// Load a configuration, accepting either a `DeviceConfig` or a full
/// `DeviceStatus` document.
pub fn load_config(path: &Path) -> Result<DeviceConfig> {
    let json = read_text(path, "configuration")?;

    match DeviceConfig::from_json(&json) {
        Ok(config) => {
            debug!(path = %path.display(), format = "config", "Parsed configuration");
            Ok(config)
        }
        Err(config_err) => match DeviceStatus::from_json(&json) {
            Ok(status) => {
                debug!(path = %path.display(), format = "status", "Parsed configuration");
                Ok(status.config)
            }
            Err(_) => Err(config_err)
                .with_context(|| format!("Failed to parse configuration: {}", path.display())),
        },
    }
}

/// Load a change set.
pub fn load_changes(path: &Path) -> Result<ConfigChanges> {
    let json = read_text(path, "change set")?;
    ConfigChanges::from_json(&json)
        .with_context(|| format!("Failed to parse change set: {}", path.display()))
}

/// Print a value as pretty JSON on stdout.
pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    writeln!(std::io::stdout().lock(), "{json}").context("Failed to write output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_variants() {
        assert_eq!(parse_hex_arg("x", "9000").unwrap(), vec![0x90, 0x00]);
        assert_eq!(parse_hex_arg("x", "0x90 00").unwrap(), vec![0x90, 0x00]);
        assert_eq!(parse_hex_arg("x", "90:00").unwrap(), vec![0x90, 0x00]);
        assert_eq!(parse_hex_arg("x", " ca fe\n").unwrap(), vec![0xCA, 0xFE]);
        assert!(parse_hex_arg("x", "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex_arg("x", "9G00").is_err());
        assert!(parse_hex_arg("x", "900").is_err());
    }

    #[test]
    fn test_parse_hex_from_missing_file() {
        let err = parse_hex_arg("phy", "@/nonexistent/phy.hex").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read phy file"));
    }
}
