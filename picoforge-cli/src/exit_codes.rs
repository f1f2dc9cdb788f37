//! Exit codes following sysexits.h conventions.

use picoforge_core::PicoError;

/// Successful execution.
pub const SUCCESS: u8 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: u8 = 1;

/// Command line usage error (malformed hex argument).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: u8 = 64;

/// Data format error (response or configuration could not be decoded/encoded).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: u8 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: u8 = 66;

/// I/O error (cannot write output).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: u8 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: u8,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Typed causes first, then the context attached by the commands
        let code = if err.chain().any(|e| e.is::<PicoError>() || e.is::<serde_json::Error>()) {
            DATA_ERROR
        } else if err.chain().any(|e| e.is::<hex::FromHexError>()) {
            USAGE_ERROR
        } else if message.contains("Failed to read") {
            INPUT_ERROR
        } else if message.contains("Failed to write") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(exit: ExitCode) -> Self {
        std::process::ExitCode::from(exit.code)
    }
}
