use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PicoError {
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Device returned status {sw:04X}")]
    Status { sw: u16 },

    #[error("CTAP error: 0x{0:02X}")]
    Ctap(u8),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("{field} too long: {len} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PicoError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PicoError>;
