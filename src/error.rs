//! Error taxonomy
//!
//! Only malformed input aborts a scan. Inputs that are merely outside the
//! calibration envelope of the models produce a complete result with a
//! lowered confidence score instead (see the `confidence` and `evidence`
//! fields of each engine result).

use thiserror::Error;

/// Errors raised by the PFAS compliance pipeline
#[derive(Debug, Error)]
pub enum PfasError {
    /// Non-positive flow, bed volume or iteration count, negative
    /// concentrations, inconsistent totals or an invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A TOML configuration document could not be parsed
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A record could not be serialized for fingerprinting
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PfasError {
    /// Shorthand used by every validator in the crate
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PfasError>;
