//! Error types for the worker binary.

use thera_batch::BatchError;
use thera_llm::LlmError;
use thera_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Every item done or already present.
pub const EXIT_OK: u8 = 0;
/// At least one item failed.
pub const EXIT_ITEM_FAILED: u8 = 1;
/// Nothing useful could run.
pub const EXIT_FATAL: u8 = 2;
/// The allocation ended; the chunk should be resubmitted (EX_TEMPFAIL).
pub const EXIT_SESSION_EXPIRED: u8 = 75;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Storage error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Inference client error
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Batch coordination error
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Batch(BatchError::SessionExpired(_)) => EXIT_SESSION_EXPIRED,
            _ => EXIT_FATAL,
        }
    }
}
