//! Error types for batch coordination

use thiserror::Error;

/// Errors that stop a chunk or a whole invocation
///
/// Per-item failures never surface here; they are counted in the run summary.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The work catalog is missing or malformed
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The endpoint failed its start-of-chunk health check
    #[error("Endpoint unreachable: {0}")]
    EndpointUnreachable(String),

    /// The compute allocation ended before the chunk finished
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resubmission or runtime error
    #[error("Worker error: {0}")]
    Worker(String),
}
