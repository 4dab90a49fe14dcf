//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur while extracting one work item
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error (retries already exhausted)
    #[error("LLM error: {0}")]
    Llm(String),

    /// The whole extraction exceeded its deadline
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// The work item cannot be turned into a prompt
    #[error("Invalid work item: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
