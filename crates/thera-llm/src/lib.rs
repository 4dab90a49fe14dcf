//! Thera LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `thera-domain`.
//!
//! # Providers
//!
//! - `OllamaProvider`: a single HTTP call against an Ollama-compatible endpoint
//! - `RetryingProvider`: wraps any provider with bounded, backed-off retries
//!   and treats too-short replies as soft failures
//! - `MockProvider`: deterministic, scriptable provider for tests
//!
//! # Examples
//!
//! ```
//! use thera_llm::{MockProvider, RetryPolicy, RetryingProvider};
//! use thera_domain::traits::LlmProvider;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = RetryingProvider::new(MockProvider::new("Hello from LLM!"), RetryPolicy::default());
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod ollama;
pub mod retry;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thera_domain::traits::LlmProvider;
use thiserror::Error;

pub use config::{GenerationOptions, RetryConfig};
pub use ollama::OllamaProvider;
pub use retry::{RetryPolicy, RetryingProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The endpoint refused or never accepted the connection
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    /// Request exceeded its timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Reply was empty or shorter than the configured minimum
    #[error("Reply too short: {len} chars (min: {min})")]
    EmptyResponse {
        /// Length of the trimmed reply
        len: usize,
        /// Configured minimum
        min: usize,
    },

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Every attempt failed
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last: Box<LlmError>,
    },

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Communication(_)
                | LlmError::Unreachable(_)
                | LlmError::Timeout(_)
                | LlmError::InvalidResponse(_)
                | LlmError::EmptyResponse { .. }
        )
    }
}

/// One scripted reply for [`MockProvider`]
#[derive(Debug, Clone)]
enum ScriptedReply {
    Text(String),
    Fail(String),
}

/// Mock LLM provider for deterministic testing
///
/// Replies come from, in order of precedence: the queued script, a per-prompt
/// table, then the default response. No network calls are made.
///
/// # Examples
///
/// ```
/// use thera_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.push_error("transient");
/// provider.push_reply("scripted");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    call_count: Arc<Mutex<usize>>,
    healthy: Arc<AtomicBool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock-model".to_string(),
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Set the reported model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Queue a successful reply for the next call
    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.script).push_back(ScriptedReply::Text(reply.into()));
    }

    /// Queue a communication failure for the next call
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script).push_back(ScriptedReply::Fail(message.into()));
    }

    /// Toggle the health-check result
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    fn next_reply(&self, prompt: &str) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;

        if let Some(scripted) = lock(&self.script).pop_front() {
            return match scripted {
                ScriptedReply::Text(text) => Ok(text),
                ScriptedReply::Fail(message) => Err(LlmError::Communication(message)),
            };
        }

        if let Some(response) = lock(&self.responses).get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.next_reply(prompt)
    }

    async fn health_check(&self) -> Result<(), Self::Error> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LlmError::Unreachable("mock endpoint marked unhealthy".to_string()))
        }
    }
}
