//! Ollama Provider Implementation
//!
//! Talks to an Ollama-compatible text-generation endpoint.
//!
//! # Features
//!
//! - `POST /api/generate` with `stream: false` and sampling options
//! - Long per-request timeout for generation, short one for health checks
//! - `GET /api/tags` as the lightweight health probe
//!
//! Each call is a single attempt; wrap the provider in
//! [`RetryingProvider`](crate::RetryingProvider) for backoff.
//!
//! # Examples
//!
//! ```no_run
//! use thera_domain::Endpoint;
//! use thera_llm::{GenerationOptions, OllamaProvider};
//!
//! let endpoint = Endpoint::new("http://localhost:11434", "llama3.3:70b");
//! let provider = OllamaProvider::new(endpoint, GenerationOptions::default()).unwrap();
//! ```

use crate::config::GenerationOptions;
use crate::LlmError;
use serde::{Deserialize, Serialize};
use thera_domain::traits::LlmProvider;
use thera_domain::Endpoint;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Ollama API provider
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: Endpoint,
    options: GenerationOptions,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: i32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Response from Ollama tags API
#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: Endpoint, options: GenerationOptions) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            options,
            client,
        })
    }

    /// Create a provider against [`DEFAULT_ENDPOINT`]
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(Endpoint::new(DEFAULT_ENDPOINT, model), GenerationOptions::default())
    }

    /// The endpoint this provider targets
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Names of the models the endpoint currently serves
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.endpoint.base_url);
        let timeout = self.options.health_timeout();

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout.as_secs()))?;

        if !response.status().is_success() {
            return Err(LlmError::Communication(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse tags: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint.base_url);
        let timeout = self.options.request_timeout();

        let request_body = OllamaGenerateRequest {
            model: &self.endpoint.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.options.temperature,
                num_predict: self.options.num_predict,
            },
        };

        debug!(url = %url, prompt_chars = prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout.as_secs()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.endpoint.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let body: OllamaGenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(timeout.as_secs())
            } else {
                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
            }
        })?;

        if !body.done {
            debug!("Endpoint reported an unfinished generation");
        }

        Ok(body.response)
    }
}

fn map_send_error(e: reqwest::Error, timeout_secs: u64) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(timeout_secs)
    } else if e.is_connect() {
        LlmError::Unreachable(e.to_string())
    } else {
        LlmError::Communication(format!("Request failed: {}", e))
    }
}

impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.endpoint.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_once(prompt).await
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        self.list_models().await.map(|_| ())
    }
}
