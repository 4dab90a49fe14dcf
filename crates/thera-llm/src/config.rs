//! Configuration for inference calls

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry behaviour for generation requests
///
/// # Examples
///
/// ```
/// use thera_llm::RetryConfig;
///
/// let config = RetryConfig::default();
/// assert_eq!(config.max_attempts, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Total attempts per prompt, including the first
    pub max_attempts: u32,

    /// Backoff base; attempt N waits `base * 2^(N-1)` before the next try
    pub base_delay_ms: u64,

    /// Replies with fewer trimmed characters are retried
    pub min_response_chars: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            min_response_chars: 10,
        }
    }
}

impl RetryConfig {
    /// Aggressive preset: fewer, quicker retries
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 500,
            min_response_chars: 10,
        }
    }

    /// Lenient preset: more patience for slow or overloaded endpoints
    pub fn lenient() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 5_000,
            min_response_chars: 10,
        }
    }

    /// Backoff base as a Duration
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Sampling and timeout options sent with each generation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature
    pub temperature: f64,

    /// Maximum tokens to generate
    pub num_predict: i32,

    /// Read timeout for generation requests (seconds); replies can be large
    pub request_timeout_secs: u64,

    /// Timeout for health checks (seconds)
    pub health_timeout_secs: u64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            num_predict: 2048,
            request_timeout_secs: 600,
            health_timeout_secs: 10,
        }
    }
}

impl GenerationOptions {
    /// Generation timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Health-check timeout as a Duration
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.num_predict == 0 {
            return Err("num_predict must not be 0".to_string());
        }
        if self.request_timeout_secs == 0 || self.health_timeout_secs == 0 {
            return Err("timeouts must be greater than 0".to_string());
        }
        if self.health_timeout_secs > self.request_timeout_secs {
            return Err("health_timeout_secs cannot exceed request_timeout_secs".to_string());
        }
        Ok(())
    }

    /// Load options from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}
