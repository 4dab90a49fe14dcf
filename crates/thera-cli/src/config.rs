//! Worker configuration.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thera_batch::BatchConfig;
use thera_domain::Endpoint;
use thera_extractor::ExtractorConfig;
use thera_llm::ollama::DEFAULT_ENDPOINT;
use thera_llm::{GenerationOptions, RetryConfig, RetryPolicy};

/// Everything a worker needs, one TOML section per crate.
///
/// Missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Inference endpoint
    pub endpoint: EndpointConfig,

    /// Retry behaviour per prompt
    pub retry: RetryConfig,

    /// Sampling and timeouts
    pub generation: GenerationOptions,

    /// Prompt, parser and classifier settings
    pub extractor: ExtractorConfig,

    /// Chunk loop and session limits
    pub batch: BatchConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON work catalog
    pub catalog: PathBuf,

    /// Directory holding one result file per work item
    pub output_dir: PathBuf,
}

/// Inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of this worker's endpoint
    pub base_url: String,

    /// Model name
    pub model: String,

    /// Base URLs handed out round-robin by `--plan`; empty means `base_url`
    pub pool: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("catalog.json"),
            output_dir: PathBuf::from("results"),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENDPOINT.to_string(),
            model: "llama3.3:70b".to_string(),
            pool: Vec::new(),
        }
    }
}

impl WorkerConfig {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".thera").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `~/.thera/config.toml` is
    /// used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::Config(format!("Config file not found: {}", path.display())));
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Ok(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply command-line or environment overrides.
    pub fn apply_overrides(&mut self, endpoint: Option<String>, model: Option<String>) {
        if let Some(base_url) = endpoint {
            self.endpoint.base_url = base_url;
        }
        if let Some(model) = model {
            self.endpoint.model = model;
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.base_url.trim().is_empty() {
            return Err(CliError::Config("endpoint.base_url must not be empty".into()));
        }
        if self.endpoint.model.trim().is_empty() {
            return Err(CliError::Config("endpoint.model must not be empty".into()));
        }

        let sections = [
            ("retry", self.retry.validate()),
            ("generation", self.generation.validate()),
            ("extractor", self.extractor.validate()),
            ("batch", self.batch.validate()),
        ];
        for (name, result) in sections {
            result.map_err(|e| CliError::Config(format!("[{}] {}", name, e)))?;
        }

        // The outer deadline must leave room for every retry
        let budget = RetryPolicy::from(self.retry.clone()).worst_case(self.generation.request_timeout());
        if self.extractor.extraction_timeout() < budget {
            return Err(CliError::Config(format!(
                "[extractor] extraction_timeout_secs {} is shorter than the retry budget of {}s",
                self.extractor.extraction_timeout_secs,
                budget.as_secs_f64().ceil()
            )));
        }
        Ok(())
    }

    /// This worker's endpoint.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(&self.endpoint.base_url, &self.endpoint.model)
    }

    /// Endpoints available to a plan.
    pub fn plan_endpoints(&self) -> Vec<Endpoint> {
        if self.endpoint.pool.is_empty() {
            return vec![self.endpoint()];
        }
        self.endpoint
            .pool
            .iter()
            .map(|url| Endpoint::new(url, &self.endpoint.model))
            .collect()
    }
}
