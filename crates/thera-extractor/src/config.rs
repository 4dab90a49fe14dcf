//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for prompt building, parsing and classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractorConfig {
    /// Records at or above this confidence count as confirmed
    pub confidence_threshold: f64,

    /// Exact digit count of a valid citation id (PubMed ids: 8)
    pub citation_id_digits: usize,

    /// Maximum excerpts rendered into the prompt
    pub max_excerpts: usize,

    /// Maximum characters of context rendered into the prompt
    pub max_context_chars: usize,

    /// Deadline for one work item including retries (seconds)
    pub extraction_timeout_secs: u64,

    /// Case-insensitive phrases marking a policy refusal
    #[serde(default = "default_refusal_phrases")]
    pub refusal_phrases: Vec<String>,

    /// Case-insensitive phrases marking a genuine "nothing found"
    #[serde(default = "default_negative_phrases")]
    pub negative_phrases: Vec<String>,
}

fn default_refusal_phrases() -> Vec<String> {
    [
        "cannot provide medical advice",
        "can't provide medical advice",
        "unable to provide medical advice",
        "not able to provide medical advice",
        "cannot give medical advice",
        "can't give medical advice",
        "i cannot help with this request",
        "i can't help with this request",
        "i cannot assist with",
        "i can't assist with",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_negative_phrases() -> Vec<String> {
    [
        "no indications found",
        "no indications were found",
        "no therapeutic indications",
        "no relevant indications",
        "no clear indications",
        "no specific indications",
        "no known indications",
        "no information found",
        "no information available",
        "no relevant information",
        "could not identify any",
        "did not identify any",
        "none identified",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold {} out of range [0.0, 1.0]",
                self.confidence_threshold
            ));
        }
        if self.citation_id_digits == 0 {
            return Err("citation_id_digits must be greater than 0".to_string());
        }
        if self.max_context_chars == 0 {
            return Err("max_context_chars must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            citation_id_digits: 8,
            max_excerpts: 50,
            max_context_chars: 60_000,
            extraction_timeout_secs: 1_900,
            refusal_phrases: default_refusal_phrases(),
            negative_phrases: default_negative_phrases(),
        }
    }
}

impl ExtractorConfig {
    /// Strict preset: higher bar for confirmed records, smaller prompts
    pub fn strict() -> Self {
        Self {
            confidence_threshold: 0.8,
            max_excerpts: 20,
            max_context_chars: 30_000,
            ..Self::default()
        }
    }

    /// Lenient preset: lower bar, more context, longer deadline
    pub fn lenient() -> Self {
        Self {
            confidence_threshold: 0.4,
            max_excerpts: 100,
            max_context_chars: 120_000,
            extraction_timeout_secs: 3_600,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
