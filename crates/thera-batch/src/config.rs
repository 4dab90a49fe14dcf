//! Configuration for batch runs
//!
//! Defines request pacing, checkpoint placement and the optional session
//! limits of a time-boxed compute allocation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Batch Coordinator
///
/// # Examples
///
/// ```
/// use thera_batch::BatchConfig;
///
/// let config = BatchConfig::default();
/// assert_eq!(config.inter_request_delay_ms, 1000);
/// assert!(config.session.is_none());
///
/// let config = BatchConfig::aggressive();
/// assert!(config.inter_request_delay_ms < 1000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Pause after each queried item (milliseconds)
    /// Default: 1000
    pub inter_request_delay_ms: u64,

    /// Where resumption checkpoints are written
    /// Default: "checkpoints"
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,

    /// Limits of a time-boxed allocation; `None` when the endpoint is permanent
    #[serde(default)]
    pub session: Option<SessionConfig>,
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

/// Limits of a time-boxed compute allocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Wall-clock lifetime of the allocation (seconds)
    /// Default: 4 hours
    pub max_runtime_secs: u64,

    /// Stop this long before the allocation ends (seconds)
    /// Default: 10 minutes
    pub safety_margin_secs: u64,

    /// Minimum spacing between endpoint health probes (seconds)
    /// Default: 5 minutes
    pub health_check_interval_secs: u64,

    /// Shell command that requests a replacement allocation
    #[serde(default)]
    pub resubmit_command: Option<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_request_delay_ms: 1_000,
            checkpoint_dir: default_checkpoint_dir(),
            session: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_runtime_secs: 4 * 3600,
            safety_margin_secs: 600,
            health_check_interval_secs: 300,
            resubmit_command: None,
        }
    }
}

impl BatchConfig {
    /// Aggressive pacing for a dedicated local endpoint
    pub fn aggressive() -> Self {
        Self {
            inter_request_delay_ms: 250,
            ..Self::default()
        }
    }

    /// Lenient pacing for a shared or fragile endpoint
    pub fn lenient() -> Self {
        Self {
            inter_request_delay_ms: 3_000,
            ..Self::default()
        }
    }

    /// Get the inter-request delay as Duration
    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.checkpoint_dir.as_os_str().is_empty() {
            return Err("checkpoint_dir must not be empty".to_string());
        }
        if let Some(session) = &self.session {
            session.validate()?;
        }
        Ok(())
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

impl SessionConfig {
    /// Get the allocation lifetime as Duration
    pub fn max_runtime(&self) -> Duration {
        Duration::from_secs(self.max_runtime_secs)
    }

    /// Get the safety margin as Duration
    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }

    /// Get the health probe spacing as Duration
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_runtime_secs == 0 {
            return Err("max_runtime_secs must be greater than 0".to_string());
        }
        if self.safety_margin_secs >= self.max_runtime_secs {
            return Err(format!(
                "safety_margin_secs ({}) must be less than max_runtime_secs ({})",
                self.safety_margin_secs, self.max_runtime_secs
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.inter_request_delay(), Duration::from_secs(1));
        assert_eq!(config.checkpoint_dir, PathBuf::from("checkpoints"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert!(BatchConfig::aggressive().inter_request_delay_ms < BatchConfig::default().inter_request_delay_ms);
        assert!(BatchConfig::lenient().inter_request_delay_ms > BatchConfig::default().inter_request_delay_ms);
    }

    #[test]
    fn test_session_validation() {
        let session = SessionConfig {
            max_runtime_secs: 600,
            safety_margin_secs: 600,
            ..Default::default()
        };
        assert!(session.validate().is_err());

        let config = BatchConfig {
            session: Some(session),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_with_session() {
        let config = BatchConfig::from_toml(
            r#"
            inter_request_delay_ms = 2000

            [session]
            max_runtime_secs = 7200
            safety_margin_secs = 300
            health_check_interval_secs = 60
            resubmit_command = "sbatch worker.sh"
            "#,
        )
        .unwrap();

        assert_eq!(config.checkpoint_dir, PathBuf::from("checkpoints"));
        let session = config.session.unwrap();
        assert_eq!(session.max_runtime(), Duration::from_secs(7200));
        assert_eq!(session.resubmit_command.as_deref(), Some("sbatch worker.sh"));
    }
}
