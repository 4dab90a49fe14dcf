//! Inference endpoints

/// Where an inference service lives and which model it serves
///
/// Injected into each worker at startup; one worker uses one endpoint by
/// convention (distinct ports per worker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL (e.g. `http://localhost:11434`)
    pub base_url: String,
    /// Model name (e.g. `llama3.3:70b`)
    pub model: String,
}

impl Endpoint {
    /// Create a new endpoint, stripping any trailing slash from the URL
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            model: model.into(),
        }
    }

    /// Identifier used in chunk plans and logs
    pub fn id(&self) -> String {
        format!("{}#{}", self.base_url, self.model)
    }
}

/// Result of the most recent health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointHealth {
    /// Answered the health check
    Reachable {
        /// Unix timestamp (seconds) of the check
        checked_at: u64,
    },
    /// Failed the health check
    Unreachable {
        /// Unix timestamp (seconds) of the check
        checked_at: u64,
        /// Failure description
        reason: String,
    },
}

impl EndpointHealth {
    /// True when reachable
    pub fn is_reachable(&self) -> bool {
        matches!(self, EndpointHealth::Reachable { .. })
    }
}
