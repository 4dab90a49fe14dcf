//! Session supervision for time-boxed compute allocations
//!
//! Checked before every item: allocations can end mid-chunk.

use crate::config::SessionConfig;
use crate::run_state::RunState;
use crate::BatchError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thera_domain::traits::LlmProvider;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Verdict of a session check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Keep going
    Valid,
    /// Stop, checkpoint and ask for a replacement
    Invalid(String),
}

impl SessionStatus {
    /// True for [`SessionStatus::Valid`]
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionStatus::Valid)
    }
}

/// Decides whether the current allocation can take another item
pub trait SessionSupervisor {
    /// Is the allocation still usable?
    fn check(&mut self) -> impl Future<Output = SessionStatus> + Send;

    /// Ask the scheduler for a replacement allocation
    fn request_replacement(
        &self,
        state: &RunState,
    ) -> impl Future<Output = Result<(), BatchError>> + Send;
}

/// Supervisor for endpoints that never expire
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupervised;

impl SessionSupervisor for Unsupervised {
    async fn check(&mut self) -> SessionStatus {
        SessionStatus::Valid
    }

    async fn request_replacement(&self, _state: &RunState) -> Result<(), BatchError> {
        Ok(())
    }
}

/// Watches the allocation deadline and probes the endpoint periodically
pub struct EndpointSupervisor<P: LlmProvider> {
    provider: Arc<P>,
    config: SessionConfig,
    started: Instant,
    last_probe: Option<Instant>,
}

impl<P> EndpointSupervisor<P>
where
    P: LlmProvider + Send + Sync,
    P::Error: std::fmt::Display,
{
    /// Start supervising now
    pub fn new(provider: Arc<P>, config: SessionConfig) -> Self {
        Self {
            provider,
            config,
            started: Instant::now(),
            last_probe: None,
        }
    }

    /// Time left before the safety margin is reached
    pub fn remaining(&self) -> Duration {
        self.config
            .max_runtime()
            .saturating_sub(self.config.safety_margin())
            .saturating_sub(self.started.elapsed())
    }

    fn probe_due(&self) -> bool {
        match self.last_probe {
            None => true,
            Some(at) => at.elapsed() >= self.config.health_check_interval(),
        }
    }
}

impl<P> SessionSupervisor for EndpointSupervisor<P>
where
    P: LlmProvider + Send + Sync,
    P::Error: std::fmt::Display,
{
    async fn check(&mut self) -> SessionStatus {
        if self.remaining().is_zero() {
            return SessionStatus::Invalid(format!(
                "allocation within {}s of its {}s limit",
                self.config.safety_margin_secs, self.config.max_runtime_secs
            ));
        }

        if self.probe_due() {
            self.last_probe = Some(Instant::now());
            if let Err(e) = self.provider.health_check().await {
                return SessionStatus::Invalid(format!("endpoint unreachable: {}", e));
            }
            debug!(remaining_secs = self.remaining().as_secs(), "Session healthy");
        }

        SessionStatus::Valid
    }

    async fn request_replacement(&self, state: &RunState) -> Result<(), BatchError> {
        let Some(command) = self.config.resubmit_command.as_deref() else {
            warn!("No resubmit_command configured; rerun this chunk manually");
            return Ok(());
        };

        info!(command, start = state.start_index, size = state.batch_size, "Requesting replacement session");

        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .env("THERA_START_INDEX", state.start_index.to_string())
            .env("THERA_BATCH_SIZE", state.batch_size.to_string())
            .status()
            .await
            .map_err(|e| BatchError::Worker(format!("failed to run resubmit command: {}", e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(BatchError::Worker(format!("resubmit command exited with {}", status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thera_domain::{Chunk, RunId};
    use thera_llm::MockProvider;

    fn config(max: u64, margin: u64, interval: u64) -> SessionConfig {
        SessionConfig {
            max_runtime_secs: max,
            safety_margin_secs: margin,
            health_check_interval_secs: interval,
            resubmit_command: None,
        }
    }

    fn state() -> RunState {
        let chunk = Chunk {
            index: 0,
            start: 5,
            size: 2,
            endpoint: None,
        };
        RunState::new(&chunk, RunId::new(), Vec::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_with_margin() {
        let mut supervisor = EndpointSupervisor::new(Arc::new(MockProvider::default()), config(100, 10, 1_000));
        assert!(supervisor.check().await.is_valid());

        tokio::time::advance(Duration::from_secs(89)).await;
        assert!(supervisor.check().await.is_valid());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!supervisor.check().await.is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unhealthy_endpoint_invalidates() {
        let provider = Arc::new(MockProvider::default());
        let mut supervisor = EndpointSupervisor::new(provider.clone(), config(3_600, 60, 30));
        assert!(supervisor.check().await.is_valid());

        provider.set_healthy(false);
        // Probe not due yet
        assert!(supervisor.check().await.is_valid());

        tokio::time::advance(Duration::from_secs(30)).await;
        match supervisor.check().await {
            SessionStatus::Invalid(reason) => assert!(reason.contains("unreachable")),
            SessionStatus::Valid => panic!("expected invalid session"),
        }
    }

    #[tokio::test]
    async fn test_resubmit_command_receives_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("env.txt");
        let mut cfg = config(3_600, 60, 30);
        cfg.resubmit_command = Some(format!(
            "echo \"$THERA_START_INDEX $THERA_BATCH_SIZE\" > '{}'",
            out.display()
        ));
        let supervisor = EndpointSupervisor::new(Arc::new(MockProvider::default()), cfg);

        supervisor.request_replacement(&state()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "5 2");
    }

    #[tokio::test]
    async fn test_failing_resubmit_command() {
        let mut cfg = config(3_600, 60, 30);
        cfg.resubmit_command = Some("exit 3".to_string());
        let supervisor = EndpointSupervisor::new(Arc::new(MockProvider::default()), cfg);

        assert!(matches!(
            supervisor.request_replacement(&state()).await,
            Err(BatchError::Worker(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupervised_always_valid() {
        let mut supervisor = Unsupervised;
        assert_eq!(supervisor.check().await, SessionStatus::Valid);
        assert!(supervisor.request_replacement(&state()).await.is_ok());
    }
}
