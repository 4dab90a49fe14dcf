//! Default mode: process one chunk of the pending set.

use super::load_pending;
use crate::config::WorkerConfig;
use crate::error::{CliError, Result, EXIT_ITEM_FAILED, EXIT_OK, EXIT_SESSION_EXPIRED};
use std::sync::Arc;
use thera_batch::{BatchCoordinator, EndpointSupervisor, RunSummary};
use thera_domain::traits::LlmProvider;
use thera_domain::Chunk;
use thera_extractor::Extractor;
use thera_llm::{OllamaProvider, RetryingProvider};
use tracing::info;

/// What a chunk run left behind.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Counters for the summary line
    pub summary: RunSummary,
    /// Why the session ended early, if it did
    pub expired: Option<String>,
}

impl RunOutcome {
    /// Outcome of a chunk that failed before any item ran.
    pub fn aborted(start_index: usize, error: &CliError) -> Self {
        Self {
            summary: RunSummary::aborted(start_index, 0, error.to_string()),
            expired: None,
        }
    }

    /// Process exit code: expiry beats item failures.
    pub fn exit_code(&self) -> u8 {
        if self.expired.is_some() {
            EXIT_SESSION_EXPIRED
        } else if self.summary.is_success() {
            EXIT_OK
        } else {
            EXIT_ITEM_FAILED
        }
    }
}

/// Process `batch_size` pending items starting at `start_index` against the
/// configured Ollama endpoint.
pub async fn execute_run(start_index: usize, batch_size: usize, config: &WorkerConfig) -> Result<RunOutcome> {
    let endpoint = config.endpoint();
    info!(endpoint = %endpoint.id(), "Using inference endpoint");

    let ollama = OllamaProvider::new(endpoint, config.generation.clone())?;
    let provider = Arc::new(RetryingProvider::new(ollama, config.retry.clone().into()));
    run_with_provider(start_index, batch_size, config, provider).await
}

/// Process one chunk with an already-built provider.
///
/// The provider is shared between the extractor and, for time-boxed
/// allocations, the session supervisor's health probes.
pub async fn run_with_provider<P>(
    start_index: usize,
    batch_size: usize,
    config: &WorkerConfig,
    provider: Arc<P>,
) -> Result<RunOutcome>
where
    P: LlmProvider + Send + Sync,
    P::Error: std::fmt::Display,
{
    let (pending, store) = load_pending(config)?;
    let chunk = Chunk {
        index: 0,
        start: start_index,
        size: batch_size,
        endpoint: Some(config.endpoint().id()),
    };
    let items = chunk.slice(&pending);

    if items.is_empty() {
        info!(
            start = start_index,
            pending = pending.len(),
            "Chunk lies outside the pending set, nothing to do"
        );
        return Ok(RunOutcome {
            summary: RunSummary::new(start_index, 0),
            expired: None,
        });
    }

    let extractor = Extractor::from_shared(provider.clone(), config.extractor.clone());
    let coordinator = BatchCoordinator::new(extractor, store, config.batch.clone());

    let report = match config.batch.session.clone() {
        Some(session) => {
            let supervisor = EndpointSupervisor::new(provider, session);
            let mut coordinator = coordinator.with_supervisor(supervisor);
            coordinator.run_chunk(&chunk, items).await?
        }
        None => {
            let mut coordinator = coordinator;
            coordinator.run_chunk(&chunk, items).await?
        }
    };

    Ok(RunOutcome {
        summary: report.summary,
        expired: report.expired,
    })
}
