//! Per-chunk processing loop

use crate::config::BatchConfig;
use crate::metrics::RunSummary;
use crate::run_state::RunState;
use crate::supervisor::{SessionStatus, SessionSupervisor, Unsupervised};
use crate::BatchError;
use thera_domain::traits::{LlmProvider, ResultStore};
use thera_domain::{Chunk, WorkItem};
use thera_extractor::Extractor;
use thera_store::CheckpointFile;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// What a chunk run produced
#[derive(Debug, Clone)]
pub struct ChunkReport {
    /// Counters for the summary line
    pub summary: RunSummary,
    /// Final per-item state
    pub state: RunState,
    /// Why the session supervisor stopped the chunk, if it did
    pub expired: Option<String>,
}

impl ChunkReport {
    /// The chunk stopped early because its session ended
    pub fn session_error(&self) -> Option<BatchError> {
        self.expired.clone().map(BatchError::SessionExpired)
    }
}

/// Drives one chunk through extraction and persistence
///
/// Item-level failures are counted and skipped; only a failed start-of-chunk
/// health check aborts the run.
pub struct BatchCoordinator<L, S, V = Unsupervised>
where
    L: LlmProvider,
{
    extractor: Extractor<L>,
    store: S,
    supervisor: V,
    config: BatchConfig,
}

impl<L, S> BatchCoordinator<L, S, Unsupervised>
where
    L: LlmProvider + Send + Sync,
    L::Error: std::fmt::Display,
    S: ResultStore,
    S::Error: std::fmt::Display,
{
    /// Create a coordinator for an endpoint that never expires
    pub fn new(extractor: Extractor<L>, store: S, config: BatchConfig) -> Self {
        Self {
            extractor,
            store,
            supervisor: Unsupervised,
            config,
        }
    }
}

impl<L, S, V> BatchCoordinator<L, S, V>
where
    L: LlmProvider + Send + Sync,
    L::Error: std::fmt::Display,
    S: ResultStore,
    S::Error: std::fmt::Display,
    V: SessionSupervisor,
{
    /// Replace the session supervisor
    pub fn with_supervisor<W: SessionSupervisor>(self, supervisor: W) -> BatchCoordinator<L, S, W> {
        BatchCoordinator {
            extractor: self.extractor,
            store: self.store,
            supervisor,
            config: self.config,
        }
    }

    /// The result store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process `items`, the pending-set slice described by `chunk`
    ///
    /// # Errors
    ///
    /// [`BatchError::EndpointUnreachable`] if the endpoint fails its health
    /// check before any item is attempted.
    pub async fn run_chunk(&mut self, chunk: &Chunk, items: &[WorkItem]) -> Result<ChunkReport, BatchError> {
        let started = Instant::now();

        if let Err(e) = self.extractor.health_check().await {
            error!(error = %e, "Endpoint failed start-of-chunk health check");
            return Err(BatchError::EndpointUnreachable(e.to_string()));
        }

        let checkpoint = CheckpointFile::for_chunk(&self.config.checkpoint_dir, chunk.start, chunk.size);
        match checkpoint.load::<RunState>() {
            Ok(Some(previous)) => info!(
                completed = previous.completed.len(),
                failed = previous.failed.len(),
                last_index = ?previous.last_index,
                "Found checkpoint from an interrupted run; resuming from the result store"
            ),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable checkpoint"),
        }

        let mut state = RunState::new(
            chunk,
            self.extractor.run_id(),
            items.iter().map(|i| i.id.clone()),
        );
        let mut summary = RunSummary::new(chunk.start, items.len());
        let mut expired = None;

        info!(
            start = chunk.start,
            size = items.len(),
            run_id = %self.extractor.run_id(),
            "Starting chunk"
        );

        for (offset, item) in items.iter().enumerate() {
            if let SessionStatus::Invalid(reason) = self.supervisor.check().await {
                warn!(reason = %reason, remaining = state.pending.len(), "Session no longer valid, stopping chunk");
                if let Err(e) = checkpoint.save(&state) {
                    error!(error = %e, "Failed to write checkpoint");
                }
                if let Err(e) = self.supervisor.request_replacement(&state).await {
                    error!(error = %e, "Failed to request a replacement session");
                }
                summary.interrupted = true;
                expired = Some(reason);
                break;
            }

            let position = offset + 1;
            if self.store.exists(&item.id) {
                info!(item = %item.id, "[{}/{}] Already done, skipping", position, items.len());
                summary.record_skipped();
                state.mark_completed(offset, &item.id);
                continue;
            }

            match self.extractor.extract(item).await {
                Ok(result) => match self.store.save(&result) {
                    Ok(()) => {
                        info!(
                            item = %item.id,
                            found = result.records.len(),
                            confirmed = result.confirmed_count,
                            "[{}/{}] Saved",
                            position,
                            items.len()
                        );
                        summary.record_processed(&result);
                        state.mark_completed(offset, &item.id);
                    }
                    Err(e) => {
                        warn!(item = %item.id, error = %e, "[{}/{}] Write failed", position, items.len());
                        summary.record_failed();
                        state.mark_failed(offset, &item.id);
                    }
                },
                Err(e) => {
                    warn!(item = %item.id, error = %e, "[{}/{}] Extraction failed", position, items.len());
                    summary.record_failed();
                    state.mark_failed(offset, &item.id);
                }
            }

            if position < items.len() && !self.config.inter_request_delay().is_zero() {
                tokio::time::sleep(self.config.inter_request_delay()).await;
            }
        }

        if expired.is_none() {
            if let Err(e) = checkpoint.remove() {
                warn!(error = %e, "Failed to remove checkpoint");
            }
        }

        summary.finish(started.elapsed());
        info!("{}", summary.summary());

        Ok(ChunkReport {
            summary,
            state,
            expired,
        })
    }
}
