//! `--plan`: how the pending set would be split across workers.

use super::load_pending;
use crate::config::WorkerConfig;
use crate::error::Result;
use crate::output::Formatter;
use thera_batch::{assign_endpoints, plan};
use thera_domain::Chunk;
use tracing::info;

/// Compute the chunk plan for `workers` workers.
pub fn plan_chunks(workers: usize, config: &WorkerConfig) -> Result<Vec<Chunk>> {
    let (pending, _) = load_pending(config)?;
    let mut chunks = plan(pending.len(), workers);
    assign_endpoints(&mut chunks, &config.plan_endpoints());
    info!(pending = pending.len(), workers, chunks = chunks.len(), "Planned chunks");
    Ok(chunks)
}

/// Execute the plan command, returning the rendered plan.
pub fn execute_plan(workers: usize, config: &WorkerConfig, formatter: &Formatter) -> Result<String> {
    let chunks = plan_chunks(workers, config)?;
    formatter.format_plan(&chunks)
}
