//! `--status`: completed and pending counts.

use super::load_catalog;
use crate::config::WorkerConfig;
use crate::error::Result;
use crate::output::Formatter;
use serde::Serialize;
use std::collections::BTreeSet;
use thera_batch::ProgressTracker;
use thera_domain::WorkItem;
use thera_store::JsonResultStore;

/// Progress of the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Catalog size
    pub total: usize,
    /// Catalog items with a persisted result
    pub completed: usize,
    /// Catalog items still to do
    pub pending: usize,
    /// Result files whose id is not in the catalog
    pub orphaned: usize,
}

impl StatusReport {
    /// Compare the catalog against the ids found in the result store.
    pub fn from_ids(all: &[WorkItem], done: &BTreeSet<String>) -> Self {
        let catalog: BTreeSet<&str> = all.iter().map(|i| i.id.as_str()).collect();
        let completed = done.iter().filter(|id| catalog.contains(id.as_str())).count();
        Self {
            total: catalog.len(),
            completed,
            pending: catalog.len() - completed,
            orphaned: done.len() - completed,
        }
    }

    /// Share of the catalog already done.
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

/// Compute the status report.
pub fn status_report(config: &WorkerConfig) -> Result<StatusReport> {
    let all = load_catalog(config)?;
    let store = JsonResultStore::new(&config.paths.output_dir);
    let done = ProgressTracker::new(&store).completed_ids()?;
    Ok(StatusReport::from_ids(&all, &done))
}

/// Execute the status command, returning the rendered report.
pub fn execute_status(config: &WorkerConfig, formatter: &Formatter) -> Result<String> {
    let report = status_report(config)?;
    formatter.format_status(&report)
}
