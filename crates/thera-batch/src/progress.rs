//! Progress tracking derived entirely from the result store

use crate::BatchError;
use std::collections::BTreeSet;
use thera_domain::traits::ResultStore;
use thera_domain::WorkItem;

/// `all` minus `completed`, keeping catalog order
pub fn pending(all: &[WorkItem], completed: &BTreeSet<String>) -> Vec<WorkItem> {
    all.iter()
        .filter(|item| !completed.contains(&item.id))
        .cloned()
        .collect()
}

/// Computes what is left to do by scanning the result store
///
/// Holds no state of its own: two trackers over the same store always agree,
/// and a fresh process sees exactly what earlier processes left on disk.
pub struct ProgressTracker<'a, S: ResultStore> {
    store: &'a S,
}

impl<'a, S> ProgressTracker<'a, S>
where
    S: ResultStore,
    S::Error: std::fmt::Display,
{
    /// Tracker over `store`
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Ids with a persisted result
    pub fn completed_ids(&self) -> Result<BTreeSet<String>, BatchError> {
        self.store
            .completed_ids()
            .map_err(|e| BatchError::Store(e.to_string()))
    }

    /// Items of `all` without a persisted result, in catalog order
    pub fn pending(&self, all: &[WorkItem]) -> Result<Vec<WorkItem>, BatchError> {
        let completed = self.completed_ids()?;
        Ok(pending(all, &completed))
    }
}
