//! Command implementations.

pub mod plan;
pub mod run;
pub mod status;

pub use self::plan::execute_plan;
pub use self::run::{execute_run, run_with_provider, RunOutcome};
pub use self::status::{execute_status, StatusReport};

use crate::config::WorkerConfig;
use crate::error::Result;
use thera_batch::{BatchError, ProgressTracker};
use thera_domain::traits::WorkCatalog;
use thera_domain::WorkItem;
use thera_store::{JsonCatalog, JsonResultStore};

/// Load the catalog; any failure is fatal before work starts.
pub(crate) fn load_catalog(config: &WorkerConfig) -> Result<Vec<WorkItem>> {
    JsonCatalog::new(&config.paths.catalog)
        .load_all()
        .map_err(|e| BatchError::CatalogUnavailable(e.to_string()).into())
}

/// Catalog items without a persisted result, in catalog order.
pub(crate) fn load_pending(config: &WorkerConfig) -> Result<(Vec<WorkItem>, JsonResultStore)> {
    let all = load_catalog(config)?;
    let store = JsonResultStore::new(&config.paths.output_dir);
    let pending = ProgressTracker::new(&store).pending(&all)?;
    Ok((pending, store))
}
