//! Thera Batch
//!
//! Coordination core for batch extraction: what is left to do, how it is
//! split between workers, and the per-chunk loop that drives one endpoint.
//!
//! # Overview
//!
//! - **Progress tracking**: the pending set is recomputed from the result
//!   store on every invocation, so reruns are cheap and safe
//! - **Chunk planning**: contiguous, near-equal, non-overlapping chunks
//! - **Batch coordination**: skip-if-done, extract, persist, count; an item
//!   failure never aborts its chunk
//! - **Session supervision**: for time-boxed allocations, stop before the
//!   deadline, checkpoint and request a replacement
//!
//! # Usage
//!
//! ```no_run
//! use thera_batch::{plan, BatchConfig, BatchCoordinator, ProgressTracker};
//! use thera_domain::traits::WorkCatalog;
//! use thera_extractor::{Extractor, ExtractorConfig};
//! use thera_llm::OllamaProvider;
//! use thera_store::{JsonCatalog, JsonResultStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let all = JsonCatalog::new("catalog.json").load_all()?;
//!     let store = JsonResultStore::new("results");
//!     let pending = ProgressTracker::new(&store).pending(&all)?;
//!
//!     let chunk = plan(pending.len(), 1).remove(0);
//!     let provider = OllamaProvider::default_endpoint("llama3.3:70b")?;
//!     let extractor = Extractor::new(provider, ExtractorConfig::default());
//!     let mut coordinator = BatchCoordinator::new(extractor, store, BatchConfig::default());
//!
//!     let report = coordinator.run_chunk(&chunk, chunk.slice(&pending)).await?;
//!     println!("{}", report.summary.to_json_line());
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! inter_request_delay_ms = 1000
//! checkpoint_dir = "checkpoints"
//!
//! [session]
//! max_runtime_secs = 14400
//! safety_margin_secs = 600
//! health_check_interval_secs = 300
//! resubmit_command = "sbatch run_chunk.sh"
//! ```

#![warn(missing_docs)]

mod config;
mod coordinator;
mod error;
mod metrics;
mod planner;
mod progress;
mod run_state;
mod supervisor;

pub use config::{BatchConfig, SessionConfig};
pub use coordinator::{BatchCoordinator, ChunkReport};
pub use error::BatchError;
pub use metrics::RunSummary;
pub use planner::{assign_endpoints, plan};
pub use progress::{pending, ProgressTracker};
pub use run_state::RunState;
pub use supervisor::{EndpointSupervisor, SessionStatus, SessionSupervisor, Unsupervised};
