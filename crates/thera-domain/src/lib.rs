//! Thera Domain Layer
//!
//! Core vocabulary for batch indication extraction. Every other crate in the
//! workspace speaks in these types; infrastructure (HTTP, file system) lives
//! elsewhere and plugs in through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **WorkItem**: one unit of extraction work (a drug plus its evidence)
//! - **CandidateRecord**: one parsed claim from a model reply
//! - **Confidence**: a heuristic score that always lies in [0, 1]
//! - **ResultSet**: every record for one work item, plus diagnostics
//! - **Outcome**: why a reply produced zero records
//! - **Chunk**: a contiguous slice of the pending set handed to one worker
//! - **Endpoint**: where an inference service lives and which model it serves
//!
//! ## Architecture
//!
//! - Pure types and trait boundaries only
//! - No I/O; the only external crate is `uuid` for run identifiers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod endpoint;
pub mod outcome;
pub mod record;
pub mod result_set;
pub mod run;
pub mod traits;
pub mod work_item;

// Re-exports for convenience
pub use chunk::Chunk;
pub use endpoint::{Endpoint, EndpointHealth};
pub use outcome::{DefectKind, Outcome};
pub use record::{normalize_label, CandidateRecord, Confidence};
pub use result_set::ResultSet;
pub use run::{unix_now, RunId};
pub use work_item::{Excerpt, WorkContext, WorkItem};
