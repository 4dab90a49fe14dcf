//! Thera Storage Layer
//!
//! File-system backed implementations of the domain's storage traits.
//!
//! # Architecture
//!
//! - [`JsonCatalog`]: the static work corpus, one JSON array on disk
//! - [`JsonResultStore`]: one `<id>_result.json` document per work item,
//!   written atomically (temp file in the same directory, then rename)
//! - [`CheckpointFile`]: optional resumption hints for a chunk
//!
//! The output directory is the only state shared between workers. Completed
//! ids are derived from file names, never from file bodies.
//!
//! # Examples
//!
//! ```no_run
//! use thera_domain::traits::ResultStore;
//! use thera_store::JsonResultStore;
//!
//! let store = JsonResultStore::new("results");
//! let done = store.completed_ids().unwrap();
//! println!("{} items already extracted", done.len());
//! ```

#![warn(missing_docs)]

mod atomic;
mod catalog;
mod checkpoint;
mod document;
mod filename;
mod results;

pub use catalog::JsonCatalog;
pub use checkpoint::CheckpointFile;
pub use document::{StoredDiagnostics, StoredMetadata, StoredRecord, StoredResult};
pub use filename::{decode_id, encode_id, RESULT_SUFFIX};
pub use results::JsonResultStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The work catalog is missing or malformed
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A persisted document does not describe a valid result
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
