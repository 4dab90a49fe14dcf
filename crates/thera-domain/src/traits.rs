//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the coordination core and
//! infrastructure. Implementations live in other crates.

use crate::{ResultSet, WorkItem};
use std::collections::BTreeSet;
use std::future::Future;

/// Text-generation backend
///
/// Implemented by the infrastructure layer (thera-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Name of the model this provider talks to
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt`
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Lightweight reachability probe
    fn health_check(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Persistent store of one result set per work item
///
/// Implemented by the infrastructure layer (thera-store)
pub trait ResultStore {
    /// Error type for store operations
    type Error;

    /// Whether a result for `work_item_id` has already been persisted
    fn exists(&self, work_item_id: &str) -> bool;

    /// Persist a result set; visible to readers only once fully written
    fn save(&self, result: &ResultSet) -> Result<(), Self::Error>;

    /// Ids of every persisted result, derived without reading file bodies
    fn completed_ids(&self) -> Result<BTreeSet<String>, Self::Error>;
}

/// Source of work items
///
/// Implemented by the infrastructure layer (thera-store)
pub trait WorkCatalog {
    /// Error type for catalog operations
    type Error;

    /// Every work item, sorted by id
    fn load_all(&self) -> Result<Vec<WorkItem>, Self::Error>;
}
