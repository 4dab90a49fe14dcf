//! Explicit progress of one chunk
//!
//! Threaded through the coordinator and written out only as a checkpoint.
//! The result store stays authoritative.

use serde::{Deserialize, Serialize};
use thera_domain::{unix_now, Chunk, RunId};

/// Progress of one chunk invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// First pending-set index of the chunk
    pub start_index: usize,
    /// Requested chunk size
    pub batch_size: usize,
    /// Invocation that owns this state
    pub run_id: String,
    /// Ids not yet attempted, in chunk order
    pub pending: Vec<String>,
    /// Ids persisted or already present
    pub completed: Vec<String>,
    /// Ids whose inference or write failed
    pub failed: Vec<String>,
    /// Chunk offset of the last item attempted
    pub last_index: Option<usize>,
    /// Unix seconds of the last update
    pub updated_at: u64,
}

impl RunState {
    /// Fresh state for `chunk` over the given ids
    pub fn new(chunk: &Chunk, run_id: RunId, ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            start_index: chunk.start,
            batch_size: chunk.size,
            run_id: run_id.to_string(),
            pending: ids.into_iter().collect(),
            completed: Vec::new(),
            failed: Vec::new(),
            last_index: None,
            updated_at: unix_now(),
        }
    }

    /// Record `id` at chunk offset `index` as done
    pub fn mark_completed(&mut self, index: usize, id: &str) {
        self.settle(index, id);
        self.completed.push(id.to_string());
    }

    /// Record `id` at chunk offset `index` as failed
    pub fn mark_failed(&mut self, index: usize, id: &str) {
        self.settle(index, id);
        self.failed.push(id.to_string());
    }

    fn settle(&mut self, index: usize, id: &str) {
        self.pending.retain(|p| p != id);
        self.last_index = Some(index);
        self.updated_at = unix_now();
    }

    /// Nothing left to attempt
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk {
            index: 0,
            start: 10,
            size: 3,
            endpoint: None,
        }
    }

    #[test]
    fn test_transitions() {
        let ids = ["a", "b", "c"].iter().map(|s| s.to_string());
        let mut state = RunState::new(&chunk(), RunId::new(), ids);
        assert_eq!(state.start_index, 10);
        assert_eq!(state.pending.len(), 3);

        state.mark_completed(0, "a");
        state.mark_failed(1, "b");

        assert_eq!(state.pending, vec!["c".to_string()]);
        assert_eq!(state.completed, vec!["a".to_string()]);
        assert_eq!(state.failed, vec!["b".to_string()]);
        assert_eq!(state.last_index, Some(1));
        assert!(!state.is_finished());

        state.mark_completed(2, "c");
        assert!(state.is_finished());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut state = RunState::new(&chunk(), RunId::new(), vec!["x".to_string()]);
        state.mark_failed(0, "x");

        let json = serde_json::to_string(&state).unwrap();
        let back: RunState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
