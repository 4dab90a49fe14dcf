//! Per-chunk resumption checkpoints
//!
//! A checkpoint only saves rescanning; the result directory stays the
//! authoritative record of what is done.

use crate::atomic::write_atomic;
use crate::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// `<dir>/checkpoint_<start>_<size>.json`
#[derive(Debug, Clone)]
pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    /// Checkpoint for the chunk starting at `start` with `size` items
    pub fn for_chunk(dir: impl AsRef<Path>, start: usize, size: usize) -> Self {
        Self {
            path: dir
                .as_ref()
                .join(format!("checkpoint_{}_{}.json", start, size)),
        }
    }

    /// Checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically write `state`
    pub fn save<T: Serialize>(&self, state: &T) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state)?;
        write_atomic(&self.path, &json)
    }

    /// Read the checkpoint, `None` if absent
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the checkpoint; absent is fine
    pub fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
