//! Chunks - contiguous slices of the pending set

use std::ops::Range;

/// A contiguous slice of pending work assigned to one worker
///
/// Computed at dispatch time and never persisted; a rerun recomputes chunks
/// from the then-current pending set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the plan (worker index)
    pub index: usize,
    /// Offset of the first item in the pending set
    pub start: usize,
    /// Number of items
    pub size: usize,
    /// Endpoint identifier assigned to the worker, if any
    pub endpoint: Option<String>,
}

impl Chunk {
    /// Index range covered in the pending set
    pub fn range(&self) -> Range<usize> {
        self.start..self.start.saturating_add(self.size)
    }

    /// Borrow this chunk's items out of `pending`
    ///
    /// Out-of-range bounds are truncated rather than panicking.
    pub fn slice<'a, T>(&self, pending: &'a [T]) -> &'a [T] {
        let start = self.start.min(pending.len());
        let end = self.start.saturating_add(self.size).min(pending.len());
        &pending[start..end]
    }
}
