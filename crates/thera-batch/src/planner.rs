//! Chunk planning
//!
//! Pure functions: no I/O, same input gives the same chunks.

use thera_domain::{Chunk, Endpoint};

/// Split `pending_len` items into `worker_count` contiguous, near-equal chunks
///
/// The remainder goes to the last chunks, one extra item each. Empty chunks
/// are never produced, so fewer than `worker_count` chunks come back when
/// there are fewer items than workers. A `worker_count` of 0 is treated as 1.
///
/// # Examples
///
/// ```
/// use thera_batch::plan;
///
/// let chunks = plan(10, 3);
/// let sizes: Vec<_> = chunks.iter().map(|c| c.size).collect();
/// assert_eq!(sizes, vec![3, 3, 4]);
/// assert_eq!(chunks[2].start, 6);
/// ```
pub fn plan(pending_len: usize, worker_count: usize) -> Vec<Chunk> {
    let workers = worker_count.max(1);
    let base = pending_len / workers;
    let remainder = pending_len % workers;

    let mut chunks = Vec::with_capacity(workers.min(pending_len));
    let mut start = 0;
    for worker in 0..workers {
        let extra = usize::from(worker >= workers - remainder);
        let size = base + extra;
        if size == 0 {
            continue;
        }
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            size,
            endpoint: None,
        });
        start += size;
    }
    chunks
}

/// Assign endpoints to chunks round-robin
pub fn assign_endpoints(chunks: &mut [Chunk], endpoints: &[Endpoint]) {
    if endpoints.is_empty() {
        return;
    }
    for chunk in chunks.iter_mut() {
        chunk.endpoint = Some(endpoints[chunk.index % endpoints.len()].id());
    }
}
