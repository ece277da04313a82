//! Progress event types
//!
//! Events are emitted in completion order, which is non-deterministic under
//! concurrency; each event therefore carries its chunk's fixed 1-based input
//! index and the fixed total, so a consumer can always reconstruct true
//! progress regardless of arrival order.

use crate::chunk::ChunkId;
use serde::Serialize;

/// Pipeline step the progress events belong to
pub const EXTRACTION_STEP: &str = "extraction";

/// Outcome-so-far of one chunk's processing
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChunkStatus {
    /// Work on the chunk has started
    Processing,
    /// The chunk finished; counts describe what was extracted
    Completed {
        /// Exceptions extracted from the chunk
        exception_count: usize,
        /// Library references extracted from the chunk
        library_count: usize,
        /// Problematic behaviors extracted from the chunk
        behavior_count: usize,
    },
    /// The chunk failed
    Failed {
        /// Error rendering of the failure cause
        reason: String,
    },
}

/// A self-describing progress event for one chunk
#[derive(Debug, Clone, Serialize)]
pub struct ChunkProgress {
    /// Pipeline step name
    pub step: &'static str,

    /// Id of the chunk the event describes
    pub chunk_id: ChunkId,

    /// 1-based position of the chunk in the input sequence
    pub chunk_index: usize,

    /// Total number of chunks in the batch
    pub total_chunks: usize,

    /// Chunk status at emission time
    #[serde(flatten)]
    pub status: ChunkStatus,
}

impl ChunkProgress {
    /// Event for a chunk whose processing just started
    pub fn processing(chunk_id: ChunkId, chunk_index: usize, total_chunks: usize) -> Self {
        Self {
            step: EXTRACTION_STEP,
            chunk_id,
            chunk_index,
            total_chunks,
            status: ChunkStatus::Processing,
        }
    }

    /// Event for a chunk that completed
    pub fn completed(
        chunk_id: ChunkId,
        chunk_index: usize,
        total_chunks: usize,
        exception_count: usize,
        library_count: usize,
        behavior_count: usize,
    ) -> Self {
        Self {
            step: EXTRACTION_STEP,
            chunk_id,
            chunk_index,
            total_chunks,
            status: ChunkStatus::Completed {
                exception_count,
                library_count,
                behavior_count,
            },
        }
    }

    /// Event for a chunk that failed
    pub fn failed(
        chunk_id: ChunkId,
        chunk_index: usize,
        total_chunks: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            step: EXTRACTION_STEP,
            chunk_id,
            chunk_index,
            total_chunks,
            status: ChunkStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Progress percentage relative to this chunk's own input position:
    /// `chunk_index / total_chunks * 100`
    pub fn percentage(&self) -> f64 {
        if self.total_chunks == 0 {
            0.0
        } else {
            self.chunk_index as f64 / self.total_chunks as f64 * 100.0
        }
    }
}
