//! Error types for the Extractor

use logsift_chunker::ChunkingError;
use logsift_domain::{ChunkExtraction, ChunkId};
use thiserror::Error;

/// One failed chunk within a batch
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    /// 0-based position of the chunk in the input sequence
    pub index: usize,

    /// Id of the failed chunk
    pub chunk_id: ChunkId,

    /// Rendered failure cause
    pub reason: String,
}

/// Errors the extraction pipeline can surface
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// A single chunk's model call failed
    #[error("extraction failed for chunk {chunk_id} ({chunk_size} bytes): {reason}")]
    Chunk {
        /// Id of the failed chunk
        chunk_id: ChunkId,
        /// Content length of the failed chunk, in bytes
        chunk_size: usize,
        /// Rendered failure cause
        reason: String,
    },

    /// One or more chunks of a batch failed
    ///
    /// Sibling chunks are never abandoned on a per-chunk failure, so the
    /// error carries both sides of the outcome: every failure and every
    /// successful extraction, each sorted by input position.
    #[error("{} of {} chunks failed", failures.len(), failures.len() + partial.len())]
    Batch {
        /// Chunks that failed, sorted by input position
        failures: Vec<ChunkFailure>,
        /// Extractions from the chunks that succeeded, in input order
        partial: Vec<ChunkExtraction>,
    },

    /// The input text could not be chunked
    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    /// A spawned chunk worker did not run to completion
    #[error("extraction worker did not complete: {0}")]
    Join(String),

    /// The batch was cancelled before completion
    #[error("extraction cancelled")]
    Cancelled,
}
