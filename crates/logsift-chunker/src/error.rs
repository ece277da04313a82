//! Error types for the chunker

use thiserror::Error;

/// Raised when a chunking pass cannot produce a complete chunk set
///
/// Chunking never returns a partial or corrupt set; any internal failure
/// (malformed parameters in practice) surfaces as this single error carrying
/// the original text length and the cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("log chunking failed for {original_size} byte input: {reason}")]
pub struct ChunkingError {
    /// Length of the text that was being chunked, in bytes
    pub original_size: usize,

    /// What went wrong
    pub reason: String,
}

impl ChunkingError {
    /// Build an error for the given input length
    pub fn new(original_size: usize, reason: impl Into<String>) -> Self {
        Self {
            original_size,
            reason: reason.into(),
        }
    }
}
