//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators. Implementations live in other crates (or in the embedding
//! application).

use crate::chunk::Chunk;
use crate::extraction::ChunkExtraction;
use crate::progress::ChunkProgress;
use async_trait::async_trait;

/// The opaque per-chunk model call
///
/// Contract:
/// - `Ok(Some(extraction))` is the normal success path. The analyzer's own
///   `chunk_id` assignment, if any, is not trusted; the orchestrator
///   overwrites it.
/// - `Ok(None)` means the model legitimately had nothing to report for the
///   chunk. The orchestrator substitutes an empty extraction; this is not an
///   error.
/// - `Err(_)` is a per-chunk failure. The orchestrator tags it with the chunk
///   id and index and keeps processing sibling chunks.
///
/// Implementations are expected to suspend (network I/O). Retries, if any,
/// belong inside the implementation or a wrapping caller; the orchestrator
/// attempts each chunk exactly once.
#[async_trait]
pub trait ChunkAnalyzer: Send + Sync {
    /// Error type for analyzer failures
    type Error: std::fmt::Display + Send;

    /// Extract structured information from one chunk
    async fn analyze(&self, chunk: &Chunk) -> Result<Option<ChunkExtraction>, Self::Error>;
}

/// Fire-and-forget consumer of progress events
///
/// Sinks must not block and must not fail the pipeline; anything expensive
/// belongs behind a channel inside the implementation.
pub trait ProgressSink: Send + Sync {
    /// Receive one progress event
    fn notify(&self, progress: ChunkProgress);
}

/// A sink that drops every event; useful as a default and in tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn notify(&self, _progress: ChunkProgress) {}
}
