//! The log chunker: strategy selection, position tracking, metadata injection

use crate::error::ChunkingError;
use crate::splitter::RecursiveTextSplitter;
use crate::strategies::{chunk_by_error_boundaries, chunk_by_timestamp_windows};
use logsift_domain::chunk::{Chunk, ChunkMetadata, ChunkSet};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

/// Default time window for the timestamp strategy, in minutes
pub const DEFAULT_TIMESTAMP_INTERVAL_MINUTES: u32 = 5;

/// How the chunker decides where one chunk ends and the next begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Layered separators: paragraph breaks, then line breaks, then spaces,
    /// then a hard character cut; only falls to a finer separator for pieces
    /// still over the size bound
    Recursive,

    /// Split only on line breaks
    LineBased,

    /// Start a new chunk at each error/exception keyword line once the
    /// current chunk already holds an incident; the size bound does not apply
    ErrorBoundary,

    /// Group consecutive lines into fixed time windows keyed by recognized
    /// timestamps; the size bound does not apply
    TimestampWindow,
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        ChunkStrategy::Recursive
    }
}

impl ChunkStrategy {
    /// Strategy name injected into chunk metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStrategy::Recursive => "recursive",
            ChunkStrategy::LineBased => "line_based",
            ChunkStrategy::ErrorBoundary => "error_boundary",
            ChunkStrategy::TimestampWindow => "timestamp_window",
        }
    }
}

/// Deterministically partitions log text into position-tracked chunks
///
/// # Examples
///
/// ```
/// use logsift_chunker::{ChunkStrategy, LogChunker};
///
/// let chunker = LogChunker::new(200, 50, ChunkStrategy::LineBased);
/// let set = chunker
///     .chunk_log("INFO ready\nERROR boom\n", &Default::default())
///     .unwrap();
/// assert_eq!(set.original_size, 22);
/// ```
pub struct LogChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    strategy: ChunkStrategy,
    timestamp_interval_minutes: u32,
}

impl LogChunker {
    /// Create a chunker
    ///
    /// `chunk_size` bounds chunk content length in characters for the
    /// separator-driven strategies; `chunk_overlap` is the trailing window
    /// repeated between adjacent chunks. Parameters are validated on the
    /// first `chunk_log` call so the error can carry the input size.
    pub fn new(chunk_size: usize, chunk_overlap: usize, strategy: ChunkStrategy) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            strategy,
            timestamp_interval_minutes: DEFAULT_TIMESTAMP_INTERVAL_MINUTES,
        }
    }

    /// Override the timestamp-window interval
    pub fn with_timestamp_interval(mut self, minutes: u32) -> Self {
        self.timestamp_interval_minutes = minutes;
        self
    }

    /// The configured strategy
    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    /// Split `text` into a chunk set
    ///
    /// Empty text yields an empty set with zero sizes; this is not an error.
    /// `metadata` is merged into every emitted chunk, under the
    /// chunker-injected keys (`chunk_number`, `chunk_strategy`, and strategy
    /// extras).
    pub fn chunk_log(
        &self,
        text: &str,
        metadata: &ChunkMetadata,
    ) -> Result<ChunkSet, ChunkingError> {
        if text.is_empty() {
            return Ok(ChunkSet::empty());
        }

        self.validate(text.len())?;

        let set = match self.strategy {
            ChunkStrategy::Recursive => {
                self.chunk_with_separators(text, metadata, &["\n\n", "\n", " ", ""])
            }
            ChunkStrategy::LineBased => self.chunk_with_separators(text, metadata, &["\n"]),
            ChunkStrategy::ErrorBoundary => chunk_by_error_boundaries(text, metadata),
            ChunkStrategy::TimestampWindow => {
                chunk_by_timestamp_windows(text, metadata, self.timestamp_interval_minutes)
            }
        };

        info!(
            strategy = self.strategy.as_str(),
            chunks = set.len(),
            original_size = set.original_size,
            total_size = set.total_size,
            "chunked log"
        );

        Ok(set)
    }

    fn validate(&self, original_size: usize) -> Result<(), ChunkingError> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::new(
                original_size,
                "chunk_size must be greater than 0",
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ChunkingError::new(
                original_size,
                format!(
                    "chunk_overlap ({}) must be smaller than chunk_size ({})",
                    self.chunk_overlap, self.chunk_size
                ),
            ));
        }
        Ok(())
    }

    /// Separator-driven splitting plus position tracking
    ///
    /// Each emitted piece is located by forward search starting from the
    /// previous chunk's end minus the overlap amount. A failed search (the
    /// overlap trim can cause one) falls back to the running cursor, recorded
    /// as `position_fallback` in the chunk metadata.
    fn chunk_with_separators(
        &self,
        text: &str,
        metadata: &ChunkMetadata,
        separators: &[&str],
    ) -> ChunkSet {
        let splitter = RecursiveTextSplitter::new(separators, self.chunk_size, self.chunk_overlap);
        let pieces = splitter.split_text(text);

        let mut chunks = Vec::with_capacity(pieces.len());
        let mut cursor = 0usize;

        for (i, piece) in pieces.iter().enumerate() {
            let (start, fallback) = match text[cursor..].find(piece.as_str()) {
                Some(offset) => (cursor + offset, false),
                None => {
                    debug!(chunk_number = i + 1, cursor, "position search failed, using cursor");
                    (cursor, true)
                }
            };
            let end = start + piece.len();

            let mut chunk_metadata = metadata.clone();
            chunk_metadata.insert("chunk_number".to_string(), json!(i + 1));
            chunk_metadata.insert(
                "chunk_strategy".to_string(),
                json!(self.strategy.as_str()),
            );
            if fallback {
                chunk_metadata.insert("position_fallback".to_string(), json!(true));
            }

            chunks.push(Chunk::new(piece.clone(), start, end, chunk_metadata));

            // The next chunk may begin inside this one's overlap region
            cursor = if i > 0 {
                rewind_chars(text, end, self.chunk_overlap)
            } else {
                end
            };
        }

        ChunkSet::new(chunks, text.len())
    }
}

/// Byte offset `count` characters before `end`, clamped to the text start
///
/// The overlap is measured in characters while positions are byte offsets;
/// stepping back by raw bytes can land inside a multibyte codepoint.
fn rewind_chars(text: &str, end: usize, count: usize) -> usize {
    let end = end.min(text.len());
    if count == 0 {
        return end;
    }
    text[..end]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map_or(end, |(offset, _)| offset)
}
