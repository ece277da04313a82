//! Chunk module - the unit of work for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a chunk based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability, so ids created by one chunking pass sort in
///   emission order
/// - 128-bit uniqueness with no coordination between concurrent workers
/// - RFC 9562-standard format with broad ecosystem support
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChunkId(uuid::Uuid);

impl ChunkId {
    /// Generate a new UUIDv7-based ChunkId
    ///
    /// # Examples
    ///
    /// ```
    /// use logsift_domain::ChunkId;
    ///
    /// let a = ChunkId::new();
    /// let b = ChunkId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a ChunkId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid UUID string: {}", e))
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata map attached to every chunk
///
/// A BTreeMap keeps key iteration deterministic, which matters for
/// reproducible chunking output.
pub type ChunkMetadata = BTreeMap<String, serde_json::Value>;

/// A bounded slice of the input log with its position in the original text
///
/// Invariant: `start_index < end_index`, and `content` equals
/// `&original[start_index..end_index]` whenever the chunker could relocate the
/// emitted text in the source. When relocation fails (overlap trimming can
/// cause this), the chunker falls back to its running cursor and records
/// `"position_fallback": true` in the metadata so the degradation is
/// observable.
///
/// Chunks are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier
    pub id: ChunkId,

    /// The chunk text
    pub content: String,

    /// Byte offset of the chunk start in the original text
    pub start_index: usize,

    /// Byte offset one past the chunk end in the original text
    pub end_index: usize,

    /// Caller metadata merged with chunker-injected keys
    /// (`chunk_number`, `chunk_strategy`, strategy extras)
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk with a fresh id
    pub fn new(
        content: impl Into<String>,
        start_index: usize,
        end_index: usize,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            id: ChunkId::new(),
            content: content.into(),
            start_index,
            end_index,
            metadata,
        }
    }

    /// Length of the chunk content in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the chunk content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether the chunker had to fall back to a best-effort position
    pub fn position_is_fallback(&self) -> bool {
        self.metadata
            .get("position_fallback")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// The ordered, read-only result of one chunking pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkSet {
    /// Chunks in emission order
    pub chunks: Vec<Chunk>,

    /// Sum of chunk content lengths (overlap is double-counted)
    pub total_size: usize,

    /// Length of the original text in bytes
    pub original_size: usize,
}

impl ChunkSet {
    /// Build a chunk set, computing `total_size` from the chunks
    pub fn new(chunks: Vec<Chunk>, original_size: usize) -> Self {
        let total_size = chunks.iter().map(Chunk::len).sum();
        Self {
            chunks,
            total_size,
            original_size,
        }
    }

    /// The empty chunk set produced for empty input
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the set holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
