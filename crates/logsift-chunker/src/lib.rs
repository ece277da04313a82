//! Logsift Chunker
//!
//! Deterministically partitions large log text into bounded, possibly
//! overlapping segments with exact positions into the original text,
//! preferring semantically meaningful split points.
//!
//! # Strategies
//!
//! - **Recursive** (default): paragraph breaks, then line breaks, then
//!   spaces, then a hard character cut; a finer separator is only used for
//!   pieces the coarser one left over the size bound, so a single log line is
//!   never cut when a coarser boundary suffices
//! - **LineBased**: line breaks only
//! - **ErrorBoundary**: groups each error/exception incident with its leading
//!   context
//! - **TimestampWindow**: groups consecutive lines into fixed time windows
//!
//! # Position tracking
//!
//! Every chunk records where its content sits in the original text. When the
//! overlap trim makes an emitted piece impossible to relocate, the chunker
//! falls back to its running cursor and flags the chunk with
//! `position_fallback` metadata rather than hiding the degradation.
//!
//! # Examples
//!
//! ```
//! use logsift_chunker::{ChunkStrategy, LogChunker};
//!
//! let chunker = LogChunker::new(4000, 200, ChunkStrategy::Recursive);
//! let set = chunker
//!     .chunk_log("INFO started\nERROR connection refused\n", &Default::default())
//!     .unwrap();
//!
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.original_size, 38);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod chunker;
mod error;
mod splitter;
mod strategies;

pub use chunker::{ChunkStrategy, LogChunker, DEFAULT_TIMESTAMP_INTERVAL_MINUTES};
pub use error::ChunkingError;
pub use strategies::ERROR_KEYWORDS;
