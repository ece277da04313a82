//! Logsift Domain Layer
//!
//! This crate contains the core data model for the logsift segment-processing
//! pipeline. It defines the fundamental value objects and trait interfaces that
//! all other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Chunk**: a bounded slice of the input log with its recorded position in
//!   the original text
//! - **ChunkSet**: the ordered, read-only output of a chunking pass
//! - **ChunkExtraction**: the structured facts an external model pulled out of
//!   one chunk (exceptions, library references, problematic behaviors)
//! - **ChunkProgress**: self-describing progress events pushed to a sink while
//!   a batch is in flight
//!
//! ## Architecture
//!
//! Infrastructure stays out of this crate: the model call lives behind the
//! [`traits::ChunkAnalyzer`] seam and progress consumers behind
//! [`traits::ProgressSink`]. Implementations live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod extraction;
pub mod progress;
pub mod traits;

// Re-exports for convenience
pub use chunk::{Chunk, ChunkId, ChunkSet};
pub use extraction::{
    ChunkExtraction, ExceptionInfo, LibraryReference, ProblematicBehavior, Severity,
};
pub use progress::{ChunkProgress, ChunkStatus};
