//! Logsift Extractor
//!
//! Orchestrates structured extraction over a set of log chunks.
//!
//! # Overview
//!
//! The Extractor fans chunks out to a [`ChunkAnalyzer`] implementation under
//! a concurrency bound and a shared rate limiter, collects results as they
//! complete, and hands them back sorted by input position. Per-chunk failures
//! never abandon the rest of the batch; they are aggregated into a single
//! error alongside every successful extraction.
//!
//! # Architecture
//!
//! ```text
//! Log text → LogChunker → ChunkSet → Extractor ⇉ ChunkAnalyzer → ChunkExtraction
//!                                        │
//!                                        ├─ Semaphore (max_concurrency)
//!                                        ├─ RateLimiter (rpm/tpm)
//!                                        └─ ProgressSink (per-chunk events)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use async_trait::async_trait;
//! use logsift_domain::chunk::Chunk;
//! use logsift_domain::traits::ChunkAnalyzer;
//! use logsift_domain::ChunkExtraction;
//! use logsift_extractor::{Extractor, ExtractorConfig};
//! use logsift_ratelimit::{RateLimitConfig, RateLimiter};
//!
//! struct NoopAnalyzer;
//!
//! #[async_trait]
//! impl ChunkAnalyzer for NoopAnalyzer {
//!     type Error = String;
//!
//!     async fn analyze(&self, _chunk: &Chunk) -> Result<Option<ChunkExtraction>, String> {
//!         Ok(None)
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let limiter = RateLimiter::new(RateLimitConfig {
//!     rpm_limit: Some(60),
//!     ..Default::default()
//! });
//! let extractor = Extractor::new(NoopAnalyzer, limiter, ExtractorConfig::default());
//!
//! let results = extractor
//!     .extract_from_log("ERROR connection refused\n", &Default::default())
//!     .await?;
//! println!("extracted from {} chunks", results.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`ChunkAnalyzer`]: logsift_domain::traits::ChunkAnalyzer

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod extractor;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::{ChunkFailure, ExtractorError};
pub use extractor::Extractor;
