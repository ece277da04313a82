//! The extraction orchestrator

use crate::config::ExtractorConfig;
use crate::error::{ChunkFailure, ExtractorError};
use logsift_chunker::LogChunker;
use logsift_domain::chunk::{Chunk, ChunkMetadata, ChunkSet};
use logsift_domain::progress::ChunkProgress;
use logsift_domain::traits::{ChunkAnalyzer, NullProgressSink, ProgressSink};
use logsift_domain::ChunkExtraction;
use logsift_ratelimit::RateLimiter;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Concurrency-bounded, order-preserving extraction over a chunk set
///
/// The orchestrator fans chunks out to the analyzer under two independent
/// gates: a semaphore bounding in-flight chunks and the shared [`RateLimiter`]
/// pacing model calls. Results come back in completion order and are re-sorted
/// by input position, so callers always see extractions aligned with their
/// chunks.
///
/// A failing chunk never abandons its siblings; the batch runs to completion
/// and reports all failures together with the successful extractions.
pub struct Extractor<A: ChunkAnalyzer> {
    analyzer: Arc<A>,
    rate_limiter: Arc<RateLimiter>,
    progress: Arc<dyn ProgressSink>,
    cancellation: CancellationToken,
    config: ExtractorConfig,
}

impl<A: ChunkAnalyzer> Clone for Extractor<A> {
    fn clone(&self) -> Self {
        Self {
            analyzer: Arc::clone(&self.analyzer),
            rate_limiter: Arc::clone(&self.rate_limiter),
            progress: Arc::clone(&self.progress),
            cancellation: self.cancellation.clone(),
            config: self.config.clone(),
        }
    }
}

impl<A: ChunkAnalyzer + 'static> Extractor<A> {
    /// Create an extractor over the given analyzer and rate limiter
    pub fn new(analyzer: A, rate_limiter: RateLimiter, config: ExtractorConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            rate_limiter: Arc::new(rate_limiter),
            progress: Arc::new(NullProgressSink),
            cancellation: CancellationToken::new(),
            config,
        }
    }

    /// Attach a progress sink; events for every chunk flow through it
    pub fn with_progress_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Arc::new(sink);
        self
    }

    /// Attach a cancellation token; cancelling it stops the batch between
    /// chunks and abandons in-flight model calls
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Process a single chunk through the rate limiter and the analyzer
    ///
    /// `index` is the chunk's 0-based input position and `total` the batch
    /// size; both are only used for progress events. Emits a processing event
    /// up front and exactly one completed or failed event afterwards.
    ///
    /// An analyzer answer of `Ok(None)` is substituted with
    /// [`ChunkExtraction::empty_for`]; the `chunk_id` of every returned
    /// extraction is overwritten with the input chunk's id.
    pub async fn extract_from_chunk(
        &self,
        chunk: &Chunk,
        index: usize,
        total: usize,
    ) -> Result<ChunkExtraction, ExtractorError> {
        self.progress
            .notify(ChunkProgress::processing(chunk.id, index + 1, total));

        let outcome = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => {
                self.progress
                    .notify(ChunkProgress::failed(chunk.id, index + 1, total, "cancelled"));
                return Err(ExtractorError::Cancelled);
            }
            outcome = async {
                self.rate_limiter.wait_for_permission(1).await;
                self.analyzer.analyze(chunk).await
            } => outcome,
        };

        match outcome {
            Ok(result) => {
                let mut extraction = match result {
                    Some(extraction) => extraction,
                    None => ChunkExtraction::empty_for(chunk.id),
                };
                // The analyzer's own id assignment is not trusted
                extraction.chunk_id = Some(chunk.id);

                debug!(
                    chunk_id = %chunk.id,
                    facts = extraction.fact_count(),
                    "chunk extraction completed"
                );
                self.progress.notify(ChunkProgress::completed(
                    chunk.id,
                    index + 1,
                    total,
                    extraction.exceptions.len(),
                    extraction.libraries.len(),
                    extraction.problematic_behaviors.len(),
                ));
                Ok(extraction)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(chunk_id = %chunk.id, reason = %reason, "chunk extraction failed");
                self.progress
                    .notify(ChunkProgress::failed(chunk.id, index + 1, total, reason.as_str()));
                Err(ExtractorError::Chunk {
                    chunk_id: chunk.id,
                    chunk_size: chunk.len(),
                    reason,
                })
            }
        }
    }

    /// Process every chunk of the set concurrently, preserving input order
    ///
    /// At most `max_concurrency` chunks are in flight at once. The batch runs
    /// to completion even when chunks fail; if any did, the result is
    /// [`ExtractorError::Batch`] carrying the failures and the extractions
    /// from the chunks that succeeded. An empty set completes immediately
    /// without touching the rate limiter or the progress sink.
    pub async fn extract_from_chunks(
        &self,
        chunk_set: &ChunkSet,
    ) -> Result<Vec<ChunkExtraction>, ExtractorError> {
        if chunk_set.is_empty() {
            return Ok(Vec::new());
        }

        let total = chunk_set.len();
        info!(
            chunks = total,
            max_concurrency = self.config.max_concurrency,
            "starting batch extraction"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut workers = JoinSet::new();

        for (index, chunk) in chunk_set.chunks.iter().cloned().enumerate() {
            let worker = self.clone();
            let permits = Arc::clone(&semaphore);
            workers.spawn(async move {
                // Never closed, so acquisition cannot fail
                let _permit = permits
                    .acquire_owned()
                    .await
                    .expect("extraction semaphore is never closed");
                let result = worker.extract_from_chunk(&chunk, index, total).await;
                (index, chunk.id, result)
            });
        }

        let mut successes: Vec<(usize, ChunkExtraction)> = Vec::with_capacity(total);
        let mut failures: Vec<ChunkFailure> = Vec::new();

        while let Some(joined) = workers.join_next().await {
            let (index, chunk_id, result) = match joined {
                Ok(entry) => entry,
                Err(e) => {
                    workers.abort_all();
                    return Err(ExtractorError::Join(e.to_string()));
                }
            };

            match result {
                Ok(extraction) => successes.push((index, extraction)),
                Err(ExtractorError::Cancelled) => {
                    workers.abort_all();
                    return Err(ExtractorError::Cancelled);
                }
                Err(e) => failures.push(ChunkFailure {
                    index,
                    chunk_id,
                    reason: e.to_string(),
                }),
            }
        }

        successes.sort_by_key(|(index, _)| *index);
        let partial: Vec<ChunkExtraction> =
            successes.into_iter().map(|(_, extraction)| extraction).collect();

        if failures.is_empty() {
            info!(chunks = total, "batch extraction completed");
            Ok(partial)
        } else {
            failures.sort_by_key(|f| f.index);
            warn!(
                failed = failures.len(),
                succeeded = partial.len(),
                "batch extraction completed with failures"
            );
            Err(ExtractorError::Batch { failures, partial })
        }
    }

    /// Chunk raw log text and extract from every chunk
    ///
    /// Convenience over [`LogChunker`] plus
    /// [`extract_from_chunks`](Self::extract_from_chunks), using the chunking
    /// parameters from the configuration. `metadata` is merged into every
    /// chunk before extraction.
    pub async fn extract_from_log(
        &self,
        text: &str,
        metadata: &ChunkMetadata,
    ) -> Result<Vec<ChunkExtraction>, ExtractorError> {
        let chunker = LogChunker::new(
            self.config.chunk_size,
            self.config.chunk_overlap,
            self.config.chunk_strategy,
        );
        let chunk_set = chunker.chunk_log(text, metadata)?;
        self.extract_from_chunks(&chunk_set).await
    }
}
