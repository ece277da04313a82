//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{Extractor, ExtractorConfig, ExtractorError};
    use async_trait::async_trait;
    use logsift_chunker::ChunkStrategy;
    use logsift_domain::chunk::{Chunk, ChunkMetadata, ChunkSet};
    use logsift_domain::extraction::EMPTY_RESULT_SUMMARY;
    use logsift_domain::progress::{ChunkProgress, ChunkStatus};
    use logsift_domain::traits::{ChunkAnalyzer, ProgressSink};
    use logsift_domain::{ChunkExtraction, ChunkId};
    use logsift_ratelimit::{RateLimitConfig, RateLimiter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Analyzer scripted through chunk content:
    /// - a `N:` prefix sleeps N milliseconds before answering
    /// - content containing `fail` errors out
    /// - content containing `nothing` answers `Ok(None)`
    /// - content containing `forged-id` answers with a wrong chunk id
    /// - anything else succeeds with the content echoed as the summary
    #[derive(Clone, Default)]
    struct MockAnalyzer {
        calls: Arc<AtomicUsize>,
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChunkAnalyzer for MockAnalyzer {
        type Error = String;

        async fn analyze(&self, chunk: &Chunk) -> Result<Option<ChunkExtraction>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);

            if let Some((prefix, _)) = chunk.content.split_once(':') {
                if let Ok(ms) = prefix.parse::<u64>() {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                }
            }

            self.active.fetch_sub(1, Ordering::SeqCst);

            if chunk.content.contains("fail") {
                return Err(format!("model refused: {}", chunk.content));
            }
            if chunk.content.contains("nothing") {
                return Ok(None);
            }

            let chunk_id = if chunk.content.contains("forged-id") {
                Some(ChunkId::new())
            } else {
                None
            };
            Ok(Some(ChunkExtraction {
                chunk_id,
                exceptions: Vec::new(),
                libraries: Vec::new(),
                problematic_behaviors: Vec::new(),
                summary: chunk.content.clone(),
            }))
        }
    }

    /// Sink that records every event for later inspection
    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<ChunkProgress>>>);

    impl ProgressSink for RecordingSink {
        fn notify(&self, progress: ChunkProgress) {
            self.0.lock().unwrap().push(progress);
        }
    }

    impl RecordingSink {
        fn events(&self) -> Vec<ChunkProgress> {
            self.0.lock().unwrap().clone()
        }
    }

    fn chunk_set(contents: &[&str]) -> ChunkSet {
        let mut chunks = Vec::new();
        let mut start = 0;
        for content in contents {
            let end = start + content.len();
            chunks.push(Chunk::new(*content, start, end, ChunkMetadata::new()));
            start = end;
        }
        ChunkSet::new(chunks, start)
    }

    fn extractor(analyzer: MockAnalyzer, max_concurrency: usize) -> Extractor<MockAnalyzer> {
        Extractor::new(
            analyzer,
            RateLimiter::disabled(),
            ExtractorConfig {
                max_concurrency,
                ..Default::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_preserve_input_order() {
        // The slowest chunks come first, so completion order is reversed
        let set = chunk_set(&["50:alpha", "40:beta", "30:gamma", "20:delta", "10:epsilon"]);
        let extractor = extractor(MockAnalyzer::default(), 5);

        let results = extractor.extract_from_chunks(&set).await.unwrap();

        let summaries: Vec<&str> = results.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["50:alpha", "40:beta", "30:gamma", "20:delta", "10:epsilon"]
        );
        for (chunk, result) in set.chunks.iter().zip(&results) {
            assert_eq!(result.chunk_id, Some(chunk.id));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bound_is_respected() {
        let contents: Vec<String> = (0..10).map(|i| format!("10:chunk-{i}")).collect();
        let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
        let set = chunk_set(&refs);

        let analyzer = MockAnalyzer::default();
        let extractor = extractor(analyzer.clone(), 3);

        extractor.extract_from_chunks(&set).await.unwrap();

        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 10);
        assert_eq!(analyzer.max_active.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_set_completes_without_side_effects() {
        let analyzer = MockAnalyzer::default();
        let sink = RecordingSink::default();
        let extractor = extractor(analyzer.clone(), 5).with_progress_sink(sink.clone());

        let results = extractor.extract_from_chunks(&ChunkSet::empty()).await.unwrap();

        assert!(results.is_empty());
        assert!(sink.events().is_empty());
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_aggregates_both_sides() {
        let set = chunk_set(&["alpha", "fail-beta", "gamma", "delta"]);
        let extractor = extractor(MockAnalyzer::default(), 2);

        let err = extractor.extract_from_chunks(&set).await.unwrap_err();
        match err {
            ExtractorError::Batch { failures, partial } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].index, 1);
                assert_eq!(failures[0].chunk_id, set.chunks[1].id);
                assert!(failures[0].reason.contains("model refused: fail-beta"));

                let summaries: Vec<&str> = partial.iter().map(|r| r.summary.as_str()).collect();
                assert_eq!(summaries, vec!["alpha", "gamma", "delta"]);
            }
            other => panic!("expected Batch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_failures_leave_no_partial() {
        let set = chunk_set(&["fail-a", "fail-b"]);
        let extractor = extractor(MockAnalyzer::default(), 2);

        let err = extractor.extract_from_chunks(&set).await.unwrap_err();
        match err {
            ExtractorError::Batch { failures, partial } => {
                assert_eq!(failures.len(), 2);
                assert!(partial.is_empty());
                assert_eq!(failures[0].index, 0);
                assert_eq!(failures[1].index, 1);
            }
            other => panic!("expected Batch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_model_answer_becomes_empty_extraction() {
        let set = chunk_set(&["nothing in this one"]);
        let extractor = extractor(MockAnalyzer::default(), 1);

        let extraction = extractor
            .extract_from_chunk(&set.chunks[0], 0, 1)
            .await
            .unwrap();

        assert_eq!(extraction.chunk_id, Some(set.chunks[0].id));
        assert_eq!(extraction.fact_count(), 0);
        assert_eq!(extraction.summary, EMPTY_RESULT_SUMMARY);
    }

    #[tokio::test]
    async fn test_analyzer_chunk_id_is_overwritten() {
        let set = chunk_set(&["forged-id payload"]);
        let extractor = extractor(MockAnalyzer::default(), 1);

        let extraction = extractor
            .extract_from_chunk(&set.chunks[0], 0, 1)
            .await
            .unwrap();

        assert_eq!(extraction.chunk_id, Some(set.chunks[0].id));
    }

    #[tokio::test]
    async fn test_progress_events_for_one_chunk() {
        let set = chunk_set(&["alpha"]);
        let sink = RecordingSink::default();
        let extractor = extractor(MockAnalyzer::default(), 1).with_progress_sink(sink.clone());

        extractor
            .extract_from_chunk(&set.chunks[0], 0, 1)
            .await
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].status, ChunkStatus::Processing));
        assert!(matches!(events[1].status, ChunkStatus::Completed { .. }));
        assert_eq!(events[0].chunk_id, set.chunks[0].id);
        assert_eq!(events[1].percentage(), 100.0);
    }

    #[tokio::test]
    async fn test_progress_percentages_across_a_batch() {
        let set = chunk_set(&["alpha", "beta"]);
        let sink = RecordingSink::default();
        let extractor = extractor(MockAnalyzer::default(), 1).with_progress_sink(sink.clone());

        extractor.extract_from_chunks(&set).await.unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 4);

        let mut completed: Vec<f64> = events
            .iter()
            .filter(|e| matches!(e.status, ChunkStatus::Completed { .. }))
            .map(ChunkProgress::percentage)
            .collect();
        completed.sort_by(f64::total_cmp);
        assert_eq!(completed, vec![50.0, 100.0]);
    }

    #[tokio::test]
    async fn test_failed_chunk_emits_failed_event() {
        let set = chunk_set(&["fail-me"]);
        let sink = RecordingSink::default();
        let extractor = extractor(MockAnalyzer::default(), 1).with_progress_sink(sink.clone());

        let err = extractor
            .extract_from_chunk(&set.chunks[0], 0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Chunk { .. }));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        match &events[1].status {
            ChunkStatus::Failed { reason } => assert!(reason.contains("model refused")),
            other => panic!("expected Failed status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_batch() {
        let set = chunk_set(&["alpha", "beta", "gamma"]);
        let token = CancellationToken::new();
        token.cancel();

        let extractor = extractor(MockAnalyzer::default(), 2).with_cancellation(token);

        let err = extractor.extract_from_chunks(&set).await.unwrap_err();
        assert!(matches!(err, ExtractorError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_paces_the_batch() {
        // Burst of 1 at 60 rpm: the second chunk has to wait about a second
        // of simulated time for the bucket to refill
        let set = chunk_set(&["alpha", "beta"]);
        let limiter = RateLimiter::new(RateLimitConfig {
            rpm_limit: Some(60),
            burst_size: 1,
            ..Default::default()
        });
        let extractor = Extractor::new(
            MockAnalyzer::default(),
            limiter,
            ExtractorConfig {
                max_concurrency: 2,
                ..Default::default()
            },
        );

        let started = tokio::time::Instant::now();
        let results = extractor.extract_from_chunks(&set).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_extract_from_log_end_to_end() {
        let text = "INFO started\nERROR connection refused";
        let extractor = Extractor::new(
            MockAnalyzer::default(),
            RateLimiter::disabled(),
            ExtractorConfig {
                max_concurrency: 2,
                chunk_size: 1000,
                chunk_overlap: 0,
                chunk_strategy: ChunkStrategy::Recursive,
            },
        );

        let results = extractor
            .extract_from_log(text, &ChunkMetadata::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].summary, text);
        assert!(results[0].chunk_id.is_some());
    }

    #[tokio::test]
    async fn test_extract_from_log_empty_text() {
        let extractor = extractor(MockAnalyzer::default(), 2);
        let results = extractor
            .extract_from_log("", &ChunkMetadata::new())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_extract_from_log_rejects_bad_chunk_params() {
        let extractor = Extractor::new(
            MockAnalyzer::default(),
            RateLimiter::disabled(),
            ExtractorConfig {
                max_concurrency: 2,
                chunk_size: 10,
                chunk_overlap: 10,
                chunk_strategy: ChunkStrategy::Recursive,
            },
        );

        let err = extractor
            .extract_from_log("some log text", &ChunkMetadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Chunking(_)));
    }
}
