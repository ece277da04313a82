//! Incident- and time-oriented chunking strategies
//!
//! Unlike the separator-driven strategies, these two work on whole lines and
//! emit chunks whose content is a contiguous run of input lines; positions are
//! exact line offsets, so the substring invariant holds by construction, and
//! the size bound is deliberately not applied.

use chrono::NaiveDateTime;
use logsift_domain::chunk::{Chunk, ChunkMetadata, ChunkSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

/// Keyword markers treated as the start of a new incident
pub const ERROR_KEYWORDS: [&str; 5] = ["ERROR", "CRITICAL", "FATAL", "Exception", "Traceback"];

static TIMESTAMP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // ISO: 2024-01-01 10:00:00 or 2024-01-01T10:00:00
        r"\d{4}-\d{2}-\d{2}[\sT]\d{2}:\d{2}:\d{2}",
        // MM/DD/YYYY
        r"\d{2}/\d{2}/\d{4}\s\d{2}:\d{2}:\d{2}",
        // YYYY/MM/DD
        r"\d{4}/\d{2}/\d{2}\s\d{2}:\d{2}:\d{2}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("timestamp pattern is valid"))
    .collect()
});

/// A line of the input together with its byte offset
struct LineSpan<'a> {
    start: usize,
    text: &'a str,
}

fn line_spans(text: &str) -> Vec<LineSpan<'_>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in text.split('\n') {
        spans.push(LineSpan { start, text: line });
        start += line.len() + 1;
    }
    spans
}

/// Accumulates contiguous lines into one chunk and seals them on demand
struct LineChunkBuilder<'a> {
    lines: Vec<&'a str>,
    start: usize,
    chunk_number: usize,
}

impl<'a> LineChunkBuilder<'a> {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            start: 0,
            chunk_number: 0,
        }
    }

    fn push(&mut self, span: &LineSpan<'a>) {
        if self.lines.is_empty() {
            self.start = span.start;
        }
        self.lines.push(span.text);
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Seal the accumulated lines into a chunk; `extra` holds the
    /// strategy-specific metadata for this chunk
    fn seal(&mut self, base: &ChunkMetadata, strategy: &str, extra: ChunkMetadata) -> Chunk {
        self.chunk_number += 1;
        let content = self.lines.join("\n");
        let end = self.start + content.len();

        let mut metadata = base.clone();
        metadata.insert("chunk_number".to_string(), json!(self.chunk_number));
        metadata.insert("chunk_strategy".to_string(), json!(strategy));
        metadata.extend(extra);

        let chunk = Chunk::new(content, self.start, end, metadata);
        self.lines.clear();
        chunk
    }
}

/// Start a new chunk whenever an error keyword line is seen and the current
/// chunk already contains one, so each incident stays grouped with its
/// leading context
pub(crate) fn chunk_by_error_boundaries(text: &str, base: &ChunkMetadata) -> ChunkSet {
    let mut chunks = Vec::new();
    let mut builder = LineChunkBuilder::new();
    let mut contains_error = false;

    for span in line_spans(text) {
        let is_error_line = ERROR_KEYWORDS.iter().any(|k| span.text.contains(k));

        if is_error_line && contains_error && !builder.is_empty() {
            let mut extra = ChunkMetadata::new();
            extra.insert("contains_error".to_string(), json!(true));
            extra.insert("error_boundary".to_string(), json!(true));
            chunks.push(builder.seal(base, "error_boundary", extra));
            contains_error = false;
        }

        builder.push(&span);
        if is_error_line {
            contains_error = true;
        }
    }

    if !builder.is_empty() {
        let mut extra = ChunkMetadata::new();
        extra.insert("contains_error".to_string(), json!(contains_error));
        extra.insert("error_boundary".to_string(), json!(contains_error));
        chunks.push(builder.seal(base, "error_boundary", extra));
    }

    ChunkSet::new(chunks, text.len())
}

/// Group consecutive lines whose recognized timestamp falls within
/// `interval_minutes` of the window's start; lines without a recognized
/// timestamp attach to the current window
pub(crate) fn chunk_by_timestamp_windows(
    text: &str,
    base: &ChunkMetadata,
    interval_minutes: u32,
) -> ChunkSet {
    let interval = chrono::Duration::minutes(i64::from(interval_minutes));
    let mut chunks = Vec::new();
    let mut builder = LineChunkBuilder::new();
    let mut window_start: Option<NaiveDateTime> = None;

    let seal_extra = |start: Option<NaiveDateTime>| {
        let mut extra = ChunkMetadata::new();
        extra.insert("time_interval_minutes".to_string(), json!(interval_minutes));
        extra.insert(
            "window_start".to_string(),
            match start {
                Some(ts) => json!(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
                None => serde_json::Value::Null,
            },
        );
        extra
    };

    for span in line_spans(text) {
        if let Some(timestamp) = extract_timestamp(span.text) {
            match window_start {
                None => window_start = Some(timestamp),
                Some(start) if timestamp - start >= interval => {
                    if !builder.is_empty() {
                        chunks.push(builder.seal(base, "timestamp_window", seal_extra(Some(start))));
                    }
                    window_start = Some(timestamp);
                }
                Some(_) => {}
            }
        }
        builder.push(&span);
    }

    if !builder.is_empty() {
        chunks.push(builder.seal(base, "timestamp_window", seal_extra(window_start)));
    }

    ChunkSet::new(chunks, text.len())
}

/// Pull the first recognizable timestamp out of a log line
fn extract_timestamp(line: &str) -> Option<NaiveDateTime> {
    for pattern in TIMESTAMP_PATTERNS.iter() {
        if let Some(m) = pattern.find(line) {
            let normalized = m.as_str().replace('T', " ");
            for format in ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
                if let Ok(ts) = NaiveDateTime::parse_from_str(&normalized, format) {
                    return Some(ts);
                }
            }
        }
    }
    None
}
