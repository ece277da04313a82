//! Extraction payload types
//!
//! These model the structured facts an external model reports for one chunk.
//! The pipeline treats the payload as opaque apart from `chunk_id`, which the
//! orchestrator always overwrites after the call; the field shapes here exist
//! so that model output can be deserialized strictly once, with the known
//! sloppy spots (stack traces as lists, non-canonical severities) normalized
//! at the boundary instead of leaking into consumers.

use crate::chunk::ChunkId;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};

/// Summary text used when the model legitimately returns nothing
///
/// An empty model response is a normal, reportable outcome for a chunk, not a
/// failure; the orchestrator substitutes [`ChunkExtraction::empty_for`].
pub const EMPTY_RESULT_SUMMARY: &str = "model returned an empty result; nothing extracted";

/// Severity scale shared by exceptions and problematic behaviors
///
/// Models occasionally answer with log-level vocabulary instead; `"warning"`
/// and `"info"` deserialize as [`Severity::Low`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or informational
    Low,
    /// Worth a look
    Medium,
    /// Likely user-visible impact
    High,
    /// Outage-grade
    Critical,
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "low" | "warning" | "info" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(D::Error::custom(format!("unknown severity '{}'", other))),
        }
    }
}

/// An exception or error occurrence extracted from a chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// Exception type, e.g. `ConnectionError`
    #[serde(rename = "type")]
    pub kind: String,

    /// Exception message
    pub message: String,

    /// Stack trace, if the log carried one. A trace arriving as a JSON list
    /// of frames is joined with newlines at deserialization.
    #[serde(default, deserialize_with = "string_or_lines")]
    pub stack_trace: Option<String>,

    /// How many times this exception was seen in the chunk
    #[serde(default = "default_occurrence_count")]
    pub occurrence_count: u32,

    /// Assessed severity, if the model provided one
    #[serde(default)]
    pub severity: Option<Severity>,
}

fn default_occurrence_count() -> u32 {
    1
}

/// A library or framework reference extracted from a chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryReference {
    /// Library name
    pub name: String,

    /// Version string, if present in the log
    #[serde(default)]
    pub version: Option<String>,

    /// The log line or phrase the reference came from
    #[serde(default)]
    pub context: Option<String>,

    /// Filesystem path the library was loaded from
    #[serde(default)]
    pub path: Option<String>,

    /// Library kind (mod, framework, library, ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Where the reference information came from
    #[serde(default)]
    pub source: Option<String>,
}

/// A potentially problematic behavior identified in a chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblematicBehavior {
    /// Problem category (database, network, memory, performance, ...)
    #[serde(default)]
    pub category: Option<String>,

    /// What is going wrong
    pub description: String,

    /// Assessed severity; defaults to medium when the model omits it
    #[serde(default = "default_behavior_severity")]
    pub severity: Severity,

    /// Additional detail, if any
    #[serde(default)]
    pub details: Option<String>,

    /// Surrounding context, if any
    #[serde(default)]
    pub context: Option<String>,

    /// The log lines the behavior was observed in
    #[serde(default)]
    pub occurrences: Vec<String>,
}

fn default_behavior_severity() -> Severity {
    Severity::Medium
}

/// Everything extracted from a single chunk
///
/// `chunk_id` may be absent or wrong in raw model output; the orchestrator
/// overwrites it with the input chunk's id unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkExtraction {
    /// Id of the chunk this extraction belongs to
    #[serde(default)]
    pub chunk_id: Option<ChunkId>,

    /// Exceptions found in the chunk
    #[serde(default)]
    pub exceptions: Vec<ExceptionInfo>,

    /// Library references found in the chunk
    #[serde(default)]
    pub libraries: Vec<LibraryReference>,

    /// Problematic behaviors found in the chunk
    #[serde(default)]
    pub problematic_behaviors: Vec<ProblematicBehavior>,

    /// One-paragraph summary of the chunk
    pub summary: String,
}

impl ChunkExtraction {
    /// The well-defined substitute for a chunk the model had nothing to say
    /// about: empty fact lists and a sentinel summary
    pub fn empty_for(chunk_id: ChunkId) -> Self {
        Self {
            chunk_id: Some(chunk_id),
            exceptions: Vec::new(),
            libraries: Vec::new(),
            problematic_behaviors: Vec::new(),
            summary: EMPTY_RESULT_SUMMARY.to_string(),
        }
    }

    /// Total number of extracted facts across all three lists
    pub fn fact_count(&self) -> usize {
        self.exceptions.len() + self.libraries.len() + self.problematic_behaviors.len()
    }
}

/// Accept either a plain string or a list of lines for a trace field
fn string_or_lines<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrLines {
        One(String),
        Many(Vec<String>),
    }

    let value = Option::<StringOrLines>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrLines::One(s) => s,
        StringOrLines::Many(lines) => lines.join("\n"),
    }))
}
