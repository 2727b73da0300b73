//! # Squircle — Request/Response DTOs
//!
//! All API contract types in one module.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros and enforced by
//!   the `ValidatedJson` extractor

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::entry::{DayEntry, Mood};

// ============================================================================
// Tag analysis
// ============================================================================

/// POST /api/analyze/tags
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TagAnalysisRequest {
    /// Diary entry text to analyze. Any length, including empty.
    pub text: String,

    /// ISO date (YYYY-MM-DD)
    pub date: NaiveDate,

    #[validate]
    #[serde(default)]
    pub mood: Option<Mood>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAnalysisResponse {
    pub tags: Vec<String>,
    /// Heuristic in [0, 1], derived from the tag count only
    pub confidence: f64,
}

impl TagAnalysisResponse {
    /// Result used whenever the model is unavailable or its output unusable.
    pub fn empty() -> Self {
        Self {
            tags: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// POST /api/analyze/batch
#[derive(Debug, Deserialize, Validate)]
pub struct BatchAnalysisRequest {
    #[validate]
    pub entries: Vec<DayEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchAnalysisResponse {
    /// All entries received, including those skipped for lacking notes
    pub processed: usize,
    pub tags_extracted: usize,
    pub success: bool,
    pub results: Vec<TagAnalysisResponse>,
}

// ============================================================================
// Summaries
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Which statistics the summary should lean on. Passed to the model as a hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFocus {
    Activities,
    Mood,
    Social,
    #[default]
    All,
}

impl fmt::Display for SummaryFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SummaryFocus::Activities => "activities",
            SummaryFocus::Mood => "mood",
            SummaryFocus::Social => "social",
            SummaryFocus::All => "all",
        };
        f.write_str(s)
    }
}

/// POST /api/summaries/generate
#[derive(Debug, Deserialize, Validate)]
pub struct SummaryRequest {
    pub date_range: DateRange,

    #[validate]
    pub entries: Vec<DayEntry>,

    #[serde(default)]
    pub focus: SummaryFocus,
}

/// Where the summary text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Model,
    Fallback,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub highlights: Vec<String>,
    pub source: SummarySource,
}

// ============================================================================
// System
// ============================================================================

/// GET /
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: &'static str,
    pub docs: &'static str,
}
