use indexmap::IndexSet;
use serde_json::Value;

use crate::dto::{BatchAnalysisResponse, TagAnalysisRequest, TagAnalysisResponse};
use crate::models::entry::DayEntry;
use crate::services::llm::{GenerationOptions, LlmError, TextGenerator};
use crate::services::prompts::{tag_extraction_prompt, TAG_EXTRACTION_SYSTEM_PROMPT};

const TAG_TEMPERATURE: f32 = 0.3;
const TAG_MAX_TOKENS: u32 = 200;

const CONFIDENCE_FLOOR: f64 = 0.7;
const CONFIDENCE_PER_TAG: f64 = 0.05;
const CONFIDENCE_CAP: f64 = 0.95;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error("model output is not valid JSON: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionOptions {
    /// Map synonyms onto canonical tags before scoring.
    pub canonicalize: bool,
}

/// Never fails: provider errors and unusable output yield an empty result.
pub async fn extract_tags(
    llm: &dyn TextGenerator,
    request: &TagAnalysisRequest,
    options: ExtractionOptions,
) -> TagAnalysisResponse {
    match try_extract_tags(llm, request, options).await {
        Ok(response) => response,
        Err(ExtractionError::MalformedOutput(e)) => {
            tracing::warn!(error = %e, date = %request.date, "Model returned unparseable tags");
            TagAnalysisResponse::empty()
        }
        Err(e) => {
            tracing::warn!(error = %e, date = %request.date, "Tag extraction failed");
            TagAnalysisResponse::empty()
        }
    }
}

pub async fn try_extract_tags(
    llm: &dyn TextGenerator,
    request: &TagAnalysisRequest,
    options: ExtractionOptions,
) -> Result<TagAnalysisResponse, ExtractionError> {
    let prompt = tag_extraction_prompt(request.date, request.mood.as_ref(), &request.text);
    let raw = llm
        .generate(
            &prompt,
            Some(TAG_EXTRACTION_SYSTEM_PROMPT),
            GenerationOptions::new(TAG_TEMPERATURE, TAG_MAX_TOKENS),
        )
        .await?;

    let mut tags = parse_tags(&raw)?;
    if options.canonicalize {
        tags = canonicalize_tags(&tags);
    }

    Ok(TagAnalysisResponse {
        confidence: confidence_for(tags.len()),
        tags,
    })
}

/// Runs extraction for each entry that has notes, one after another.
pub async fn extract_batch(
    llm: &dyn TextGenerator,
    entries: &[DayEntry],
    options: ExtractionOptions,
) -> BatchAnalysisResponse {
    let mut results = Vec::new();
    let mut tags_extracted = 0;

    for entry in entries {
        let Some(notes) = entry.journal_text() else {
            continue;
        };
        let request = TagAnalysisRequest {
            text: notes.to_string(),
            date: entry.date,
            mood: entry.mood.clone(),
        };
        let result = extract_tags(llm, &request, options).await;
        tags_extracted += result.tags.len();
        results.push(result);
    }

    tracing::info!(
        processed = entries.len(),
        analyzed = results.len(),
        tags_extracted,
        "Batch tag analysis complete"
    );

    BatchAnalysisResponse {
        processed: entries.len(),
        tags_extracted,
        success: true,
        results,
    }
}

/// Tolerant parse of the model's tag list into clean, unique, lowercase tags.
pub fn parse_tags(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let text = strip_code_fence(raw.trim());
    let value: Value = serde_json::from_str(&text)?;

    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    let cleaned = items
        .iter()
        .filter(|item| is_truthy(item))
        .map(|item| tag_text(item).to_lowercase().trim().to_string())
        .filter(|tag| !tag.is_empty());

    Ok(dedup_preserving_order(cleaned))
}

/// More tags read as a more confident extraction, capped below certainty.
/// A parsed but empty list still scores the floor.
pub fn confidence_for(tag_count: usize) -> f64 {
    (CONFIDENCE_FLOOR + CONFIDENCE_PER_TAG * tag_count as f64).min(CONFIDENCE_CAP)
}

/// Maps known synonyms onto one canonical tag.
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.to_lowercase();
    let canonical = match tag.as_str() {
        "workout" | "cardio" => "exercise",
        "gym workout" | "weight training" => "gym",
        "running" | "jogging" => "run",
        "breakfast" | "lunch" | "dinner" => "meal",
        _ => return tag,
    };
    canonical.to_string()
}

pub fn canonicalize_tags(tags: &[String]) -> Vec<String> {
    dedup_preserving_order(tags.iter().map(|t| normalize_tag(t)))
}

/// A fenced reply loses its opening and closing lines.
fn strip_code_fence(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn tag_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn dedup_preserving_order<I: IntoIterator<Item = String>>(tags: I) -> Vec<String> {
    tags.into_iter().collect::<IndexSet<String>>().into_iter().collect()
}
