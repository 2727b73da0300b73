use crate::dto::{SummaryRequest, SummaryResponse, SummarySource};
use crate::models::entry::DayEntry;
use crate::services::llm::{GenerationOptions, LlmError, TextGenerator};
use crate::services::prompts::{summary_prompt, SUMMARY_SYSTEM_PROMPT};
use crate::services::stats::{aggregate, EntryStats};

const SUMMARY_SAMPLE_LIMIT: usize = 5;
const SUMMARY_TEMPERATURE: f32 = 0.7;
const SUMMARY_MAX_TOKENS: u32 = 500;

/// Never fails: when the model is unavailable a templated summary is used.
pub async fn generate_summary(
    llm: &dyn TextGenerator,
    request: &SummaryRequest,
) -> SummaryResponse {
    let stats = aggregate(&request.entries, SUMMARY_SAMPLE_LIMIT);
    let highlights = highlights(&stats, &request.entries);

    match request_narrative(llm, request, &stats).await {
        Ok(summary) => SummaryResponse {
            summary,
            highlights,
            source: SummarySource::Model,
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                entries = request.entries.len(),
                "Summary generation unavailable, using fallback"
            );
            SummaryResponse {
                summary: fallback_summary(request),
                highlights,
                source: SummarySource::Fallback,
            }
        }
    }
}

async fn request_narrative(
    llm: &dyn TextGenerator,
    request: &SummaryRequest,
    stats: &EntryStats<'_>,
) -> Result<String, LlmError> {
    let prompt = summary_prompt(request, stats);
    let text = llm
        .generate(
            &prompt,
            Some(SUMMARY_SYSTEM_PROMPT),
            GenerationOptions::new(SUMMARY_TEMPERATURE, SUMMARY_MAX_TOKENS),
        )
        .await?;
    Ok(text.trim().to_string())
}

pub fn fallback_summary(request: &SummaryRequest) -> String {
    format!(
        "You tracked {} days between {} and {}.",
        request.entries.len(),
        request.date_range.start,
        request.date_range.end
    )
}

/// Deterministic facts shown next to the narrative, in a fixed order.
pub fn highlights(stats: &EntryStats<'_>, entries: &[DayEntry]) -> Vec<String> {
    let mut highlights = Vec::new();

    if let Some((tag, count)) = stats.tags.top() {
        highlights.push(format!("Most common activity: {} ({} times)", tag, count));
    }
    if let Some((mood, count)) = stats.moods.top() {
        highlights.push(format!("Most frequent mood: {} ({} times)", mood, count));
    }

    highlights.push(format!("Total days tracked: {}", entries.len()));

    let journal_days = entries.iter().filter(|e| e.journal_text().is_some()).count();
    if journal_days > 0 {
        highlights.push(format!("Days with journal entries: {}", journal_days));
    }

    highlights
}
