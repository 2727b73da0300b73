//! Prompt templates. Every builder is a pure function of its inputs.

use chrono::NaiveDate;

use crate::dto::SummaryRequest;
use crate::models::entry::Mood;
use crate::services::stats::{EntryStats, FrequencyTable};

pub const TOP_TAGS_IN_SUMMARY: usize = 10;
pub const TOP_MOODS_IN_SUMMARY: usize = 5;
const SAMPLE_PREVIEW_CHARS: usize = 100;

pub const TAG_EXTRACTION_SYSTEM_PROMPT: &str = r#"You analyze diary entries and extract structured tags from them.

Tags should capture:
- Activities (gym, running, work, cooking, reading, etc.)
- People (friends, family, specific names if mentioned)
- Places (home, office, park, restaurant, gym, etc.)
- Time context (morning, evening, afternoon, night, after work)
- Emotions or feelings when explicitly mentioned
- Specific details (chest day, leg day, cardio, weights, etc.)

Rules:
1. Use lowercase for every tag
2. Be specific but concise ("chest workout" becomes "chest", "gym")
3. Normalize similar activities (gym workout = weight training = gym)
4. Extract 3-10 tags per entry
5. Only extract tags that are mentioned or clearly implied
6. Return ONLY a JSON array of strings and nothing else

Examples:
Input: "Went to the gym this morning, did chest and back. Felt great afterwards!"
Output: ["gym", "exercise", "morning", "chest", "back"]

Input: "Had dinner with Sarah at the new Italian place downtown. Food was amazing."
Output: ["dinner", "friends", "restaurant", "italian", "downtown", "social"]

Input: "Worked from home today. Long meetings but productive. Took a walk in the evening."
Output: ["work", "home", "meetings", "productive", "walk", "evening"]
"#;

pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You analyze mood tracking data and write insightful, human-readable summaries.

Your summaries help people understand their own patterns and habits.

Guidelines:
1. Be conversational and encouraging
2. Focus on actionable insights
3. Highlight interesting patterns
4. Use specific numbers and dates
5. Connect activities to moods when relevant
6. Keep it concise but informative (3-5 sentences)

Examples:
"In October, you hit the gym 10 times - impressive consistency! You focused mainly on chest (4 sessions) and back (3 sessions). Your mood was consistently energetic after workouts, especially morning sessions. Keep up the great routine!"

"This month you spent quality time with friends 8 times, and your mood was happiest on those days. You enjoyed a mix of dinner outings (4x) and casual hangouts (4x). Social connections seem to really boost your mood!"
"#;

pub fn tag_extraction_prompt(date: NaiveDate, mood: Option<&Mood>, text: &str) -> String {
    let mood = mood.map_or_else(|| "Not specified".to_string(), Mood::describe);
    format!(
        r#"Extract tags from this diary entry:

Date: {date}
Mood: {mood}
Text: {text}

Return ONLY a JSON array of tag strings. Example: ["tag1", "tag2", "tag3"]"#
    )
}

pub fn summary_prompt(request: &SummaryRequest, stats: &EntryStats<'_>) -> String {
    let tag_stats = or_placeholder(
        frequency_lines(&stats.tags, TOP_TAGS_IN_SUMMARY),
        "No tags found",
    );
    let mood_stats = or_placeholder(
        frequency_lines(&stats.moods, TOP_MOODS_IN_SUMMARY),
        "No mood data",
    );
    let sample_entries = or_placeholder(
        stats
            .samples
            .iter()
            .map(|entry| {
                let preview: String = entry
                    .notes
                    .as_deref()
                    .unwrap_or_default()
                    .chars()
                    .take(SAMPLE_PREVIEW_CHARS)
                    .collect();
                format!("- {}: {}...", entry.date, preview)
            })
            .collect(),
        "No entries",
    );

    format!(
        r#"Generate a summary for this time period:

Date Range: {start} to {end}
Focus: {focus}

Tag Statistics:
{tag_stats}

Mood Statistics:
{mood_stats}

Key Entries:
{sample_entries}

Generate an engaging 3-5 sentence summary highlighting the most interesting patterns and insights."#,
        start = request.date_range.start,
        end = request.date_range.end,
        focus = request.focus,
    )
}

fn frequency_lines(table: &FrequencyTable, n: usize) -> Vec<String> {
    table
        .most_common(n)
        .into_iter()
        .map(|(key, count)| format!("- {}: {} times", key, count))
        .collect()
}

fn or_placeholder(lines: Vec<String>, placeholder: &str) -> String {
    if lines.is_empty() {
        placeholder.to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{DateRange, SummaryFocus};
    use crate::models::entry::DayEntry;
    use crate::services::stats::aggregate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn request(entries: Vec<DayEntry>) -> SummaryRequest {
        SummaryRequest {
            date_range: DateRange {
                start: date(1),
                end: date(31),
            },
            entries,
            focus: SummaryFocus::Activities,
        }
    }

    #[test]
    fn test_tag_prompt_includes_date_mood_and_text() {
        let mood = Mood {
            label: "tired".into(),
            color: "#888".into(),
            intensity: Some(2),
        };
        let prompt = tag_extraction_prompt(date(5), Some(&mood), "Long day at the office.");
        assert!(prompt.contains("Date: 2024-03-05"));
        assert!(prompt.contains("Mood: tired (intensity: 2)"));
        assert!(prompt.contains("Text: Long day at the office."));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_tag_prompt_without_mood() {
        let prompt = tag_extraction_prompt(date(5), None, "text");
        assert!(prompt.contains("Mood: Not specified"));
    }

    #[test]
    fn test_summary_prompt_empty_sections_use_placeholders() {
        let req = request(vec![]);
        let stats = aggregate(&req.entries, 5);
        let prompt = summary_prompt(&req, &stats);
        assert!(prompt.contains("Date Range: 2024-03-01 to 2024-03-31"));
        assert!(prompt.contains("Focus: activities"));
        assert!(prompt.contains("Tag Statistics:\nNo tags found"));
        assert!(prompt.contains("Mood Statistics:\nNo mood data"));
        assert!(prompt.contains("Key Entries:\nNo entries"));
    }

    #[test]
    fn test_summary_prompt_limits_tags_to_top_ten() {
        let tags: Vec<String> = (0..12).map(|i| format!("tag{i:02}")).collect();
        let mut entries = vec![DayEntry {
            date: date(1),
            mood: None,
            notes: None,
            tags: Some(tags),
        }];
        // make the last tag the most frequent so it ranks first
        entries.push(DayEntry {
            date: date(2),
            mood: None,
            notes: None,
            tags: Some(vec!["tag11".into()]),
        });
        let req = request(entries);
        let stats = aggregate(&req.entries, 5);
        let prompt = summary_prompt(&req, &stats);

        assert!(prompt.contains("Tag Statistics:\n- tag11: 2 times\n- tag00: 1 times"));
        assert!(prompt.contains("- tag08: 1 times"));
        assert!(!prompt.contains("tag09"));
        assert!(!prompt.contains("tag10"));
    }

    #[test]
    fn test_summary_prompt_truncates_sample_notes() {
        let notes = "a".repeat(150);
        let req = request(vec![DayEntry {
            date: date(7),
            mood: None,
            notes: Some(notes),
            tags: None,
        }]);
        let stats = aggregate(&req.entries, 5);
        let prompt = summary_prompt(&req, &stats);
        assert!(prompt.contains(&format!("- 2024-03-07: {}...", "a".repeat(100))));
        assert!(!prompt.contains(&"a".repeat(101)));
    }
}
