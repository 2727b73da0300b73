use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Mood {
    pub label: String,
    pub color: String,
    /// 1-5 scale, 5 being most intense
    #[validate(range(min = 1, max = 5, message = "Mood intensity must be 1-5"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<i32>,
}

impl Mood {
    /// Human readable form used in prompts, e.g. `happy (intensity: 4)`.
    pub fn describe(&self) -> String {
        match self.intensity {
            Some(intensity) => format!("{} (intensity: {})", self.label, intensity),
            None => self.label.clone(),
        }
    }
}

/// One tracked day as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DayEntry {
    pub date: NaiveDate,

    #[validate]
    #[serde(default)]
    pub mood: Option<Mood>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl DayEntry {
    /// Notes that are present and non-empty.
    pub fn journal_text(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }

    pub fn notes_len(&self) -> usize {
        self.notes.as_deref().map_or(0, |n| n.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mood(intensity: Option<i32>) -> Mood {
        Mood {
            label: "happy".into(),
            color: "#FFD700".into(),
            intensity,
        }
    }

    #[test]
    fn test_mood_describe_with_intensity() {
        assert_eq!(mood(Some(4)).describe(), "happy (intensity: 4)");
    }

    #[test]
    fn test_mood_describe_without_intensity() {
        assert_eq!(mood(None).describe(), "happy");
    }

    #[test]
    fn test_mood_intensity_out_of_range_fails_validation() {
        assert!(mood(Some(6)).validate().is_err());
        assert!(mood(Some(0)).validate().is_err());
        assert!(mood(Some(5)).validate().is_ok());
        assert!(mood(None).validate().is_ok());
    }

    #[test]
    fn test_day_entry_deserializes_with_optional_fields_missing() {
        let entry: DayEntry = serde_json::from_str(r#"{"date": "2024-01-01"}"#).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(entry.mood.is_none());
        assert!(entry.notes.is_none());
        assert!(entry.tags.is_none());
    }

    #[test]
    fn test_day_entry_ignores_client_only_fields() {
        let entry: DayEntry = serde_json::from_str(
            r#"{"date": "2024-01-01", "notes": "walk", "timestamps": [{"id": "1", "time": "t", "content": "c"}]}"#,
        )
        .unwrap();
        assert_eq!(entry.journal_text(), Some("walk"));
    }

    #[test]
    fn test_journal_text_skips_empty_notes() {
        let entry = DayEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            mood: None,
            notes: Some(String::new()),
            tags: None,
        };
        assert_eq!(entry.journal_text(), None);
        assert_eq!(entry.notes_len(), 0);
    }

    #[test]
    fn test_notes_len_counts_characters() {
        let entry = DayEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            mood: None,
            notes: Some("café ☕".into()),
            tags: None,
        };
        assert_eq!(entry.notes_len(), 6);
    }
}
