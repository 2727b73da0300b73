use indexmap::IndexMap;

use crate::models::entry::DayEntry;

/// Entries need notes longer than this (in characters) to be sampled.
const SAMPLE_MIN_NOTES_CHARS: usize = 20;

/// Occurrence counts that remember the order keys were first seen, so
/// equal counts rank by first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    counts: IndexMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Up to `n` keys by descending count, ties in first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        // sort_by is stable, which keeps first-seen order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    pub fn top(&self) -> Option<(&str, usize)> {
        self.most_common(1).into_iter().next()
    }
}

/// Everything the summary pipeline derives locally from the entries.
#[derive(Debug)]
pub struct EntryStats<'a> {
    pub tags: FrequencyTable,
    pub moods: FrequencyTable,
    pub samples: Vec<&'a DayEntry>,
}

pub fn aggregate(entries: &[DayEntry], sample_limit: usize) -> EntryStats<'_> {
    EntryStats {
        tags: count_tags(entries),
        moods: count_moods(entries),
        samples: sample_entries(entries, sample_limit),
    }
}

pub fn count_tags(entries: &[DayEntry]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for tag in entries.iter().filter_map(|e| e.tags.as_ref()).flatten() {
        table.record(tag);
    }
    table
}

pub fn count_moods(entries: &[DayEntry]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for mood in entries.iter().filter_map(|e| e.mood.as_ref()) {
        table.record(&mood.label);
    }
    table
}

/// The most detailed entries: longest notes first, original order on ties.
pub fn sample_entries(entries: &[DayEntry], limit: usize) -> Vec<&DayEntry> {
    let mut detailed: Vec<&DayEntry> = entries
        .iter()
        .filter(|e| e.notes_len() > SAMPLE_MIN_NOTES_CHARS)
        .collect();
    detailed.sort_by(|a, b| b.notes_len().cmp(&a.notes_len()));
    detailed.truncate(limit);
    detailed
}
