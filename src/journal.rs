//! Usage experience journal
//!
//! Free-text reflections on a single AI-assisted learning task. Entries are
//! append-only; insertion order is chronological order.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JournalError;

/// Display format for entry timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub task: String,
    pub tool: String,
    pub usage: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Local-clock `YYYY-MM-DD HH:MM` rendering of the creation time
    pub fn date(&self) -> String {
        format_timestamp(self.created_at)
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

/// Order in which entries are projected for display
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Archive view, oldest first
    #[default]
    Chronological,
    /// Most recent first
    Recent,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a new entry stamped with the current time.
    ///
    /// All three fields must be non-empty after trimming; on failure nothing
    /// is stored. Accepted fields are stored exactly as submitted.
    pub fn submit_entry(
        &mut self,
        task: &str,
        tool: &str,
        usage: &str,
    ) -> Result<&JournalEntry, JournalError> {
        let missing: Vec<&'static str> = [("task", task), ("tool", tool), ("usage", usage)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if !missing.is_empty() {
            tracing::warn!(?missing, "Rejected journal entry with missing fields");
            return Err(JournalError::MissingFields { missing });
        }

        self.entries.push(JournalEntry {
            task: task.to_string(),
            tool: tool.to_string(),
            usage: usage.to_string(),
            created_at: Utc::now(),
        });
        tracing::info!(total = self.entries.len(), "Journal entry saved");

        // just pushed
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Read-only projection of the stored entries in the requested order
    pub fn list_entries(&self, order: EntryOrder) -> Box<dyn Iterator<Item = &JournalEntry> + '_> {
        match order {
            EntryOrder::Chronological => Box::new(self.entries.iter()),
            EntryOrder::Recent => Box::new(self.entries.iter().rev()),
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    /// The most recent `n` entries, oldest first
    pub fn last_n(&self, n: usize) -> &[JournalEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_entry_appends_with_timestamp() {
        let mut journal = Journal::new();
        let before = Utc::now();

        let entry = journal
            .submit_entry("reading an article", "ChatGPT", "asked for a summary")
            .expect("valid entry")
            .clone();

        assert_eq!(journal.len(), 1);
        assert_eq!(journal.latest(), Some(&entry));
        assert_eq!(entry.task, "reading an article");
        assert!(entry.created_at >= before);
    }

    #[test]
    fn test_submit_entry_stores_fields_as_submitted() {
        let mut journal = Journal::new();
        journal
            .submit_entry("  essay draft ", "ChatGPT\n", " outlined sections")
            .unwrap();

        let last = journal.list_entries(EntryOrder::Chronological).last().unwrap();
        assert_eq!(last.task, "  essay draft ");
        assert_eq!(last.tool, "ChatGPT\n");
        assert_eq!(last.usage, " outlined sections");
    }

    #[test]
    fn test_submit_entry_rejects_blank_fields_without_mutation() {
        let mut journal = Journal::new();

        let err = journal
            .submit_entry("essay outline", "   ", "")
            .expect_err("blank fields");

        assert_eq!(
            err,
            JournalError::MissingFields {
                missing: vec!["tool", "usage"]
            }
        );
        assert!(journal.is_empty());
    }

    #[test]
    fn test_list_entries_orders() {
        let mut journal = Journal::new();
        for task in ["first", "second", "third"] {
            journal.submit_entry(task, "tool", "usage").unwrap();
        }

        let chronological: Vec<_> = journal
            .list_entries(EntryOrder::Chronological)
            .map(|e| e.task.as_str())
            .collect();
        let recent: Vec<_> = journal
            .list_entries(EntryOrder::Recent)
            .map(|e| e.task.as_str())
            .collect();

        assert_eq!(chronological, vec!["first", "second", "third"]);
        assert_eq!(recent, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_last_n_keeps_most_recent() {
        let mut journal = Journal::new();
        for i in 0..7 {
            journal.submit_entry(&format!("task {i}"), "tool", "usage").unwrap();
        }

        let tail = journal.last_n(5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].task, "task 2");
        assert_eq!(tail[4].task, "task 6");
        assert_eq!(journal.last_n(50).len(), 7);
    }

    #[test]
    fn test_date_uses_minute_precision() {
        let mut journal = Journal::new();
        let entry = journal.submit_entry("t", "t", "t").unwrap();
        // YYYY-MM-DD HH:MM
        assert_eq!(entry.date().len(), 16);
    }
}
