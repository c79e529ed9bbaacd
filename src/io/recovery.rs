use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::store::{KeyValueStore, RECOVERY_LOG_KEY, StoreError};

/// Oldest entries are trimmed once the log holds more than this.
const MAX_LOG_ENTRIES: usize = 200;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryCategory {
    /// Stored data that could not be parsed
    Parser,
    /// A board upgraded from the flat v1 layout
    Migration,
    Write,
    /// Fields dropped while importing a bundle
    Import,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Migration => write!(f, "migration"),
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Import => write!(f, "import"),
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
    #[serde(default)]
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: IndexMap::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Summary info about the recovery log.
#[derive(Debug, Clone)]
pub struct RecoverySummary {
    pub entry_count: usize,
    pub oldest: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Entries oldest-first. A log that can't be read or parsed reads as empty.
fn load_entries(store: &dyn KeyValueStore) -> Vec<RecoveryEntry> {
    match store.get(RECOVERY_LOG_KEY) {
        Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn save_entries(store: &mut dyn KeyValueStore, entries: &[RecoveryEntry]) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(entries)?;
    store.set(RECOVERY_LOG_KEY, &text)
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Errors are swallowed and printed to stderr.
pub fn log_recovery(store: &mut dyn KeyValueStore, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(store, entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn log_recovery_inner(store: &mut dyn KeyValueStore, entry: RecoveryEntry) -> Result<(), StoreError> {
    let mut entries = load_entries(store);
    entries.push(entry);
    if entries.len() > MAX_LOG_ENTRIES {
        entries.drain(..entries.len() - MAX_LOG_ENTRIES);
    }
    save_entries(store, &entries)
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries, most recent first.
pub fn read_recovery_entries(
    store: &dyn KeyValueStore,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<RecoveryEntry> {
    let mut entries = load_entries(store);

    if let Some(since_dt) = since {
        entries.retain(|e| e.timestamp >= since_dt);
    }

    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }

    entries.reverse();
    entries
}

/// Get a summary of the recovery log.
pub fn recovery_summary(store: &dyn KeyValueStore) -> Option<RecoverySummary> {
    let entries = load_entries(store);
    if entries.is_empty() {
        return None;
    }
    Some(RecoverySummary {
        entry_count: entries.len(),
        oldest: entries.first().map(|e| e.timestamp),
    })
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Prune entries older than `before` (default: [`PRUNE_AGE_DAYS`] ago), or
/// every entry when `all` is set. Returns the number of entries removed.
pub fn prune_recovery(
    store: &mut dyn KeyValueStore,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> Result<usize, StoreError> {
    let mut entries = load_entries(store);
    let original_count = entries.len();
    if original_count == 0 {
        return Ok(0);
    }

    if all {
        entries.clear();
    } else {
        let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
        entries.retain(|e| e.timestamp >= cutoff);
    }

    save_entries(store, &entries)?;
    Ok(original_count - entries.len())
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    /// Format as a markdown block for `sb recovery`.
    pub fn to_display_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {} {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push('\n');
            out.push_str("```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;

    fn make_entry(category: RecoveryCategory, desc: &str, body: &str) -> RecoveryEntry {
        RecoveryEntry::new(category, desc)
            .field("Key", "board:Home")
            .field("Reason", "expected value at line 1")
            .body(body)
    }

    #[test]
    fn test_entry_formatting() {
        let entry = make_entry(RecoveryCategory::Parser, "unreadable board", "{oops");
        let md = entry.to_display_markdown();
        assert!(md.starts_with("## "));
        assert!(md.contains("parser: unreadable board"));
        assert!(md.contains("Key: board:Home"));
        assert!(md.contains("```text\n{oops\n```"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn test_log_and_read() {
        let mut store = MemoryStore::new();
        log_recovery(&mut store, make_entry(RecoveryCategory::Parser, "first", "a"));
        log_recovery(&mut store, make_entry(RecoveryCategory::Write, "second", ""));

        let entries = read_recovery_entries(&store, None, None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "second");
        assert_eq!(entries[1].fields["Key"], "board:Home");

        let latest = read_recovery_entries(&store, Some(1), None);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].description, "second");
    }

    #[test]
    fn test_log_is_capped() {
        let mut store = MemoryStore::new();
        for i in 0..MAX_LOG_ENTRIES + 5 {
            log_recovery(
                &mut store,
                RecoveryEntry::new(RecoveryCategory::Write, format!("entry {}", i)),
            );
        }
        let summary = recovery_summary(&store).unwrap();
        assert_eq!(summary.entry_count, MAX_LOG_ENTRIES);
        let entries = read_recovery_entries(&store, None, None);
        assert_eq!(entries.last().unwrap().description, "entry 5");
    }

    #[test]
    fn test_prune_by_age() {
        let mut store = MemoryStore::new();
        let mut old = make_entry(RecoveryCategory::Parser, "old", "");
        old.timestamp = Utc::now() - chrono::Duration::days(45);
        log_recovery(&mut store, old);
        log_recovery(&mut store, make_entry(RecoveryCategory::Parser, "new", ""));

        assert_eq!(prune_recovery(&mut store, None, false).unwrap(), 1);
        let entries = read_recovery_entries(&store, None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "new");

        assert_eq!(prune_recovery(&mut store, None, true).unwrap(), 1);
        assert!(recovery_summary(&store).is_none());
    }

    #[test]
    fn test_unparseable_log_reads_empty() {
        let mut store = MemoryStore::new();
        store.set(RECOVERY_LOG_KEY, "not json").unwrap();
        assert!(read_recovery_entries(&store, None, None).is_empty());
        log_recovery(&mut store, make_entry(RecoveryCategory::Write, "fresh", ""));
        assert_eq!(recovery_summary(&store).unwrap().entry_count, 1);
    }
}
