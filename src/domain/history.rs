use serde::{Deserialize, Serialize};

/// One recorded (source, translated display) pair from a completed
/// interaction. Immutable once appended.
///
/// Serializes as a 2-element array `[source, display]` so the persisted
/// history file is a plain array of pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct HistoryEntry {
    pub source: String,
    pub display: String,
}

impl HistoryEntry {
    pub fn new(source: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            display: display.into(),
        }
    }
}

impl From<(String, String)> for HistoryEntry {
    fn from((source, display): (String, String)) -> Self {
        Self { source, display }
    }
}

impl From<HistoryEntry> for (String, String) {
    fn from(entry: HistoryEntry) -> Self {
        (entry.source, entry.display)
    }
}

/// Append-only in-memory log of history entries.
///
/// Insertion order is chronological order. The log is replaced wholesale by
/// a successful load and serialized wholesale by a save; there is no
/// incremental diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. O(1), preserves order.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Replace the whole log, e.g. after a successful load.
    pub fn replace(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = HistoryLog::new();
        log.append(HistoryEntry::new("one", "۱"));
        log.append(HistoryEntry::new("two", "۲"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].source, "one");
        assert_eq!(log.last().unwrap().source, "two");
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut log = HistoryLog::new();
        log.append(HistoryEntry::new("old", "x"));

        log.replace(vec![HistoryEntry::new("new", "y")]);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].source, "new");
    }

    #[test]
    fn test_entry_serializes_as_pair() {
        let entry = HistoryEntry::new("hello", "سلام");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"["hello","سلام"]"#);

        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
