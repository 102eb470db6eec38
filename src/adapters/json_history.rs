use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{DomainError, HistoryEntry};
use crate::ports::HistoryStore;

/// History persistence as a JSON array of `[source, display]` pairs.
///
/// Saves go through a sibling temporary file followed by a rename, so a
/// failed write never corrupts a previously valid history file.
pub struct JsonHistoryStore;

impl JsonHistoryStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for JsonHistoryStore {
    fn save(&self, path: &Path, entries: &[HistoryEntry]) -> Result<(), DomainError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DomainError::HistoryIo(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        let tmp = tmp_path(path);
        fs::write(&tmp, json).map_err(|e| DomainError::HistoryIo(e.to_string()))?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(DomainError::HistoryIo(e.to_string()));
        }

        info!(path = ?path, entries = entries.len(), "History saved");
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Vec<HistoryEntry>, DomainError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DomainError::HistoryNotFound(path.display().to_string()))
            }
            Err(e) => return Err(DomainError::HistoryIo(e.to_string())),
        };

        let entries: Vec<HistoryEntry> = serde_json::from_str(&content)
            .map_err(|e| DomainError::HistoryCorrupt(e.to_string()))?;

        debug!(path = ?path, entries = entries.len(), "History loaded");
        Ok(entries)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry::new("hello", "سلام"),
            HistoryEntry::new("world", "دنیا"),
            HistoryEntry::new("good morning", "صبح بخیر"),
        ]
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_history.json");
        let store = JsonHistoryStore::new();

        let entries = sample_entries();
        store.save(&path, &entries).unwrap();
        let loaded = store.load(&path).unwrap();

        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_save_leaves_no_temporary_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_history.json");
        let store = JsonHistoryStore::new();

        store.save(&path, &sample_entries()).unwrap();

        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_history.json");
        let store = JsonHistoryStore::new();

        store.save(&path, &sample_entries()).unwrap();
        let shorter = vec![HistoryEntry::new("bye", "خداحافظ")];
        store.save(&path, &shorter).unwrap();

        assert_eq!(store.load(&path).unwrap(), shorter);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new();

        let err = store.load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DomainError::HistoryNotFound(_)));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_history.json");
        fs::write(&path, "{ not json ]").unwrap();

        let store = JsonHistoryStore::new();
        let err = store.load(&path).unwrap_err();
        assert!(matches!(err, DomainError::HistoryCorrupt(_)));
    }

    #[test]
    fn test_load_wrong_shape_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_history.json");
        fs::write(&path, r#"{"entries": []}"#).unwrap();

        let store = JsonHistoryStore::new();
        let err = store.load(&path).unwrap_err();
        assert!(matches!(err, DomainError::HistoryCorrupt(_)));
    }

    #[test]
    fn test_persisted_format_is_array_of_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_history.json");
        let store = JsonHistoryStore::new();

        store
            .save(&path, &[HistoryEntry::new("hello", "سلام")])
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0][0], "hello");
        assert_eq!(raw[0][1], "سلام");
    }
}
