use std::path::Path;

use crate::domain::{DomainError, HistoryEntry};

/// Port for history persistence.
///
/// The in-memory log itself lives in `domain::HistoryLog`; this port only
/// covers the round-trip to disk.
pub trait HistoryStore: Send + Sync {
    /// Serialize the full ordered sequence of entries to `path`.
    ///
    /// A failed save must not corrupt a previously valid file.
    fn save(&self, path: &Path, entries: &[HistoryEntry]) -> Result<(), DomainError>;

    /// Deserialize entries from `path`.
    ///
    /// Fails with `HistoryNotFound`, `HistoryCorrupt`, or `HistoryIo`.
    /// Callers keep their in-memory history untouched on any failure.
    fn load(&self, path: &Path) -> Result<Vec<HistoryEntry>, DomainError>;
}
