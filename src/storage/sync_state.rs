//! Last-sync watermark persistence
//!
//! A single JSON record `{"lastSync": "<ISO8601>"}` overwritten in place after
//! every successful run. A missing or unreadable file means "never synced",
//! which makes the next run a full backfill.

use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persisted sync state, exactly as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Start time of the last run that completed, ISO8601
    #[serde(rename = "lastSync", default)]
    pub last_sync: Option<String>,
}

impl SyncState {
    pub fn new(timestamp: &DateTime<Utc>) -> Self {
        Self {
            last_sync: Some(to_iso8601(timestamp)),
        }
    }

    /// Parse the stored timestamp
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_sync.as_deref()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!(last_sync = %raw, error = %e, "Ignoring unparsable last sync time");
                None
            }
        }
    }
}

/// Format a timestamp the way GitHub's `since` parameter expects it
pub fn to_iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// File-backed store for the last-sync timestamp
#[derive(Debug, Clone)]
pub struct SyncStateStore {
    path: PathBuf,
}

impl SyncStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last-sync timestamp
    ///
    /// Never fails: a missing, unreadable or malformed record is logged and
    /// reported as `None`.
    pub fn load(&self) -> Option<DateTime<Utc>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No previous sync recorded, running full backfill");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read sync state, running full backfill");
                return None;
            }
        };

        match serde_json::from_str::<SyncState>(&content) {
            Ok(state) => {
                let last_sync = state.timestamp();
                if let Some(ref ts) = last_sync {
                    tracing::info!(last_sync = %to_iso8601(ts), "Loaded last sync time");
                }
                last_sync
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    body = %content,
                    "Sync state is malformed, running full backfill"
                );
                None
            }
        }
    }

    /// Overwrite the record with a new timestamp
    ///
    /// Writes to a temporary file next to the target and renames it over the
    /// old record, so an interrupted write never leaves a truncated file.
    pub fn save(&self, timestamp: DateTime<Utc>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let state = SyncState::new(&timestamp);
        let json = serde_json::to_string_pretty(&state)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::info!(last_sync = %to_iso8601(&timestamp), "Updated last sync time");
        Ok(())
    }

    /// Delete the record so the next run backfills everything
    ///
    /// Returns whether a record existed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = SyncStateStore::new(dir.path().join("last-sync.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SyncStateStore::new(dir.path().join("nested/last-sync.json"));
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        store.save(ts).unwrap();
        assert_eq!(store.load(), Some(ts));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"lastSync\": \"2025-03-14T09:26:53.000Z\""));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = SyncStateStore::new(dir.path().join("last-sync.json"));
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        store.save(first).unwrap();
        store.save(second).unwrap();
        assert_eq!(store.load(), Some(second));
    }

    #[test]
    fn test_reads_record_written_by_other_tools() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last-sync.json");
        fs::write(&path, r#"{ "lastSync": "2025-06-01T12:30:00.123Z" }"#).unwrap();

        let store = SyncStateStore::new(&path);
        let ts = store.load().unwrap();
        assert_eq!(to_iso8601(&ts), "2025-06-01T12:30:00.123Z");
    }

    #[test]
    fn test_malformed_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last-sync.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(SyncStateStore::new(&path).load(), None);

        fs::write(&path, r#"{"lastSync": null}"#).unwrap();
        assert_eq!(SyncStateStore::new(&path).load(), None);

        fs::write(&path, r#"{"lastSync": "yesterday"}"#).unwrap();
        assert_eq!(SyncStateStore::new(&path).load(), None);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = SyncStateStore::new(dir.path().join("last-sync.json"));
        assert!(!store.clear().unwrap());

        store.save(Utc::now()).unwrap();
        assert!(store.clear().unwrap());
        assert_eq!(store.load(), None);
    }
}
