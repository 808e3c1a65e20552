//! Version history.
//!
//! Append-only list of published versions, persisted beside the store
//! file so it survives draft discard and restarts.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::core::constants;
use crate::core::domain::VersionEntry;
use crate::core::persist;
use crate::error::{DraftError, Result};

const LABEL_FORMAT: &str = "%Y%m%d.%H%M%S.%3f";

pub(crate) struct VersionLog {
    file: PathBuf,
    entries: Mutex<Vec<VersionEntry>>,
}

impl VersionLog {
    /// Load the log in `dir`, empty if the file does not exist yet.
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        let file = dir.join(constants::VERSIONS_FILE);
        let entries: Vec<VersionEntry> = persist::load_json(&file)?.unwrap_or_default();
        debug!(file = %file.display(), versions = entries.len(), "version log opened");
        Ok(Self {
            file,
            entries: Mutex::new(entries),
        })
    }

    /// Label for a version published at `now`, strictly after the last one.
    pub(crate) fn next_label(&self, now: DateTime<Utc>) -> String {
        let entries = self.entries.lock();
        next_label(entries.last().map(|e| e.version.as_str()), now)
    }

    /// Append and persist. The in-memory list only grows once the write
    /// succeeded.
    pub(crate) fn append(&self, entry: VersionEntry) -> Result<()> {
        let mut entries = self.entries.lock();
        let mut working = entries.clone();
        working.push(entry);
        persist::save_json(&self.file, &working)?;
        *entries = working;
        Ok(())
    }

    /// Newest first.
    pub(crate) fn newest_first(&self) -> Vec<VersionEntry> {
        self.entries.lock().iter().rev().cloned().collect()
    }

    /// Look up by id or by label.
    pub(crate) fn find(&self, id: &str) -> Result<VersionEntry> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.id == id || e.version == id)
            .cloned()
            .ok_or_else(|| DraftError::VersionNotFound(id.to_string()).into())
    }
}

/// `YYYYMMDD.HHMMSS.mmm`, or the previous stem with a bumped `-NNNN`
/// suffix when the clock has not moved past the previous label. The
/// suffix is zero-padded so labels keep sorting as strings.
fn next_label(previous: Option<&str>, now: DateTime<Utc>) -> String {
    let stem = now.format(LABEL_FORMAT).to_string();
    let Some(previous) = previous else {
        return stem;
    };

    let (prev_stem, prev_n) = split_label(previous);
    if stem.as_str() > prev_stem {
        stem
    } else {
        format!("{}-{:04}", prev_stem, prev_n + 1)
    }
}

fn split_label(label: &str) -> (&str, u32) {
    match label.rsplit_once('-') {
        Some((stem, n)) => match n.parse() {
            Ok(n) => (stem, n),
            Err(_) => (label, 0),
        },
        None => (label, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_label_format() {
        let label = next_label(None, at(42));
        assert_eq!(label.len(), "20251009.085320.042".len());
        assert!(label.ends_with(".042"));
    }

    #[test]
    fn test_labels_increase_with_time() {
        let first = next_label(None, at(0));
        let second = next_label(Some(&first), at(1));
        assert!(second > first);
    }

    #[test]
    fn test_same_instant_gets_suffix() {
        let first = next_label(None, at(0));
        let second = next_label(Some(&first), at(0));
        let third = next_label(Some(&second), at(0));

        assert_eq!(second, format!("{}-0001", first));
        assert_eq!(third, format!("{}-0002", first));
    }

    #[test]
    fn test_suffixed_labels_sort_as_strings() {
        let mut labels = vec![next_label(None, at(0))];
        for _ in 0..12 {
            let next = next_label(labels.last().map(String::as_str), at(0));
            labels.push(next);
        }
        labels.push(next_label(labels.last().map(String::as_str), at(1)));

        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(sorted, labels);
        assert!(labels[12].ends_with("-0012"));
    }

    #[test]
    fn test_clock_going_backwards_stays_monotonic() {
        let first = next_label(None, at(5_000));
        let second = next_label(Some(&first), at(0));
        assert!(second > first);
        assert!(second.starts_with(&first));
    }

    #[test]
    fn test_log_persists() {
        let tmp = tempfile::TempDir::new().unwrap();
        let log = VersionLog::open(tmp.path()).unwrap();
        log.append(VersionEntry {
            id: "v1".to_string(),
            version: log.next_label(Utc::now()),
            description: "first".to_string(),
            author: None,
            timestamp: Utc::now(),
            variable_count: 0,
            changes: Vec::new(),
            published: true,
        })
        .unwrap();

        let reopened = VersionLog::open(tmp.path()).unwrap();
        assert_eq!(reopened.newest_first().len(), 1);
        assert_eq!(reopened.find("v1").unwrap().description, "first");
        assert!(reopened.find("v2").is_err());
    }
}
