use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::record::ScanLogRecord;
use crate::logic::features::FeatureVector;

/// Read-only view of the scan log at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanLogSnapshot {
    pub records: Vec<ScanLogRecord>,
    pub skipped_malformed: usize,
    pub skipped_layout: usize,
}

impl ScanLogSnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Feature vectors of the most recent `max` records, oldest first
    pub fn feature_window(&self, max: usize) -> Vec<FeatureVector> {
        let start = self.records.len().saturating_sub(max);
        self.records[start..].iter().map(|r| r.features).collect()
    }

    /// Records logged strictly after `since`
    pub fn count_since(&self, since: DateTime<Utc>) -> usize {
        self.records.iter().filter(|r| r.timestamp > since).count()
    }
}

/// Load every readable record. A missing log is an empty snapshot; malformed
/// lines and records from another feature layout are skipped and counted.
pub fn read_snapshot(path: &Path) -> io::Result<ScanLogSnapshot> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ScanLogSnapshot::default()),
        Err(e) => return Err(e),
    };

    let mut snapshot = ScanLogSnapshot::default();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ScanLogRecord>(line) {
            Ok(record) if record.matches_layout() => snapshot.records.push(record),
            Ok(_) => snapshot.skipped_layout += 1,
            Err(e) => {
                log::debug!("Skipping scan log line {}: {}", number + 1, e);
                snapshot.skipped_malformed += 1;
            }
        }
    }

    if snapshot.skipped_malformed + snapshot.skipped_layout > 0 {
        log::warn!(
            "Scan log {}: skipped {} malformed and {} out-of-layout record(s)",
            path.display(),
            snapshot.skipped_malformed,
            snapshot.skipped_layout
        );
    }
    Ok(snapshot)
}
