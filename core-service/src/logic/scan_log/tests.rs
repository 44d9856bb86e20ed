use std::fs;
use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use tempfile::tempdir;
use uuid::Uuid;

use super::*;
use crate::logic::features::layout::layout_hash;
use crate::logic::features::{FeatureVector, FEATURE_VERSION};
use crate::logic::intel::RiskTier;

fn record(host: &str, open_ports: f64) -> ScanLogRecord {
    let mut features = FeatureVector::default();
    features.open_ports_count = open_ports;
    ScanLogRecord {
        analysis_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        host_id: host.to_string(),
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        features,
        classifier_tier: RiskTier::High,
        confidence: 0.375,
        final_tier: RiskTier::Critical,
        final_score: 95.0,
        escalation_applied: true,
    }
}

#[test]
fn test_append_and_read_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("scan_log.jsonl");
    let writer = ScanLogWriter::new(path.clone()).unwrap();

    writer.append(&record("10.0.0.5", 2.0)).unwrap();
    writer.append(&record("10.0.0.6", 4.0)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);

    let snapshot = read_snapshot(&path).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.records[0].host_id, "10.0.0.5");
    assert_eq!(snapshot.records[1].final_tier, RiskTier::Critical);
    assert_eq!(snapshot.skipped_malformed, 0);
}

#[test]
fn test_missing_log_is_empty() {
    let dir = tempdir().unwrap();
    let snapshot = read_snapshot(&dir.path().join("absent.jsonl")).unwrap();
    assert!(snapshot.is_empty());
}

#[test]
fn test_bad_lines_and_foreign_layout_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_log.jsonl");
    let writer = ScanLogWriter::new(path.clone()).unwrap();
    writer.append(&record("good", 1.0)).unwrap();

    let mut foreign = record("foreign", 3.0);
    foreign.layout_hash = !layout_hash();
    writer.append(&foreign).unwrap();

    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("{\"truncated\": \n");
    content.push_str("\n");
    fs::write(&path, content).unwrap();

    let snapshot = read_snapshot(&path).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.records[0].host_id, "good");
    assert_eq!(snapshot.skipped_layout, 1);
    assert_eq!(snapshot.skipped_malformed, 1);
}

#[test]
fn test_feature_window_takes_most_recent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_log.jsonl");
    let writer = ScanLogWriter::new(path.clone()).unwrap();
    for i in 0..10 {
        writer.append(&record("h", i as f64)).unwrap();
    }

    let snapshot = read_snapshot(&path).unwrap();
    let window = snapshot.feature_window(3);
    let ports: Vec<f64> = window.iter().map(|v| v.open_ports_count).collect();
    assert_eq!(ports, vec![7.0, 8.0, 9.0]);
    assert_eq!(snapshot.feature_window(50).len(), 10);
}

#[test]
fn test_concurrent_appends_stay_line_delimited() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_log.jsonl");
    let writer = Arc::new(ScanLogWriter::new(path.clone()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let writer = Arc::clone(&writer);
            thread::spawn(move || {
                for i in 0..25 {
                    writer.append(&record(&format!("host-{}-{}", t, i), 1.0)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = read_snapshot(&path).unwrap();
    assert_eq!(snapshot.len(), 100);
    assert_eq!(snapshot.skipped_malformed, 0);
}

#[test]
fn test_count_since_only_counts_newer_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan_log.jsonl");
    let writer = ScanLogWriter::new(path.clone()).unwrap();

    let cutoff = Utc::now();
    for (host, offset) in [("old-1", -2), ("old-2", -1), ("new-1", 1), ("new-2", 2), ("new-3", 3)] {
        let mut entry = record(host, 1.0);
        entry.timestamp = cutoff + Duration::hours(offset);
        writer.append(&entry).unwrap();
    }

    let snapshot = read_snapshot(&path).unwrap();
    assert_eq!(snapshot.len(), 5);
    assert_eq!(snapshot.count_since(cutoff), 3);
    assert_eq!(snapshot.count_since(cutoff + Duration::hours(5)), 0);
}
