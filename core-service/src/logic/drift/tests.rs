use super::*;
use crate::logic::features::layout::layout_hash;
use crate::logic::features::{Feature, FeatureVector};

#[derive(Default, Clone, Copy)]
struct Shift {
    ports: f64,
    cvss: f64,
    services: f64,
}

fn vector(i: usize, shift: Shift) -> FeatureVector {
    let mut v = FeatureVector::default();
    v.open_ports_count = (i % 5) as f64 + 1.0 + shift.ports;
    v.service_count = (i % 4) as f64 + 1.0 + shift.services;
    v.avg_cvss = 3.0 + (i % 6) as f64 * 0.5 + shift.cvss;
    v.cvss_variance = (i % 3) as f64;
    v
}

fn sample(n: usize, shift: Shift) -> Vec<FeatureVector> {
    (0..n).map(|i| vector(i, shift)).collect()
}

#[test]
fn test_identical_distributions_never_drift() {
    let monitor = DriftMonitor::default();
    let report = monitor
        .check(&sample(60, Shift::default()), &sample(120, Shift::default()))
        .unwrap();

    assert!(!report.drift_detected);
    assert_eq!(report.recommended_action, RecommendedAction::None);
    assert_eq!(report.flagged_count, 0);
    assert_eq!(report.features.len(), 3);
    for feature in &report.features {
        assert_eq!(feature.statistic, 0.0);
        assert_eq!(feature.p_value, 1.0);
        assert!(feature.shift_pct < 1e-6);
    }
}

#[test]
fn test_shifted_feature_triggers_retrain() {
    let monitor = DriftMonitor::default();
    let shifted = Shift {
        ports: 6.0,
        ..Default::default()
    };
    let report = monitor
        .check(&sample(60, Shift::default()), &sample(60, shifted))
        .unwrap();

    assert!(report.drift_detected);
    assert_eq!(report.recommended_action, RecommendedAction::RetrainRecommended);
    let flagged: Vec<Feature> = report.flagged().map(|f| f.feature).collect();
    assert_eq!(flagged, vec![Feature::OpenPortsCount]);
    assert_eq!(report.features[0].statistic, 1.0);
    assert!(report.features[0].window_mean > report.features[0].reference_mean);
}

#[test]
fn test_unmonitored_features_ignored() {
    let monitor = DriftMonitor::default();
    let reference = sample(60, Shift::default());
    let window: Vec<FeatureVector> = sample(60, Shift::default())
        .into_iter()
        .map(|mut v| {
            v.cvss_variance += 50.0;
            v
        })
        .collect();
    assert!(!monitor.check(&reference, &window).unwrap().drift_detected);
}

#[test]
fn test_single_flag_is_drift_regardless_of_ratio() {
    let config = DriftConfig {
        flagged_ratio: 0.9,
        ..Default::default()
    };
    let monitor = DriftMonitor::new(config);
    let reference = sample(60, Shift::default());

    let one = Shift {
        ports: 6.0,
        ..Default::default()
    };
    let report = monitor.check(&reference, &sample(60, one)).unwrap();
    assert_eq!(report.flagged_count, 1);
    assert!(report.flagged_fraction < 0.9);
    assert!(report.drift_detected);
    assert_eq!(report.recommended_action, RecommendedAction::RetrainRecommended);

    let two = Shift {
        ports: 6.0,
        cvss: 4.0,
        ..Default::default()
    };
    let report = monitor.check(&reference, &sample(60, two)).unwrap();
    assert_eq!(report.flagged_count, 2);
    assert!(report.drift_detected);
}

#[test]
fn test_insufficient_data_is_unknown() {
    let monitor = DriftMonitor::default();
    let err = monitor
        .check(&sample(10, Shift::default()), &sample(60, Shift::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        DriftError::InsufficientData {
            sample: "reference",
            found: 10,
            required: 30
        }
    ));

    let status = monitor.status(&sample(60, Shift::default()), &sample(20, Shift::default()));
    assert_eq!(status.drift_detected(), None);
    assert_eq!(status.label(), "unknown");
    assert!(matches!(status, DriftStatus::Unknown { .. }));
}

#[test]
fn test_non_finite_window_rejected() {
    let monitor = DriftMonitor::default();
    let mut window = sample(60, Shift::default());
    window[3].avg_cvss = f64::NAN;
    let err = monitor
        .check(&sample(60, Shift::default()), &window)
        .unwrap_err();
    assert!(matches!(
        err,
        DriftError::NonFiniteValue {
            sample: "window",
            feature: Feature::AvgCvss
        }
    ));
}

#[test]
fn test_no_monitored_features() {
    let monitor = DriftMonitor::new(DriftConfig {
        monitored_features: vec![],
        ..Default::default()
    });
    let data = sample(60, Shift::default());
    assert!(matches!(
        monitor.check(&data, &data),
        Err(DriftError::NoMonitoredFeatures)
    ));
}

#[test]
fn test_retrain_eligibility() {
    let monitor = DriftMonitor::default();
    let shifted = Shift {
        services: 5.0,
        ..Default::default()
    };
    let drifted = monitor
        .check(&sample(60, Shift::default()), &sample(60, shifted))
        .unwrap();
    assert!(retrain_eligibility(&drifted, 250, 200).eligible);

    let short = retrain_eligibility(&drifted, 120, 200);
    assert!(!short.eligible);
    assert!(short.reason.contains("120"));

    let stable = monitor
        .check(&sample(60, Shift::default()), &sample(60, Shift::default()))
        .unwrap();
    assert!(!retrain_eligibility(&stable, 1000, 200).eligible);
}

#[test]
fn test_config_validation() {
    assert!(DriftConfig::default().validate().is_ok());

    let duplicated = DriftConfig {
        monitored_features: vec![Feature::AvgCvss, Feature::AvgCvss],
        ..Default::default()
    };
    assert!(duplicated.validate().is_err());

    let bad_alpha = DriftConfig {
        significance_level: 1.5,
        ..Default::default()
    };
    assert!(bad_alpha.validate().is_err());
}

#[test]
fn test_reference_snapshot_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("reference.json");

    let snapshot = ReferenceSnapshot::new("training-2026-09", sample(40, Shift::default()));
    snapshot.save(&path).unwrap();

    let loaded = ReferenceSnapshot::load(&path).unwrap();
    assert_eq!(loaded.len(), 40);
    assert_eq!(loaded.source, "training-2026-09");
    assert_eq!(loaded.layout_hash, layout_hash());
}

#[test]
fn test_reference_snapshot_layout_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reference.json");

    let mut snapshot = ReferenceSnapshot::new("old", sample(40, Shift::default()));
    snapshot.layout_hash = !layout_hash();
    std::fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

    assert!(matches!(
        ReferenceSnapshot::load(&path),
        Err(DriftError::Layout(_))
    ));
}

#[test]
fn test_drift_status_serializes_tagged() {
    let status = DriftStatus::Unknown {
        reason: "insufficient window data".to_string(),
    };
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["status"], "unknown");
    assert_eq!(json["reason"], "insufficient window data");
}
