//! Test fixtures: a small hand-built forest over four features.
//!
//! Zero-port hosts land on Low (0.7125); the SMB + RPC Windows host lands on
//! High (0.375) with Critical second (0.2625).

use super::artifact::{ModelArtifact, TrainingInfo};
use super::calibration::Calibration;
use super::inference::CalibratedClassifier;
use super::tree::{Aggregation, DecisionTree, TreeEnsemble, TreeNode};
use crate::logic::features::{FeatureVector, FEATURE_LAYOUT, FEATURE_VERSION};
use crate::logic::intel::RiskTier;

fn split(feature: usize, threshold: f64, left: usize, right: usize, cover: f64) -> TreeNode {
    TreeNode::Split {
        feature,
        threshold,
        left,
        right,
        cover,
    }
}

fn leaf(value: [f64; 4], cover: f64) -> TreeNode {
    TreeNode::Leaf {
        value: value.to_vec(),
        cover,
    }
}

pub fn ensemble() -> TreeEnsemble {
    let trees = vec![
        // avg_cvss
        DecisionTree {
            nodes: vec![
                split(2, 4.0, 1, 2, 100.0),
                leaf([0.8, 0.15, 0.05, 0.0], 40.0),
                split(2, 7.5, 3, 4, 60.0),
                leaf([0.2, 0.6, 0.15, 0.05], 30.0),
                leaf([0.0, 0.15, 0.55, 0.30], 30.0),
            ],
        },
        // port_severity_score
        DecisionTree {
            nodes: vec![
                split(5, 2.0, 1, 2, 100.0),
                leaf([0.75, 0.2, 0.05, 0.0], 45.0),
                split(5, 6.0, 3, 4, 55.0),
                leaf([0.1, 0.5, 0.3, 0.1], 30.0),
                leaf([0.0, 0.1, 0.4, 0.5], 25.0),
            ],
        },
        // open_ports_count
        DecisionTree {
            nodes: vec![
                split(0, 3.0, 1, 2, 100.0),
                leaf([0.6, 0.3, 0.1, 0.0], 55.0),
                split(0, 8.0, 3, 4, 45.0),
                leaf([0.2, 0.4, 0.3, 0.1], 25.0),
                leaf([0.05, 0.2, 0.4, 0.35], 20.0),
            ],
        },
        // high_risk_port_count, then os_flag
        DecisionTree {
            nodes: vec![
                split(6, 0.5, 1, 2, 100.0),
                split(4, 0.5, 3, 4, 60.0),
                leaf([0.05, 0.25, 0.45, 0.25], 40.0),
                leaf([0.7, 0.25, 0.05, 0.0], 40.0),
                leaf([0.45, 0.35, 0.15, 0.05], 20.0),
            ],
        },
    ];

    TreeEnsemble {
        n_classes: 4,
        aggregation: Aggregation::Average,
        base_score: vec![],
        trees,
    }
}

pub fn artifact() -> ModelArtifact {
    ModelArtifact {
        model_id: "fixture-forest".to_string(),
        model_version: "1.0.0".to_string(),
        feature_version: FEATURE_VERSION,
        feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        classes: RiskTier::ALL.to_vec(),
        ensemble: ensemble(),
        calibration: Calibration::None,
        training: TrainingInfo {
            trained_at: None,
            training_samples: 400,
            validation_f1: Some(0.91),
        },
    }
}

pub fn classifier() -> CalibratedClassifier {
    let artifact = artifact();
    CalibratedClassifier::new(artifact.ensemble, artifact.calibration, &artifact.classes)
        .expect("fixture model is valid")
}

/// Features of a Windows host exposing 445/microsoft-ds (9.8) and 135/msrpc (7.8)
pub fn smb_rpc_features() -> FeatureVector {
    FeatureVector {
        open_ports_count: 2.0,
        service_count: 2.0,
        avg_cvss: 8.8,
        uncommon_ports: 2.0,
        os_flag: 1.0,
        port_severity_score: 6.26,
        high_risk_port_count: 2.0,
        service_entropy: 1.0,
        cvss_variance: 1.0,
    }
}
