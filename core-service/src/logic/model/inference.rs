//! Inference - Calibrated Tree Classifier
//!
//! `RiskClassifier` is the seam the engine depends on; `CoalitionValue` is
//! what the attributor needs. `CalibratedClassifier` implements both over a
//! validated `TreeEnsemble` and `Calibration`.

use serde::{Deserialize, Serialize};

use super::calibration::Calibration;
use super::tree::TreeEnsemble;
use crate::error::EngineError;
use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use crate::logic::intel::RiskTier;

/// Bitmask with every feature known
pub const FULL_COALITION: u16 = (1u16 << FEATURE_COUNT) - 1;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Calibrated probability per tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierProbabilities {
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Medium")]
    pub medium: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Critical")]
    pub critical: f64,
}

impl TierProbabilities {
    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            low: values[0],
            medium: values[1],
            high: values[2],
            critical: values[3],
        }
    }

    pub fn get(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
            RiskTier::Critical => self.critical,
        }
    }

    pub fn total(&self) -> f64 {
        RiskTier::ALL.iter().map(|t| self.get(*t)).sum()
    }

    /// Most likely tier; ties resolve to the more severe tier
    pub fn most_likely(&self) -> RiskTier {
        let mut best = RiskTier::Critical;
        for tier in RiskTier::ALL.iter().rev() {
            if self.get(*tier) > self.get(best) {
                best = *tier;
            }
        }
        best
    }
}

/// Classifier output for one host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub tier: RiskTier,
    /// Calibrated probability of `tier`
    pub confidence: f64,
    pub probabilities: TierProbabilities,
    /// Pre-calibration ensemble output for `tier`
    pub raw_output: f64,
}

/// Descriptive, parameter-free summary of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub algorithm: String,
    pub calibration: String,
    pub tree_count: usize,
}

// ============================================================================
// CAPABILITIES
// ============================================================================

pub trait RiskClassifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<ClassifierVerdict, EngineError>;
}

pub trait CoalitionValue: Send + Sync {
    /// Expected raw output for `tier` when only the features whose bits are
    /// set in `coalition` are known
    fn coalition_value(&self, features: &[f64; FEATURE_COUNT], coalition: u16, tier: RiskTier) -> f64;
}

/// Everything the engine needs from a loaded model
pub trait RiskModel: RiskClassifier + CoalitionValue {
    fn descriptor(&self) -> ModelDescriptor;
}

// ============================================================================
// CALIBRATED CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct CalibratedClassifier {
    ensemble: TreeEnsemble,
    calibration: Calibration,
    /// Ensemble output index → tier
    classes: [RiskTier; 4],
}

impl CalibratedClassifier {
    /// `classes` must be a permutation of the four tiers matching the
    /// ensemble's output order
    pub fn new(
        ensemble: TreeEnsemble,
        calibration: Calibration,
        classes: &[RiskTier],
    ) -> Result<Self, String> {
        let order: [RiskTier; 4] = classes
            .try_into()
            .map_err(|_| format!("expected 4 classes, found {}", classes.len()))?;
        for tier in RiskTier::ALL {
            if !order.contains(&tier) {
                return Err(format!("class list is missing {}", tier));
            }
        }
        if ensemble.n_classes != order.len() {
            return Err(format!(
                "ensemble has {} outputs for {} classes",
                ensemble.n_classes,
                order.len()
            ));
        }
        ensemble.validate()?;
        calibration.validate(order.len())?;

        Ok(Self {
            ensemble,
            calibration,
            classes: order,
        })
    }

    fn class_index(&self, tier: RiskTier) -> usize {
        self.classes.iter().position(|t| *t == tier).unwrap_or(0)
    }
}

impl RiskClassifier for CalibratedClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<ClassifierVerdict, EngineError> {
        let x = features.to_array();
        if x.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::Classification(
                "feature vector contains non-finite values".to_string(),
            ));
        }

        let raw = self.ensemble.raw_scores(&x);
        let calibrated = self.calibration.apply(&self.ensemble.probabilities(&raw));

        let mut by_tier = [0.0; 4];
        for (index, tier) in self.classes.iter().enumerate() {
            by_tier[tier.index()] = calibrated[index];
        }
        if by_tier.iter().any(|p| !p.is_finite()) {
            return Err(EngineError::Classification(
                "model produced non-finite probabilities".to_string(),
            ));
        }

        let probabilities = TierProbabilities::from_array(by_tier);
        let tier = probabilities.most_likely();

        Ok(ClassifierVerdict {
            tier,
            confidence: probabilities.get(tier),
            probabilities,
            raw_output: raw[self.class_index(tier)],
        })
    }
}

impl CoalitionValue for CalibratedClassifier {
    fn coalition_value(&self, features: &[f64; FEATURE_COUNT], coalition: u16, tier: RiskTier) -> f64 {
        self.ensemble
            .expected_raw(features, coalition, self.class_index(tier))
    }
}

impl RiskModel for CalibratedClassifier {
    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor {
            algorithm: self.ensemble.aggregation.algorithm_name().to_string(),
            calibration: self.calibration.name().to_string(),
            tree_count: self.ensemble.tree_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::fixtures;

    #[test]
    fn test_scenario_host_predicts_high() {
        let model = fixtures::classifier();
        let verdict = model.predict(&fixtures::smb_rpc_features()).unwrap();
        assert_eq!(verdict.tier, RiskTier::High);
        assert!((verdict.confidence - 0.375).abs() < 1e-9);
        assert!((verdict.probabilities.total() - 1.0).abs() < 1e-9);
        assert!((verdict.raw_output - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_empty_host_predicts_low() {
        let model = fixtures::classifier();
        let verdict = model.predict(&FeatureVector::default()).unwrap();
        assert_eq!(verdict.tier, RiskTier::Low);
        assert!((verdict.confidence - 0.7125).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let model = fixtures::classifier();
        let features = fixtures::smb_rpc_features();
        assert_eq!(model.predict(&features).unwrap(), model.predict(&features).unwrap());
    }

    #[test]
    fn test_ties_break_toward_severity() {
        let probabilities = TierProbabilities::from_array([0.3, 0.3, 0.2, 0.2]);
        assert_eq!(probabilities.most_likely(), RiskTier::Medium);
        let even = TierProbabilities::from_array([0.25; 4]);
        assert_eq!(even.most_likely(), RiskTier::Critical);
    }

    #[test]
    fn test_non_finite_features_rejected() {
        let model = fixtures::classifier();
        let mut features = FeatureVector::default();
        features.avg_cvss = f64::NAN;
        assert!(matches!(
            model.predict(&features),
            Err(EngineError::Classification(_))
        ));
    }

    #[test]
    fn test_class_permutation_maps_outputs() {
        let artifact = fixtures::artifact();
        // Reverse both the class list and every leaf
        let mut ensemble = artifact.ensemble.clone();
        for tree in &mut ensemble.trees {
            for node in &mut tree.nodes {
                if let crate::logic::model::TreeNode::Leaf { value, .. } = node {
                    value.reverse();
                }
            }
        }
        let reversed = CalibratedClassifier::new(
            ensemble,
            Calibration::None,
            &[RiskTier::Critical, RiskTier::High, RiskTier::Medium, RiskTier::Low],
        )
        .unwrap();
        let original = fixtures::classifier();
        let features = fixtures::smb_rpc_features();
        let a = original.predict(&features).unwrap();
        let b = reversed.predict(&features).unwrap();
        assert_eq!(a.tier, b.tier);
        assert!((a.confidence - b.confidence).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_class_list_rejected() {
        let artifact = fixtures::artifact();
        let result = CalibratedClassifier::new(
            artifact.ensemble,
            Calibration::None,
            &[RiskTier::Low, RiskTier::Low, RiskTier::High, RiskTier::Critical],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_descriptor_has_no_parameters() {
        let descriptor = fixtures::classifier().descriptor();
        assert_eq!(descriptor.algorithm, "random_forest");
        assert_eq!(descriptor.tree_count, 4);
    }
}
