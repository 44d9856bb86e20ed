//! Model Artifact
//!
//! JSON serialization of a trained ensemble plus everything needed to trust
//! it at load time: the feature names it was trained on, its class order,
//! calibration and training provenance.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::calibration::Calibration;
use super::inference::CalibratedClassifier;
use super::tree::TreeEnsemble;
use crate::logic::features::layout::{names_match_layout, FEATURE_VERSION};
use crate::logic::intel::RiskTier;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("artifact feature layout v{found_version} {found:?} does not match the current layout")]
    LayoutMismatch {
        found_version: u8,
        found: Vec<String>,
    },

    #[error("artifact structure invalid: {0}")]
    Structure(String),

    #[error("artifact checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Provenance recorded by the training pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingInfo {
    pub trained_at: Option<DateTime<Utc>>,
    pub training_samples: u64,
    pub validation_f1: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_id: String,
    pub model_version: String,
    pub feature_version: u8,
    pub feature_names: Vec<String>,
    /// Tier of each ensemble output, in output order
    pub classes: Vec<RiskTier>,
    pub ensemble: TreeEnsemble,
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub training: TrainingInfo,
}

/// Hex SHA-256 of artifact bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl ModelArtifact {
    /// Parse and validate
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read, optionally verify the checksum, parse and validate.
    /// Returns the artifact with the checksum of the bytes read.
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> Result<(Self, String), ArtifactError> {
        let bytes = fs::read(path)?;
        let checksum = sha256_hex(&bytes);

        if let Some(expected) = expected_sha256 {
            if !expected.trim().eq_ignore_ascii_case(&checksum) {
                return Err(ArtifactError::ChecksumMismatch {
                    expected: expected.trim().to_lowercase(),
                    actual: checksum,
                });
            }
        }

        let artifact = Self::from_slice(&bytes)?;
        Ok((artifact, checksum))
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature_version != FEATURE_VERSION || !names_match_layout(&self.feature_names) {
            return Err(ArtifactError::LayoutMismatch {
                found_version: self.feature_version,
                found: self.feature_names.clone(),
            });
        }
        if self.model_id.trim().is_empty() {
            return Err(ArtifactError::Structure("model id is empty".to_string()));
        }
        let complete = RiskTier::ALL.iter().all(|t| self.classes.contains(t));
        if self.classes.len() != RiskTier::ALL.len() || !complete {
            return Err(ArtifactError::Structure(
                "classes must list each risk tier exactly once".to_string(),
            ));
        }
        self.ensemble.validate().map_err(ArtifactError::Structure)?;
        self.calibration
            .validate(self.ensemble.n_classes)
            .map_err(ArtifactError::Structure)?;
        Ok(())
    }

    /// Build the runtime classifier
    pub fn classifier(&self) -> Result<CalibratedClassifier, ArtifactError> {
        self.validate()?;
        CalibratedClassifier::new(
            self.ensemble.clone(),
            self.calibration.clone(),
            &self.classes,
        )
        .map_err(ArtifactError::Structure)
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::fixtures;
    use crate::logic::model::RiskClassifier;

    const SHIPPED_MODEL: &[u8] = include_bytes!("../../../models/port_risk_v1.json");

    #[test]
    fn test_shipped_model_loads() {
        let artifact = ModelArtifact::from_slice(SHIPPED_MODEL).unwrap();
        assert_eq!(artifact.classes, RiskTier::ALL.to_vec());
        assert_eq!(artifact.calibration.name(), "temperature");
        let classifier = artifact.classifier().unwrap();
        let verdict = classifier.predict(&fixtures::smb_rpc_features()).unwrap();
        assert_eq!(verdict.tier, RiskTier::High);
    }

    #[test]
    fn test_reordered_features_rejected() {
        let mut artifact = fixtures::artifact();
        artifact.feature_names.swap(1, 2);
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn test_old_feature_version_rejected() {
        let mut artifact = fixtures::artifact();
        artifact.feature_version = FEATURE_VERSION + 1;
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_calibration_rejected() {
        let mut artifact = fixtures::artifact();
        artifact.calibration = Calibration::Temperature { temperature: -1.0 };
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::Structure(_))
        ));
    }

    #[test]
    fn test_load_with_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let bytes = fixtures::artifact().to_json_pretty().unwrap();
        fs::write(&path, &bytes).unwrap();

        let expected = sha256_hex(&bytes);
        let (artifact, checksum) = ModelArtifact::load(&path, Some(&expected)).unwrap();
        assert_eq!(checksum, expected);
        assert_eq!(artifact.model_id, "fixture-forest");
        assert_eq!(artifact.ensemble.tree_count(), 4);

        let wrong = "0".repeat(64);
        assert!(matches!(
            ModelArtifact::load(&path, Some(&wrong)),
            Err(ArtifactError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelArtifact::load(&dir.path().join("absent.json"), None);
        assert!(matches!(result, Err(ArtifactError::Io(_))));
    }
}
