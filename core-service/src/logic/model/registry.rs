//! Model Registry
//!
//! Holds the active model behind a `parking_lot::RwLock<Option<Arc<..>>>`.
//! Readers clone the `Arc` and release the lock immediately, so a reload
//! never changes the model under an analysis that already started.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::artifact::{ArtifactError, ModelArtifact, TrainingInfo};
use super::evaluation::{evaluate, LabeledSample, PromotionDecision};
use super::inference::RiskModel;
use crate::error::EngineError;
use crate::logic::features::layout::layout_hash;
use crate::logic::features::{FEATURE_LAYOUT, FEATURE_VERSION};
use crate::logic::intel::RiskTier;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata surfaced to operators. Never contains tree parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_version: String,
    pub algorithm: String,
    pub calibration: String,
    pub tree_count: usize,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<RiskTier>,
    pub training: TrainingInfo,
    pub checksum: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

/// A model plus its metadata, swapped as one unit
pub struct LoadedModel {
    model: Arc<dyn RiskModel>,
    metadata: ModelMetadata,
}

impl LoadedModel {
    pub fn new(model: Arc<dyn RiskModel>, metadata: ModelMetadata) -> Self {
        Self { model, metadata }
    }

    pub fn from_artifact(artifact: ModelArtifact, checksum: Option<String>) -> Result<Self, ArtifactError> {
        let classifier = artifact.classifier()?;
        let descriptor = classifier.descriptor();
        let metadata = ModelMetadata {
            model_id: artifact.model_id,
            model_version: artifact.model_version,
            algorithm: descriptor.algorithm,
            calibration: descriptor.calibration,
            tree_count: descriptor.tree_count,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            classes: artifact.classes,
            training: artifact.training,
            checksum,
            loaded_at: Utc::now(),
        };
        Ok(Self::new(Arc::new(classifier), metadata))
    }

    pub fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Default)]
pub struct ModelRegistry {
    active: RwLock<Option<Arc<LoadedModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: LoadedModel) -> Self {
        let registry = Self::new();
        registry.install(model);
        registry
    }

    /// Atomically replace the active model, returning the previous one
    pub fn install(&self, model: LoadedModel) -> Option<Arc<LoadedModel>> {
        log::info!(
            "Activating model {} v{} ({}, calibration: {})",
            model.metadata.model_id,
            model.metadata.model_version,
            model.metadata.algorithm,
            model.metadata.calibration
        );
        self.active.write().replace(Arc::new(model))
    }

    /// Load, verify and activate an artifact from disk
    pub fn load_file(
        &self,
        path: &Path,
        expected_sha256: Option<&str>,
    ) -> Result<Arc<LoadedModel>, EngineError> {
        let (artifact, checksum) = ModelArtifact::load(path, expected_sha256).map_err(|e| {
            log::error!("Rejected model artifact {}: {}", path.display(), e);
            e
        })?;
        self.install(LoadedModel::from_artifact(artifact, Some(checksum))?);
        self.current()
    }

    /// Active model, or `ModelUnavailable`
    pub fn current(&self) -> Result<Arc<LoadedModel>, EngineError> {
        self.active
            .read()
            .as_ref()
            .cloned()
            .ok_or(EngineError::ModelUnavailable)
    }

    pub fn metadata(&self) -> Option<ModelMetadata> {
        self.active.read().as_ref().map(|m| m.metadata.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.active.read().is_some()
    }

    /// Evaluate `candidate` and the active model on the same samples and
    /// activate the candidate only when its weighted F1 is higher
    pub fn promote_if_better(
        &self,
        candidate: LoadedModel,
        samples: &[LabeledSample],
    ) -> Result<PromotionDecision, EngineError> {
        let candidate_metrics = evaluate(candidate.model(), samples)?;
        let incumbent_metrics = match self.current() {
            Ok(active) => Some(evaluate(active.model(), samples)?),
            Err(EngineError::ModelUnavailable) => None,
            Err(e) => return Err(e),
        };

        let decision = PromotionDecision::decide(candidate_metrics, incumbent_metrics);
        if decision.promoted {
            self.install(candidate);
        } else {
            log::info!("Keeping active model: {}", decision.reason);
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::fixtures;

    fn loaded() -> LoadedModel {
        LoadedModel::from_artifact(fixtures::artifact(), None).unwrap()
    }

    #[test]
    fn test_empty_registry_is_unavailable() {
        let registry = ModelRegistry::new();
        assert!(!registry.is_loaded());
        assert!(matches!(registry.current(), Err(EngineError::ModelUnavailable)));
        assert!(registry.metadata().is_none());
    }

    #[test]
    fn test_install_and_swap() {
        let registry = ModelRegistry::with_model(loaded());
        let first = registry.current().unwrap();
        assert_eq!(first.metadata().model_id, "fixture-forest");

        let mut artifact = fixtures::artifact();
        artifact.model_id = "second".to_string();
        let previous = registry.install(LoadedModel::from_artifact(artifact, None).unwrap());

        assert_eq!(previous.unwrap().metadata().model_id, "fixture-forest");
        assert_eq!(registry.current().unwrap().metadata().model_id, "second");
        // Handle taken before the swap still points at the old model
        assert_eq!(first.metadata().model_id, "fixture-forest");
    }

    #[test]
    fn test_metadata_reflects_layout() {
        let metadata = loaded().metadata().clone();
        assert_eq!(metadata.feature_names.len(), 9);
        assert_eq!(metadata.layout_hash, layout_hash());
        assert_eq!(metadata.algorithm, "random_forest");
        assert_eq!(metadata.calibration, "none");
    }

    #[test]
    fn test_load_file_rejects_bad_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut artifact = fixtures::artifact();
        artifact.feature_names.reverse();
        std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

        let registry = ModelRegistry::new();
        let err = registry.load_file(&path, None).unwrap_err();
        assert!(matches!(err, EngineError::Artifact(ArtifactError::LayoutMismatch { .. })));
        assert!(!registry.is_loaded());
    }

    #[test]
    fn test_load_file_records_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, fixtures::artifact().to_json_pretty().unwrap()).unwrap();

        let registry = ModelRegistry::new();
        let active = registry.load_file(&path, None).unwrap();
        assert_eq!(active.metadata().checksum.as_ref().map(|c| c.len()), Some(64));
    }

    #[test]
    fn test_promotion_without_active_model() {
        let registry = ModelRegistry::new();
        let samples = vec![LabeledSample {
            features: fixtures::smb_rpc_features(),
            label: RiskTier::High,
        }];
        let decision = registry.promote_if_better(loaded(), &samples).unwrap();
        assert!(decision.promoted);
        assert!(registry.is_loaded());
    }

    #[test]
    fn test_equal_candidate_not_promoted() {
        let registry = ModelRegistry::with_model(loaded());
        let mut artifact = fixtures::artifact();
        artifact.model_id = "candidate".to_string();
        let candidate = LoadedModel::from_artifact(artifact, None).unwrap();
        let samples = vec![LabeledSample {
            features: fixtures::smb_rpc_features(),
            label: RiskTier::High,
        }];

        let decision = registry.promote_if_better(candidate, &samples).unwrap();
        assert!(!decision.promoted);
        assert_eq!(registry.current().unwrap().metadata().model_id, "fixture-forest");
    }
}
