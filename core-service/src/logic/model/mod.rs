//! Model Module - Calibrated Risk Classifier
//!
//! - `tree.rs`: flat-array tree ensemble and coalition expectations
//! - `calibration.rs`: probability calibration layer
//! - `inference.rs`: classifier capabilities and the calibrated classifier
//! - `artifact.rs`: JSON artifact, layout and checksum validation
//! - `registry.rs`: atomically swappable active model
//! - `evaluation.rs`: weighted metrics and promotion gate

pub mod artifact;
pub mod calibration;
pub mod evaluation;
pub mod inference;
pub mod registry;
pub mod tree;

#[cfg(test)]
pub(crate) mod fixtures;

pub use artifact::{ArtifactError, ModelArtifact, TrainingInfo};
pub use calibration::Calibration;
pub use evaluation::{evaluate, EvaluationMetrics, LabeledSample, PromotionDecision};
pub use inference::{
    CalibratedClassifier, ClassifierVerdict, CoalitionValue, ModelDescriptor, RiskClassifier,
    RiskModel, TierProbabilities, FULL_COALITION,
};
pub use registry::{LoadedModel, ModelMetadata, ModelRegistry};
pub use tree::{Aggregation, DecisionTree, TreeEnsemble, TreeNode};
