//! Error handling
//!
//! Every failure carries the pipeline stage it came from so callers can
//! report `{stage, message}` without exposing model internals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::drift::DriftError;
use crate::logic::intel::IntelError;
use crate::logic::model::ArtifactError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Pipeline stage an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FeatureBuild,
    Classification,
    Attribution,
    Combination,
    Drift,
    ModelLoad,
    Configuration,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FeatureBuild => "feature_build",
            Stage::Classification => "classification",
            Stage::Attribution => "attribution",
            Stage::Combination => "combination",
            Stage::Drift => "drift",
            Stage::ModelLoad => "model_load",
            Stage::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid host facts: {0}")]
    InvalidHostFacts(String),

    #[error("no risk model is loaded")]
    ModelUnavailable,

    #[error("model artifact rejected: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("port intelligence catalog rejected: {0}")]
    Intel(#[from] IntelError),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("attribution failed: {0}")]
    Attribution(String),

    #[error("combination failed: {0}")]
    Combination(String),

    #[error("drift check failed: {0}")]
    Drift(#[from] DriftError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn stage(&self) -> Stage {
        match self {
            EngineError::InvalidHostFacts(_) => Stage::FeatureBuild,
            EngineError::ModelUnavailable | EngineError::Classification(_) => {
                Stage::Classification
            }
            EngineError::Attribution(_) => Stage::Attribution,
            EngineError::Combination(_) => Stage::Combination,
            EngineError::Drift(_) => Stage::Drift,
            EngineError::Artifact(_) => Stage::ModelLoad,
            EngineError::Intel(_) | EngineError::Config(_) | EngineError::Io(_) => {
                Stage::Configuration
            }
        }
    }

    /// Caller-facing report. Artifact and IO details stay in the logs.
    pub fn public_report(&self) -> ErrorReport {
        let message = match self {
            EngineError::Artifact(_) => "model artifact could not be loaded".to_string(),
            EngineError::Io(_) => "input could not be read".to_string(),
            other => other.to_string(),
        };
        ErrorReport {
            stage: self.stage(),
            message,
        }
    }
}

/// Serializable `{stage, message}` pair handed to outer surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub stage: Stage,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(
            EngineError::InvalidHostFacts("x".into()).stage(),
            Stage::FeatureBuild
        );
        assert_eq!(EngineError::ModelUnavailable.stage(), Stage::Classification);
        assert_eq!(
            EngineError::Combination("x".into()).stage(),
            Stage::Combination
        );
    }

    #[test]
    fn test_bad_catalog_is_configuration() {
        let err = EngineError::from(IntelError::InvalidPort);
        assert_eq!(err.stage(), Stage::Configuration);
        let json = serde_json::to_value(err.public_report()).unwrap();
        assert_eq!(json["stage"], "configuration");
    }

    #[test]
    fn test_public_report_hides_artifact_details() {
        let err = EngineError::Artifact(ArtifactError::Structure(
            "tree 0 node 3: threshold 4.25".into(),
        ));
        let report = err.public_report();
        assert_eq!(report.stage, Stage::ModelLoad);
        assert!(!report.message.contains("4.25"));
    }

    #[test]
    fn test_model_unavailable_is_distinct() {
        let report = EngineError::ModelUnavailable.public_report();
        assert_eq!(report.message, "no risk model is loaded");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "classification");
    }
}
