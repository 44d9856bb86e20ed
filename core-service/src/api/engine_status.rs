//! Admin View - Engine Status
//!
//! Operator-facing status: active model metadata (never parameters),
//! training provenance, drift status and counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::APP_VERSION;
use crate::logic::drift::DriftStatus;
use crate::logic::engine::RiskEngine;
use crate::logic::features::layout::layout_hash;
use crate::logic::features::{FEATURE_COUNT, FEATURE_VERSION};
use crate::logic::model::{ModelMetadata, TrainingInfo};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub engine_version: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,

    pub model: ModelStatus,
    pub operations: OperationalMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub metadata: Option<ModelMetadata>,
    pub training: Option<TrainingInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalMetrics {
    pub analyses_processed: u64,
    pub catalog_records: usize,
    pub drift_status: String,
    pub drift: DriftStatus,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

pub fn engine_status(engine: &RiskEngine, drift: &DriftStatus) -> EngineStatus {
    let metadata = engine.models().metadata();
    EngineStatus {
        engine_version: APP_VERSION.to_string(),
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        feature_count: FEATURE_COUNT,
        model: ModelStatus {
            loaded: metadata.is_some(),
            training: metadata.as_ref().map(|m| m.training.clone()),
            metadata,
        },
        operations: OperationalMetrics {
            analyses_processed: engine.analyses_processed(),
            catalog_records: engine.store().len(),
            drift_status: drift.label().to_string(),
            drift: drift.clone(),
            started_at: engine.started_at(),
            generated_at: Utc::now(),
        },
    }
}
