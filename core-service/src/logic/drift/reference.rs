//! Reference snapshot: the training-time feature distribution, stored as
//! layout-versioned JSON and validated on load.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::DriftError;
use crate::logic::features::layout::{layout_hash, validate_layout};
use crate::logic::features::{FeatureVector, FEATURE_VERSION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub created_at: DateTime<Utc>,
    /// Free-form origin, e.g. training dataset name
    pub source: String,
    pub samples: Vec<FeatureVector>,
}

impl ReferenceSnapshot {
    pub fn new(source: &str, samples: Vec<FeatureVector>) -> Self {
        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            created_at: Utc::now(),
            source: source.to_string(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn validate(&self) -> Result<(), DriftError> {
        validate_layout(self.feature_version, self.layout_hash)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), DriftError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        log::info!(
            "Saved reference snapshot ({} samples) to {}",
            self.samples.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, DriftError> {
        let data = fs::read(path)?;
        let snapshot: ReferenceSnapshot = serde_json::from_slice(&data)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
