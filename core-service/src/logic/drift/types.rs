use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::layout::LayoutMismatchError;
use crate::logic::features::Feature;

// ============================================================================
// CONSTANTS
// ============================================================================

pub const DEFAULT_KS_THRESHOLD: f64 = 0.25;
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;
pub const DEFAULT_FLAGGED_RATIO: f64 = 0.5;
pub const DEFAULT_MIN_REFERENCE: usize = 30;
pub const DEFAULT_MIN_WINDOW: usize = 50;
pub const DEFAULT_MIN_RETRAIN_SAMPLES: usize = 200;
pub const DEFAULT_MAX_WINDOW: usize = 1000;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum DriftError {
    #[error("insufficient {sample} data: {found} vectors, {required} required")]
    InsufficientData {
        sample: &'static str,
        found: usize,
        required: usize,
    },

    #[error("non-finite value in {sample} for {feature}")]
    NonFiniteValue {
        sample: &'static str,
        feature: Feature,
    },

    #[error("no features configured for drift monitoring")]
    NoMonitoredFeatures,

    #[error("reference snapshot unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("reference snapshot malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("reference snapshot: {0}")]
    Layout(#[from] LayoutMismatchError),
}

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub monitored_features: Vec<Feature>,
    /// Flag a feature when its KS statistic exceeds this
    pub ks_statistic_threshold: f64,
    /// ... or when its p-value falls below this
    pub significance_level: f64,
    /// Overall drift when the flagged fraction exceeds this (one flagged
    /// feature is always enough)
    pub flagged_ratio: f64,
    pub min_reference_samples: usize,
    pub min_window_samples: usize,
    /// Most recent scan log records taken as the window
    pub max_window_samples: usize,
    /// New samples required before a retrain is worth running
    pub min_retrain_samples: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            monitored_features: vec![
                Feature::OpenPortsCount,
                Feature::AvgCvss,
                Feature::ServiceCount,
            ],
            ks_statistic_threshold: DEFAULT_KS_THRESHOLD,
            significance_level: DEFAULT_SIGNIFICANCE,
            flagged_ratio: DEFAULT_FLAGGED_RATIO,
            min_reference_samples: DEFAULT_MIN_REFERENCE,
            min_window_samples: DEFAULT_MIN_WINDOW,
            max_window_samples: DEFAULT_MAX_WINDOW,
            min_retrain_samples: DEFAULT_MIN_RETRAIN_SAMPLES,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.monitored_features.is_empty() {
            return Err("drift monitoring needs at least one feature".to_string());
        }
        for (i, feature) in self.monitored_features.iter().enumerate() {
            if self.monitored_features[..i].contains(feature) {
                return Err(format!("feature {} monitored twice", feature));
            }
        }
        if !(0.0..=1.0).contains(&self.ks_statistic_threshold) {
            return Err("ks_statistic_threshold must be within 0-1".to_string());
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err("significance_level must be within (0, 1)".to_string());
        }
        if !(0.0..=1.0).contains(&self.flagged_ratio) {
            return Err("flagged_ratio must be within 0-1".to_string());
        }
        if self.min_reference_samples == 0 || self.min_window_samples == 0 {
            return Err("minimum sample sizes must be positive".to_string());
        }
        if self.max_window_samples < self.min_window_samples {
            return Err("max_window_samples must not be below min_window_samples".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    None,
    RetrainRecommended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDrift {
    pub feature: Feature,
    pub statistic: f64,
    pub p_value: f64,
    pub drifted: bool,
    pub reference_mean: f64,
    pub window_mean: f64,
    /// Mean relative change of mean, median and std in percent. Informational.
    pub shift_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub features: Vec<FeatureDrift>,
    pub flagged_count: usize,
    pub flagged_fraction: f64,
    pub drift_detected: bool,
    pub recommended_action: RecommendedAction,
    pub reference_samples: usize,
    pub window_samples: usize,
    pub checked_at: DateTime<Utc>,
}

impl DriftReport {
    pub fn flagged(&self) -> impl Iterator<Item = &FeatureDrift> {
        self.features.iter().filter(|f| f.drifted)
    }
}

/// Drift outcome as surfaced to operators. A failed check is `Unknown`,
/// never "no drift".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftStatus {
    Unknown { reason: String },
    Checked(DriftReport),
}

impl DriftStatus {
    pub fn drift_detected(&self) -> Option<bool> {
        match self {
            DriftStatus::Unknown { .. } => None,
            DriftStatus::Checked(report) => Some(report.drift_detected),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.drift_detected() {
            None => "unknown",
            Some(true) => "drift_detected",
            Some(false) => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrainEligibility {
    pub eligible: bool,
    pub new_samples: usize,
    pub required_samples: usize,
    pub reason: String,
}
