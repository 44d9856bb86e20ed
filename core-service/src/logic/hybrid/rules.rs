//! Hybrid Decision Rules & Weights
//!
//! Constants and configurable weights for the final score. No combine logic.

use serde::{Deserialize, Serialize};

use crate::logic::intel::RiskTier;

// ============================================================================
// WEIGHTS
// ============================================================================

/// Weight of the classifier's probability-weighted tier anchor
pub const CLASSIFIER_WEIGHT: f64 = 0.85;

/// Weight of the catalog severity index
pub const SEVERITY_WEIGHT: f64 = 0.15;

/// `port_severity_score` at which the severity index reaches ~63
pub const SEVERITY_SCALE: f64 = 4.0;

/// Escalated scores sit at least this far below the tier ceiling
pub const ESCALATION_MARGIN: f64 = 5.0;

// ============================================================================
// TIER ANCHORS AND BANDS
// ============================================================================

/// Score a tier contributes when the classifier is certain of it
pub fn tier_anchor(tier: RiskTier) -> f64 {
    match tier {
        RiskTier::Low => 0.0,
        RiskTier::Medium => 40.0,
        RiskTier::High => 70.0,
        RiskTier::Critical => 100.0,
    }
}

/// Inclusive score range a final tier may report
pub fn tier_band(tier: RiskTier) -> (f64, f64) {
    match tier {
        RiskTier::Low => (0.0, 25.0),
        RiskTier::Medium => (25.0, 50.0),
        RiskTier::High => (50.0, 75.0),
        RiskTier::Critical => (75.0, 100.0),
    }
}

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridThresholds {
    pub classifier_weight: f64,
    pub severity_weight: f64,
    pub severity_scale: f64,
    pub escalation_margin: f64,
}

impl Default for HybridThresholds {
    fn default() -> Self {
        Self {
            classifier_weight: CLASSIFIER_WEIGHT,
            severity_weight: SEVERITY_WEIGHT,
            severity_scale: SEVERITY_SCALE,
            escalation_margin: ESCALATION_MARGIN,
        }
    }
}

impl HybridThresholds {
    pub fn validate(&self) -> Result<(), String> {
        let weights = [self.classifier_weight, self.severity_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("hybrid weights must be non-negative".to_string());
        }
        if (self.classifier_weight + self.severity_weight - 1.0).abs() > 1e-9 {
            return Err("hybrid weights must sum to 1".to_string());
        }
        if self.classifier_weight < self.severity_weight {
            return Err("classifier weight must dominate severity weight".to_string());
        }
        if !self.severity_scale.is_finite() || self.severity_scale <= 0.0 {
            return Err("severity scale must be positive".to_string());
        }
        if !(0.0..=25.0).contains(&self.escalation_margin) {
            return Err("escalation margin must be within 0-25".to_string());
        }
        Ok(())
    }
}
