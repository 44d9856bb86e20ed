//! Hybrid Decision Types

use serde::{Deserialize, Serialize};

use crate::logic::intel::RiskTier;

/// Final decision for one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridVerdict {
    pub final_tier: RiskTier,
    /// 0 - 100, inside the final tier's band
    pub final_score: f64,
    pub escalation_applied: bool,
    pub classifier_tier: RiskTier,
    pub classifier_confidence: f64,
    pub port_intelligence_tier: RiskTier,
    pub critical_port_count: usize,
    pub high_port_count: usize,
    pub justification: String,
}
