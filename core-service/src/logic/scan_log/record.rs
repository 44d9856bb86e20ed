use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::engine::HostAnalysis;
use crate::logic::features::layout::layout_hash;
use crate::logic::features::{FeatureVector, FEATURE_VERSION};
use crate::logic::intel::RiskTier;

/// One analyzed host, as appended to the scan log
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScanLogRecord {
    pub analysis_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub host_id: String,

    // Feature contract
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: FeatureVector,

    // Decision
    pub classifier_tier: RiskTier,
    pub confidence: f64,
    pub final_tier: RiskTier,
    pub final_score: f64,
    pub escalation_applied: bool,
}

impl ScanLogRecord {
    pub fn from_analysis(analysis: &HostAnalysis) -> Self {
        Self {
            analysis_id: analysis.analysis_id,
            timestamp: analysis.analyzed_at,
            host_id: analysis.host.host_id().to_string(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            features: analysis.features,
            classifier_tier: analysis.classifier.tier,
            confidence: analysis.classifier.confidence,
            final_tier: analysis.hybrid.final_tier,
            final_score: analysis.hybrid.final_score,
            escalation_applied: analysis.hybrid.escalation_applied,
        }
    }

    pub fn matches_layout(&self) -> bool {
        self.feature_version == FEATURE_VERSION && self.layout_hash == layout_hash()
    }
}
