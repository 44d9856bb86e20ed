//! Dashboard & Report Views
//!
//! Pure projections of one `HostAnalysis`. Nothing here recomputes a
//! verdict; both views read the same analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::engine::HostAnalysis;
use crate::logic::explain::{AttributionEntry, TopAttributions};
use crate::logic::features::FeatureVector;
use crate::logic::intel::{Rating, RiskTier};
use crate::logic::model::TierProbabilities;
use crate::logic::posture::{risk_indicators, SecurityPosture};

fn percent(value: f64) -> f64 {
    (value * 10_000.0).round() / 100.0
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// Frontend-safe summary. No attribution and no model internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub host: String,
    pub final_risk: RiskTier,
    pub risk_score: f64,
    /// Percent
    pub confidence: f64,
    pub security_score: u8,
    pub posture_tier: RiskTier,
    pub open_ports: Vec<u16>,
    pub critical_port_count: usize,
    pub high_port_count: usize,
    pub total_ports: usize,
    pub active_services: Vec<String>,
    pub operating_system: String,
    pub recommendations: Vec<String>,
}

pub fn dashboard(analysis: &HostAnalysis) -> DashboardView {
    let host = &analysis.host;
    DashboardView {
        host: host.host_id().to_string(),
        final_risk: analysis.hybrid.final_tier,
        risk_score: analysis.hybrid.final_score,
        confidence: percent(analysis.classifier.confidence),
        security_score: analysis.posture.security_score,
        posture_tier: analysis.posture.posture_tier,
        open_ports: host.ports().iter().map(|p| p.port).collect(),
        critical_port_count: analysis.hybrid.critical_port_count,
        high_port_count: analysis.hybrid.high_port_count,
        total_ports: host.ports().len(),
        active_services: active_services(analysis),
        operating_system: host.os().to_string(),
        recommendations: analysis.posture.recommendations.clone(),
    }
}

fn active_services(analysis: &HostAnalysis) -> Vec<String> {
    let mut services: Vec<String> = analysis
        .host
        .ports()
        .iter()
        .map(|p| p.service.to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    services.sort();
    services.dedup();
    services
}

// ============================================================================
// DETAILED REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSection {
    pub predicted_risk: RiskTier,
    /// Percent
    pub confidence: f64,
    pub probabilities: TierProbabilities,
    pub algorithm: String,
    pub calibration: String,
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSection {
    pub classifier_risk: RiskTier,
    pub port_intelligence_risk: RiskTier,
    pub escalation_applied: bool,
    pub final_risk: RiskTier,
    pub final_risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortAnalysis {
    pub port: u16,
    pub service: String,
    pub label: String,
    pub risk_level: RiskTier,
    pub cvss_score: f64,
    pub vulnerability_ids: Vec<String>,
    pub exploitability: Rating,
    pub mitigation_priority: Rating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAnalysis {
    pub features: FeatureVector,
    pub risk_indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explainability {
    pub explained_tier: RiskTier,
    pub baseline: f64,
    pub top_features: TopAttributions,
    pub all_features: Vec<AttributionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub host: String,
    pub operating_system: String,
    pub active_services: Vec<String>,
    pub classifier: ClassifierSection,
    pub hybrid: HybridSection,
    /// Cataloged ports only
    pub port_analysis: Vec<PortAnalysis>,
    pub feature_analysis: FeatureAnalysis,
    pub explainability: Explainability,
    pub security_posture: SecurityPosture,
    pub justification: String,
}

pub fn report(analysis: &HostAnalysis, top_attributions: usize) -> ReportView {
    let classifier = &analysis.classifier;
    let hybrid = &analysis.hybrid;

    let port_analysis = analysis
        .ports
        .iter()
        .filter_map(|finding| {
            finding.record.as_ref().map(|record| PortAnalysis {
                port: finding.port,
                service: record.service.clone(),
                label: record.label.clone(),
                risk_level: record.tier,
                cvss_score: record.cvss,
                vulnerability_ids: record.vulnerability_ids.clone(),
                exploitability: record.exploitability,
                mitigation_priority: record.mitigation_priority,
            })
        })
        .collect();

    ReportView {
        analysis_id: analysis.analysis_id,
        analyzed_at: analysis.analyzed_at,
        host: analysis.host.host_id().to_string(),
        operating_system: analysis.host.os().to_string(),
        active_services: active_services(analysis),
        classifier: ClassifierSection {
            predicted_risk: classifier.tier,
            confidence: percent(classifier.confidence),
            probabilities: classifier.probabilities,
            algorithm: analysis.model.algorithm.clone(),
            calibration: analysis.model.calibration.clone(),
            model_version: analysis.model.model_version.clone(),
        },
        hybrid: HybridSection {
            classifier_risk: hybrid.classifier_tier,
            port_intelligence_risk: hybrid.port_intelligence_tier,
            escalation_applied: hybrid.escalation_applied,
            final_risk: hybrid.final_tier,
            final_risk_score: hybrid.final_score,
        },
        port_analysis,
        feature_analysis: FeatureAnalysis {
            features: analysis.features,
            risk_indicators: risk_indicators(&analysis.features),
        },
        explainability: Explainability {
            explained_tier: analysis.attribution.tier,
            baseline: analysis.attribution.baseline,
            top_features: analysis.attribution.top(top_attributions),
            all_features: analysis.attribution.ranked.clone(),
        },
        security_posture: analysis.posture.clone(),
        justification: hybrid.justification.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::logic::config::EngineConfig;
    use crate::logic::engine::RiskEngine;
    use crate::logic::host::{HostFacts, OpenPort};
    use crate::logic::intel::PortIntelligenceStore;
    use crate::logic::model::{fixtures, LoadedModel, ModelRegistry};

    fn analysis() -> HostAnalysis {
        let engine = RiskEngine::new(
            Arc::new(PortIntelligenceStore::builtin().unwrap()),
            Arc::new(ModelRegistry::with_model(
                LoadedModel::from_artifact(fixtures::artifact(), None).unwrap(),
            )),
            Arc::new(EngineConfig::default()),
        )
        .unwrap();
        let host = HostFacts::new(
            "10.0.0.5",
            "Windows 10",
            vec![
                OpenPort::new(445, "microsoft-ds", Some(9.8)),
                OpenPort::new(135, "msrpc", Some(7.8)),
                OpenPort::new(40000, "custom-agent", None),
            ],
        )
        .unwrap();
        engine.analyze(&host).unwrap()
    }

    #[test]
    fn test_dashboard_has_no_internals() {
        let analysis = analysis();
        let view = dashboard(&analysis);
        assert_eq!(view.final_risk, analysis.hybrid.final_tier);
        assert_eq!(view.open_ports, vec![135, 445, 40000]);
        assert_eq!(view.total_ports, 3);
        assert_eq!(view.active_services, vec!["custom-agent", "microsoft-ds", "msrpc"]);

        let json = serde_json::to_value(&view).unwrap();
        for hidden in ["attribution", "probabilities", "justification", "ensemble"] {
            assert!(json.get(hidden).is_none(), "dashboard exposes {}", hidden);
        }
    }

    #[test]
    fn test_report_sections_agree_with_analysis() {
        let analysis = analysis();
        let view = report(&analysis, 5);

        assert_eq!(view.hybrid.final_risk, analysis.hybrid.final_tier);
        assert_eq!(view.hybrid.final_risk_score, analysis.hybrid.final_score);
        assert_eq!(view.classifier.predicted_risk, analysis.classifier.tier);
        assert_eq!(view.classifier.algorithm, "random_forest");
        assert_eq!(view.justification, analysis.hybrid.justification);

        // Unknown port 40000 is not in the catalog section
        let ports: Vec<u16> = view.port_analysis.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![135, 445]);
        assert_eq!(view.port_analysis[1].label, "SMB");

        assert_eq!(view.explainability.top_features.shown, 5);
        assert_eq!(view.explainability.top_features.total, 9);
        assert_eq!(view.explainability.all_features.len(), 9);
    }

    #[test]
    fn test_views_share_one_verdict() {
        let analysis = analysis();
        let d = dashboard(&analysis);
        let r = report(&analysis, 3);
        assert_eq!(d.final_risk, r.hybrid.final_risk);
        assert_eq!(d.risk_score, r.hybrid.final_risk_score);
        assert_eq!(d.confidence, r.classifier.confidence);
        assert_eq!(r.explainability.top_features.shown, 3);
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(0.375), 37.5);
        assert_eq!(percent(0.71254), 71.25);
    }
}
