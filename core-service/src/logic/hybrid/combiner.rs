//! Hybrid Combiner - Core Decision Logic
//!
//! Combines the classifier verdict with catalog knowledge of the host's open
//! ports. Port intelligence may only raise the classifier's tier.
//!
//! ## Flow
//! 1. Port tier = highest catalog tier among open ports (Low when none known)
//! 2. Escalate when port tier > classifier tier; final tier = port tier
//! 3. Otherwise keep the classifier tier
//! 4. Score = probability-weighted tier anchor blended with severity index,
//!    clamped into the final tier's band; escalations pinned near the ceiling

use super::rules::{tier_anchor, tier_band, HybridThresholds};
use super::types::HybridVerdict;
use crate::error::EngineError;
use crate::logic::features::FeatureVector;
use crate::logic::host::HostFacts;
use crate::logic::intel::{PortIntelligenceStore, RiskTier};
use crate::logic::model::ClassifierVerdict;

const PROBABILITY_TOLERANCE: f64 = 1e-6;

// ============================================================================
// MAIN COMBINE FUNCTION
// ============================================================================

pub fn combine(
    features: &FeatureVector,
    verdict: &ClassifierVerdict,
    host: &HostFacts,
    store: &PortIntelligenceStore,
    thresholds: &HybridThresholds,
) -> Result<HybridVerdict, EngineError> {
    check_inputs(features, verdict, host)?;

    let port_tier = store.port_tier(host);
    let (critical, high) = store.exposure_counts(host);

    if !host.has_open_ports() {
        return Ok(HybridVerdict {
            final_tier: RiskTier::Low,
            final_score: 0.0,
            escalation_applied: false,
            classifier_tier: verdict.tier,
            classifier_confidence: verdict.confidence,
            port_intelligence_tier: port_tier,
            critical_port_count: 0,
            high_port_count: 0,
            justification: format!(
                "Final risk Low: no open ports detected. Classifier predicted {} ({:.1}% confidence); no escalation applied.",
                verdict.tier,
                verdict.confidence * 100.0
            ),
        });
    }

    let escalation_applied = port_tier > verdict.tier;
    let final_tier = if escalation_applied { port_tier } else { verdict.tier };
    let final_score = final_score(features, verdict, final_tier, escalation_applied, thresholds);

    if escalation_applied {
        log::info!(
            "Escalating {} from {} to {} ({} critical, {} high-risk port(s))",
            host.host_id(),
            verdict.tier,
            final_tier,
            critical,
            high
        );
    }

    let mut justification = format!(
        "Final risk {} ({:.2}/100). Classifier predicted {} with {:.1}% confidence. \
         Port intelligence rated the exposure {} ({} critical, {} high-risk port(s); average CVSS {:.2}). ",
        final_tier,
        final_score,
        verdict.tier,
        verdict.confidence * 100.0,
        port_tier,
        critical,
        high,
        features.avg_cvss
    );
    if escalation_applied {
        justification.push_str(&format!(
            "Escalation applied: raised from {} to {} because a cataloged port outranks the classifier.",
            verdict.tier, final_tier
        ));
    } else {
        justification.push_str("No escalation applied: classifier verdict retained.");
    }

    Ok(HybridVerdict {
        final_tier,
        final_score,
        escalation_applied,
        classifier_tier: verdict.tier,
        classifier_confidence: verdict.confidence,
        port_intelligence_tier: port_tier,
        critical_port_count: critical,
        high_port_count: high,
        justification,
    })
}

// ============================================================================
// SCORE
// ============================================================================

/// Catalog severity mapped onto 0-100 with saturation
pub fn severity_index(port_severity_score: f64, scale: f64) -> f64 {
    100.0 * (1.0 - (-port_severity_score.max(0.0) / scale).exp())
}

fn final_score(
    features: &FeatureVector,
    verdict: &ClassifierVerdict,
    final_tier: RiskTier,
    escalated: bool,
    thresholds: &HybridThresholds,
) -> f64 {
    let expected: f64 = RiskTier::ALL
        .iter()
        .map(|t| verdict.probabilities.get(*t) * tier_anchor(*t))
        .sum();
    let severity = severity_index(features.port_severity_score, thresholds.severity_scale);
    let blend = thresholds.classifier_weight * expected + thresholds.severity_weight * severity;

    let (floor, ceiling) = tier_band(final_tier);
    let mut score = blend.clamp(floor, ceiling);
    if escalated {
        score = score.max(ceiling - thresholds.escalation_margin);
    }
    (score * 100.0).round() / 100.0
}

fn check_inputs(
    features: &FeatureVector,
    verdict: &ClassifierVerdict,
    host: &HostFacts,
) -> Result<(), EngineError> {
    if features.open_ports_count != host.ports().len() as f64 {
        return Err(EngineError::Combination(format!(
            "feature vector describes {} open ports but host {} has {}",
            features.open_ports_count,
            host.host_id(),
            host.ports().len()
        )));
    }

    let probabilities = verdict.probabilities;
    let valid_range = RiskTier::ALL.iter().all(|t| {
        let p = probabilities.get(*t);
        p.is_finite() && (0.0..=1.0 + PROBABILITY_TOLERANCE).contains(&p)
    });
    if !valid_range || (probabilities.total() - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(EngineError::Combination(
            "classifier probabilities are not a distribution".to_string(),
        ));
    }
    if (probabilities.get(verdict.tier) - verdict.confidence).abs() > PROBABILITY_TOLERANCE {
        return Err(EngineError::Combination(
            "classifier confidence does not match its predicted tier".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
