//! Host Security Posture
//!
//! A 100-point "how well is this host configured" score, reported next to
//! the risk verdict. It is derived from the same feature vector and catalog
//! counts and never feeds back into the verdict.

use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;
use crate::logic::intel::RiskTier;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Points kept per category (higher is better)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureBreakdown {
    /// out of 20
    pub open_ports: u8,
    /// out of 25
    pub cvss: u8,
    /// out of 30
    pub critical_ports: u8,
    /// out of 15
    pub os: u8,
    /// out of 10
    pub service_complexity: u8,
}

impl PostureBreakdown {
    pub fn total(&self) -> u8 {
        self.open_ports + self.cvss + self.critical_ports + self.os + self.service_complexity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityPosture {
    pub security_score: u8,
    pub posture_tier: RiskTier,
    pub breakdown: PostureBreakdown,
    pub recommendations: Vec<String>,
}

// ============================================================================
// SCORING
// ============================================================================

pub fn assess(features: &FeatureVector, critical_ports: usize, high_ports: usize) -> SecurityPosture {
    let breakdown = PostureBreakdown {
        open_ports: open_ports_points(features.open_ports_count),
        cvss: cvss_points(features.avg_cvss),
        critical_ports: match critical_ports {
            0 => 30,
            1 => 15,
            2 => 8,
            _ => 0,
        },
        os: if features.os_flag >= 0.5 { 8 } else { 15 },
        service_complexity: service_points(features.service_count, features.uncommon_ports),
    };

    let security_score = breakdown.total().min(100);
    let posture_tier = match security_score {
        80..=100 => RiskTier::Low,
        60..=79 => RiskTier::Medium,
        40..=59 => RiskTier::High,
        _ => RiskTier::Critical,
    };

    SecurityPosture {
        security_score,
        posture_tier,
        breakdown,
        recommendations: recommendations(features, critical_ports, high_ports),
    }
}

fn open_ports_points(count: f64) -> u8 {
    match count {
        c if c <= 1.0 => 20,
        c if c <= 3.0 => 15,
        c if c <= 5.0 => 10,
        c if c <= 8.0 => 5,
        _ => 0,
    }
}

fn cvss_points(avg: f64) -> u8 {
    match avg {
        a if a <= 3.0 => 25,
        a if a <= 5.0 => 18,
        a if a <= 7.0 => 12,
        a if a <= 8.0 => 6,
        _ => 0,
    }
}

fn service_points(services: f64, uncommon: f64) -> u8 {
    match services {
        s if s <= 2.0 => 10,
        s if s <= 4.0 => 8,
        s if s <= 6.0 => 5,
        _ if uncommon == 0.0 => 2,
        _ => 0,
    }
}

fn recommendations(features: &FeatureVector, critical_ports: usize, high_ports: usize) -> Vec<String> {
    let mut recommendations = Vec::new();

    if critical_ports > 0 {
        recommendations.push(format!(
            "CRITICAL: Patch or disable {} critical port(s) immediately",
            critical_ports
        ));
    }
    if features.open_ports_count > 5.0 {
        recommendations.push(format!(
            "Close unnecessary ports (currently {} open)",
            features.open_ports_count as u32
        ));
    }
    if features.avg_cvss > 7.0 {
        recommendations.push(format!(
            "Address high CVSS vulnerabilities (avg: {:.1})",
            features.avg_cvss
        ));
    }
    if features.os_flag >= 0.5 {
        recommendations.push("Apply OS-specific hardening for a high-value target platform".to_string());
    }
    if features.service_count > 6.0 {
        recommendations.push("Reduce service count and complexity".to_string());
    }
    if high_ports > 0 {
        recommendations.push(format!(
            "Configure firewalls for {} high-risk port(s)",
            high_ports
        ));
    }

    if recommendations.is_empty() {
        recommendations.push("Continue regular security monitoring and patching".to_string());
    }
    recommendations
}

// ============================================================================
// RISK INDICATORS
// ============================================================================

/// Plain-language reading of the feature vector for reports
pub fn risk_indicators(features: &FeatureVector) -> Vec<String> {
    let mut indicators = Vec::new();

    if features.avg_cvss >= 7.0 {
        indicators.push(format!(
            "High vulnerability score (CVSS {:.2}), indicating severe security weaknesses",
            features.avg_cvss
        ));
    }
    if features.open_ports_count >= 10.0 {
        indicators.push(format!(
            "{} open ports detected - expanded attack surface",
            features.open_ports_count as u32
        ));
    }
    if features.service_count >= 8.0 {
        indicators.push(format!(
            "Multiple active services ({}) increase exploitation exposure",
            features.service_count as u32
        ));
    }
    if features.uncommon_ports >= 1.0 {
        indicators.push(
            "Non-standard ports open - may indicate hidden or misconfigured services".to_string(),
        );
    }
    if features.os_flag >= 0.5 {
        indicators.push("High-value operating system - frequent ransomware and malware target".to_string());
    }
    if features.high_risk_port_count >= 1.0 {
        indicators.push(format!(
            "{} port(s) cataloged as high or critical risk",
            features.high_risk_port_count as u32
        ));
    }

    if indicators.is_empty() {
        indicators.push("No major high-risk indicators detected".to_string());
    }
    indicators
}
