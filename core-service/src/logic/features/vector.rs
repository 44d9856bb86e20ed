//! Feature Vector - Core data structure for model input
//!
//! Named fields for readability at the call sites; `to_array` produces the
//! positional form in `FEATURE_LAYOUT` order for the model and attributor.

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, Feature, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub open_ports_count: f64,
    pub service_count: f64,
    pub avg_cvss: f64,
    pub uncommon_ports: f64,
    pub os_flag: f64,
    pub port_severity_score: f64,
    pub high_risk_port_count: f64,
    pub service_entropy: f64,
    pub cvss_variance: f64,
}

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::OpenPortsCount => self.open_ports_count,
            Feature::ServiceCount => self.service_count,
            Feature::AvgCvss => self.avg_cvss,
            Feature::UncommonPorts => self.uncommon_ports,
            Feature::OsFlag => self.os_flag,
            Feature::PortSeverityScore => self.port_severity_score,
            Feature::HighRiskPortCount => self.high_risk_port_count,
            Feature::ServiceEntropy => self.service_entropy,
            Feature::CvssVariance => self.cvss_variance,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        let slot = match feature {
            Feature::OpenPortsCount => &mut self.open_ports_count,
            Feature::ServiceCount => &mut self.service_count,
            Feature::AvgCvss => &mut self.avg_cvss,
            Feature::UncommonPorts => &mut self.uncommon_ports,
            Feature::OsFlag => &mut self.os_flag,
            Feature::PortSeverityScore => &mut self.port_severity_score,
            Feature::HighRiskPortCount => &mut self.high_risk_port_count,
            Feature::ServiceEntropy => &mut self.service_entropy,
            Feature::CvssVariance => &mut self.cvss_variance,
        };
        *slot = value;
    }

    /// Positional form in `FEATURE_LAYOUT` order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        Feature::ALL.map(|f| self.get(f))
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let mut vector = Self::default();
        for feature in Feature::ALL {
            vector.set(feature, values[feature.index()]);
        }
        vector
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// JSON form for logging, with layout metadata
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": FEATURE_VERSION,
            "layout_hash": layout_hash(),
            "values": self.to_array(),
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.to_array().iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_array(values)
    }
}
