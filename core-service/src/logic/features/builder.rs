//! Feature Builder
//!
//! Pure mapping from validated `HostFacts` plus catalog lookups to a
//! `FeatureVector`. Unknown ports contribute their count and CVSS but no
//! catalog severity.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::layout::WELL_KNOWN_PORTS;
use super::stats::{mean, population_variance, shannon_entropy_bits};
use super::vector::FeatureVector;
use crate::logic::host::HostFacts;
use crate::logic::intel::{PortIntelligenceStore, RiskTier};

/// Builder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Lowercase substrings of the OS label that set `os_flag`
    pub high_value_os_patterns: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            high_value_os_patterns: vec!["windows".to_string()],
        }
    }
}

pub struct FeatureBuilder<'a> {
    store: &'a PortIntelligenceStore,
    config: &'a FeatureConfig,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(store: &'a PortIntelligenceStore, config: &'a FeatureConfig) -> Self {
        Self { store, config }
    }

    pub fn build(&self, host: &HostFacts) -> FeatureVector {
        let resolved = self.store.resolve(host);
        let cvss: Vec<f64> = resolved.iter().map(|r| r.cvss).collect();

        let services: Vec<String> = host
            .ports()
            .iter()
            .map(|p| p.service.to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let distinct: BTreeSet<&str> = services.iter().map(String::as_str).collect();

        let uncommon = host
            .ports()
            .iter()
            .filter(|p| !WELL_KNOWN_PORTS.contains(&p.port))
            .count();

        let severity = resolved
            .iter()
            .filter_map(|r| r.tier().map(|tier| tier.severity_weight() * r.cvss / 10.0))
            .fold(0.0, |acc, v| acc + v);

        let high_risk = resolved
            .iter()
            .filter(|r| matches!(r.tier(), Some(RiskTier::High | RiskTier::Critical)))
            .count();

        let features = FeatureVector {
            open_ports_count: host.ports().len() as f64,
            service_count: distinct.len() as f64,
            avg_cvss: mean(&cvss),
            uncommon_ports: uncommon as f64,
            os_flag: if self.is_high_value_os(host.os()) { 1.0 } else { 0.0 },
            port_severity_score: severity,
            high_risk_port_count: high_risk as f64,
            service_entropy: shannon_entropy_bits(services.iter().map(String::as_str)),
            cvss_variance: population_variance(&cvss),
        };

        log::debug!(
            "Features for {}: {}",
            host.host_id(),
            features.to_log_entry()["named_values"]
        );

        features
    }

    fn is_high_value_os(&self, os: &str) -> bool {
        let os = os.to_lowercase();
        self.config
            .high_value_os_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && os.contains(&pattern.to_lowercase()))
    }
}
