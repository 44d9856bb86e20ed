//! Engine Configuration
//!
//! Every tunable of the engine in one serde document. Sources, lowest to
//! highest precedence: built-in defaults, JSON file (`PORT_RISK_CONFIG`),
//! individual environment overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{self, DEFAULT_TOP_ATTRIBUTIONS};
use crate::error::EngineError;
use crate::logic::drift::DriftConfig;
use crate::logic::features::{Feature, FeatureConfig};
use crate::logic::hybrid::HybridThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Attributions listed in the report's top section
    pub top_attributions: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_attributions: DEFAULT_TOP_ATTRIBUTIONS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub features: FeatureConfig,
    pub hybrid: HybridThresholds,
    pub drift: DriftConfig,
    pub report: ReportConfig,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let data = fs::read(path)?;
        let config: EngineConfig = serde_json::from_slice(&data)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults or `PORT_RISK_CONFIG`, then environment overrides
    pub fn load() -> Result<Self, EngineError> {
        let mut config = match constants::get_config_path() {
            Some(path) => {
                log::info!("Loading engine config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(patterns) = std::env::var("PORT_RISK_HIGH_VALUE_OS") {
            self.features.high_value_os_patterns = patterns
                .split(',')
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect();
        }
        if let Ok(names) = std::env::var("PORT_RISK_DRIFT_FEATURES") {
            let mut monitored = Vec::new();
            for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                match Feature::from_name(name) {
                    Some(feature) => monitored.push(feature),
                    None => log::warn!("Ignoring unknown drift feature '{}'", name),
                }
            }
            self.drift.monitored_features = monitored;
        }
        if let Some(alpha) = constants::get_env_parsed("PORT_RISK_DRIFT_ALPHA") {
            self.drift.significance_level = alpha;
        }
        if let Some(threshold) = constants::get_env_parsed("PORT_RISK_DRIFT_KS_THRESHOLD") {
            self.drift.ks_statistic_threshold = threshold;
        }
        if let Some(min) = constants::get_env_parsed("PORT_RISK_DRIFT_MIN_WINDOW") {
            self.drift.min_window_samples = min;
        }
        if let Some(max) = constants::get_env_parsed("PORT_RISK_DRIFT_MAX_WINDOW") {
            self.drift.max_window_samples = max;
        }
        if let Some(top) = constants::get_env_parsed("PORT_RISK_TOP_ATTRIBUTIONS") {
            self.report.top_attributions = top;
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.hybrid.validate().map_err(EngineError::Config)?;
        self.drift.validate().map_err(EngineError::Config)?;
        if self.report.top_attributions == 0 {
            return Err(EngineError::Config(
                "top_attributions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.top_attributions, 5);
        assert_eq!(config.drift.monitored_features.len(), 3);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(
            &path,
            r#"{ "drift": { "significance_level": 0.01, "monitored_features": ["avg_cvss"] } }"#,
        )
        .unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.drift.significance_level, 0.01);
        assert_eq!(config.drift.monitored_features, vec![Feature::AvgCvss]);
        assert_eq!(config.drift.ks_statistic_threshold, 0.25);
        assert_eq!(config.hybrid, HybridThresholds::default());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{ "report": { "top_attributions": 0 } }"#).unwrap();
        assert!(matches!(
            EngineConfig::from_file(&path),
            Err(EngineError::Config(_))
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            EngineConfig::from_file(&path),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("PORT_RISK_DRIFT_ALPHA", "0.1");
        std::env::set_var("PORT_RISK_HIGH_VALUE_OS", "Windows, FreeBSD");
        std::env::set_var("PORT_RISK_TOP_ATTRIBUTIONS", "not-a-number");
        std::env::set_var("PORT_RISK_DRIFT_FEATURES", "avg_cvss, bogus,service_entropy");

        let mut config = EngineConfig::default();
        config.apply_env_overrides();

        std::env::remove_var("PORT_RISK_DRIFT_ALPHA");
        std::env::remove_var("PORT_RISK_HIGH_VALUE_OS");
        std::env::remove_var("PORT_RISK_TOP_ATTRIBUTIONS");
        std::env::remove_var("PORT_RISK_DRIFT_FEATURES");

        assert_eq!(
            config.drift.monitored_features,
            vec![Feature::AvgCvss, Feature::ServiceEntropy]
        );

        assert_eq!(config.drift.significance_level, 0.1);
        assert_eq!(
            config.features.high_value_os_patterns,
            vec!["windows".to_string(), "freebsd".to_string()]
        );
        assert_eq!(config.report.top_attributions, 5);
    }
}
