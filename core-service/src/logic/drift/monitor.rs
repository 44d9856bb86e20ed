//! Drift Monitor
//!
//! Compares a recent window of feature vectors against the training-time
//! reference, one KS test per monitored feature. Reports only; retraining
//! is left to the caller.

use chrono::Utc;

use super::ks::ks_2samp;
use super::types::{
    DriftConfig, DriftError, DriftReport, DriftStatus, FeatureDrift, RecommendedAction,
    RetrainEligibility,
};
use crate::logic::features::stats::{mean, median, population_std};
use crate::logic::features::{Feature, FeatureVector};

#[derive(Debug, Clone, Default)]
pub struct DriftMonitor {
    config: DriftConfig,
}

impl DriftMonitor {
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    pub fn check(
        &self,
        reference: &[FeatureVector],
        window: &[FeatureVector],
    ) -> Result<DriftReport, DriftError> {
        let config = &self.config;
        if config.monitored_features.is_empty() {
            return Err(DriftError::NoMonitoredFeatures);
        }
        require("reference", reference.len(), config.min_reference_samples)?;
        require("window", window.len(), config.min_window_samples)?;

        let mut features = Vec::with_capacity(config.monitored_features.len());
        for &feature in &config.monitored_features {
            let reference_values = column("reference", reference, feature)?;
            let window_values = column("window", window, feature)?;

            let ks = ks_2samp(&reference_values, &window_values);
            let drifted = ks.statistic > config.ks_statistic_threshold
                || ks.p_value < config.significance_level;

            features.push(FeatureDrift {
                feature,
                statistic: ks.statistic,
                p_value: ks.p_value,
                drifted,
                reference_mean: mean(&reference_values),
                window_mean: mean(&window_values),
                shift_pct: shift_pct(&reference_values, &window_values),
            });
        }

        let flagged_count = features.iter().filter(|f| f.drifted).count();
        let flagged_fraction = flagged_count as f64 / features.len() as f64;
        let drift_detected = flagged_count > 0 || flagged_fraction > config.flagged_ratio;

        let report = DriftReport {
            features,
            flagged_count,
            flagged_fraction,
            drift_detected,
            recommended_action: if drift_detected {
                RecommendedAction::RetrainRecommended
            } else {
                RecommendedAction::None
            },
            reference_samples: reference.len(),
            window_samples: window.len(),
            checked_at: Utc::now(),
        };

        if drift_detected {
            let names: Vec<&str> = report.flagged().map(|f| f.feature.name()).collect();
            log::warn!(
                "Drift detected in {}/{} monitored features ({}); retraining recommended",
                flagged_count,
                report.features.len(),
                names.join(", ")
            );
        } else {
            log::info!(
                "No drift across {} monitored features ({} reference, {} window)",
                report.features.len(),
                report.reference_samples,
                report.window_samples
            );
        }

        Ok(report)
    }

    /// `check`, with failures reported as `DriftStatus::Unknown`
    pub fn status(&self, reference: &[FeatureVector], window: &[FeatureVector]) -> DriftStatus {
        match self.check(reference, window) {
            Ok(report) => DriftStatus::Checked(report),
            Err(e) => {
                log::warn!("Drift status unknown: {}", e);
                DriftStatus::Unknown {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Whether a retrain is worth running: drift was detected and enough new
/// labeled samples have accumulated
pub fn retrain_eligibility(
    report: &DriftReport,
    new_samples: usize,
    min_samples: usize,
) -> RetrainEligibility {
    let (eligible, reason) = match (report.drift_detected, new_samples >= min_samples) {
        (false, _) => (false, "no drift detected".to_string()),
        (true, false) => (
            false,
            format!(
                "drift detected but only {} new samples ({} required)",
                new_samples, min_samples
            ),
        ),
        (true, true) => (
            true,
            format!("drift detected with {} new samples", new_samples),
        ),
    };
    RetrainEligibility {
        eligible,
        new_samples,
        required_samples: min_samples,
        reason,
    }
}

fn require(sample: &'static str, found: usize, required: usize) -> Result<(), DriftError> {
    if found < required {
        return Err(DriftError::InsufficientData {
            sample,
            found,
            required,
        });
    }
    Ok(())
}

fn column(
    sample: &'static str,
    vectors: &[FeatureVector],
    feature: Feature,
) -> Result<Vec<f64>, DriftError> {
    vectors
        .iter()
        .map(|v| {
            let value = v.get(feature);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(DriftError::NonFiniteValue { sample, feature })
            }
        })
        .collect()
}

fn shift_pct(reference: &[f64], window: &[f64]) -> f64 {
    let relative = |a: f64, b: f64| (a - b).abs() / (a.abs() + 1e-10) * 100.0;
    (relative(mean(reference), mean(window))
        + relative(median(reference), median(window))
        + relative(population_std(reference), population_std(window)))
        / 3.0
}
