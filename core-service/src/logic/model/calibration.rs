//! Calibration Layer
//!
//! Maps the ensemble's uncalibrated class probabilities onto calibrated
//! ones. Every method renormalizes so the output is a distribution.

use serde::{Deserialize, Serialize};

use super::tree::normalize;

/// Per-class piecewise-linear map (isotonic regression export)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsotonicCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl IsotonicCurve {
    fn validate(&self) -> Result<(), String> {
        if self.x.is_empty() || self.x.len() != self.y.len() {
            return Err("isotonic curve needs matching, non-empty x and y".to_string());
        }
        if self.x.iter().chain(self.y.iter()).any(|v| !v.is_finite()) {
            return Err("isotonic curve has non-finite points".to_string());
        }
        if self.x.windows(2).any(|w| w[1] < w[0]) || self.y.windows(2).any(|w| w[1] < w[0]) {
            return Err("isotonic curve must be non-decreasing".to_string());
        }
        Ok(())
    }

    fn apply(&self, p: f64) -> f64 {
        let last = self.x.len() - 1;
        if p <= self.x[0] {
            return self.y[0];
        }
        if p >= self.x[last] {
            return self.y[last];
        }
        // First knot strictly above p
        let upper = self.x.partition_point(|&knot| knot <= p);
        let lower = upper - 1;
        let span = self.x[upper] - self.x[lower];
        if span <= 0.0 {
            return self.y[upper];
        }
        let t = (p - self.x[lower]) / span;
        self.y[lower] + t * (self.y[upper] - self.y[lower])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Calibration {
    /// Pass-through
    #[default]
    None,
    /// One-vs-rest Platt scaling: `p' = 1 / (1 + exp(slope * p + intercept))`
    Sigmoid {
        slopes: Vec<f64>,
        intercepts: Vec<f64>,
    },
    /// Power scaling `p^(1/T)`; T > 1 softens, T < 1 sharpens
    Temperature { temperature: f64 },
    Isotonic { curves: Vec<IsotonicCurve> },
}

impl Calibration {
    pub fn name(&self) -> &'static str {
        match self {
            Calibration::None => "none",
            Calibration::Sigmoid { .. } => "sigmoid",
            Calibration::Temperature { .. } => "temperature",
            Calibration::Isotonic { .. } => "isotonic",
        }
    }

    pub fn validate(&self, n_classes: usize) -> Result<(), String> {
        match self {
            Calibration::None => Ok(()),
            Calibration::Sigmoid { slopes, intercepts } => {
                if slopes.len() != n_classes || intercepts.len() != n_classes {
                    return Err(format!(
                        "sigmoid calibration needs {} slopes and intercepts",
                        n_classes
                    ));
                }
                if slopes.iter().chain(intercepts.iter()).any(|v| !v.is_finite()) {
                    return Err("sigmoid calibration has non-finite parameters".to_string());
                }
                Ok(())
            }
            Calibration::Temperature { temperature } => {
                if !temperature.is_finite() || *temperature <= 0.0 {
                    return Err("temperature must be positive".to_string());
                }
                Ok(())
            }
            Calibration::Isotonic { curves } => {
                if curves.len() != n_classes {
                    return Err(format!("isotonic calibration needs {} curves", n_classes));
                }
                curves.iter().try_for_each(IsotonicCurve::validate)
            }
        }
    }

    /// Calibrate a probability vector (one entry per ensemble class)
    pub fn apply(&self, probabilities: &[f64]) -> Vec<f64> {
        match self {
            Calibration::None => probabilities.to_vec(),
            Calibration::Sigmoid { slopes, intercepts } => {
                let mapped = probabilities
                    .iter()
                    .zip(slopes.iter().zip(intercepts.iter()))
                    .map(|(p, (a, b))| 1.0 / (1.0 + (a * p + b).exp()))
                    .collect();
                normalize(mapped)
            }
            Calibration::Temperature { temperature } => {
                let mapped = probabilities
                    .iter()
                    .map(|p| p.max(0.0).powf(1.0 / temperature))
                    .collect();
                normalize(mapped)
            }
            Calibration::Isotonic { curves } => {
                let mapped = probabilities
                    .iter()
                    .zip(curves.iter())
                    .map(|(p, curve)| curve.apply(*p))
                    .collect();
                normalize(mapped)
            }
        }
    }
}
