//! Model Evaluation
//!
//! Support-weighted classification metrics over labeled feature vectors.
//! Used to gate replacing the active model with a retrained candidate.

use serde::{Deserialize, Serialize};

use super::inference::RiskClassifier;
use crate::error::EngineError;
use crate::logic::features::FeatureVector;
use crate::logic::intel::RiskTier;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub label: RiskTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub samples: usize,
    pub accuracy: f64,
    /// Support-weighted over tiers
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

pub fn evaluate<C>(model: &C, samples: &[LabeledSample]) -> Result<EvaluationMetrics, EngineError>
where
    C: RiskClassifier + ?Sized,
{
    if samples.is_empty() {
        return Err(EngineError::Classification(
            "evaluation requires at least one labeled sample".to_string(),
        ));
    }

    // confusion[actual][predicted]
    let mut confusion = [[0usize; 4]; 4];
    for sample in samples {
        let predicted = model.predict(&sample.features)?.tier;
        confusion[sample.label.index()][predicted.index()] += 1;
    }

    let total = samples.len() as f64;
    let correct: usize = (0..4).map(|i| confusion[i][i]).sum();

    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1 = 0.0;
    for class in 0..4 {
        let support: usize = confusion[class].iter().sum();
        if support == 0 {
            continue;
        }
        let tp = confusion[class][class] as f64;
        let predicted: usize = (0..4).map(|actual| confusion[actual][class]).sum();

        let p = if predicted > 0 { tp / predicted as f64 } else { 0.0 };
        let r = tp / support as f64;
        let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

        let weight = support as f64 / total;
        precision += weight * p;
        recall += weight * r;
        f1 += weight * f;
    }

    Ok(EvaluationMetrics {
        samples: samples.len(),
        accuracy: correct as f64 / total,
        precision,
        recall,
        f1,
    })
}

/// Outcome of a candidate-vs-active comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionDecision {
    pub promoted: bool,
    pub candidate: EvaluationMetrics,
    pub incumbent: Option<EvaluationMetrics>,
    /// Relative F1 change in percent, when an incumbent exists
    pub improvement_pct: Option<f64>,
    pub reason: String,
}

impl PromotionDecision {
    pub fn decide(candidate: EvaluationMetrics, incumbent: Option<EvaluationMetrics>) -> Self {
        match incumbent {
            None => Self {
                promoted: true,
                candidate,
                incumbent: None,
                improvement_pct: None,
                reason: "no active model".to_string(),
            },
            Some(current) => {
                let improvement_pct = if current.f1 > 0.0 {
                    Some((candidate.f1 - current.f1) / current.f1 * 100.0)
                } else {
                    None
                };
                let promoted = candidate.f1 > current.f1;
                let reason = if promoted {
                    format!("candidate F1 {:.4} beats active {:.4}", candidate.f1, current.f1)
                } else {
                    format!(
                        "candidate F1 {:.4} does not beat active {:.4}",
                        candidate.f1, current.f1
                    )
                };
                Self {
                    promoted,
                    candidate,
                    incumbent: Some(current),
                    improvement_pct,
                    reason,
                }
            }
        }
    }
}
