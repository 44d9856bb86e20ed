use super::types::{Attribution, AttributionEntry, Direction};
use crate::error::EngineError;
use crate::logic::features::{Feature, FeatureVector, FEATURE_COUNT};
use crate::logic::intel::RiskTier;
use crate::logic::model::{CoalitionValue, FULL_COALITION};

/// Allowed drift between `baseline + Σ contributions` and the raw output
const ADDITIVITY_TOLERANCE: f64 = 1e-6;

/// Exact Shapley attribution of `tier`'s raw output.
///
/// The value of a coalition is the model's expected raw output when only
/// that subset of features is known; with nine features all 512 coalitions
/// are evaluated directly.
pub fn explain<M>(features: &FeatureVector, model: &M, tier: RiskTier) -> Result<Attribution, EngineError>
where
    M: CoalitionValue + ?Sized,
{
    let x = features.to_array();
    if x.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::Attribution(
            "feature vector contains non-finite values".to_string(),
        ));
    }

    let values: Vec<f64> = (0..=FULL_COALITION)
        .map(|coalition| model.coalition_value(&x, coalition, tier))
        .collect();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::Attribution(
            "model returned a non-finite coalition value".to_string(),
        ));
    }

    let weights = shapley_weights();
    let baseline = values[0];
    let raw_output = values[FULL_COALITION as usize];

    let by_feature: Vec<AttributionEntry> = Feature::ALL
        .iter()
        .map(|&feature| {
            let bit = 1u16 << feature.index();
            let contribution: f64 = (0..=FULL_COALITION)
                .filter(|coalition| coalition & bit == 0)
                .map(|coalition| {
                    let size = coalition.count_ones() as usize;
                    weights[size]
                        * (values[(coalition | bit) as usize] - values[coalition as usize])
                })
                .sum();

            AttributionEntry {
                feature,
                value: features.get(feature),
                contribution,
                direction: Direction::from_contribution(contribution),
                description: describe(feature).to_string(),
            }
        })
        .collect();

    let total: f64 = by_feature.iter().map(|e| e.contribution).sum();
    if (baseline + total - raw_output).abs() > ADDITIVITY_TOLERANCE * raw_output.abs().max(1.0) {
        return Err(EngineError::Attribution(
            "attributions do not add up to the model output".to_string(),
        ));
    }

    let mut ranked = by_feature.clone();
    // Stable sort keeps layout order among equal magnitudes
    ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

    Ok(Attribution {
        tier,
        baseline,
        raw_output,
        by_feature,
        ranked,
    })
}

/// `|S|! (M - |S| - 1)! / M!` indexed by coalition size
fn shapley_weights() -> [f64; FEATURE_COUNT] {
    let factorial = |n: usize| (1..=n).map(|k| k as f64).product::<f64>();
    let m = FEATURE_COUNT;
    let mut weights = [0.0; FEATURE_COUNT];
    for (size, weight) in weights.iter_mut().enumerate() {
        *weight = factorial(size) * factorial(m - size - 1) / factorial(m);
    }
    weights
}

fn describe(feature: Feature) -> &'static str {
    match feature {
        Feature::OpenPortsCount => "Number of exposed ports",
        Feature::ServiceCount => "Distinct network services",
        Feature::AvgCvss => "Average vulnerability severity of exposed services",
        Feature::UncommonPorts => "Services on non-standard ports",
        Feature::OsFlag => "High-value operating system target",
        Feature::PortSeverityScore => "Known-risk weighted port exposure",
        Feature::HighRiskPortCount => "Ports cataloged as high or critical risk",
        Feature::ServiceEntropy => "Diversity of exposed services",
        Feature::CvssVariance => "Spread of vulnerability severity",
    }
}
