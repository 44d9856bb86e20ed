use serde::{Deserialize, Serialize};

use crate::logic::features::Feature;
use crate::logic::intel::RiskTier;

/// Sign of a contribution. Zero counts as `DecreasesRisk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    IncreasesRisk,
    DecreasesRisk,
}

impl Direction {
    pub fn from_contribution(contribution: f64) -> Self {
        if contribution > 0.0 {
            Direction::IncreasesRisk
        } else {
            Direction::DecreasesRisk
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionEntry {
    pub feature: Feature,
    /// Feature value of the explained host
    pub value: f64,
    pub contribution: f64,
    pub direction: Direction,
    pub description: String,
}

/// Additive explanation of one tier's raw output:
/// `baseline + Σ contribution == raw_output`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub tier: RiskTier,
    pub baseline: f64,
    pub raw_output: f64,
    /// Layout order
    pub by_feature: Vec<AttributionEntry>,
    /// |contribution| descending, ties in layout order
    pub ranked: Vec<AttributionEntry>,
}

/// Top-N projection that discloses how much was left out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAttributions {
    pub entries: Vec<AttributionEntry>,
    pub shown: usize,
    pub total: usize,
}

impl Attribution {
    pub fn top(&self, n: usize) -> TopAttributions {
        let entries: Vec<AttributionEntry> = self.ranked.iter().take(n).cloned().collect();
        TopAttributions {
            shown: entries.len(),
            total: self.ranked.len(),
            entries,
        }
    }

    pub fn contribution_sum(&self) -> f64 {
        self.by_feature.iter().map(|e| e.contribution).sum()
    }
}
