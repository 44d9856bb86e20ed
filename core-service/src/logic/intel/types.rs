//! Port Intelligence Types
//!
//! Data structures only; lookup rules live in `store.rs`.

use serde::{Deserialize, Serialize};

// ============================================================================
// RISK TIER
// ============================================================================

/// Host and port risk levels, ordered `Low < Medium < High < Critical`.
///
/// Variant order is the severity order; `Ord` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// All tiers, least severe first
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::Medium,
        RiskTier::High,
        RiskTier::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
            RiskTier::Critical => "Critical",
        }
    }

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Multiplier used by `port_severity_score`
    pub fn severity_weight(&self) -> f64 {
        match self {
            RiskTier::Low => 1.0,
            RiskTier::Medium => 2.0,
            RiskTier::High => 3.0,
            RiskTier::Critical => 4.0,
        }
    }

    pub fn parse(value: &str) -> Option<RiskTier> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskTier::Low),
            "medium" => Some(RiskTier::Medium),
            "high" => Some(RiskTier::High),
            "critical" => Some(RiskTier::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RATINGS
// ============================================================================

/// Four-step rating used for exploitability and mitigation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    Low,
    Medium,
    High,
    Critical,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Low => "Low",
            Rating::Medium => "Medium",
            Rating::High => "High",
            Rating::Critical => "Critical",
        }
    }
}

// ============================================================================
// PORT RECORD
// ============================================================================

/// Catalog entry for one `(port, service)` exposure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub port: u16,
    /// Scanner service name, lowercase (e.g. "microsoft-ds")
    pub service: String,
    /// Human label (e.g. "SMB")
    pub label: String,
    pub tier: RiskTier,
    /// Reference CVSS score, 0.0 - 10.0
    pub cvss: f64,
    pub exploitability: Rating,
    pub mitigation_priority: Rating,
    #[serde(default)]
    pub vulnerability_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
        assert!(RiskTier::High < RiskTier::Critical);
        assert_eq!(RiskTier::ALL.iter().max(), Some(&RiskTier::Critical));
    }

    #[test]
    fn test_tier_index_matches_all() {
        for (i, tier) in RiskTier::ALL.iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
    }

    #[test]
    fn test_tier_serde_names() {
        let json = serde_json::to_string(&RiskTier::Critical).unwrap();
        assert_eq!(json, "\"Critical\"");
        let back: RiskTier = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(back, RiskTier::Medium);
        assert_eq!(RiskTier::parse(" HIGH "), Some(RiskTier::High));
        assert_eq!(RiskTier::parse("severe"), None);
    }
}
