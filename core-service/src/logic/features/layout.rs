//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema shared by the builder, the model
//! artifact, attributions and drift snapshots.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! A model artifact whose feature names differ from `FEATURE_LAYOUT` is
//! rejected at load time.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Total number of features
pub const FEATURE_COUNT: usize = 9;

/// Feature names in exact vector order
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    // === Exposure (0-3) ===
    "open_ports_count",     // 0: Number of open ports
    "service_count",        // 1: Distinct non-empty service names
    "avg_cvss",             // 2: Mean resolved CVSS over open ports
    "uncommon_ports",       // 3: Ports outside WELL_KNOWN_PORTS

    // === Host (4) ===
    "os_flag",              // 4: 1 when the OS matches a high-value pattern

    // === Catalog severity (5-6) ===
    "port_severity_score",  // 5: Σ tier weight × CVSS / 10
    "high_risk_port_count", // 6: Ports cataloged High or Critical

    // === Distribution shape (7-8) ===
    "service_entropy",      // 7: Shannon entropy (bits) of services
    "cvss_variance",        // 8: Population variance of resolved CVSS
];

/// Ports treated as common exposure; everything else counts as uncommon
pub const WELL_KNOWN_PORTS: [u16; 7] = [21, 22, 25, 53, 80, 110, 443];

/// Typed handle for one feature. Discriminant == index in `FEATURE_LAYOUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    OpenPortsCount = 0,
    ServiceCount = 1,
    AvgCvss = 2,
    UncommonPorts = 3,
    OsFlag = 4,
    PortSeverityScore = 5,
    HighRiskPortCount = 6,
    ServiceEntropy = 7,
    CvssVariance = 8,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::OpenPortsCount,
        Feature::ServiceCount,
        Feature::AvgCvss,
        Feature::UncommonPorts,
        Feature::OsFlag,
        Feature::PortSeverityScore,
        Feature::HighRiskPortCount,
        Feature::ServiceEntropy,
        Feature::CvssVariance,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        FEATURE_LAYOUT[self.index()]
    }

    pub fn from_index(index: usize) -> Option<Feature> {
        Feature::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        feature_index(name).and_then(Feature::from_index)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and the ordered feature names
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version, self.expected_hash, self.actual_version, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Check that an externally supplied name list is exactly the current layout
pub fn names_match_layout<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_LAYOUT.iter())
            .all(|(a, b)| a.as_ref() == *b)
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(Feature::ALL.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_enum_matches_layout() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
            let serde_name = serde_json::to_value(feature).unwrap();
            assert_eq!(serde_name, FEATURE_LAYOUT[i]);
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
        assert!(validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_names_match_layout() {
        assert!(names_match_layout(&FEATURE_LAYOUT[..]));

        let mut swapped: Vec<&str> = FEATURE_LAYOUT.to_vec();
        swapped.swap(0, 1);
        assert!(!names_match_layout(&swapped));
        assert!(!names_match_layout(&FEATURE_LAYOUT[..8]));
    }

    #[test]
    fn test_feature_lookup() {
        assert_eq!(feature_index("open_ports_count"), Some(0));
        assert_eq!(feature_index("cvss_variance"), Some(8));
        assert_eq!(feature_index("nonexistent"), None);
        assert_eq!(feature_name(4), Some("os_flag"));
        assert_eq!(feature_name(100), None);
        assert_eq!(Feature::from_name("avg_cvss"), Some(Feature::AvgCvss));
    }
}
