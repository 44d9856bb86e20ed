//! Hybrid Decision Module
//!
//! Merges the classifier verdict with port intelligence. Catalog knowledge
//! can raise the classifier's tier but never lower it.
//!
//! ## Structure
//! - `types`: HybridVerdict
//! - `rules`: Score weights, tier anchors and bands
//! - `combiner`: Escalation and score logic
//!
//! ## Usage
//! ```ignore
//! use crate::logic::hybrid::{combine, HybridThresholds};
//!
//! let verdict = combine(&features, &ml, &host, &store, &HybridThresholds::default())?;
//! if verdict.escalation_applied {
//!     println!("{}", verdict.justification);
//! }
//! ```

pub mod combiner;
pub mod rules;
pub mod types;

pub use combiner::{combine, severity_index};
pub use rules::{tier_anchor, tier_band, HybridThresholds};
pub use types::HybridVerdict;
