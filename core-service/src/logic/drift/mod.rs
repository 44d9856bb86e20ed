//! Drift Module - Feature Distribution Monitoring
//!
//! Decides whether live traffic has moved away from the distribution the
//! active model was trained on.
//!
//! # Architecture
//! - `ks.rs`: two-sample Kolmogorov-Smirnov statistic and p-value
//! - `types.rs`: `DriftConfig`, `DriftReport`, `DriftStatus`, `DriftError`
//! - `monitor.rs`: per-feature tests, overall verdict, retrain eligibility
//! - `reference.rs`: persisted training-time distribution
//!
//! # Failure Strategy
//! Too little data, non-finite values or an empty feature set make the
//! status `Unknown`. A failed check is never reported as "no drift".

pub mod ks;
pub mod monitor;
pub mod reference;
pub mod types;
#[cfg(test)]
mod tests;

pub use monitor::{retrain_eligibility, DriftMonitor};
pub use reference::ReferenceSnapshot;
pub use types::{
    DriftConfig, DriftError, DriftReport, DriftStatus, FeatureDrift, RecommendedAction,
    RetrainEligibility,
};
