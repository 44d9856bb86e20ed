//! Explain Module - Additive Feature Attribution
//!
//! Per-feature contributions that sum, with the baseline, to the model's
//! raw output for the explained tier.

pub mod engine;
pub mod types;

pub use engine::explain;
pub use types::{Attribution, AttributionEntry, Direction, TopAttributions};
