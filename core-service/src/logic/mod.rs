//! Logic Module - Decision Pipeline & Monitoring
//!
//! ## Architecture
//! - `host` - Validated host facts (input contract)
//! - `intel/` - Port intelligence catalog and lookup rules
//! - `features/` - Feature layout, vector and builder
//! - `model/` - Tree ensemble, calibration, artifact, registry
//! - `explain/` - Exact Shapley attribution
//! - `hybrid/` - Raise-only escalation and final score
//! - `drift/` - KS drift monitor and reference snapshot
//! - `posture` - 100-point host security score
//! - `scan_log/` - JSONL history of analyses
//! - `engine/` - Pipeline orchestration
//! - `config` - Engine configuration

pub mod config;
pub mod drift;
pub mod engine;
pub mod explain;
pub mod features;
pub mod host;
pub mod hybrid;
pub mod intel;
pub mod model;
pub mod posture;
pub mod scan_log;
