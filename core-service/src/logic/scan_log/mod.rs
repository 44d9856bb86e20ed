//! Scan Log Module - Observed Feature History
//!
//! Every analysis is appended as one JSONL line carrying the feature
//! contract (version + layout hash) alongside the decision. Snapshots of
//! this log are the drift monitor's recent window and the raw material for
//! offline retraining.

pub mod reader;
pub mod record;
pub mod writer;

#[cfg(test)]
mod tests;

pub use reader::{read_snapshot, ScanLogSnapshot};
pub use record::ScanLogRecord;
pub use writer::ScanLogWriter;
