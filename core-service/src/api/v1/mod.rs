//! API v1 Module
//!
//! Re-exports the current stable projections for versioning.
//! This allows future versions (v2, v3) to coexist.

pub use super::engine_status::*;
pub use super::views::*;
