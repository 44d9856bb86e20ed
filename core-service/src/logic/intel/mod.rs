//! Port Intelligence Module
//!
//! Curated knowledge of well-known network exposures, keyed by
//! `(port, service)`:
//! - `types.rs`: RiskTier ordering and PortRecord
//! - `store.rs`: lookup rules and catalog validation
//! - `catalog.rs`: built-in records

pub mod catalog;
pub mod store;
pub mod types;

pub use store::{IntelError, PortIntelligenceStore};
pub use types::{PortRecord, Rating, RiskTier};
