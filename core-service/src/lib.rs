//! Port Risk Intelligence Core
//!
//! Hybrid risk decision and drift monitoring for scanned hosts:
//! host facts → feature vector → calibrated tree ensemble → attributions
//! → raise-only port-intelligence escalation → dashboard/report/admin views.

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{EngineError, Stage};
pub use logic::engine::{HostAnalysis, RiskEngine};
pub use logic::host::{HostFacts, OpenPort};
pub use logic::intel::{PortIntelligenceStore, PortRecord, RiskTier};
