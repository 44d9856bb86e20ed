//! API Module
//!
//! Read-only projections handed to outer surfaces.
//!
//! Structure:
//! - views.rs: Dashboard and detailed report over one `HostAnalysis`
//! - engine_status.rs: Admin view of model, training and drift
//! - v1/mod.rs: Re-exports the current projections as the v1 API
//!
//! All three views read the same analysis; none recomputes a verdict.

pub mod engine_status;
pub mod v1;
pub mod views;

pub use engine_status::{engine_status, EngineStatus};
pub use views::{dashboard, report, DashboardView, ReportView};
