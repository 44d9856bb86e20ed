//! Port Intelligence Store
//!
//! Read-only after construction; shared across analyses behind an `Arc`.
//!
//! ## Lookup rules
//! 1. Exact match on `(port, service)`. Service names are lowercased and a
//!    trailing `?` (scanner uncertainty marker) is dropped.
//! 2. Otherwise, when the port is cataloged, fall back to its most severe
//!    record (catalog order on ties). Scanners name the same service
//!    differently (`mongod`, `rdp`, `redis-server`), so the port number wins.
//! 3. Ports missing from the catalog are unknown and contribute no severity.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::catalog::builtin_records;
use super::types::{PortRecord, RiskTier};
use crate::logic::host::{HostFacts, OpenPort};

#[derive(Debug, Error)]
pub enum IntelError {
    #[error("duplicate catalog record for port {port}/{service}")]
    DuplicateRecord { port: u16, service: String },

    #[error("catalog record {port}/{service} has CVSS {cvss} outside 0-10")]
    InvalidCvss { port: u16, service: String, cvss: f64 },

    #[error("catalog record for port 0 is not allowed")]
    InvalidPort,

    #[error("catalog file unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog file malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A host port paired with its catalog entry and resolved CVSS
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPort<'a> {
    pub port: &'a OpenPort,
    pub record: Option<&'a PortRecord>,
    /// Host-supplied score, else catalog score, else 0.0
    pub cvss: f64,
}

impl ResolvedPort<'_> {
    pub fn tier(&self) -> Option<RiskTier> {
        self.record.map(|r| r.tier)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PortIntelligenceStore {
    by_port: BTreeMap<u16, Vec<PortRecord>>,
}

impl PortIntelligenceStore {
    /// Build from records, rejecting duplicate pairs and invalid scores
    pub fn from_records(records: Vec<PortRecord>) -> Result<Self, IntelError> {
        let mut by_port: BTreeMap<u16, Vec<PortRecord>> = BTreeMap::new();

        for mut record in records {
            record.service = normalize_service(&record.service);

            if record.port == 0 {
                return Err(IntelError::InvalidPort);
            }
            if !record.cvss.is_finite() || !(0.0..=10.0).contains(&record.cvss) {
                return Err(IntelError::InvalidCvss {
                    port: record.port,
                    service: record.service,
                    cvss: record.cvss,
                });
            }

            let entries = by_port.entry(record.port).or_default();
            if entries.iter().any(|r| r.service == record.service) {
                return Err(IntelError::DuplicateRecord {
                    port: record.port,
                    service: record.service,
                });
            }
            entries.push(record);
        }

        Ok(Self { by_port })
    }

    /// Catalog shipped with the crate
    pub fn builtin() -> Result<Self, IntelError> {
        Self::from_records(builtin_records())
    }

    /// Load an operator-supplied JSON array of records
    pub fn from_json_file(path: &Path) -> Result<Self, IntelError> {
        let data = fs::read(path)?;
        let records: Vec<PortRecord> = serde_json::from_slice(&data)?;
        let store = Self::from_records(records)?;
        log::info!(
            "Loaded port catalog from {} ({} records)",
            path.display(),
            store.len()
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.by_port.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_port.is_empty()
    }

    /// Look up a `(port, service)` pair
    pub fn lookup(&self, port: u16, service: &str) -> Option<&PortRecord> {
        let entries = match self.by_port.get(&port) {
            Some(entries) => entries,
            None => {
                log::debug!("No catalog entry for port {}", port);
                return None;
            }
        };

        let service = normalize_service(service);
        if let Some(record) = entries.iter().find(|r| r.service == service) {
            return Some(record);
        }

        let fallback = entries.iter().rev().max_by_key(|r| r.tier);
        if let Some(record) = fallback {
            log::debug!(
                "Port {} reported as '{}', using catalog entry '{}'",
                port,
                service,
                record.service
            );
        }
        fallback
    }

    /// Pair each open port of a host with its catalog entry
    pub fn resolve<'a>(&'a self, host: &'a HostFacts) -> Vec<ResolvedPort<'a>> {
        host.ports()
            .iter()
            .map(|port| {
                let record = self.lookup(port.port, &port.service);
                let cvss = port
                    .cvss
                    .or_else(|| record.map(|r| r.cvss))
                    .unwrap_or(0.0);
                ResolvedPort { port, record, cvss }
            })
            .collect()
    }

    /// Highest catalog tier among the host's open ports (Low when none is known)
    pub fn port_tier(&self, host: &HostFacts) -> RiskTier {
        self.resolve(host)
            .iter()
            .filter_map(ResolvedPort::tier)
            .max()
            .unwrap_or(RiskTier::Low)
    }

    /// `(critical, high)` port counts for a host
    pub fn exposure_counts(&self, host: &HostFacts) -> (usize, usize) {
        self.resolve(host)
            .iter()
            .fold((0, 0), |(critical, high), resolved| match resolved.tier() {
                Some(RiskTier::Critical) => (critical + 1, high),
                Some(RiskTier::High) => (critical, high + 1),
                _ => (critical, high),
            })
    }
}

fn normalize_service(service: &str) -> String {
    service.trim().trim_end_matches('?').trim().to_lowercase()
}
