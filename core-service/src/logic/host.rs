//! Host Facts
//!
//! Normalized scan output for one host. Construction (and deserialization)
//! validates the facts once so later stages can rely on them.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One open port as reported by the scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPort {
    pub port: u16,
    /// Detected service name, may be empty
    #[serde(default)]
    pub service: String,
    /// CVSS-like score supplied with the scan, 0.0 - 10.0
    #[serde(default)]
    pub cvss: Option<f64>,
}

impl OpenPort {
    pub fn new(port: u16, service: &str, cvss: Option<f64>) -> Self {
        Self {
            port,
            service: service.to_string(),
            cvss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHostFacts")]
pub struct HostFacts {
    host_id: String,
    os: String,
    ports: Vec<OpenPort>,
}

#[derive(Deserialize)]
struct RawHostFacts {
    host_id: String,
    #[serde(default)]
    os: String,
    #[serde(default)]
    ports: Vec<OpenPort>,
}

impl TryFrom<RawHostFacts> for HostFacts {
    type Error = EngineError;

    fn try_from(raw: RawHostFacts) -> Result<Self, Self::Error> {
        HostFacts::new(&raw.host_id, &raw.os, raw.ports)
    }
}

impl HostFacts {
    /// Validate and normalize host facts. Ports are kept sorted by number.
    pub fn new(host_id: &str, os: &str, ports: Vec<OpenPort>) -> Result<Self, EngineError> {
        let host_id = host_id.trim();
        if host_id.is_empty() {
            return Err(EngineError::InvalidHostFacts(
                "host identifier is empty".to_string(),
            ));
        }

        let mut ports: Vec<OpenPort> = ports
            .into_iter()
            .map(|mut p| {
                p.service = p.service.trim().to_string();
                p
            })
            .collect();
        ports.sort_by_key(|p| p.port);

        for (i, port) in ports.iter().enumerate() {
            if port.port == 0 {
                return Err(EngineError::InvalidHostFacts(
                    "port 0 is not a valid open port".to_string(),
                ));
            }
            if i > 0 && ports[i - 1].port == port.port {
                return Err(EngineError::InvalidHostFacts(format!(
                    "port {} listed more than once",
                    port.port
                )));
            }
            if let Some(cvss) = port.cvss {
                if !cvss.is_finite() || !(0.0..=10.0).contains(&cvss) {
                    return Err(EngineError::InvalidHostFacts(format!(
                        "port {} has CVSS {} outside 0-10",
                        port.port, cvss
                    )));
                }
            }
        }

        Ok(Self {
            host_id: host_id.to_string(),
            os: os.trim().to_string(),
            ports,
        })
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn ports(&self) -> &[OpenPort] {
        &self.ports
    }

    pub fn has_open_ports(&self) -> bool {
        !self.ports.is_empty()
    }
}
