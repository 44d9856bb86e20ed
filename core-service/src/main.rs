//! Port Risk - Command Line Entry Point
//!
//! Usage: `port-risk <host-facts.json>... [--report] [--admin]`
//!
//! Each input file holds one host-facts object or an array of them. Prints
//! dashboard views (and optionally reports and the admin status) as JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use port_risk_core::api::{dashboard, engine_status, report};
use port_risk_core::constants::{self, APP_NAME, APP_VERSION};
use port_risk_core::logic::config::EngineConfig;
use port_risk_core::logic::drift::{DriftStatus, ReferenceSnapshot};
use port_risk_core::logic::model::ModelRegistry;
use port_risk_core::logic::scan_log::{read_snapshot, ScanLogRecord, ScanLogWriter};
use port_risk_core::{EngineError, HostFacts, PortIntelligenceStore, RiskEngine};

#[derive(Deserialize)]
#[serde(untagged)]
enum HostInput {
    One(HostFacts),
    Many(Vec<HostFacts>),
}

struct Options {
    inputs: Vec<PathBuf>,
    report: bool,
    admin: bool,
}

fn parse_args() -> Option<Options> {
    let mut options = Options {
        inputs: Vec::new(),
        report: false,
        admin: false,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--report" => options.report = true,
            "--admin" => options.admin = true,
            flag if flag.starts_with("--") => return None,
            path => options.inputs.push(PathBuf::from(path)),
        }
    }
    if options.inputs.is_empty() && !options.admin {
        return None;
    }
    Some(options)
}

fn load_hosts(path: &Path) -> Result<Vec<HostFacts>, EngineError> {
    let data = fs::read(path)?;
    let input: HostInput = serde_json::from_slice(&data)
        .map_err(|e| EngineError::InvalidHostFacts(format!("{}: {}", path.display(), e)))?;
    Ok(match input {
        HostInput::One(host) => vec![host],
        HostInput::Many(hosts) => hosts,
    })
}

fn load_store() -> Result<PortIntelligenceStore, EngineError> {
    match constants::get_catalog_path() {
        Some(path) => {
            log::info!("Loading port catalog from {}", path.display());
            Ok(PortIntelligenceStore::from_json_file(&path)?)
        }
        None => Ok(PortIntelligenceStore::builtin()?),
    }
}

fn drift_status(engine: &RiskEngine, scan_log: &Path) -> DriftStatus {
    let Some(reference_path) = constants::get_reference_path() else {
        return DriftStatus::Unknown {
            reason: "no reference snapshot configured".to_string(),
        };
    };
    let reference = match ReferenceSnapshot::load(&reference_path) {
        Ok(reference) => reference,
        Err(e) => {
            log::warn!("Reference snapshot {}: {}", reference_path.display(), e);
            return DriftStatus::Unknown {
                reason: e.to_string(),
            };
        }
    };
    let snapshot = match read_snapshot(scan_log) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return DriftStatus::Unknown {
                reason: format!("scan log unreadable: {}", e),
            }
        }
    };

    let window = snapshot.feature_window(engine.config().drift.max_window_samples);
    let status = engine.check_drift(&reference.samples, &window);
    if let DriftStatus::Checked(report) = &status {
        if report.drift_detected {
            let new_samples = snapshot.count_since(reference.created_at);
            let eligibility = engine.retrain_eligibility(report, new_samples);
            log::warn!("Retrain eligibility: {}", eligibility.reason);
        }
    }
    status
}

fn run(options: Options) -> Result<Value, EngineError> {
    let config = Arc::new(EngineConfig::load()?);
    let store = Arc::new(load_store()?);

    let models = Arc::new(ModelRegistry::new());
    let model_path = constants::get_model_path();
    if let Err(e) = models.load_file(&model_path, constants::get_model_checksum().as_deref()) {
        // Analyses will report ModelUnavailable per host
        log::error!("No model loaded from {}: {}", model_path.display(), e);
    }

    let engine = RiskEngine::new(store, models, config)?;
    let scan_log_path = constants::get_scan_log_path();
    let writer = ScanLogWriter::new(scan_log_path.clone())?;
    let top = engine.config().report.top_attributions;

    let mut dashboards = Vec::new();
    let mut reports = Vec::new();
    let mut errors = Vec::new();

    for path in &options.inputs {
        let hosts = match load_hosts(path) {
            Ok(hosts) => hosts,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                errors.push(json!({ "input": path.display().to_string(), "error": e.public_report() }));
                continue;
            }
        };

        for (host, result) in hosts.iter().zip(engine.analyze_all(&hosts)) {
            match result {
                Ok(analysis) => {
                    if let Err(e) = writer.append(&ScanLogRecord::from_analysis(&analysis)) {
                        log::error!("Failed to append to {}: {}", writer.path().display(), e);
                    }
                    dashboards.push(dashboard(&analysis));
                    if options.report {
                        reports.push(report(&analysis, top));
                    }
                }
                Err(e) => {
                    errors.push(json!({ "host": host.host_id(), "error": e.public_report() }));
                }
            }
        }
    }

    let mut output = json!({ "dashboard": dashboards });
    if options.report {
        output["reports"] = serde_json::to_value(&reports).map_err(std::io::Error::from)?;
    }
    if options.admin {
        let drift = drift_status(&engine, &scan_log_path);
        output["admin"] =
            serde_json::to_value(engine_status(&engine, &drift)).map_err(std::io::Error::from)?;
    }
    if !errors.is_empty() {
        output["errors"] = Value::Array(errors);
    }
    Ok(output)
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(options) = parse_args() else {
        eprintln!("Usage: {} <host-facts.json>... [--report] [--admin]", APP_NAME);
        std::process::exit(2);
    };

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    match run(options) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                log::error!("Failed to render output: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("{} failed: {}", e.stage(), e);
            eprintln!("{}", json!(e.public_report()));
            std::process::exit(1);
        }
    }
}
