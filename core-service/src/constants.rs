//! Central Configuration Constants
//!
//! Single source of truth for file locations and environment overrides.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "port-risk";

/// Default model artifact file name (inside the data dir)
pub const DEFAULT_MODEL_FILE: &str = "port_risk_model.json";

/// Default scan log file name (inside the data dir)
pub const DEFAULT_SCAN_LOG_FILE: &str = "scan_log.jsonl";

/// Default number of attributions shown in the report view
pub const DEFAULT_TOP_ATTRIBUTIONS: usize = 5;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Data directory for artifacts and logs
pub fn get_data_dir() -> PathBuf {
    std::env::var("PORT_RISK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
        })
}

/// Optional engine config file
pub fn get_config_path() -> Option<PathBuf> {
    std::env::var("PORT_RISK_CONFIG").ok().map(PathBuf::from)
}

/// Model artifact path from environment or data dir
pub fn get_model_path() -> PathBuf {
    std::env::var("PORT_RISK_MODEL")
        .map(PathBuf::from)
        .unwrap_or_else(|_| get_data_dir().join(DEFAULT_MODEL_FILE))
}

/// Optional expected SHA-256 of the model artifact
pub fn get_model_checksum() -> Option<String> {
    std::env::var("PORT_RISK_MODEL_SHA256")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Scan log path from environment or data dir
pub fn get_scan_log_path() -> PathBuf {
    std::env::var("PORT_RISK_SCAN_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| get_data_dir().join(DEFAULT_SCAN_LOG_FILE))
}

/// Optional reference snapshot for drift checks
pub fn get_reference_path() -> Option<PathBuf> {
    std::env::var("PORT_RISK_REFERENCE").ok().map(PathBuf::from)
}

/// Optional operator port catalog replacing the built-in one
pub fn get_catalog_path() -> Option<PathBuf> {
    std::env::var("PORT_RISK_CATALOG").ok().map(PathBuf::from)
}

/// Parse a numeric override, ignoring unparsable values
pub fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
