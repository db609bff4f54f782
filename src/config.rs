// src/config.rs

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::parser::AnalyzerOptions;
use crate::logging::project_directory;

const CONFIG_FILE: &str = "config.json";

/// Runtime settings for a scan. Every field has a default, so a partial
/// `config.json` is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// User agent sent with every HTTP request.
    pub user_agent: String,
    /// Timeout applied to each HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// Maximum number of crt.sh entries kept.
    pub ct_log_limit: usize,
    /// How many of those certificates are downloaded and decoded.
    pub ct_certificate_limit: usize,
    /// Maximum number of Wayback Machine snapshots requested.
    pub wayback_limit: usize,
    /// Timeout for each WHOIS server conversation, in seconds.
    pub whois_timeout_secs: u64,
    /// GeoLite2/GeoIP2 City database. Geolocation is skipped without one.
    pub geolite_db_path: Option<PathBuf>,
    pub analyzer: AnalyzerOptions,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            user_agent: "VanguardRecon/0.1".to_string(),
            request_timeout_secs: 15,
            ct_log_limit: 100,
            ct_certificate_limit: 5,
            wayback_limit: 25,
            whois_timeout_secs: 10,
            geolite_db_path: None,
            analyzer: AnalyzerOptions::default(),
        }
    }
}

impl ReconConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois_timeout_secs)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).wrap_err("invalid configuration")
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults.");
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_json_str(&source)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        info!(path = %path.display(), "Configuration loaded.");
        Ok(config)
    }

    /// Loads `config.json` from the platform configuration directory.
    pub fn load() -> Result<Self> {
        Self::from_file(config_path())
    }
}

pub fn config_path() -> PathBuf {
    match project_directory() {
        Some(dirs) => dirs.config_dir().join(CONFIG_FILE),
        None => PathBuf::from(".").join(CONFIG_FILE),
    }
}
