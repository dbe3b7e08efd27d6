//! Configuration management for the CEV client
//!
//! Settings are resolved in layers: built-in defaults, then the TOML config
//! file, then environment variables. Command-line flags are applied last by
//! the caller.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Backend URL used when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Transport timeout. Report generation can take a while on large datasets.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Keys accepted by `cev config get/set`.
pub const CONFIG_KEYS: &[&str] = &["server_url", "session_file", "report_dir", "timeout_secs"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, without the `/api` suffix
    pub server_url: String,

    /// Where the session cookies are kept between invocations
    pub session_file: PathBuf,

    /// Directory downloaded reports are saved into
    pub report_dir: PathBuf,

    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            session_file: config_dir().join("session.json"),
            report_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the config file (if present) and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_file_path())?;
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults overlaid with the file at `path`; a missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply `CEV_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("CEV_SERVER_URL") {
            self.server_url = url;
        }
        if let Ok(path) = std::env::var("CEV_SESSION_FILE") {
            self.session_file = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("CEV_REPORT_DIR") {
            self.report_dir = PathBuf::from(dir);
        }
        if let Ok(secs) = std::env::var("CEV_API_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .parse()
                .map_err(|_| CliError::config(format!("CEV_API_TIMEOUT_SECS must be a number, got '{}'", secs)))?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        validate_server_url(&self.server_url)?;
        if self.timeout_secs == 0 {
            return Err(CliError::config("timeout_secs must be greater than 0"));
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "server_url" => Ok(self.server_url.clone()),
            "session_file" => Ok(self.session_file.display().to_string()),
            "report_dir" => Ok(self.report_dir.display().to_string()),
            "timeout_secs" => Ok(self.timeout_secs.to_string()),
            _ => Err(unknown_key(key)),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server_url" => {
                validate_server_url(value)?;
                self.server_url = value.trim_end_matches('/').to_string();
            },
            "session_file" => self.session_file = PathBuf::from(value),
            "report_dir" => self.report_dir = PathBuf::from(value),
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .map_err(|_| CliError::config(format!("timeout_secs must be a number, got '{}'", value)))?;
            },
            _ => return Err(unknown_key(key)),
        }
        self.validate()
    }
}

fn unknown_key(key: &str) -> CliError {
    CliError::config(format!(
        "Unknown config key: {} (expected one of: {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

/// The backend is plain HTTP(S); anything else is a typo.
pub fn validate_server_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CliError::config(format!(
            "server_url must use http or https, got '{}'",
            other
        ))),
    }
}

/// `<platform config dir>/cev`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cev")
}

/// Config file location; `CEV_CONFIG_FILE` overrides the default.
pub fn config_file_path() -> PathBuf {
    std::env::var("CEV_CONFIG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.toml"))
}
