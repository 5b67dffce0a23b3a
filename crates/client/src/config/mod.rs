//! Client configuration.
//!
//! Loads configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SIVICOS_API_BASE_URL`: backend base URL (required)
//! - `SIVICOS_HTTP_TIMEOUT_SECS`: request timeout in seconds (default 30)
//! - `SIVICOS_TOKEN_PATH`: credential file location (default: platform
//!   config dir)
//!
//! ## File Locations
//! The loader probes `./sivicos.{json,toml}` and `./config.{json,toml}` in
//! the current working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Configuration for the API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL; all request paths are relative to it.
    pub base_url: String,

    /// Timeout applied to every HTTP call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Credential file location. `None` means the platform default.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_path: None,
        }
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns [`ApiError::Config`] if neither the environment nor a config
/// file yields a complete configuration.
pub fn load() -> Result<ClientConfig, ApiError> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables.
///
/// # Errors
/// Returns [`ApiError::Config`] if `SIVICOS_API_BASE_URL` is missing or a
/// numeric variable fails to parse.
pub fn load_from_env() -> Result<ClientConfig, ApiError> {
    let base_url = std::env::var("SIVICOS_API_BASE_URL").map_err(|_| {
        ApiError::Config("missing required environment variable: SIVICOS_API_BASE_URL".to_string())
    })?;

    let timeout_secs = match std::env::var("SIVICOS_HTTP_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|err| ApiError::Config(format!("invalid timeout: {err}")))?,
        Err(_) => DEFAULT_TIMEOUT_SECS,
    };

    let token_path = std::env::var("SIVICOS_TOKEN_PATH").ok().map(PathBuf::from);

    Ok(ClientConfig { base_url, timeout_secs, token_path })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns [`ApiError::Config`] if no file is found or it fails to parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig, ApiError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ApiError::Config(format!("config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ApiError::Config("no config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|err| ApiError::Config(format!("failed to read config file: {err}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format is detected by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig, ApiError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|err| ApiError::Config(format!("invalid TOML format: {err}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|err| ApiError::Config(format!("invalid JSON format: {err}"))),
        other => Err(ApiError::Config(format!("unsupported config format: {other}"))),
    }
}

/// Probe the working directory for configuration files.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let candidates = [
        cwd.join("sivicos.json"),
        cwd.join("sivicos.toml"),
        cwd.join("config.json"),
        cwd.join("config.toml"),
    ];
    candidates.into_iter().find(|path| path.exists())
}
