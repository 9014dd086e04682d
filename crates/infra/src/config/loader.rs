//! Configuration loader
//!
//! Loads [`DataAccessConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `BACKSTOP_RETRY_COUNT` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `BACKSTOP_RETRY_COUNT`: Maximum number of attempts (required)
//! - `BACKSTOP_COOL_OFF_MS`: First cool-off in milliseconds (default 100)
//! - `BACKSTOP_COOL_OFF_FACTOR`: Cool-off multiplier (default 1.0)
//! - `BACKSTOP_PROVIDER`: Vendor preset, `sql_server` or `sqlite` (default
//!   `sql_server`)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./backstop.toml` or `./backstop.json` (current working directory)
//! 2. `./config/backstop.toml` or `./config/backstop.json`
//! 3. Next to the executable

use std::path::{Path, PathBuf};
use std::time::Duration;

use backstop_common::RetrySettings;

use super::DataAccessConfig;
use crate::error::{InfraError, InfraResult};

pub const ENV_RETRY_COUNT: &str = "BACKSTOP_RETRY_COUNT";
pub const ENV_COOL_OFF_MS: &str = "BACKSTOP_COOL_OFF_MS";
pub const ENV_COOL_OFF_FACTOR: &str = "BACKSTOP_COOL_OFF_FACTOR";
pub const ENV_PROVIDER: &str = "BACKSTOP_PROVIDER";

const FILE_NAMES: [&str; 2] = ["backstop.toml", "backstop.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `InfraError` if configuration cannot be loaded from either
/// source or fails validation.
pub fn load() -> InfraResult<DataAccessConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Data-access configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from the process environment.
///
/// # Errors
/// Returns `InfraError::Config` if `BACKSTOP_RETRY_COUNT` is missing or a
/// value does not parse.
pub fn load_from_env() -> InfraResult<DataAccessConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration from any key/value source shaped like the
/// environment.
///
/// # Errors
/// See [`load_from_env`].
pub fn load_from_lookup<F>(lookup: F) -> InfraResult<DataAccessConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let retry_count = lookup(ENV_RETRY_COUNT)
        .ok_or_else(|| {
            InfraError::config(format!("Missing required environment variable: {ENV_RETRY_COUNT}"))
        })
        .and_then(|s| parse_var::<u32>(ENV_RETRY_COUNT, &s))?;

    let defaults = RetrySettings::default();
    let cool_off = match lookup(ENV_COOL_OFF_MS) {
        Some(s) => Duration::from_millis(parse_var::<u64>(ENV_COOL_OFF_MS, &s)?),
        None => defaults.cool_off_period(),
    };
    let factor = match lookup(ENV_COOL_OFF_FACTOR) {
        Some(s) => parse_var::<f64>(ENV_COOL_OFF_FACTOR, &s)?,
        None => defaults.cool_off_factor(),
    };

    let mut config = DataAccessConfig {
        retry: RetrySettings::new(retry_count, cool_off, factor)?,
        ..DataAccessConfig::default()
    };
    if let Some(provider) = lookup(ENV_PROVIDER) {
        config.provider = provider.trim().to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes [`probe_config_paths`]. The format is
/// detected by file extension.
///
/// # Errors
/// Returns `InfraError` if the file is missing, unreadable, malformed or
/// fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> InfraResult<DataAccessConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InfraError::config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            InfraError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading data-access configuration from file");

    let contents = std::fs::read_to_string(&config_path)?;
    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> InfraResult<DataAccessConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents)?),
        "json" => Ok(serde_json::from_str(contents)?),
        _ => Err(InfraError::config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join("config"));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn parse_var<T>(key: &str, value: &str) -> InfraResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| InfraError::config(format!("Invalid {key}: {e}")))
}
