//! Configuration loading and management
//!
//! A [`DataAccessConfig`] holds the retry budget and the provider error-code
//! table the data-access handler classifies with. It is loaded from
//! environment variables or from a TOML/JSON file.

pub mod loader;

use backstop_common::{ProviderErrorCodes, RetrySettings};
use serde::{Deserialize, Serialize};

use crate::error::{InfraError, InfraResult};

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, load_from_lookup, probe_config_paths};

const DEFAULT_PROVIDER: &str = "sql_server";

/// Settings for guarded data-access calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataAccessConfig {
    pub retry: RetrySettings,
    /// Vendor preset used when `codes` is absent
    pub provider: String,
    /// Explicit code table, overriding the vendor preset
    pub codes: Option<ProviderErrorCodes>,
}

impl Default for DataAccessConfig {
    fn default() -> Self {
        Self { retry: RetrySettings::default(), provider: DEFAULT_PROVIDER.to_string(), codes: None }
    }
}

impl DataAccessConfig {
    pub fn new(retry: RetrySettings, provider: impl Into<String>) -> Self {
        Self { retry, provider: provider.into(), codes: None }
    }

    /// The code table to classify provider errors with.
    ///
    /// # Errors
    /// Returns `InfraError::Config` when no explicit table is given and the
    /// provider has no preset.
    pub fn error_codes(&self) -> InfraResult<ProviderErrorCodes> {
        if let Some(codes) = &self.codes {
            return Ok(codes.clone());
        }
        ProviderErrorCodes::for_vendor(&self.provider)
            .ok_or_else(|| InfraError::config(format!("Unknown provider: {}", self.provider)))
    }

    /// Check the retry settings and the provider.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> InfraResult<()> {
        self.retry.validate()?;
        self.error_codes()?;
        Ok(())
    }
}
