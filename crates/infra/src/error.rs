//! Infrastructure error type.

use backstop_common::error::{CommonError, ErrorSeverity};
use backstop_common::ProviderFailure;
use thiserror::Error;

pub type InfraResult<T> = Result<T, InfraError>;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A guarded call that the executor gave up on
    #[error(transparent)]
    Provider(#[from] ProviderFailure),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl InfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

backstop_common::impl_error_conversion!(InfraError, Common);
backstop_common::impl_error_classification!(InfraError, Common,
    Self::Config(_) | Self::Toml(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::Database(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
        critical: false,
    },
    Self::Provider(_) => {
        retryable: false,
        severity: ErrorSeverity::Critical,
        critical: true,
    }
);

#[cfg(test)]
mod tests {
    use backstop_common::error::ErrorClassification;
    use backstop_common::{FailureReason, Recoverability};

    use super::*;

    #[test]
    fn test_json_errors_become_serialization_errors() {
        let err: InfraError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, InfraError::Common(CommonError::Serialization { .. })));
    }

    /// Validates classification of infrastructure errors.
    ///
    /// Assertions:
    /// - Confirms a provider failure is critical and never retried.
    /// - Confirms common errors keep their own recoverability.
    #[test]
    fn test_classification() {
        let provider = InfraError::from(ProviderFailure::new(FailureReason::Exhausted, None, vec![]));
        assert!(provider.is_critical());
        assert!(!provider.is_retryable());
        assert_eq!(provider.recoverability(), Recoverability::Unrecoverable);

        let missing = InfraError::from(CommonError::not_found("config"));
        assert_eq!(missing.recoverability(), Recoverability::UserRecoverable);

        assert_eq!(InfraError::config("bad").severity(), ErrorSeverity::Error);
    }
}
