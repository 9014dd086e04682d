//! Shared error type and error classification
//!
//! [`CommonError`] covers the failures more than one Backstop crate can hit
//! outside a guarded call: bad configuration, malformed documents, file
//! I/O, missing records. [`ErrorClassification`] is the common question
//! every error type in the workspace answers, the taxonomy's [`Failure`]
//! included.
//!
//! A `CommonError` that escapes into a guarded operation is folded into the
//! taxonomy through `From<CommonError> for Failure`, so an operation written
//! against [`CommonResult`] can be handed straight to the retry executor.
//!
//! ## Module-specific errors
//!
//! ```rust,ignore
//! use backstop_common::error::{CommonError, ErrorSeverity};
//!
//! #[derive(Debug, thiserror::Error)]
//! pub enum LoaderError {
//!     #[error("Missing file: {0}")]
//!     MissingFile(String),
//!
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//! }
//!
//! backstop_common::impl_error_conversion!(LoaderError, Common);
//! backstop_common::impl_error_classification!(LoaderError, Common,
//!     Self::MissingFile(_) => {
//!         retryable: false,
//!         severity: ErrorSeverity::Error,
//!         critical: false,
//!     }
//! );
//! ```
//!
//! [`Failure`]: crate::failure::Failure

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::failure::Recoverability;

pub type CommonResult<T> = Result<T, CommonError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    #[error("Configuration error{}: {message}", in_field(.field))]
    Config { message: String, field: Option<String> },

    #[error("Serialization error{}: {message}", parenthesized(.format))]
    Serialization { message: String, format: Option<String> },

    /// File or driver I/O outside a guarded call
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout { operation: String, duration: Duration },

    #[error("Validation error for field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("{resource_type} not found{}", quoted_id(.identifier))]
    NotFound { resource_type: String, identifier: Option<String> },

    #[error("Unauthorized to perform '{operation}'")]
    Unauthorized { operation: String },

    /// Broken internal assumption
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn in_field(field: &Option<String>) -> String {
    field.as_ref().map(|field| format!(" in field '{field}'")).unwrap_or_default()
}

fn parenthesized(format: &Option<String>) -> String {
    format.as_ref().map(|format| format!(" ({format})")).unwrap_or_default()
}

fn quoted_id(identifier: &Option<String>) -> String {
    identifier.as_ref().map(|id| format!(": '{id}'")).unwrap_or_default()
}

impl CommonError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Configuration error pinned to one setting.
    pub fn config_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    pub fn serialization_format(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), format: Some(format.into()) }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }

    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound { resource_type: resource_type.into(), identifier: None }
    }

    pub fn not_found_with_id(resource_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound { resource_type: resource_type.into(), identifier: Some(identifier.into()) }
    }

    pub fn unauthorized(operation: impl Into<String>) -> Self {
        Self::Unauthorized { operation: operation.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Timeout { .. } | Self::Unauthorized { .. } => ErrorSeverity::Warning,
            Self::NotFound { .. } => ErrorSeverity::Info,
            Self::Internal { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn recoverability(&self) -> Recoverability {
        match self {
            Self::Timeout { .. } => Recoverability::Recoverable,
            Self::NotFound { .. } | Self::Unauthorized { .. } => Recoverability::UserRecoverable,
            _ => Recoverability::Unrecoverable,
        }
    }
}

/// Standard interface for classifying errors by their characteristics
///
/// Implemented by `CommonError`, by the failure taxonomy and by every
/// module-specific error in the workspace (usually through
/// [`impl_error_classification!`](crate::impl_error_classification)).
pub trait ErrorClassification {
    /// A later attempt of the same call may succeed without anything else
    /// changing.
    fn is_retryable(&self) -> bool;

    fn severity(&self) -> ErrorSeverity;

    /// Needs immediate attention
    fn is_critical(&self) -> bool;

    /// Suggested wait before retrying, if the error knows one
    fn retry_after(&self) -> Option<Duration>;

    /// Defaults to `Recoverable` for retryable errors and `Unrecoverable`
    /// otherwise. Override it to mark errors the caller can fix.
    fn recoverability(&self) -> Recoverability {
        if self.is_retryable() {
            Recoverability::Recoverable
        } else {
            Recoverability::Unrecoverable
        }
    }
}

/// Severity levels for log routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        })
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_format("JSON", err.to_string())
    }
}

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

/// Generate `From<serde_json::Error>` and `From<std::io::Error>` for a
/// module error that embeds `CommonError` in `$variant`.
///
/// The variant must already convert from `CommonError` (usually via
/// `#[from]`).
#[macro_export]
macro_rules! impl_error_conversion {
    ($error_type:ty, $variant:ident) => {
        impl From<serde_json::Error> for $error_type {
            fn from(err: serde_json::Error) -> Self {
                Self::$variant($crate::error::CommonError::from(err))
            }
        }

        impl From<std::io::Error> for $error_type {
            fn from(err: std::io::Error) -> Self {
                Self::$variant($crate::error::CommonError::from(err))
            }
        }
    };
}

/// Macro to implement ErrorClassification by delegating to CommonError
///
/// The embedded `CommonError` variant delegates every method, including
/// `recoverability`; the listed variants supply their own answers and fall
/// back to the trait's default recoverability.
#[macro_export]
macro_rules! impl_error_classification {
    (
        $error_type:ty,
        $common_variant:ident
        $(,
            $variant:pat => {
                retryable: $retryable:expr,
                severity: $severity:expr,
                critical: $critical:expr
                $(, retry_after: $retry_after:expr)?
                $(,)?
            }
        )*
        $(,)?
    ) => {
        impl $crate::error::ErrorClassification for $error_type {
            fn is_retryable(&self) -> bool {
                match self {
                    Self::$common_variant(e) => $crate::error::ErrorClassification::is_retryable(e),
                    $(
                        $variant => $retryable,
                    )*
                }
            }

            fn severity(&self) -> $crate::error::ErrorSeverity {
                match self {
                    Self::$common_variant(e) => $crate::error::ErrorClassification::severity(e),
                    $(
                        $variant => $severity,
                    )*
                }
            }

            fn is_critical(&self) -> bool {
                match self {
                    Self::$common_variant(e) => $crate::error::ErrorClassification::is_critical(e),
                    $(
                        $variant => $critical,
                    )*
                }
            }

            fn retry_after(&self) -> Option<std::time::Duration> {
                match self {
                    Self::$common_variant(e) => $crate::error::ErrorClassification::retry_after(e),
                    $(
                        $(
                            $variant => $retry_after,
                        )?
                    )*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            fn recoverability(&self) -> $crate::failure::Recoverability {
                match self {
                    Self::$common_variant(e) => $crate::error::ErrorClassification::recoverability(e),
                    _ if $crate::error::ErrorClassification::is_retryable(self) => $crate::failure::Recoverability::Recoverable,
                    _ => $crate::failure::Recoverability::Unrecoverable,
                }
            }
        }
    };
}
