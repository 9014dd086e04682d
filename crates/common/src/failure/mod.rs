//! Failure taxonomy for guarded data-access calls
//!
//! Every failure a guarded operation can report is one variant of
//! [`Failure`]. Each variant maps to a fieldless [`FailureKind`], and each
//! kind has exactly one [`Recoverability`] class and one [`RetryPolicy`]:
//!
//! | Kind | Recoverability | Policy |
//! |------|----------------|--------|
//! | `Deadlocked`, `Timeout` | Recoverable | Retry |
//! | `ForeignKeyViolation` | Recoverable | Abort |
//! | `DuplicateKey`, `DataUpdated`, `DataDeleted`, `NoData`, `Authorization` | UserRecoverable | Abort |
//! | `InvalidData`, `TruncatedData`, `TransactionAborted`, `ProviderInaccessible`, `Unclassified` | Unrecoverable | Abort |
//!
//! [`classify`] is the single switch the retry executor consults. A failure
//! nobody recognised is `Unclassified` and never retried.

mod inaccessible;
mod violation;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::inaccessible::{AttemptRecord, FailureReason, ProviderFailure};
pub use self::violation::{ForeignKeyViolation, UniqueKeyViolation};
use crate::error::{CommonError, ErrorClassification, ErrorSeverity};

/// Boxed error type carried as the underlying cause of a failure
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Whether a failure can go away, and who has to act for it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recoverability {
    /// May succeed if simply attempted again
    Recoverable,
    /// Recoverable, but only after the caller or end user changes something
    UserRecoverable,
    /// The operation cannot succeed as issued
    Unrecoverable,
}

impl Recoverability {
    /// True for both recoverable classes.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::Unrecoverable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::UserRecoverable => "user_recoverable",
            Self::Unrecoverable => "unrecoverable",
        }
    }
}

impl fmt::Display for Recoverability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the executor does with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryPolicy {
    Retry,
    Abort,
}

/// Fieldless tag for every [`Failure`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidData,
    TruncatedData,
    Authorization,
    TransactionAborted,
    Deadlocked,
    Timeout,
    ForeignKeyViolation,
    DuplicateKey,
    DataUpdated,
    DataDeleted,
    NoData,
    ProviderInaccessible,
    Unclassified,
}

impl FailureKind {
    /// Every kind, in declaration order.
    pub const ALL: [FailureKind; 13] = [
        Self::InvalidData,
        Self::TruncatedData,
        Self::Authorization,
        Self::TransactionAborted,
        Self::Deadlocked,
        Self::Timeout,
        Self::ForeignKeyViolation,
        Self::DuplicateKey,
        Self::DataUpdated,
        Self::DataDeleted,
        Self::NoData,
        Self::ProviderInaccessible,
        Self::Unclassified,
    ];

    pub fn recoverability(self) -> Recoverability {
        match self {
            Self::Deadlocked | Self::Timeout | Self::ForeignKeyViolation => {
                Recoverability::Recoverable
            }
            Self::DuplicateKey
            | Self::DataUpdated
            | Self::DataDeleted
            | Self::NoData
            | Self::Authorization => Recoverability::UserRecoverable,
            Self::InvalidData
            | Self::TruncatedData
            | Self::TransactionAborted
            | Self::ProviderInaccessible
            | Self::Unclassified => Recoverability::Unrecoverable,
        }
    }

    pub fn retry_policy(self) -> RetryPolicy {
        classify(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidData => "invalid_data",
            Self::TruncatedData => "truncated_data",
            Self::Authorization => "authorization",
            Self::TransactionAborted => "transaction_aborted",
            Self::Deadlocked => "deadlocked",
            Self::Timeout => "timeout",
            Self::ForeignKeyViolation => "foreign_key_violation",
            Self::DuplicateKey => "duplicate_key",
            Self::DataUpdated => "data_updated",
            Self::DataDeleted => "data_deleted",
            Self::NoData => "no_data",
            Self::ProviderInaccessible => "provider_inaccessible",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether a failure of `kind` is worth another attempt.
///
/// Only transient contention (`Deadlocked`) and slowness (`Timeout`) are
/// retried. A foreign-key violation belongs to the recoverable family but is
/// a logic error in the request, so it aborts like everything else.
pub fn classify(kind: FailureKind) -> RetryPolicy {
    match kind {
        FailureKind::Deadlocked | FailureKind::Timeout => RetryPolicy::Retry,
        _ => RetryPolicy::Abort,
    }
}

/// A classified failure of a guarded operation.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("Data truncated: {message}")]
    TruncatedData {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("Not authorized: {message}")]
    Authorization {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("Transaction aborted: {message}")]
    TransactionAborted {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("Deadlocked: {message}")]
    Deadlocked {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("Timed out: {message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("Foreign key violation ({violation}): {message}")]
    ForeignKeyViolation {
        violation: ForeignKeyViolation,
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("Duplicate key ({violation}): {message}")]
    DuplicateKey {
        violation: UniqueKeyViolation,
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("{entity} '{id}' was changed by someone else")]
    DataUpdated {
        entity: String,
        id: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("{entity} '{id}' was deleted by someone else")]
    DataDeleted {
        entity: String,
        id: String,
        #[source]
        source: Option<BoxedError>,
    },

    #[error("No data: {message}")]
    NoData {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// A nested executor gave up.
    #[error(transparent)]
    ProviderInaccessible(Box<ProviderFailure>),

    #[error("{message}")]
    Unclassified {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },
}

impl Failure {
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData { message: message.into(), source: None }
    }

    pub fn truncated_data(message: impl Into<String>) -> Self {
        Self::TruncatedData { message: message.into(), source: None }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization { message: message.into(), source: None }
    }

    pub fn transaction_aborted(message: impl Into<String>) -> Self {
        Self::TransactionAborted { message: message.into(), source: None }
    }

    pub fn deadlocked(message: impl Into<String>) -> Self {
        Self::Deadlocked { message: message.into(), source: None }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout { message: message.into(), source: None }
    }

    pub fn foreign_key(violation: ForeignKeyViolation, message: impl Into<String>) -> Self {
        Self::ForeignKeyViolation { violation, message: message.into(), source: None }
    }

    pub fn duplicate_key(violation: UniqueKeyViolation, message: impl Into<String>) -> Self {
        Self::DuplicateKey { violation, message: message.into(), source: None }
    }

    pub fn data_updated(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DataUpdated { entity: entity.into(), id: id.into(), source: None }
    }

    pub fn data_deleted(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DataDeleted { entity: entity.into(), id: id.into(), source: None }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::NoData { message: message.into(), source: None }
    }

    /// Wrap an error nobody classified. It will never be retried.
    pub fn unclassified(error: impl Into<BoxedError>) -> Self {
        let source = error.into();
        Self::Unclassified { message: source.to_string(), source: Some(source) }
    }

    /// An unclassified failure with only a message.
    pub fn unclassified_msg(message: impl Into<String>) -> Self {
        Self::Unclassified { message: message.into(), source: None }
    }

    /// Attach the underlying cause. No-op for `ProviderInaccessible`,
    /// whose cause is its own attempt history.
    pub fn with_source(mut self, cause: impl Into<BoxedError>) -> Self {
        match &mut self {
            Self::InvalidData { source, .. }
            | Self::TruncatedData { source, .. }
            | Self::Authorization { source, .. }
            | Self::TransactionAborted { source, .. }
            | Self::Deadlocked { source, .. }
            | Self::Timeout { source, .. }
            | Self::ForeignKeyViolation { source, .. }
            | Self::DuplicateKey { source, .. }
            | Self::DataUpdated { source, .. }
            | Self::DataDeleted { source, .. }
            | Self::NoData { source, .. }
            | Self::Unclassified { source, .. } => *source = Some(cause.into()),
            Self::ProviderInaccessible(_) => {}
        }
        self
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidData { .. } => FailureKind::InvalidData,
            Self::TruncatedData { .. } => FailureKind::TruncatedData,
            Self::Authorization { .. } => FailureKind::Authorization,
            Self::TransactionAborted { .. } => FailureKind::TransactionAborted,
            Self::Deadlocked { .. } => FailureKind::Deadlocked,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::ForeignKeyViolation { .. } => FailureKind::ForeignKeyViolation,
            Self::DuplicateKey { .. } => FailureKind::DuplicateKey,
            Self::DataUpdated { .. } => FailureKind::DataUpdated,
            Self::DataDeleted { .. } => FailureKind::DataDeleted,
            Self::NoData { .. } => FailureKind::NoData,
            Self::ProviderInaccessible(_) => FailureKind::ProviderInaccessible,
            Self::Unclassified { .. } => FailureKind::Unclassified,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        classify(self.kind())
    }

    /// Structured duplicate-key details, if this is a duplicate key.
    pub fn unique_violation(&self) -> Option<&UniqueKeyViolation> {
        match self {
            Self::DuplicateKey { violation, .. } => Some(violation),
            _ => None,
        }
    }

    /// Structured foreign-key details, if this is a foreign-key violation.
    pub fn foreign_key_violation(&self) -> Option<&ForeignKeyViolation> {
        match self {
            Self::ForeignKeyViolation { violation, .. } => Some(violation),
            _ => None,
        }
    }
}

impl ErrorClassification for Failure {
    fn is_retryable(&self) -> bool {
        self.retry_policy() == RetryPolicy::Retry
    }

    fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            FailureKind::Deadlocked | FailureKind::Timeout => ErrorSeverity::Warning,
            FailureKind::ProviderInaccessible => ErrorSeverity::Critical,
            kind if kind.recoverability() == Recoverability::UserRecoverable => {
                ErrorSeverity::Info
            }
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::ProviderInaccessible(_))
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn recoverability(&self) -> Recoverability {
        self.kind().recoverability()
    }
}

impl From<CommonError> for Failure {
    fn from(err: CommonError) -> Self {
        let message = err.to_string();
        match err {
            CommonError::Timeout { .. } => Self::timeout(message).with_source(err),
            CommonError::Validation { .. } => Self::invalid_data(message).with_source(err),
            CommonError::NotFound { .. } => Self::no_data(message).with_source(err),
            CommonError::Unauthorized { .. } => Self::authorization(message).with_source(err),
            other => Self::unclassified(other),
        }
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Self::timeout(err.to_string()).with_source(err),
            std::io::ErrorKind::PermissionDenied => {
                Self::authorization(err.to_string()).with_source(err)
            }
            _ => Self::unclassified(err),
        }
    }
}

impl From<ProviderFailure> for Failure {
    fn from(err: ProviderFailure) -> Self {
        Self::ProviderInaccessible(Box::new(err))
    }
}
