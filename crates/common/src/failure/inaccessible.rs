//! The terminal failure reported by the retry executor.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Failure, FailureKind, Recoverability};
use crate::error::{ErrorClassification, ErrorSeverity};

/// Why the executor gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// A failure classified as not worth retrying
    Aborted,
    /// Every allowed attempt failed with a retryable failure
    Exhausted,
    /// The caller cancelled the sequence
    Cancelled,
}

impl FailureReason {
    fn headline(self) -> &'static str {
        match self {
            Self::Aborted => "Operation aborted.",
            Self::Exhausted => "Retry count exceeded.",
            Self::Cancelled => "Operation cancelled.",
        }
    }
}

/// One failed invocation of the guarded operation.
#[derive(Debug)]
pub struct AttemptRecord {
    /// 1-based attempt ordinal
    pub attempt: u32,
    pub failure: Failure,
    pub at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(attempt: u32, failure: Failure, at: DateTime<Utc>) -> Self {
        Self { attempt, failure, at }
    }
}

/// The provider could not be reached, or the call could not succeed.
///
/// This is the only error the executor returns. It owns the ordered history
/// of every failed attempt (oldest first) and the operation descriptor,
/// which was rendered exactly once, when this value was built.
#[derive(Debug)]
pub struct ProviderFailure {
    reason: FailureReason,
    message: String,
    descriptor: Option<String>,
    attempts: Vec<AttemptRecord>,
    total_delay: Duration,
}

impl ProviderFailure {
    pub fn new(
        reason: FailureReason,
        descriptor: Option<String>,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        let message = match descriptor.as_deref().map(str::trim) {
            Some(descriptor) if !descriptor.is_empty() => {
                format!("{} {}", reason.headline(), descriptor)
            }
            _ => reason.headline().to_string(),
        };
        Self { reason, message, descriptor, attempts, total_delay: Duration::ZERO }
    }

    /// Record how long the executor slept before giving up.
    pub fn with_total_delay(mut self, total_delay: Duration) -> Self {
        self.total_delay = total_delay;
        self
    }

    pub fn reason(&self) -> FailureReason {
        self.reason
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn descriptor(&self) -> Option<&str> {
        self.descriptor.as_deref()
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn into_attempts(self) -> Vec<AttemptRecord> {
        self.attempts
    }

    /// Time spent cooling off between attempts.
    pub fn total_delay(&self) -> Duration {
        self.total_delay
    }

    /// Every collected failure, oldest first.
    pub fn failures(&self) -> impl Iterator<Item = &Failure> + '_ {
        self.attempts.iter().map(|record| &record.failure)
    }

    pub fn last_failure(&self) -> Option<&Failure> {
        self.attempts.last().map(|record| &record.failure)
    }

    pub fn contains_kind(&self, kind: FailureKind) -> bool {
        self.failures().any(|failure| failure.kind() == kind)
    }

    /// True when the sequence stopped on something the caller can fix
    /// (bad input, a stale row, missing rights) rather than a system fault.
    pub fn is_user_recoverable(&self) -> bool {
        self.reason == FailureReason::Aborted
            && self.last_failure().map(|failure| failure.kind().recoverability())
                == Some(Recoverability::UserRecoverable)
    }

    /// The message, a blank line, then every collected failure in order.
    pub fn report(&self) -> String {
        let mut report = self.message.clone();
        report.push('\n');
        for record in &self.attempts {
            report.push_str(&format!(
                "\nattempt {} at {} [{}]: {}",
                record.attempt,
                record.at.to_rfc3339(),
                record.failure.kind(),
                record.failure
            ));
        }
        report
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_failure().map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}

impl ErrorClassification for ProviderFailure {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        if self.is_user_recoverable() {
            ErrorSeverity::Warning
        } else {
            ErrorSeverity::Error
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn recoverability(&self) -> Recoverability {
        if self.is_user_recoverable() {
            Recoverability::UserRecoverable
        } else {
            Recoverability::Unrecoverable
        }
    }
}
