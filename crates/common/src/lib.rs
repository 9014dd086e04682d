//! Failure taxonomy and retry executor shared across Backstop crates.
//!
//! Guarded data-access calls fail in many ways. This crate turns every such
//! failure into a closed set of kinds, each carrying a recoverability class,
//! and drives the guarded call through a bounded, backoff-adjusted retry loop
//! that only ever reports one terminal error type, [`ProviderFailure`].
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors, failure taxonomy, violation parsers, provider error
//!   codes and retry settings
//! - `observability`: optional tracing (not included by default)
//! - `runtime`: the async retry executor, its blocking twin and the clock
//! - `test-utils`: scripted operations, fixtures and the mock clock for
//!   downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod failure;
#[cfg(feature = "foundation")]
pub mod provider;
#[cfg(feature = "foundation")]
pub mod resilience;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "runtime")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "foundation")]
pub use failure::{
    classify, AttemptRecord, BoxedError, Failure, FailureKind, FailureReason,
    ForeignKeyViolation, ProviderFailure, Recoverability, RetryPolicy, UniqueKeyViolation,
};
#[cfg(feature = "foundation")]
pub use provider::{classify_provider_error, ProviderError, ProviderErrorCodes, RawProviderError};
#[cfg(feature = "runtime")]
pub use resilience::{execute, RetryExecutor, RetryOutcome, RetryState};
#[cfg(feature = "foundation")]
pub use resilience::{RetrySettings, RetrySettingsBuilder};
#[cfg(feature = "test-utils")]
pub use testing::MockClock;
#[cfg(feature = "runtime")]
pub use time::{Clock, SystemClock};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;
