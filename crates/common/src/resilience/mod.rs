//! Retry settings and the retry executor
//!
//! - **[`settings`]**: the immutable retry budget and cool-off schedule
//! - **[`retry`]** (`runtime`): the async executor and its blocking twin
//!
//! Settings carry no async machinery, so they live in the foundation tier
//! and can be loaded and validated by crates that never run the executor.

pub mod settings;

#[cfg(feature = "runtime")]
pub mod retry;

#[cfg(feature = "runtime")]
pub use retry::{execute, RetryExecutor, RetryOutcome, RetryState};
pub use settings::{RetrySettings, RetrySettingsBuilder};
