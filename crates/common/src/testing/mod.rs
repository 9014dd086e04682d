//! Testing utilities for code built on the retry executor
//!
//! - **[`mocks`]**: [`ScriptedOperation`], a guarded operation that replays
//!   a fixed script of results and counts its invocations
//! - **[`fixtures`]**: canonical provider messages and errors
//! - **[`time`]**: [`MockClock`], virtual time for executor tests
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use backstop_common::failure::Failure;
//! use backstop_common::testing::ScriptedOperation;
//!
//! let op = ScriptedOperation::failing_then(vec![Failure::timeout("slow")], 42);
//! assert!(op.call().is_err());
//! assert_eq!(op.call().unwrap(), 42);
//! assert_eq!(op.calls(), 2);
//! # }
//! ```

pub mod fixtures;
pub mod mocks;
pub mod time;

pub use fixtures::{
    deadlock_error, sql_server_error, timeout_error, FOREIGN_KEY_MESSAGE, UNIQUE_INDEX_MESSAGE, UNIQUE_KEY_MESSAGE,
};
pub use mocks::ScriptedOperation;
pub use time::MockClock;
pub use crate::time::{Clock, SystemClock};
