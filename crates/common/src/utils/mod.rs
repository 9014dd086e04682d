//! Common utility functions
//!
//! - **[`serde`]**: serialization helpers for settings values

pub mod serde;

pub use self::serde::duration_millis;
