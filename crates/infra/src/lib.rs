//! # Backstop Infrastructure
//!
//! Provider-facing side of the retry executor.
//!
//! This crate contains:
//! - The SQL data-access handler, which classifies provider errors by code
//!   and hands the guarded call to the generic executor
//! - The SQLite provider adapter over `rusqlite`
//! - Configuration loading from environment variables or TOML/JSON files
//!
//! ## Architecture
//! - Builds on the taxonomy and executor in `backstop-common`
//! - Contains all "impure" code (I/O, database, environment)

pub mod config;
pub mod database;
pub mod error;

// Re-export commonly used items
pub use config::DataAccessConfig;
pub use database::{SqlDataAccessHandler, SqliteDatabase, SqliteProviderError};
pub use error::{InfraError, InfraResult};
