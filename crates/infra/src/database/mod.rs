//! Database access
//!
//! - [`sqlite`]: the SQLite provider adapter and a shared connection handle
//! - [`sql_data_access`]: the handler that runs provider calls under the
//!   retry executor

pub mod sql_data_access;
pub mod sqlite;

pub use sql_data_access::SqlDataAccessHandler;
pub use sqlite::{SqliteDatabase, SqliteProviderError};
