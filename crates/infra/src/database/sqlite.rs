//! SQLite provider adapter
//!
//! [`SqliteProviderError`] exposes a `rusqlite` error through the
//! [`ProviderError`] seam: the extended result code is the provider code,
//! `SQLITE_ABORT` marks an aborted transaction and a query that returned no
//! rows reports no data. [`SqliteDatabase`] is a single shared connection
//! whose calls produce that error type.

use std::path::Path;
use std::sync::Arc;

use backstop_common::ProviderError;
use parking_lot::Mutex;
use rusqlite::ffi::ErrorCode;
use rusqlite::Connection;
use thiserror::Error;

use crate::error::InfraResult;

/// Error raised by a call against [`SqliteDatabase`].
#[derive(Debug, Error)]
pub enum SqliteProviderError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// The blocking task running the call panicked or was cancelled
    #[error("Database task failed: {0}")]
    Task(String),
}

impl ProviderError for SqliteProviderError {
    fn code(&self) -> Option<i32> {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => Some(err.extended_code),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(_, Some(message))) => message.clone(),
            other => other.to_string(),
        }
    }

    fn is_transaction_aborted(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::OperationAborted
        )
    }

    fn is_no_data(&self) -> bool {
        matches!(self, Self::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}

/// A single SQLite connection shared between callers.
///
/// Calls are serialized on the connection. Clones share it.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    /// Open (or create) a database file with foreign keys enforced.
    ///
    /// # Errors
    /// Returns [`InfraError::Database`](crate::InfraError::Database) if the
    /// file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> InfraResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database with foreign keys enforced.
    ///
    /// # Errors
    /// Returns [`InfraError::Database`](crate::InfraError::Database) if
    /// SQLite cannot allocate it.
    pub fn open_in_memory() -> InfraResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, enabling foreign-key enforcement.
    ///
    /// # Errors
    /// Returns [`InfraError::Database`](crate::InfraError::Database) if the
    /// pragma fails.
    pub fn from_connection(conn: Connection) -> InfraResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Run `f` on the calling thread.
    ///
    /// # Errors
    /// Whatever `f` returns.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, SqliteProviderError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock();
        Ok(f(&conn)?)
    }

    /// Run `f` on the blocking thread pool.
    ///
    /// # Errors
    /// Whatever `f` returns, or [`SqliteProviderError::Task`] if the task
    /// does not complete.
    pub async fn call<T, F>(&self, f: F) -> Result<T, SqliteProviderError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_connection(f))
            .await
            .map_err(|e| SqliteProviderError::Task(e.to_string()))?
    }
}
