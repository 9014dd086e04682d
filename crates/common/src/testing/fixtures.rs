//! Canonical provider messages and errors

use crate::provider::RawProviderError;

/// SQL Server error 547 for an insert into `LocalTable`.
pub const FOREIGN_KEY_MESSAGE: &str = "The INSERT statement conflicted with the FOREIGN KEY \
     constraint \"FK_LocalTable_ForeignTable\". The conflict occurred in database \
     \"AnAmazingDatabase\", table \"dbo.ForeignTable\", column 'Id'.";

/// SQL Server error 2627 on `UQ_TableName_ColumnName`.
pub const UNIQUE_KEY_MESSAGE: &str = "Violation of UNIQUE KEY constraint \
     'UQ_TableName_ColumnName'. Cannot insert duplicate key in object 'dbo.TableName'. The \
     duplicate key value is (blablabla).";

/// SQL Server error 2601 on `IDX_TableName_ColumnName`.
pub const UNIQUE_INDEX_MESSAGE: &str = "Cannot insert duplicate key row in object \
     'dbo.TableName' with unique index 'IDX_TableName_ColumnName'. The duplicate key value is \
     (blablabla).";

/// A SQL Server error with the given number.
pub fn sql_server_error(code: i32, message: impl Into<String>) -> RawProviderError {
    RawProviderError::new(code, message)
}

/// SQL Server deadlock victim (1205).
pub fn deadlock_error() -> RawProviderError {
    sql_server_error(
        1205,
        "Transaction (Process ID 52) was deadlocked on lock resources with another process and \
         has been chosen as the deadlock victim. Rerun the transaction.",
    )
}

/// SQL Server client timeout (-2).
pub fn timeout_error() -> RawProviderError {
    sql_server_error(
        -2,
        "Execution Timeout Expired. The timeout period elapsed prior to completion of the \
         operation or the server is not responding.",
    )
}
