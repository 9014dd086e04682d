//! Provider error codes and their mapping onto the failure taxonomy
//!
//! Providers report failures as an opaque integer code plus free text. The
//! numbering is vendor specific, so the codes live in a
//! [`ProviderErrorCodes`] table rather than in the mapping itself.
//! [`classify_provider_error`] turns any [`ProviderError`] into a
//! [`Failure`], parsing violation details out of the message where the
//! code calls for it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::failure::{Failure, FailureKind, ForeignKeyViolation, UniqueKeyViolation};

/// Error codes of one provider vendor, grouped by what they mean.
///
/// The default table is empty: every code is unknown. Groups left out of a
/// deserialized table stay empty too, so a custom vendor table never
/// inherits another vendor's numbering. Use [`ProviderErrorCodes::sql_server`]
/// or [`ProviderErrorCodes::sqlite`] for a preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderErrorCodes {
    pub vendor: String,
    pub timeout: Vec<i32>,
    pub deadlock: Vec<i32>,
    pub foreign_key: Vec<i32>,
    pub unique_constraint: Vec<i32>,
    pub unique_index: Vec<i32>,
    pub truncation: Vec<i32>,
    pub invalid_data: Vec<i32>,
    pub authorization: Vec<i32>,
}

impl ProviderErrorCodes {
    /// Microsoft SQL Server error numbers.
    pub fn sql_server() -> Self {
        Self {
            vendor: "sql_server".to_string(),
            timeout: vec![-2],
            deadlock: vec![1205],
            foreign_key: vec![547],
            unique_constraint: vec![2627],
            unique_index: vec![2601],
            truncation: vec![8152],
            invalid_data: vec![515],
            authorization: vec![229, 18456],
        }
    }

    /// SQLite extended result codes.
    pub fn sqlite() -> Self {
        Self {
            vendor: "sqlite".to_string(),
            // SQLITE_BUSY_TIMEOUT
            timeout: vec![773],
            // SQLITE_BUSY, SQLITE_LOCKED and their extended forms
            deadlock: vec![5, 6, 261, 262, 517],
            // SQLITE_CONSTRAINT_FOREIGNKEY
            foreign_key: vec![787],
            // SQLITE_CONSTRAINT_UNIQUE, SQLITE_CONSTRAINT_PRIMARYKEY
            unique_constraint: vec![2067, 1555],
            unique_index: vec![],
            // SQLITE_TOOBIG
            truncation: vec![18],
            // SQLITE_CONSTRAINT_NOTNULL, SQLITE_CONSTRAINT_CHECK
            invalid_data: vec![1299, 275],
            // SQLITE_AUTH, SQLITE_PERM
            authorization: vec![23, 3],
        }
    }

    /// Preset for a vendor name, if one exists.
    pub fn for_vendor(vendor: &str) -> Option<Self> {
        match vendor.trim().to_ascii_lowercase().as_str() {
            "sql_server" | "sqlserver" | "mssql" => Some(Self::sql_server()),
            "sqlite" => Some(Self::sqlite()),
            _ => None,
        }
    }

    /// The taxonomy kind a code stands for, if the table knows it.
    pub fn category(&self, code: i32) -> Option<FailureKind> {
        let groups: [(&[i32], FailureKind); 7] = [
            (self.foreign_key.as_slice(), FailureKind::ForeignKeyViolation),
            (self.unique_constraint.as_slice(), FailureKind::DuplicateKey),
            (self.unique_index.as_slice(), FailureKind::DuplicateKey),
            (self.deadlock.as_slice(), FailureKind::Deadlocked),
            (self.timeout.as_slice(), FailureKind::Timeout),
            (self.truncation.as_slice(), FailureKind::TruncatedData),
            (self.invalid_data.as_slice(), FailureKind::InvalidData),
        ];
        groups
            .into_iter()
            .find(|(codes, _)| codes.contains(&code))
            .map(|(_, kind)| kind)
            .or_else(|| self.authorization.contains(&code).then_some(FailureKind::Authorization))
    }
}

/// An error raised by a data provider.
pub trait ProviderError: std::error::Error + Send + Sync + 'static {
    /// Vendor error number, when the error carries one.
    fn code(&self) -> Option<i32>;

    /// Raw provider text, the input of the violation parsers.
    fn message(&self) -> String;

    /// The enclosing transaction was aborted. Always unrecoverable.
    fn is_transaction_aborted(&self) -> bool {
        false
    }

    /// The query ran but produced nothing.
    fn is_no_data(&self) -> bool {
        false
    }
}

/// A provider error reduced to its code and text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error {code}: {message}")]
pub struct RawProviderError {
    pub code: i32,
    pub message: String,
    pub transaction_aborted: bool,
}

impl RawProviderError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), transaction_aborted: false }
    }

    pub fn transaction_aborted(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), transaction_aborted: true }
    }
}

impl ProviderError for RawProviderError {
    fn code(&self) -> Option<i32> {
        Some(self.code)
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn is_transaction_aborted(&self) -> bool {
        self.transaction_aborted
    }
}

/// Map a provider error onto the taxonomy.
///
/// A transaction abort wins over any code. Foreign-key and duplicate-key
/// codes carry the parsed violation record. Codes the table does not know
/// become `Unclassified`, which the executor never retries.
pub fn classify_provider_error<E: ProviderError>(codes: &ProviderErrorCodes, err: E) -> Failure {
    let message = err.message();

    if err.is_transaction_aborted() {
        return Failure::transaction_aborted(message).with_source(err);
    }
    if err.is_no_data() {
        return Failure::no_data(message).with_source(err);
    }

    let Some(kind) = err.code().and_then(|code| codes.category(code)) else {
        return Failure::unclassified(err);
    };

    let failure = match kind {
        FailureKind::ForeignKeyViolation => {
            Failure::foreign_key(ForeignKeyViolation::parse(&message), message)
        }
        FailureKind::DuplicateKey => {
            let violation = match err.code() {
                Some(code) if codes.unique_index.contains(&code) => {
                    UniqueKeyViolation::parse_index(&message)
                }
                _ => UniqueKeyViolation::parse_constraint(&message),
            };
            Failure::duplicate_key(violation, message)
        }
        FailureKind::Deadlocked => Failure::deadlocked(message),
        FailureKind::Timeout => Failure::timeout(message),
        FailureKind::TruncatedData => Failure::truncated_data(message),
        FailureKind::InvalidData => Failure::invalid_data(message),
        FailureKind::Authorization => Failure::authorization(message),
        _ => Failure::unclassified_msg(message),
    };
    failure.with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::{Recoverability, RetryPolicy};

    fn classify_sql(code: i32, message: &str) -> Failure {
        classify_provider_error(&ProviderErrorCodes::sql_server(), RawProviderError::new(code, message))
    }

    /// Validates the SQL Server table against the documented mapping.
    ///
    /// Assertions:
    /// - Confirms deadlock and timeout codes retry.
    /// - Confirms constraint and truncation codes abort.
    #[test]
    fn test_sql_server_mapping() {
        assert_eq!(classify_sql(1205, "deadlock victim").kind(), FailureKind::Deadlocked);
        assert_eq!(classify_sql(-2, "timeout expired").kind(), FailureKind::Timeout);
        assert_eq!(classify_sql(8152, "would be truncated").kind(), FailureKind::TruncatedData);
        assert_eq!(classify_sql(1205, "x").retry_policy(), RetryPolicy::Retry);
        assert_eq!(classify_sql(8152, "x").retry_policy(), RetryPolicy::Abort);
    }

    #[test]
    fn test_foreign_key_code_parses_violation() {
        let failure = classify_sql(
            547,
            "The INSERT statement conflicted with the FOREIGN KEY constraint \
             \"FK_LocalTable_ForeignTable\". The conflict occurred in database \
             \"AnAmazingDatabase\", table \"dbo.ForeignTable\", column 'Id'.",
        );
        assert_eq!(failure.kind(), FailureKind::ForeignKeyViolation);
        assert_eq!(failure.retry_policy(), RetryPolicy::Abort);
        assert_eq!(
            failure.foreign_key_violation(),
            Some(&ForeignKeyViolation::new("LocalTable", "dbo.ForeignTable", "Id"))
        );
    }

    #[test]
    fn test_unique_codes_parse_violation() {
        let cases = [
            (
                2627,
                "Violation of UNIQUE KEY constraint 'UQ_Customer_Email'. Cannot insert duplicate \
                 key in object 'dbo.Customer'. The duplicate key value is (a@b.c).",
            ),
            (
                2601,
                "Cannot insert duplicate key row in object 'dbo.Customer' with unique index \
                 'IDX_Customer_Email'. The duplicate key value is (a@b.c).",
            ),
        ];
        for (code, message) in cases {
            let failure = classify_sql(code, message);
            assert_eq!(failure.kind(), FailureKind::DuplicateKey);
            assert_eq!(failure.kind().recoverability(), Recoverability::UserRecoverable);
            assert_eq!(
                failure.unique_violation(),
                Some(&UniqueKeyViolation::new("Customer", "Email", "a@b.c"))
            );
        }
    }

    /// Validates the code picks which constraint prefix is searched.
    ///
    /// Assertions:
    /// - Confirms a unique-index code ignores a `'pk_` prefix inside the
    ///   duplicate value.
    /// - Confirms a unique-constraint code ignores an `'idx_` prefix inside
    ///   the duplicate value.
    #[test]
    fn test_unique_code_selects_constraint_prefix() {
        let index = classify_sql(
            2601,
            "Cannot insert duplicate key row in object 'dbo.Person' with unique index \
             'IDX_Person_Name'. The duplicate key value is (O'pk_Hara).",
        );
        assert_eq!(
            index.unique_violation(),
            Some(&UniqueKeyViolation::new("Person", "Name", "O'pk_Hara"))
        );

        let constraint = classify_sql(
            2627,
            "Violation of PRIMARY KEY constraint 'PK_Tag_Label'. Cannot insert duplicate key in \
             object 'dbo.Tag'. The duplicate key value is (x'idx_y).",
        );
        assert_eq!(
            constraint.unique_violation(),
            Some(&UniqueKeyViolation::new("Tag", "Label", "x'idx_y"))
        );
    }

    /// Validates a transaction abort is unrecoverable whatever its code.
    #[test]
    fn test_transaction_abort_overrides_code() {
        let failure = classify_provider_error(
            &ProviderErrorCodes::sql_server(),
            RawProviderError::transaction_aborted(1205, "transaction aborted"),
        );
        assert_eq!(failure.kind(), FailureKind::TransactionAborted);
        assert_eq!(failure.retry_policy(), RetryPolicy::Abort);
    }

    #[test]
    fn test_unknown_code_is_unclassified() {
        let failure = classify_sql(50000, "custom raiserror");
        assert_eq!(failure.kind(), FailureKind::Unclassified);
        assert_eq!(failure.retry_policy(), RetryPolicy::Abort);
    }

    #[test]
    fn test_sqlite_categories() {
        let codes = ProviderErrorCodes::sqlite();
        assert_eq!(codes.category(5), Some(FailureKind::Deadlocked));
        assert_eq!(codes.category(787), Some(FailureKind::ForeignKeyViolation));
        assert_eq!(codes.category(2067), Some(FailureKind::DuplicateKey));
        assert_eq!(codes.category(1299), Some(FailureKind::InvalidData));
        assert_eq!(codes.category(1), None);
    }

    #[test]
    fn test_for_vendor() {
        assert_eq!(ProviderErrorCodes::for_vendor("MSSQL"), Some(ProviderErrorCodes::sql_server()));
        assert_eq!(ProviderErrorCodes::for_vendor(" sqlite "), Some(ProviderErrorCodes::sqlite()));
        assert_eq!(ProviderErrorCodes::for_vendor("oracle"), None);
    }

    /// Validates a partial table only knows the codes it lists.
    ///
    /// Assertions:
    /// - Confirms listed codes map onto their group.
    /// - Confirms SQL Server numbers are not filled into missing groups.
    /// - Confirms an unlisted timeout code classifies as `Unclassified`.
    #[test]
    fn test_codes_deserialize_with_defaults() {
        let codes: ProviderErrorCodes =
            serde_json::from_str(r#"{"vendor":"postgres","deadlock":[40001]}"#).unwrap();
        assert_eq!(codes.vendor, "postgres");
        assert_eq!(codes.category(40001), Some(FailureKind::Deadlocked));
        assert_eq!(codes.category(547), None);
        assert_eq!(codes.category(-2), None);
        assert!(codes.timeout.is_empty());

        let failure = classify_provider_error(&codes, RawProviderError::new(-2, "timeout expired"));
        assert_eq!(failure.kind(), FailureKind::Unclassified);
        assert_eq!(failure.retry_policy(), RetryPolicy::Abort);
    }

    #[test]
    fn test_default_table_is_empty() {
        let codes = ProviderErrorCodes::default();
        assert!(codes.vendor.is_empty());
        assert_eq!(codes.category(1205), None);
        assert_eq!(codes.category(2627), None);
    }
}
