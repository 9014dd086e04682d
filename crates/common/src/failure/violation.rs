//! Constraint violation records parsed from raw provider messages.
//!
//! Parsing is best-effort. Provider message formats drift between versions,
//! so a message without the expected markers yields an empty record instead
//! of an error. Only position markers (quotes, parentheses, underscores in
//! the constraint name) are used; the duplicate value itself is copied
//! verbatim, whatever bytes it holds.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FOREIGN_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"table "(?P<table>[^"]+)""#).expect("FOREIGN_TABLE should compile - this is a bug")
});

static FOREIGN_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"column '(?P<column>[^']+)'").expect("FOREIGN_COLUMN should compile - this is a bug")
});

const FOREIGN_KEY_MARKER: &str = "\"fk_";

/// Quoted prefixes of unique and primary-key constraint names.
const CONSTRAINT_MARKERS: [&str; 2] = ["'uq_", "'pk_"];

/// Quoted prefix of unique index names.
const INDEX_MARKERS: [&str; 1] = ["'idx_"];

const ALL_UNIQUE_MARKERS: [&str; 3] = ["'uq_", "'pk_", "'idx_"];

const SQLITE_UNIQUE_MARKER: &str = "unique constraint failed: ";

/// A referential-integrity violation: which entity pointed at which
/// foreign table and column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyViolation {
    pub local_entity: String,
    pub foreign_entity: String,
    pub foreign_column: String,
}

impl ForeignKeyViolation {
    pub fn new(
        local_entity: impl Into<String>,
        foreign_entity: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        Self {
            local_entity: local_entity.into(),
            foreign_entity: foreign_entity.into(),
            foreign_column: foreign_column.into(),
        }
    }

    /// Parse a foreign-key conflict message.
    ///
    /// Expects a constraint named `"FK_<local>_<rest>"` (prefix matched
    /// case-insensitively). The local entity runs from the prefix to the next
    /// underscore. The foreign entity and column come from the first
    /// `table "..."` and `column '...'` segments; each is left empty when its
    /// segment is missing. Without the constraint marker the whole record is
    /// empty.
    pub fn parse(message: &str) -> Self {
        let lowered = message.to_ascii_lowercase();
        let Some(marker) = lowered.find(FOREIGN_KEY_MARKER) else {
            return Self::default();
        };

        let start = marker + FOREIGN_KEY_MARKER.len();
        let rest = &message[start..];
        let end = rest.find(['_', '"']).unwrap_or(rest.len());
        let local_entity = &rest[..end];

        let foreign_entity =
            FOREIGN_TABLE.captures(message).map(|c| c["table"].to_string()).unwrap_or_default();
        let foreign_column =
            FOREIGN_COLUMN.captures(message).map(|c| c["column"].to_string()).unwrap_or_default();

        Self::new(local_entity, foreign_entity, foreign_column)
    }

    /// True when nothing could be extracted.
    pub fn is_empty(&self) -> bool {
        self.local_entity.is_empty() && self.foreign_entity.is_empty() && self.foreign_column.is_empty()
    }
}

impl fmt::Display for ForeignKeyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}.{}", self.local_entity, self.foreign_entity, self.foreign_column)
    }
}

/// A uniqueness violation: the table, the key (column) and the value that
/// was already present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKeyViolation {
    pub table_name: String,
    pub key_name: String,
    pub duplicate_value: String,
}

impl UniqueKeyViolation {
    pub fn new(
        table_name: impl Into<String>,
        key_name: impl Into<String>,
        duplicate_value: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            key_name: key_name.into(),
            duplicate_value: duplicate_value.into(),
        }
    }

    /// Parse a unique-constraint, primary-key or unique-index message when
    /// the error code does not say which of them was violated.
    ///
    /// Recognises constraint names quoted as `'UQ_<table>_<key>'`,
    /// `'PK_<table>_<key>'` or `'IDX_<table>_<key>'` (prefixes matched
    /// case-insensitively), splitting on the last underscore of the name.
    /// The earliest prefix in the message wins. The duplicate value starts
    /// after the first `(` following the name and runs to the end of the
    /// message minus its two trailing characters.
    ///
    /// SQLite's `UNIQUE constraint failed: <table>.<column>` form is also
    /// understood; it carries no value, so `duplicate_value` stays empty.
    pub fn parse(message: &str) -> Self {
        Self::parse_with(message, &ALL_UNIQUE_MARKERS)
    }

    /// Parse a unique-constraint or primary-key message. Only `'UQ_` and
    /// `'PK_` names (and the SQLite form) are searched.
    pub fn parse_constraint(message: &str) -> Self {
        Self::parse_with(message, &CONSTRAINT_MARKERS)
    }

    /// Parse a unique-index message. Only `'IDX_` names (and the SQLite
    /// form) are searched.
    pub fn parse_index(message: &str) -> Self {
        Self::parse_with(message, &INDEX_MARKERS)
    }

    fn parse_with(message: &str, markers: &[&str]) -> Self {
        let lowered = message.to_ascii_lowercase();

        let earliest = markers
            .iter()
            .filter_map(|marker| lowered.find(marker).map(|position| position + marker.len()))
            .min();
        if let Some(name_start) = earliest {
            return Self::parse_quoted(message, name_start);
        }

        if let Some(position) = lowered.find(SQLITE_UNIQUE_MARKER) {
            return Self::parse_sqlite(&message[position + SQLITE_UNIQUE_MARKER.len()..]);
        }

        Self::default()
    }

    /// `name_start` is the byte offset just past the constraint prefix.
    fn parse_quoted(message: &str, name_start: usize) -> Self {
        let Some(name_len) = message[name_start..].find("'.") else {
            return Self::default();
        };
        let name_end = name_start + name_len;
        let name = &message[name_start..name_end];

        let (table_name, key_name) = match name.rfind('_') {
            Some(split) => (&name[..split], &name[split + 1..]),
            None => ("", name),
        };

        let duplicate_value = message[name_end..]
            .find('(')
            .map(|open| drop_trailing_chars(&message[name_end + open + 1..], 2))
            .unwrap_or_default();

        Self::new(table_name, key_name, duplicate_value)
    }

    fn parse_sqlite(columns: &str) -> Self {
        let mut table_name = "";
        let mut keys = Vec::new();
        for qualified in columns.trim().split(", ") {
            match qualified.split_once('.') {
                Some((table, column)) => {
                    table_name = table;
                    keys.push(column);
                }
                None => keys.push(qualified),
            }
        }

        Self::new(table_name, keys.join(","), "")
    }

    /// True when nothing could be extracted.
    pub fn is_empty(&self) -> bool {
        self.table_name.is_empty() && self.key_name.is_empty() && self.duplicate_value.is_empty()
    }
}

impl fmt::Display for UniqueKeyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} = ({})", self.table_name, self.key_name, self.duplicate_value)
    }
}

/// Drop `count` trailing characters, never splitting a code point.
fn drop_trailing_chars(value: &str, count: usize) -> String {
    let keep = value.chars().count().saturating_sub(count);
    value.chars().take(keep).collect()
}
