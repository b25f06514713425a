//! Table name validation.
//!
//! The collection table is configurable and interpolated into SQL, so it must
//! be a plain PostgreSQL identifier.

use sema_core::{Error, Result};

/// PostgreSQL truncates identifiers longer than this.
pub const MAX_IDENTIFIER_LEN: usize = 63;

const RESERVED: &[&str] = &[
    "pg_catalog",
    "information_schema",
    "select",
    "insert",
    "update",
    "delete",
    "drop",
    "create",
    "alter",
    "table",
    "grant",
    "revoke",
    "truncate",
    "user",
];

/// Validate a table name: ASCII letters, digits and underscores, starting
/// with a letter or underscore, at most 63 bytes, not a reserved word.
///
/// ```
/// use sema_db::validate_table_name;
///
/// assert!(validate_table_name("inbox_embeddings").is_ok());
/// assert!(validate_table_name("inbox; DROP TABLE x").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config("Table name cannot be empty".to_string()));
    }

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::Config(format!(
            "Table name exceeds {} character limit: {} characters",
            MAX_IDENTIFIER_LEN,
            name.len()
        )));
    }

    if let Some(first) = name.chars().next() {
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::Config(format!(
                "Table name must start with a letter or underscore, found: '{}'",
                first
            )));
        }
    }

    if let Some(bad) = name
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_')
    {
        return Err(Error::Config(format!(
            "Table name contains invalid character: '{}'",
            bad
        )));
    }

    if RESERVED.contains(&name.to_lowercase().as_str()) {
        return Err(Error::Config(format!(
            "Table name '{}' is a reserved word",
            name
        )));
    }

    Ok(())
}
