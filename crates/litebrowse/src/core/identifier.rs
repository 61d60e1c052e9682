//! Identifier validation and quoting for dynamically built SQL.
//!
//! Table and column names cannot be bound as statement parameters, so every
//! statement the browser builds splices them in as quoted identifiers. SQLite
//! quotes identifiers with double quotes; an embedded double quote is doubled.
//!
//! Values are never spliced: they always travel as positional `?` parameters.

use crate::error::{BrowseError, Result};

/// Validate an identifier before it is spliced into SQL.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (SQLite truncates the statement there)
///
/// # Errors
///
/// Returns `BrowseError::Validation` for invalid identifiers.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BrowseError::Validation(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(BrowseError::Validation(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    Ok(())
}

/// Quote a SQLite identifier.
///
/// # Examples
///
/// ```
/// use litebrowse::core::identifier::quote_ident;
/// assert_eq!(quote_ident("users").unwrap(), "\"users\"");
/// assert_eq!(quote_ident("my\"table").unwrap(), "\"my\"\"table\"");
/// ```
pub fn quote_ident(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote a list of identifiers and join them with `", "`.
pub fn quote_ident_list<S: AsRef<str>>(names: &[S]) -> Result<String> {
    let quoted = names
        .iter()
        .map(|n| quote_ident(n.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(quoted.join(", "))
}

/// Position of `name` in `columns`, compared case-insensitively.
pub fn find_column(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.eq_ignore_ascii_case(name))
}

/// `names` with every case-insensitive occurrence of `name` removed.
pub fn without(names: &[String], name: &str) -> Vec<String> {
    names
        .iter()
        .filter(|n| !n.eq_ignore_ascii_case(name))
        .cloned()
        .collect()
}
