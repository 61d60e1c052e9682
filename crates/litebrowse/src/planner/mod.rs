//! Override planning for constraint-aware row duplication.
//!
//! Copying a row "as new" has to dodge two kinds of uniqueness violation:
//! the primary key, and every other unique index. The planner picks, per
//! constraint, one column that receives a fresh value instead of the copied
//! one, and records the choice in an [`OverridePlan`].
//!
//! The guarantee is deliberately weak: after [`plan_unique_overrides`]
//! succeeds, every unique index whose columns all appear in the insertion
//! column list has at least one column in the changed set. The INSERT then
//! differs from the source row on each applicable index; whether it really
//! succeeds is up to the engine.

use crate::affinity::{classify, Affinity};
use crate::core::identifier::quote_ident;
use crate::core::schema::{pk_columns, ColumnInfo, UniqueIndex};
use crate::core::value::SqlValue;
use crate::error::{BrowseError, Result};
use crate::preview::SeedRow;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Length of the random suffix appended to copied text values.
const TEXT_SUFFIX_LEN: usize = 8;

/// Source of "next value" numbers for numeric columns.
///
/// Implemented for [`Connection`] as `COALESCE(MAX(col)+1, 1)`.
pub trait SequenceProbe {
    /// A value strictly greater than every value currently in `column`,
    /// or 1 when the column holds no values.
    fn next_value(&self, table: &str, column: &str) -> Result<i64>;
}

impl SequenceProbe for Connection {
    fn next_value(&self, table: &str, column: &str) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX({})+1, 1) FROM {}",
            quote_ident(column)?,
            quote_ident(table)?
        );
        debug!("{}", sql);

        let value: Value = self
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| BrowseError::schema(format!("next value of {}", column), e))?;

        Ok(match value {
            Value::Integer(v) => v,
            Value::Real(v) => v.ceil() as i64,
            Value::Text(s) => s.trim().parse().unwrap_or(1),
            Value::Null | Value::Blob(_) => 1,
        })
    }
}

/// A fresh random identifier in canonical hyphenated form.
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Columns chosen for replacement and the values replacing them.
///
/// Both collections are keyed by lowercased column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverridePlan {
    changed: HashSet<String>,
    overrides: HashMap<String, SqlValue>,
}

impl OverridePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `column` as receiving a fresh value without recording one.
    ///
    /// Used for a rowid-alias key the engine assigns itself.
    pub fn mark_changed(&mut self, column: &str) {
        self.changed.insert(column.to_lowercase());
    }

    /// Record a replacement value for `column` and mark it changed.
    pub fn set_override(&mut self, column: &str, value: SqlValue) {
        let key = column.to_lowercase();
        self.changed.insert(key.clone());
        self.overrides.insert(key, value);
    }

    /// Check if `column` already receives a fresh value.
    pub fn is_changed(&self, column: &str) -> bool {
        self.changed.contains(&column.to_lowercase())
    }

    /// Replacement value for `column`, if one was planned.
    pub fn override_for(&self, column: &str) -> Option<&SqlValue> {
        self.overrides.get(&column.to_lowercase())
    }

    /// Lowercased names of all changed columns.
    pub fn changed(&self) -> &HashSet<String> {
        &self.changed
    }

    /// All planned replacement values.
    pub fn overrides(&self) -> &HashMap<String, SqlValue> {
        &self.overrides
    }
}

/// How the primary key of the copy is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PkSeed {
    /// No declared primary key; the copy gets a new rowid.
    NoPrimaryKey,

    /// `INTEGER PRIMARY KEY`: left out of the INSERT so the engine assigns it.
    Omitted(String),

    /// Any other single-column key: replaced by a planned override.
    Overridden(String),
}

impl PkSeed {
    /// The key column left out of the insertion column list, if any.
    pub fn omitted_column(&self) -> Option<&str> {
        match self {
            PkSeed::Omitted(col) => Some(col),
            _ => None,
        }
    }
}

/// Seed `plan` according to the primary key shape of `columns`.
///
/// Composite keys are rejected up front.
pub fn seed_primary_key<P: SequenceProbe + ?Sized>(
    probe: &P,
    table: &str,
    columns: &[ColumnInfo],
    plan: &mut OverridePlan,
) -> Result<PkSeed> {
    let pk = pk_columns(columns);
    match pk.as_slice() {
        [] => Ok(PkSeed::NoPrimaryKey),
        [col] if col.is_rowid_alias() => {
            plan.mark_changed(&col.name);
            Ok(PkSeed::Omitted(col.name.clone()))
        }
        [col] => {
            let value = match col.affinity() {
                Affinity::Numeric => SqlValue::Integer(probe.next_value(table, &col.name)?),
                Affinity::Text | Affinity::Other => SqlValue::Text(fresh_id()),
            };
            debug!("New primary key {} = {}", col.name, value);
            plan.set_override(&col.name, value);
            Ok(PkSeed::Overridden(col.name.clone()))
        }
        _ => Err(BrowseError::Unsupported(
            "composite primary keys not supported for duplicate insert".to_string(),
        )),
    }
}

/// Ensure every applicable unique index gets at least one fresh column.
///
/// For each index restricted to `insert_cols`: skip it when nothing is left
/// or when a column is already changed; otherwise replace the first text
/// column, else the first numeric column, else the first column.
///
/// Text columns get the seed value plus `-` and eight random hex digits,
/// numeric columns the next value from `probe`, anything else a fresh id.
pub fn plan_unique_overrides<P: SequenceProbe + ?Sized>(
    probe: &P,
    table: &str,
    insert_cols: &[String],
    col_types: &HashMap<String, String>,
    indexes: &[UniqueIndex],
    seed: &SeedRow<'_>,
    plan: &mut OverridePlan,
) -> Result<()> {
    let present: HashSet<String> = insert_cols.iter().map(|c| c.to_lowercase()).collect();
    let affinity_of = |col: &str| {
        col_types
            .get(&col.to_lowercase())
            .map(|t| classify(t))
            .unwrap_or(Affinity::Other)
    };

    for index in indexes {
        let cols: Vec<&String> = index
            .columns
            .iter()
            .filter(|c| present.contains(&c.to_lowercase()))
            .collect();
        if cols.is_empty() {
            continue;
        }
        if cols.iter().any(|c| plan.is_changed(c)) {
            continue;
        }

        let chosen = cols
            .iter()
            .find(|c| affinity_of(c.as_str()) == Affinity::Text)
            .or_else(|| {
                cols.iter()
                    .find(|c| affinity_of(c.as_str()) == Affinity::Numeric)
            })
            .unwrap_or(&cols[0]);

        let value = match affinity_of(chosen.as_str()) {
            Affinity::Text => {
                let base = seed.get(chosen).unwrap_or_default();
                let id = fresh_id();
                SqlValue::Text(format!("{}-{}", base, &id[..TEXT_SUFFIX_LEN]))
            }
            Affinity::Numeric => SqlValue::Integer(probe.next_value(table, chosen)?),
            Affinity::Other => SqlValue::Text(fresh_id()),
        };

        debug!("Unique index {}: override {} = {}", index.name, chosen, value);
        plan.set_override(chosen, value);
    }

    Ok(())
}
