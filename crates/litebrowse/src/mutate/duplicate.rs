//! Constraint-aware copy of the selected row.

use super::RowContext;
use crate::core::identifier::{quote_ident, quote_ident_list, without};
use crate::core::schema::column_types;
use crate::core::value::SqlValue;
use crate::error::{BrowseError, Result};
use crate::introspect::{describe, unique_indexes};
use crate::planner::{plan_unique_overrides, seed_primary_key, OverridePlan, PkSeed};
use crate::rowid::{build_where, RowFilter, RowKey};
use rusqlite::{params_from_iter, Connection};
use std::fmt;
use tracing::{debug, info, warn};

/// Progress of one duplication, reported when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateStage {
    Idle,
    /// Selection bounds checked.
    Validated,
    /// Column and unique-index metadata loaded.
    Introspected,
    /// Primary key handled.
    Seeded,
    /// Every applicable unique index has a changed column.
    Planned,
    /// The engine returned from the INSERT.
    Executed,
}

impl fmt::Display for DuplicateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DuplicateStage::Idle => "idle",
            DuplicateStage::Validated => "validated",
            DuplicateStage::Introspected => "introspected",
            DuplicateStage::Seeded => "seeded",
            DuplicateStage::Planned => "planned",
            DuplicateStage::Executed => "executed",
        };
        f.write_str(s)
    }
}

/// Statement text and its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Compose `INSERT INTO t (cols) SELECT exprs FROM t WHERE filter`.
///
/// Each select expression is `?` for an overridden column and the quoted
/// column otherwise. Override parameters come first in column order,
/// followed by the filter parameters.
pub fn build_insert_select(
    table: &str,
    insert_cols: &[String],
    plan: &OverridePlan,
    filter: &RowFilter,
) -> Result<InsertStatement> {
    let table = quote_ident(table)?;

    let mut exprs = Vec::with_capacity(insert_cols.len());
    let mut params = Vec::with_capacity(insert_cols.len() + filter.params.len());
    for col in insert_cols {
        match plan.override_for(col) {
            Some(value) => {
                exprs.push("?".to_string());
                params.push(value.clone());
            }
            None => exprs.push(quote_ident(col)?),
        }
    }
    params.extend(filter.params.iter().cloned());

    let sql = format!(
        "INSERT INTO {} ({}) SELECT {} FROM {} WHERE {}",
        table,
        quote_ident_list(insert_cols)?,
        exprs.join(", "),
        table,
        filter.clause
    );

    Ok(InsertStatement { sql, params })
}

/// Insert a copy of the selected row that dodges its table's uniqueness
/// constraints.
///
/// Metadata is fetched fresh. Returns the plan that was applied.
pub fn duplicate_row(conn: &Connection, ctx: &RowContext<'_>) -> Result<OverridePlan> {
    let mut stage = DuplicateStage::Idle;
    let result = run(conn, ctx, &mut stage);
    if let Err(e) = &result {
        warn!("Duplicate on {} failed after stage {}: {}", ctx.table, stage, e);
    }
    result
}

fn run(conn: &Connection, ctx: &RowContext<'_>, stage: &mut DuplicateStage) -> Result<OverridePlan> {
    let seed = ctx
        .preview
        .seed(ctx.row)
        .ok_or_else(|| BrowseError::Validation("no row selected".to_string()))?;
    *stage = DuplicateStage::Validated;

    let columns = describe(conn, ctx.table)?;
    let indexes = unique_indexes(conn, ctx.table)?;
    *stage = DuplicateStage::Introspected;

    let mut plan = OverridePlan::new();
    let pk_seed = seed_primary_key(conn, ctx.table, &columns, &mut plan)?;

    let filter = build_where(&columns, ctx.preview, ctx.row)?;
    match (&pk_seed, &filter.key) {
        (PkSeed::NoPrimaryKey, RowKey::Implicit(_)) => {}
        (PkSeed::Omitted(_) | PkSeed::Overridden(_), RowKey::Identified(_)) => {}
        _ => return Err(BrowseError::unidentifiable()),
    }
    *stage = DuplicateStage::Seeded;

    let all_cols: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let insert_cols = match pk_seed.omitted_column() {
        Some(pk) => without(&all_cols, pk),
        None => all_cols,
    };

    plan_unique_overrides(
        conn,
        ctx.table,
        &insert_cols,
        &column_types(&columns),
        &indexes,
        &seed,
        &mut plan,
    )?;
    *stage = DuplicateStage::Planned;

    let affected = if insert_cols.is_empty() {
        // Only an INTEGER PRIMARY KEY: nothing to copy.
        let sql = format!("INSERT INTO {} DEFAULT VALUES", quote_ident(ctx.table)?);
        debug!("{}", sql);
        conn.execute(&sql, [])
            .map_err(|e| BrowseError::engine("insert", e))?
    } else {
        let stmt = build_insert_select(ctx.table, &insert_cols, &plan, &filter)?;
        debug!("{} {:?}", stmt.sql, stmt.params);
        conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))
            .map_err(|e| BrowseError::engine("insert", e))?
    };
    if affected == 0 {
        return Err(BrowseError::unidentifiable());
    }
    *stage = DuplicateStage::Executed;

    info!(
        "Duplicated row {} of {} ({} inserted, {} overridden)",
        ctx.row,
        ctx.table,
        affected,
        plan.overrides().len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(clause: &str, params: Vec<SqlValue>) -> RowFilter {
        RowFilter {
            key: RowKey::Implicit(3),
            clause: clause.to_string(),
            params,
        }
    }

    #[test]
    fn test_build_insert_select_mixes_overrides_and_copies() {
        let cols = vec!["id".to_string(), "Email".to_string(), "name".to_string()];
        let mut plan = OverridePlan::new();
        plan.set_override("ID", SqlValue::from("new"));
        plan.set_override("email", SqlValue::from("x@y-0123abcd"));

        let stmt = build_insert_select(
            "users",
            &cols,
            &plan,
            &filter("\"id\" = ?", vec![SqlValue::from("p1")]),
        )
        .unwrap();

        assert_eq!(
            stmt.sql,
            "INSERT INTO \"users\" (\"id\", \"Email\", \"name\") SELECT ?, ?, \"name\" FROM \"users\" WHERE \"id\" = ?"
        );
        assert_eq!(
            stmt.params,
            vec![
                SqlValue::from("new"),
                SqlValue::from("x@y-0123abcd"),
                SqlValue::from("p1")
            ]
        );
    }

    #[test]
    fn test_build_insert_select_copy_only() {
        let cols = vec!["a".to_string(), "b".to_string()];
        let stmt = build_insert_select(
            "r",
            &cols,
            &OverridePlan::new(),
            &filter("rowid = ?", vec![SqlValue::Integer(3)]),
        )
        .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"r\" (\"a\", \"b\") SELECT \"a\", \"b\" FROM \"r\" WHERE rowid = ?"
        );
        assert_eq!(stmt.params, vec![SqlValue::Integer(3)]);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(DuplicateStage::Introspected.to_string(), "introspected");
    }
}
