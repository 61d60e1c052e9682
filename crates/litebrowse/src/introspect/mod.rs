//! Schema introspection through SQLite pragmas and the schema catalog.
//!
//! Nothing here is cached. Callers fetch metadata again whenever the current
//! object changes or a structural change (drop, reload) may have happened.

use crate::core::identifier::quote_ident;
use crate::core::schema::{ColumnInfo, ObjectKind, TableSchema, UniqueIndex};
use crate::error::{BrowseError, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use tracing::debug;

/// A table or view listed in the schema catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaObject {
    pub name: String,
    pub kind: ObjectKind,
}

/// List user tables and views sorted by name.
///
/// Internal `sqlite_*` objects are excluded.
pub fn list_objects(conn: &Connection) -> Result<Vec<SchemaObject>> {
    let sql = "SELECT name, type FROM sqlite_schema \
               WHERE type IN ('table','view') AND name NOT LIKE 'sqlite_%' \
               ORDER BY name";
    debug!("{}", sql);

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| BrowseError::schema("list tables", e))?;
    let objects = stmt
        .query_map([], |row| {
            let name: String = row.get(0)?;
            let kind: String = row.get(1)?;
            Ok(SchemaObject {
                name,
                kind: ObjectKind::from_catalog(&kind),
            })
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| BrowseError::schema("list tables", e))?;

    Ok(objects)
}

/// Look up whether `name` is a table or a view.
///
/// Any catalog type other than `view` is reported as a table.
pub fn object_kind(conn: &Connection, name: &str) -> Result<ObjectKind> {
    let kind: Option<String> = conn
        .query_row(
            "SELECT type FROM sqlite_schema WHERE name = ?1 LIMIT 1",
            [name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| BrowseError::schema("object kind", e))?;

    match kind {
        Some(kind) => Ok(ObjectKind::from_catalog(&kind)),
        None => Err(BrowseError::SchemaMissing(name.to_string())),
    }
}

/// Column descriptors in declaration order.
pub fn describe(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table)?);
    debug!("{}", sql);

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| BrowseError::schema("table_info", e))?;
    let columns = stmt
        .query_map([], |row| {
            // cid, name, type, notnull, dflt_value, pk
            let pk: i64 = row.get(5)?;
            Ok(ColumnInfo {
                name: row.get(1)?,
                decl_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                pk_order: u32::try_from(pk).unwrap_or(0),
            })
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| BrowseError::schema("table_info", e))?;

    // table_info returns no rows rather than an error for unknown names.
    if columns.is_empty() {
        return Err(BrowseError::SchemaMissing(table.to_string()));
    }

    Ok(columns)
}

/// Unique indexes of `table`, excluding the automatic primary-key index.
///
/// Index columns come back in index order. Expression columns have no name
/// and are left out; an index made only of expressions is dropped.
pub fn unique_indexes(conn: &Connection, table: &str) -> Result<Vec<UniqueIndex>> {
    // index_list is silent for unknown tables
    object_kind(conn, table)?;

    let sql = format!("PRAGMA index_list({})", quote_ident(table)?);
    debug!("{}", sql);

    let candidates: Vec<(String, String)> = {
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| BrowseError::schema("index_list", e))?;
        let rows = stmt
            .query_map([], |row| {
                // seq, name, unique, origin, partial
                let name: String = row.get(1)?;
                let unique: i64 = row.get(2)?;
                let origin: String = row.get(3)?;
                Ok((name, unique, origin))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| BrowseError::schema("index_list", e))?;
        rows.into_iter()
            .filter(|(_, unique, origin)| *unique == 1 && !origin.eq_ignore_ascii_case("pk"))
            .map(|(name, _, origin)| (name, origin))
            .collect()
    };

    let mut out = Vec::with_capacity(candidates.len());
    for (name, origin) in candidates {
        let columns = index_columns(conn, &name)?;
        if columns.is_empty() {
            continue;
        }
        debug!("Unique index {} ({}) on {:?}", name, origin, columns);
        out.push(UniqueIndex { name, columns });
    }

    Ok(out)
}

/// Named columns of an index in index order.
fn index_columns(conn: &Connection, index: &str) -> Result<Vec<String>> {
    let sql = format!("PRAGMA index_info({})", quote_ident(index)?);
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| BrowseError::schema("index_info", e))?;
    let names = stmt
        .query_map([], |row| row.get::<_, Option<String>>(2))
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| BrowseError::schema("index_info", e))?;

    Ok(names
        .into_iter()
        .flatten()
        .filter(|n| !n.is_empty())
        .collect())
}

/// Load kind, columns, and unique indexes in one go.
pub fn load_schema(conn: &Connection, name: &str) -> Result<TableSchema> {
    let kind = object_kind(conn, name)?;
    let columns = describe(conn, name)?;
    let unique_indexes = match kind {
        ObjectKind::Table => unique_indexes(conn, name)?,
        ObjectKind::View => Vec::new(),
    };

    Ok(TableSchema {
        name: name.to_string(),
        kind,
        columns,
        unique_indexes,
    })
}
