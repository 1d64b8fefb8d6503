/// Schema Inspection Module
///
/// This module provides read-only introspection of a database: tables and
/// views, columns, indexes, foreign keys, stored DDL, and engine-level
/// settings. Every descriptor is an immutable snapshot; a fresh fetch
/// replaces the prior one in the caller's cache.
///
/// Enrichment steps (per-table row counts, per-index column lists,
/// per-setting pragma reads) degrade individually: one bad table never
/// aborts a listing.

use crate::core::db::{query::Value, quote_ident};
use crate::core::{DbPeekError, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Sentinel stored for an engine setting whose pragma read failed.
pub const UNAVAILABLE: &str = "unavailable";

/// Engine settings reported by `database_info`, in display order.
const SETTINGS: &[&str] = &[
    "journal_mode",
    "page_size",
    "cache_size",
    "synchronous",
    "auto_vacuum",
    "foreign_keys",
    "encoding",
    "user_version",
    "page_count",
    "freelist_count",
];

/// Kind of a catalog object returned by `list_tables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
    View,
}

/// A table or view in the catalog.
///
/// `row_count` is a snapshot taken at listing time (stale after writes)
/// and is populated only for `Table`-kind entries; a failed count leaves
/// it unset for that table alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    pub kind: TableKind,
    pub row_count: Option<u64>,
}

/// A column of a table or view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub ordinal: i64,
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

/// A single column of an index, in the index's own order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexColumn {
    pub ordinal: i64,
    pub name: String,
}

/// An index on a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub is_unique: bool,
    pub columns: Vec<IndexColumn>,
}

/// A foreign-key relationship declared on a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeyDescriptor {
    pub id: i64,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub on_update: String,
    pub on_delete: String,
}

/// Engine-level settings plus file-derived fields.
///
/// `filename` and the size fields are always present; each engine setting
/// degrades independently to the `UNAVAILABLE` sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseInfo {
    pub filename: String,
    pub file_size: Option<u64>,
    pub file_size_display: String,
    pub settings: BTreeMap<String, String>,
}

/// Lists tables and views from the catalog, excluding the engine's
/// reserved `sqlite_` prefix, ordered tables-before-views then by name.
///
/// Each table entry is enriched with a `SELECT COUNT(*)` snapshot; a
/// per-table count failure is logged and leaves `row_count` unset for
/// that table only.
pub fn list_tables(conn: &Connection) -> Result<Vec<TableDescriptor>> {
    let mut stmt = conn
        .prepare(
            "SELECT name, type FROM sqlite_master
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'
             ORDER BY CASE type WHEN 'table' THEN 0 ELSE 1 END, name",
        )
        .map_err(schema_err)?;

    let entries = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(schema_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(schema_err)?;

    let mut tables = Vec::with_capacity(entries.len());
    for (name, kind) in entries {
        let kind = if kind == "view" {
            TableKind::View
        } else {
            TableKind::Table
        };
        let row_count = match kind {
            TableKind::Table => match table_row_count(conn, &name) {
                Ok(count) => Some(count),
                Err(e) => {
                    warn!("row count for {} unavailable: {}", name, e);
                    None
                }
            },
            TableKind::View => None,
        };
        tables.push(TableDescriptor {
            name,
            kind,
            row_count,
        });
    }

    Ok(tables)
}

/// Retrieves column metadata for `table` via `PRAGMA table_info`.
///
/// An unknown table yields an empty list (the pragma reports no rows);
/// an engine rejection of the call itself is a `Schema` error.
pub fn columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
        .map_err(schema_err)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ColumnDescriptor {
                ordinal: row.get(0)?,
                name: row.get(1)?,
                declared_type: row.get(2)?,
                not_null: row.get(3)?,
                default_value: row.get(4)?,
                is_primary_key: row.get::<_, i64>(5)? > 0,
            })
        })
        .map_err(schema_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(schema_err)?;

    Ok(rows)
}

/// Lists the indexes on `table`, each with its ordered column list.
///
/// A failed per-index column lookup is logged and yields an empty column
/// list for that index only, not a total failure.
pub fn indexes(conn: &Connection, table: &str) -> Result<Vec<IndexDescriptor>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA index_list({})", quote_ident(table)))
        .map_err(schema_err)?;

    let listed = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, bool>(2)?))
        })
        .map_err(schema_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(schema_err)?;

    let mut out = Vec::with_capacity(listed.len());
    for (name, is_unique) in listed {
        let columns = match index_columns(conn, &name) {
            Ok(columns) => columns,
            Err(e) => {
                warn!("column list for index {} unavailable: {}", name, e);
                Vec::new()
            }
        };
        out.push(IndexDescriptor {
            name,
            is_unique,
            columns,
        });
    }

    Ok(out)
}

/// Lists the foreign keys declared on `table`.
pub fn foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKeyDescriptor>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA foreign_key_list({})", quote_ident(table)))
        .map_err(schema_err)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ForeignKeyDescriptor {
                id: row.get(0)?,
                to_table: row.get(2)?,
                from_column: row.get(3)?,
                // NULL when the reference targets the parent's primary key
                to_column: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                on_update: row.get(5)?,
                on_delete: row.get(6)?,
            })
        })
        .map_err(schema_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(schema_err)?;

    Ok(rows)
}

/// Returns the stored creation statement for the named table or view.
///
/// Fails with `NotFound` if no such object exists or its statement is
/// NULL (as for some internal objects).
pub fn ddl(conn: &Connection, name: &str) -> Result<String> {
    let stored: Option<Option<String>> = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()
        .map_err(schema_err)?;

    match stored {
        Some(Some(sql)) => Ok(sql),
        _ => Err(DbPeekError::NotFound(format!(
            "no stored definition for {}",
            name
        ))),
    }
}

/// Reads the fixed set of engine-level settings plus file-derived fields.
///
/// This call never fails as a whole: each setting read degrades to the
/// `UNAVAILABLE` sentinel for that one key, and a missing file leaves
/// `file_size` unset with the sentinel in the display field.
pub fn database_info(conn: &Connection, path: impl AsRef<Path>) -> DatabaseInfo {
    let path = path.as_ref();

    let mut settings = BTreeMap::new();
    for name in SETTINGS {
        let value = match read_setting(conn, name) {
            Ok(value) => value,
            Err(e) => {
                warn!("pragma {} unavailable: {}", name, e);
                UNAVAILABLE.to_string()
            }
        };
        settings.insert((*name).to_string(), value);
    }

    let file_size = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.len()),
        Err(e) => {
            warn!("could not stat {}: {}", path.display(), e);
            None
        }
    };

    DatabaseInfo {
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        file_size,
        file_size_display: file_size
            .map(human_size)
            .unwrap_or_else(|| UNAVAILABLE.to_string()),
        settings,
    }
}

/// Formats a byte count as a human-readable unit string, binary-1024
/// based with two-decimal precision.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

fn table_row_count(conn: &Connection, table: &str) -> rusqlite::Result<u64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count as u64)
}

fn index_columns(conn: &Connection, index: &str) -> rusqlite::Result<Vec<IndexColumn>> {
    let mut stmt = conn.prepare(&format!("PRAGMA index_info({})", quote_ident(index)))?;
    let rows = stmt.query_map([], |row| {
        Ok(IndexColumn {
            ordinal: row.get(0)?,
            // NULL for rowid or expression columns
            name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
    })?;
    rows.collect()
}

fn read_setting(conn: &Connection, name: &str) -> rusqlite::Result<String> {
    conn.query_row(&format!("PRAGMA {}", name), [], |row| {
        row.get_ref(0).map(|v| Value::from_sql_ref(v).to_string())
    })
}

fn schema_err(e: rusqlite::Error) -> DbPeekError {
    DbPeekError::Schema(e.to_string())
}
