/// Query Execution Module
///
/// This module runs arbitrary SQL text against a connection and normalizes
/// the heterogeneous result shape into one output type. Each invocation is
/// a fresh parse/execute cycle: no statement caching, no prepared-statement
/// reuse, no transaction management beyond the engine's autocommit.
///
/// SQL-level failures are data, not control flow: `run` never returns a
/// Rust error, so a failed user query can be rendered inline without
/// aborting the session.

use crate::core::db::quote_ident;
use rusqlite::{types::ValueRef, Connection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default cap on rows fetched by `paginate`, bounding memory and render
/// latency. Overridable through configuration.
pub const DEFAULT_ROW_LIMIT: usize = 1000;

/// A single cell value, tagged so round-trips across the boundary are
/// lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Converts a borrowed engine value into an owned tagged value.
    pub fn from_sql_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(t) => write!(f, "{}", t),
            Value::Blob(b) => write!(f, "<BLOB: {} bytes>", b.len()),
        }
    }
}

/// Outcome of executing one piece of SQL text.
///
/// The discriminant is explicit so a zero-row SELECT (columns known, rows
/// empty) is never mistaken for a mutation, and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum QueryOutput {
    /// The statement produced a column set (possibly with zero rows).
    /// Each inner row has exactly `columns.len()` values.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// The statement produced no column set; `count` is the engine's
    /// reported mutation magnitude.
    Affected { count: usize },
    /// The engine rejected the statement. Carried as data so the boundary
    /// caller can render it inline.
    Failed { message: String },
}

/// Executes arbitrary SQL text against `conn`.
///
/// Never returns a Rust error for a SQL-level failure; the engine's
/// message comes back in `QueryOutput::Failed` instead.
///
/// Only the first statement of the text is prepared and executed; any
/// trailing statements are ignored. Hosts that need to run a script
/// submit one statement per call.
pub fn run(conn: &Connection, sql: &str) -> QueryOutput {
    match execute(conn, sql) {
        Ok(output) => output,
        Err(e) => QueryOutput::Failed {
            message: e.to_string(),
        },
    }
}

/// Fetches one page of `table` via a synthesized
/// `SELECT * FROM "table" LIMIT n OFFSET m`.
///
/// `limit` defaults to `DEFAULT_ROW_LIMIT`, `offset` to 0.
pub fn paginate(
    conn: &Connection,
    table: &str,
    limit: Option<usize>,
    offset: Option<usize>,
) -> QueryOutput {
    let sql = format!(
        "SELECT * FROM {} LIMIT {} OFFSET {}",
        quote_ident(table),
        limit.unwrap_or(DEFAULT_ROW_LIMIT),
        offset.unwrap_or(0)
    );
    run(conn, &sql)
}

fn execute(conn: &Connection, sql: &str) -> rusqlite::Result<QueryOutput> {
    let mut stmt = conn.prepare(sql)?;

    // A statement without a column set is a mutation; its magnitude is the
    // engine-reported change count.
    if stmt.column_count() == 0 {
        let count = stmt.execute([])?;
        return Ok(QueryOutput::Affected { count });
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = stmt.column_count();

    let rows = stmt
        .query_map([], |row| {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(Value::from_sql_ref(row.get_ref(i)?));
            }
            Ok(values)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(QueryOutput::Rows { columns, rows })
}
