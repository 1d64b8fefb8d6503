//! SQL pretty-printing collaborator.
//!
//! Parses SQL text with the engine's dialect and re-renders it in
//! canonical form. A parse failure is a typed `Format` error; boundary
//! callers fall back to displaying the original unformatted text.

use crate::core::{DbPeekError, Result};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// Formats SQL text, returning the canonical rendering of each statement
/// joined by `;\n`.
pub fn format_sql(sql: &str) -> Result<String> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(DbPeekError::Format(
            "cannot format empty SQL text".to_string(),
        ));
    }

    let statements = Parser::parse_sql(&SQLiteDialect {}, trimmed)
        .map_err(|e| DbPeekError::Format(e.to_string()))?;

    Ok(statements
        .iter()
        .map(|stmt| stmt.to_string())
        .collect::<Vec<_>>()
        .join(";\n"))
}
