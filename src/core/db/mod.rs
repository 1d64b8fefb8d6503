/// Database Module
///
/// This module provides the core database functionality for dbpeek,
/// organized into focused submodules:
/// - **Connection Registry** (`registry.rs`): one live engine handle per
///   database path, opened lazily and cached
/// - **Schema Inspection** (`schema.rs`): catalog and pragma metadata
/// - **Query Execution** (`query.rs`): ad-hoc SQL with a tagged value type
///
/// All fallible operations use the shared `DbPeekError` type. SQL-level
/// execution failures are reported as data inside `QueryOutput`, not as
/// errors.
pub mod query;
pub mod registry;
pub mod schema;

pub use query::*;
pub use registry::*;
pub use schema::*;

/// Quotes an identifier for safe splicing into SQL text.
///
/// Wraps the name in double quotes and doubles any embedded double quote,
/// which is the engine's own escaping rule. Both catalog-supplied and
/// caller-supplied names pass through here, so a name containing quote
/// characters can never terminate the quoted identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
