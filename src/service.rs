//! Message boundary for a presentation host.
//!
//! Requests carry a correlation id; every request yields exactly one
//! response echoing that id. Typed introspection failures become
//! `Payload::Error` for the host to surface, while SQL-level query
//! failures ride inside `QueryOutput` as data. External refresh triggers
//! (file watchers live in the host, not here) use `refresh` to push an
//! unsolicited table list and database info.

use crate::config::Config;
use crate::core::db::query::{self, QueryOutput};
use crate::core::db::registry::{ConnectionRegistry, SharedConnection};
use crate::core::db::schema::{
    self, ColumnDescriptor, DatabaseInfo, ForeignKeyDescriptor, IndexDescriptor, TableDescriptor,
};
use crate::core::{DbPeekError, Result};
use crate::formatter;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;
use tracing::debug;
use uuid::Uuid;

/// Operations the service accepts from the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    ListTables { path: String },
    Columns { path: String, table: String },
    Indexes { path: String, table: String },
    ForeignKeys { path: String, table: String },
    Ddl { path: String, table: String },
    DatabaseInfo { path: String },
    Run { path: String, sql: String },
    Paginate {
        path: String,
        table: String,
        limit: Option<usize>,
        offset: Option<usize>,
    },
    Format { sql: String },
    Close { path: String },
    CloseAll,
}

/// A correlation-tagged request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Wraps a command with a fresh correlation id.
    pub fn new(command: Command) -> Self {
        Request {
            id: Uuid::new_v4(),
            command,
        }
    }
}

/// Response payloads, one variant per command family.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Tables { tables: Vec<TableDescriptor> },
    Columns { columns: Vec<ColumnDescriptor> },
    Indexes { indexes: Vec<IndexDescriptor> },
    ForeignKeys { foreign_keys: Vec<ForeignKeyDescriptor> },
    Ddl { sql: String },
    Info { info: DatabaseInfo },
    Query { output: QueryOutput },
    Formatted { sql: String },
    Closed,
    Error { message: String },
}

/// A response keyed by the originating request's correlation id.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: Uuid,
    pub payload: Payload,
}

/// Introspection and query service over a private connection registry.
pub struct DbService {
    registry: ConnectionRegistry,
    row_limit: usize,
}

impl DbService {
    /// Creates a service consuming the configured row limit.
    pub fn new(config: &Config) -> Self {
        DbService {
            registry: ConnectionRegistry::new(),
            row_limit: config.row_limit(),
        }
    }

    /// Handles one request, producing exactly one response with the same
    /// correlation id. Typed failures are folded into `Payload::Error`;
    /// nothing here panics or propagates.
    pub fn handle(&self, request: Request) -> Response {
        let payload = match self.dispatch(request.command) {
            Ok(payload) => payload,
            Err(e) => Payload::Error {
                message: e.to_string(),
            },
        };
        Response {
            id: request.id,
            payload,
        }
    }

    /// Pushes the current table list and database info for `path` with
    /// fresh correlation ids, for unsolicited refresh after an external
    /// file-change trigger.
    pub fn refresh(&self, path: &str) -> Vec<Response> {
        debug!("refreshing descriptors for {}", path);
        vec![
            self.handle(Request::new(Command::ListTables {
                path: path.to_string(),
            })),
            self.handle(Request::new(Command::DatabaseInfo {
                path: path.to_string(),
            })),
        ]
    }

    fn dispatch(&self, command: Command) -> Result<Payload> {
        match command {
            Command::ListTables { path } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                Ok(Payload::Tables {
                    tables: schema::list_tables(&conn)?,
                })
            }
            Command::Columns { path, table } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                Ok(Payload::Columns {
                    columns: schema::columns(&conn, &table)?,
                })
            }
            Command::Indexes { path, table } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                Ok(Payload::Indexes {
                    indexes: schema::indexes(&conn, &table)?,
                })
            }
            Command::ForeignKeys { path, table } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                Ok(Payload::ForeignKeys {
                    foreign_keys: schema::foreign_keys(&conn, &table)?,
                })
            }
            Command::Ddl { path, table } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                Ok(Payload::Ddl {
                    sql: schema::ddl(&conn, &table)?,
                })
            }
            Command::DatabaseInfo { path } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                Ok(Payload::Info {
                    info: schema::database_info(&conn, &path),
                })
            }
            Command::Run { path, sql } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                Ok(Payload::Query {
                    output: query::run(&conn, &sql),
                })
            }
            Command::Paginate {
                path,
                table,
                limit,
                offset,
            } => {
                let shared = self.registry.open(&path)?;
                let conn = lock_conn(&shared)?;
                let limit = limit.unwrap_or(self.row_limit);
                Ok(Payload::Query {
                    output: query::paginate(&conn, &table, Some(limit), offset),
                })
            }
            Command::Format { sql } => match formatter::format_sql(&sql) {
                Ok(formatted) => Ok(Payload::Formatted { sql: formatted }),
                Err(e) => {
                    // Fall back to the original text; a formatting failure
                    // is never surfaced as an error to the host.
                    debug!("formatting failed, returning original text: {}", e);
                    Ok(Payload::Formatted { sql })
                }
            },
            Command::Close { path } => {
                self.registry.close(&path)?;
                Ok(Payload::Closed)
            }
            Command::CloseAll => {
                self.registry.close_all();
                Ok(Payload::Closed)
            }
        }
    }
}

fn lock_conn(shared: &SharedConnection) -> Result<MutexGuard<'_, Connection>> {
    shared
        .lock()
        .map_err(|_| DbPeekError::App("connection lock poisoned".to_string()))
}
