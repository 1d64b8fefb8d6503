//! End-to-end tests for the request/response service boundary.

use dbpeek::config::Config;
use dbpeek::core::db::query::{QueryOutput, Value};
use dbpeek::service::{Command, DbService, Payload, Request};
use rusqlite::Connection;
use tempfile::NamedTempFile;

fn seeded_db() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();
    conn.execute_batch(
        "
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );
        INSERT INTO users (name) VALUES ('Alice'), ('Bob');
    ",
    )
    .unwrap();
    file
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_str().unwrap().to_string()
}

#[test]
fn test_response_echoes_correlation_id() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());

    let request = Request::new(Command::ListTables { path: path_of(&file) });
    let id = request.id;
    let response = service.handle(request);

    assert_eq!(response.id, id);
}

#[test]
fn test_list_tables_through_service() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());

    let response = service.handle(Request::new(Command::ListTables { path: path_of(&file) }));
    match response.payload {
        Payload::Tables { tables } => {
            assert_eq!(tables.len(), 1);
            assert_eq!(tables[0].name, "users");
            assert_eq!(tables[0].row_count, Some(2));
        }
        other => panic!("Expected Tables, got {:?}", other),
    }
}

#[test]
fn test_columns_through_service() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());

    let response = service.handle(Request::new(Command::Columns {
        path: path_of(&file),
        table: "users".to_string(),
    }));
    match response.payload {
        Payload::Columns { columns } => {
            assert_eq!(columns.len(), 2);
            assert!(columns[0].is_primary_key);
        }
        other => panic!("Expected Columns, got {:?}", other),
    }
}

#[test]
fn test_run_and_paginate_through_service() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());
    let path = path_of(&file);

    let response = service.handle(Request::new(Command::Run {
        path: path.clone(),
        sql: "INSERT INTO users (name) VALUES ('Carol')".to_string(),
    }));
    match response.payload {
        Payload::Query { output } => assert_eq!(output, QueryOutput::Affected { count: 1 }),
        other => panic!("Expected Query, got {:?}", other),
    }

    let response = service.handle(Request::new(Command::Paginate {
        path,
        table: "users".to_string(),
        limit: Some(1),
        offset: Some(2),
    }));
    match response.payload {
        Payload::Query {
            output: QueryOutput::Rows { rows, .. },
        } => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0][1], Value::Text("Carol".to_string()));
        }
        other => panic!("Expected Rows, got {:?}", other),
    }
}

#[test]
fn test_sql_failure_rides_inside_query_payload() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());

    let response = service.handle(Request::new(Command::Run {
        path: path_of(&file),
        sql: "SELECT * FROM nonexistent".to_string(),
    }));
    match response.payload {
        Payload::Query {
            output: QueryOutput::Failed { message },
        } => assert!(message.contains("no such table")),
        other => panic!("Expected Failed query output, got {:?}", other),
    }
}

#[test]
fn test_missing_object_becomes_error_payload() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());

    let response = service.handle(Request::new(Command::Ddl {
        path: path_of(&file),
        table: "dropped".to_string(),
    }));
    match response.payload {
        Payload::Error { message } => assert!(message.contains("Not found")),
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[test]
fn test_unopenable_path_becomes_error_payload() {
    let service = DbService::new(&Config::default());

    let response = service.handle(Request::new(Command::ListTables {
        path: "/nonexistent/dir/peek.db".to_string(),
    }));
    match response.payload {
        Payload::Error { message } => assert!(message.contains("Connection error")),
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[test]
fn test_format_falls_back_to_original_text() {
    let service = DbService::new(&Config::default());

    let response = service.handle(Request::new(Command::Format {
        sql: "select  1".to_string(),
    }));
    match response.payload {
        Payload::Formatted { sql } => assert_eq!(sql, "SELECT 1"),
        other => panic!("Expected Formatted, got {:?}", other),
    }

    let garbage = "SELEKT * FRUM users".to_string();
    let response = service.handle(Request::new(Command::Format {
        sql: garbage.clone(),
    }));
    match response.payload {
        Payload::Formatted { sql } => assert_eq!(sql, garbage),
        other => panic!("Expected Formatted, got {:?}", other),
    }
}

#[test]
fn test_database_info_through_service() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());

    let response = service.handle(Request::new(Command::DatabaseInfo { path: path_of(&file) }));
    match response.payload {
        Payload::Info { info } => {
            assert!(info.file_size.unwrap() > 0);
            assert!(info.settings.contains_key("journal_mode"));
        }
        other => panic!("Expected Info, got {:?}", other),
    }
}

#[test]
fn test_refresh_pushes_tables_and_info() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());

    let pushed = service.refresh(&path_of(&file));
    assert_eq!(pushed.len(), 2);
    assert!(matches!(pushed[0].payload, Payload::Tables { .. }));
    assert!(matches!(pushed[1].payload, Payload::Info { .. }));
    assert_ne!(pushed[0].id, pushed[1].id);
}

#[test]
fn test_close_and_close_all() {
    let file = seeded_db();
    let service = DbService::new(&Config::default());
    let path = path_of(&file);

    service.handle(Request::new(Command::ListTables { path: path.clone() }));

    let response = service.handle(Request::new(Command::Close { path }));
    assert!(matches!(response.payload, Payload::Closed));

    let response = service.handle(Request::new(Command::CloseAll));
    assert!(matches!(response.payload, Payload::Closed));
}

#[test]
fn test_configured_row_limit_caps_pagination() {
    let file = seeded_db();
    let config: Config = toml::from_str("[query]\nrow_limit = 1\n").unwrap();
    let service = DbService::new(&config);

    let response = service.handle(Request::new(Command::Paginate {
        path: path_of(&file),
        table: "users".to_string(),
        limit: None,
        offset: None,
    }));
    match response.payload {
        Payload::Query {
            output: QueryOutput::Rows { rows, .. },
        } => assert_eq!(rows.len(), 1),
        other => panic!("Expected Rows, got {:?}", other),
    }
}
