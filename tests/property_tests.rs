//! Property-based tests for identifier quoting, pagination windows, and
//! size formatting.

use dbpeek::core::db::query::{paginate, QueryOutput, Value};
use dbpeek::core::db::schema::{self, human_size};
use dbpeek::core::db::quote_ident;
use proptest::prelude::*;
use rusqlite::Connection;

fn expect_rows(output: QueryOutput) -> Vec<Vec<Value>> {
    match output {
        QueryOutput::Rows { rows, .. } => rows,
        other => panic!("expected rows, got {:?}", other),
    }
}

proptest! {
    /// Any printable name, quote characters included, survives DDL,
    /// introspection, and pagination once it goes through `quote_ident`.
    #[test]
    fn quoted_identifiers_are_inert(
        // The engine rejects object names with its reserved prefix even
        // when quoted, so keep those out of the strategy.
        name in "[ -~]{1,16}".prop_filter(
            "engine-reserved name prefix",
            |s| !s.starts_with("sqlite_"),
        ),
    ) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            &format!("CREATE TABLE {} (x INTEGER)", quote_ident(&name)),
            [],
        )
        .unwrap();
        conn.execute(
            &format!("INSERT INTO {} VALUES (1)", quote_ident(&name)),
            [],
        )
        .unwrap();

        let columns = schema::columns(&conn, &name).unwrap();
        prop_assert_eq!(columns.len(), 1);
        prop_assert_eq!(&columns[0].name, "x");

        let rows = expect_rows(paginate(&conn, &name, None, None));
        prop_assert_eq!(rows, vec![vec![Value::Integer(1)]]);
    }

    /// `paginate` returns exactly the requested window in insertion
    /// order, clipped at the end of the table.
    #[test]
    fn paginate_returns_expected_window(
        n in 0usize..30,
        limit in 0usize..10,
        offset in 0usize..40,
    ) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (x INTEGER)", []).unwrap();
        for i in 0..n {
            conn.execute("INSERT INTO t VALUES (?1)", [i as i64]).unwrap();
        }

        let rows = expect_rows(paginate(&conn, "t", Some(limit), Some(offset)));
        let expected: Vec<Vec<Value>> = (offset..n.min(offset + limit))
            .map(|i| vec![Value::Integer(i as i64)])
            .collect();
        prop_assert_eq!(rows, expected);
    }

    /// `human_size` always renders a two-decimal value with a known unit
    /// and keeps the scaled value within one unit step.
    #[test]
    fn human_size_is_bounded(bytes in 0u64..1u64 << 50) {
        let rendered = human_size(bytes);
        let (number, unit) = rendered.split_once(' ').unwrap();
        let value: f64 = number.parse().unwrap();

        prop_assert!(["B", "KB", "MB", "GB", "TB"].contains(&unit));
        prop_assert!(value >= 0.0);
        if unit != "TB" {
            // {:.2} rounding can land exactly on the unit boundary
            prop_assert!(value <= 1024.0);
        }
    }
}
