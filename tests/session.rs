//! End-to-end tests for the interactive loop.
//!
//! Drives a full session with scripted input lines against a SQLite file and
//! checks what reaches the output sink.

use std::collections::VecDeque;
use std::path::Path;

use rusqlite::Connection;
use sqlshell::cli::{LineSource, OutputSink, ReplInput};
use sqlshell::db::{Database, SqliteDatabase};
use sqlshell::{Session, SessionConfig};
use tempfile::{tempdir, TempDir};

/// Line source that replays a fixed script, then signals end of input.
struct Script {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl Script {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

impl LineSource for Script {
    fn read_line(&mut self, prompt: &str) -> sqlshell::Result<ReplInput> {
        self.prompts.push(prompt.to_string());
        Ok(match self.lines.pop_front() {
            Some(line) => ReplInput::Line(line),
            None => ReplInput::Exit,
        })
    }
}

#[derive(Default)]
struct Capture {
    emitted: Vec<String>,
    diagnostics: Vec<String>,
}

impl OutputSink for Capture {
    fn emit(&mut self, rendered: &str) -> std::io::Result<()> {
        self.emitted.push(rendered.to_string());
        Ok(())
    }

    fn diagnostic(&mut self, message: &str) -> std::io::Result<()> {
        self.diagnostics.push(message.to_string());
        Ok(())
    }
}

fn create_database(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("shop.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE orders (id INTEGER, customer TEXT, total REAL, placed DATETIME);
         INSERT INTO orders VALUES (1, 'alice', 12.5, '2020-01-02 09:30:00');
         INSERT INTO orders VALUES (2, 'bob', 7.25, '2020-01-03 14:00:00');
         INSERT INTO orders VALUES (3, NULL, 100.0, '2020-02-01 00:00:00');",
    )
    .unwrap();
    path
}

fn open_session(path: &Path) -> Session<SqliteDatabase, Capture> {
    let db = SqliteDatabase::open(path, true).unwrap();
    Session::new(db, Capture::default(), SessionConfig::default())
}

fn run_script(path: &Path, lines: &[&str]) -> (Session<SqliteDatabase, Capture>, Script) {
    let mut session = open_session(path);
    let mut script = Script::new(lines);
    session.run(&mut script).unwrap();
    (session, script)
}

#[test]
fn test_multiline_statement_bordered() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, script) = run_script(
        &path,
        &["select id, customer", "from orders", "where id < 3", "order by id;"],
    );

    let expected = "\
+----+----------+
| id | customer |
+----+----------+
|  1 | alice    |
|  2 | bob      |
+----+----------+
2 rows in set

";
    assert_eq!(session.sink().emitted, vec![expected]);
    assert!(session.sink().diagnostics.is_empty());
    assert_eq!(
        script.prompts,
        vec!["sqlshell> ", "       -> ", "       -> ", "       -> ", "sqlshell> "]
    );
}

#[test]
fn test_vertical_with_null() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, _) = run_script(&path, &["select id, customer from orders where id = 3\\G"]);

    let stars = "*".repeat(30);
    let expected = format!("{stars} 1. row {stars}\n      id: 3\ncustomer: NULL\n1 rows in set\n\n");
    assert_eq!(session.sink().emitted, vec![expected]);
}

#[test]
fn test_date_macro_filters_rows() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, _) = run_script(
        &path,
        &["select id, placed from orders where placed >= #date('2020-01-03') order by id;"],
    );

    let out = &session.sink().emitted[0];
    assert!(out.contains("| 2020-01-03 14:00:00 |"));
    assert!(out.contains("| 2020-02-01 00:00:00 |"));
    assert!(!out.contains("2020-01-02"));
    assert!(out.ends_with("2 rows in set\n\n"));
}

#[test]
fn test_empty_set() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, _) = run_script(&path, &["select * from orders where id > 100;"]);
    assert_eq!(session.sink().emitted, vec!["Empty set\n\n"]);
}

#[test]
fn test_several_statements_on_one_line() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, script) =
        run_script(&path, &["select 1 as one; select 2 as two\\g select 3 as three;"]);

    let emitted = &session.sink().emitted;
    assert_eq!(emitted.len(), 3);
    assert!(emitted[0].contains("| one |"));
    assert!(emitted[1].contains("two: 2"));
    assert!(emitted[2].contains("| three |"));
    // One line read, then the end-of-input read
    assert_eq!(script.prompts.len(), 2);
}

#[test]
fn test_cancel_then_continue() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, _) = run_script(
        &path,
        &["select * from", "orders oops \\c", "select count(*) as n from orders;"],
    );

    assert_eq!(session.sink().emitted.len(), 1);
    assert!(session.sink().emitted[0].contains("| 3 |"));
    assert!(session.sink().diagnostics.is_empty());
}

#[test]
fn test_illegal_statement_discards_rest_of_line() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, _) = run_script(
        &path,
        &[
            "delete from orders; select 'lost' as x;",
            "select count(*) as n from orders;",
        ],
    );

    assert_eq!(session.sink().diagnostics.len(), 1);
    assert!(session.sink().diagnostics[0].contains("ERROR: Illegal query!"));
    assert_eq!(session.sink().emitted.len(), 1);
    assert!(!session.sink().emitted[0].contains("lost"));
    assert!(session.sink().emitted[0].contains("| 3 |"));
}

#[test]
fn test_query_error_then_recovery() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, _) = run_script(
        &path,
        &["select * from missing;", "select max(id) as m from orders;"],
    );

    assert_eq!(session.sink().diagnostics.len(), 1);
    assert!(session.sink().diagnostics[0].contains("ERROR: Error executing statement:"));
    assert!(session.sink().diagnostics[0].contains("missing"));
    assert!(session.sink().emitted[0].contains("| 3 |"));
}

#[test]
fn test_quit_sentinel_stops_loop() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let (session, script) = run_script(&path, &["QUIT", "select 1;"]);

    assert!(session.sink().emitted.is_empty());
    assert_eq!(script.lines.len(), 1);
}

#[test]
fn test_single_shot_tab_separated() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let mut session = open_session(&path);
    let outcome = session
        .execute_statement("select id, customer from orders order by id;", true)
        .unwrap();

    assert!(!outcome.is_failure());
    assert_eq!(session.sink().emitted, vec!["1\talice\n2\tbob\n3\tNULL\n"]);
}

#[test]
fn test_single_shot_refuses_writes() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let mut session = open_session(&path);
    let outcome = session.execute_statement("update orders set total = 0", true).unwrap();

    assert!(outcome.is_failure());
    assert!(session.sink().emitted.is_empty());
}

#[test]
fn test_custom_null_display() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let db = SqliteDatabase::open(&path, true).unwrap();
    let config = SessionConfig {
        null_display: "(none)".to_string(),
        ..SessionConfig::default()
    };
    let mut session = Session::new(db, Capture::default(), config);
    session
        .execute_statement("select customer from orders where id = 3;", false)
        .unwrap();

    // A column holding only nulls is right-aligned
    assert!(session.sink().emitted[0].contains("|   (none) |"));
}

#[test]
fn test_row_cap_applies_to_session() {
    let dir = tempdir().unwrap();
    let path = create_database(&dir);

    let db = SqliteDatabase::open(&path, true).unwrap().with_limits(1, 2);
    assert_eq!(db.max_rows(), 2);
    let mut session = Session::new(db, Capture::default(), SessionConfig::default());
    session.execute_statement("select id from orders;", false).unwrap();

    assert!(session.sink().emitted[0].ends_with("2 rows in set\n\n"));
}
