//! SQLite database source.

use std::collections::VecDeque;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, InterruptHandle, OpenFlags};

use super::{Cell, Database, DEFAULT_FETCH_SIZE, DEFAULT_MAX_ROWS};
use crate::error::QueryError;
use crate::statement::DateDialect;

const IN_MEMORY: &str = ":memory:";

/// How a declared column type steers value conversion.
///
/// SQLite stores dates as TEXT and booleans as INTEGER; the declared type is
/// the only hint that a value is something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind {
    Boolean,
    Date,
    DateTime,
    Other,
}

impl DeclaredKind {
    /// Map a declared type (e.g. `VARCHAR(20)`, `TIMESTAMP`) to a kind.
    pub fn from_decl_type(decl_type: Option<&str>) -> Self {
        let Some(decl) = decl_type else {
            return DeclaredKind::Other;
        };
        let upper = decl.trim().to_ascii_uppercase();
        if upper.contains("DATETIME") || upper.contains("TIMESTAMP") {
            DeclaredKind::DateTime
        } else if upper == "DATE" {
            DeclaredKind::Date
        } else if upper == "BOOLEAN" || upper == "BOOL" {
            DeclaredKind::Boolean
        } else {
            DeclaredKind::Other
        }
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Convert a raw SQLite value, using the declared type where it helps.
fn to_cell(value: ValueRef<'_>, kind: DeclaredKind) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(n) if kind == DeclaredKind::Boolean => Cell::Boolean(n != 0),
        ValueRef::Integer(n) => Cell::Integer(n),
        ValueRef::Real(f) => Cell::Real(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            match kind {
                DeclaredKind::DateTime => match parse_datetime(&text) {
                    Some(value) => Cell::DateTime { value, text },
                    None => Cell::Text(text),
                },
                DeclaredKind::Date => match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                    Ok(value) => Cell::Date { value, text },
                    Err(_) => Cell::Text(text),
                },
                _ => Cell::Text(text),
            }
        }
        ValueRef::Blob(bytes) => Cell::Bytes(bytes.to_vec()),
    }
}

/// Database source backed by a SQLite connection.
///
/// Rows are pulled from SQLite when the statement executes, stopping at the
/// row cap, and then handed out `fetch_size` at a time.
pub struct SqliteDatabase {
    conn: Connection,
    target: String,
    fetch_size: usize,
    max_rows: usize,
    columns: Vec<String>,
    column_types: Vec<Option<String>>,
    pending: VecDeque<Vec<Cell>>,
    executed: bool,
}

impl SqliteDatabase {
    /// Open a database file, read-only unless `read_only` is false.
    ///
    /// `:memory:` opens a private in-memory database.
    pub fn open<P: AsRef<Path>>(path: P, read_only: bool) -> Result<Self, QueryError> {
        let path = path.as_ref();
        let target = path.display().to_string();

        let conn = if target == IN_MEMORY {
            Connection::open_in_memory()
        } else if read_only {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        } else {
            Connection::open(path)
        }
        .map_err(|e| QueryError::Open {
            target: target.clone(),
            reason: e.to_string(),
        })?;

        tracing::info!(target = %target, read_only, "Opened SQLite database");
        Ok(Self::from_connection(conn, target))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection, target: impl Into<String>) -> Self {
        Self {
            conn,
            target: target.into(),
            fetch_size: DEFAULT_FETCH_SIZE,
            max_rows: DEFAULT_MAX_ROWS,
            columns: Vec::new(),
            column_types: Vec::new(),
            pending: VecDeque::new(),
            executed: false,
        }
    }

    /// Set the batch size and the row cap. Zero values are raised to one.
    pub fn with_limits(mut self, fetch_size: usize, max_rows: usize) -> Self {
        self.fetch_size = fetch_size.max(1);
        self.max_rows = max_rows.max(1);
        self
    }

    /// Description of what we are connected to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Handle that aborts the running statement from another thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Close the connection, reporting any failure to finalize it.
    pub fn close(self) -> Result<(), QueryError> {
        tracing::info!(target = %self.target, "Closing SQLite database");
        self.conn.close().map_err(|(_, e)| QueryError::Close {
            target: self.target,
            reason: e.to_string(),
        })
    }
}

impl Database for SqliteDatabase {
    fn execute(&mut self, sql: &str) -> Result<(), QueryError> {
        self.pending.clear();
        self.columns.clear();
        self.column_types.clear();
        self.executed = false;

        let mut stmt = self.conn.prepare(sql)?;
        self.columns = stmt.column_names().into_iter().map(String::from).collect();
        self.column_types = stmt
            .columns()
            .iter()
            .map(|c| c.decl_type().map(str::to_string))
            .collect();
        let kinds: Vec<DeclaredKind> = self
            .column_types
            .iter()
            .map(|t| DeclaredKind::from_decl_type(t.as_deref()))
            .collect();

        let mut rows = stmt.query([])?;
        while self.pending.len() < self.max_rows {
            let Some(row) = rows.next()? else {
                break;
            };
            let mut cells = Vec::with_capacity(kinds.len());
            for (idx, kind) in kinds.iter().enumerate() {
                cells.push(to_cell(row.get_ref(idx)?, *kind));
            }
            self.pending.push_back(cells);
        }

        tracing::debug!(
            rows = self.pending.len(),
            capped = self.pending.len() >= self.max_rows,
            "Statement executed"
        );
        self.executed = true;
        Ok(())
    }

    fn fetch_batch(&mut self) -> Result<Vec<Vec<Cell>>, QueryError> {
        if !self.executed {
            return Err(QueryError::NoActiveStatement);
        }
        let take = self.fetch_size.min(self.pending.len());
        Ok(self.pending.drain(..take).collect())
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn column_types(&self) -> &[Option<String>] {
        &self.column_types
    }

    fn dialect(&self) -> DateDialect {
        DateDialect::Sqlite
    }

    fn max_rows(&self) -> usize {
        self.max_rows
    }
}
