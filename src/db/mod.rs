//! Database source abstraction.
//!
//! The shell only needs a cursor-like interface: run a statement, pull rows in
//! batches, and look at the column metadata. Result sets are capped; a caller
//! can never assume it saw every matching row.

mod sqlite;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::QueryError;
use crate::statement::DateDialect;

pub use sqlite::SqliteDatabase;

/// Default cap on rows fetched for one statement.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Default number of rows handed out per [`Database::fetch_batch`] call.
pub const DEFAULT_FETCH_SIZE: usize = 10_000;

/// One value in a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    /// A date with the text the database stored it as
    Date { value: NaiveDate, text: String },
    /// A timestamp with the text the database stored it as
    DateTime { value: NaiveDateTime, text: String },
    Bytes(Vec<u8>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    /// Canonical text form, with `null_display` standing in for NULL.
    pub fn render(&self, null_display: &str) -> String {
        match self {
            Cell::Null => null_display.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Integer(n) => n.to_string(),
            Cell::Real(f) => f.to_string(),
            Cell::Boolean(b) => b.to_string(),
            Cell::Date { text, .. } | Cell::DateTime { text, .. } => text.clone(),
            Cell::Bytes(bytes) => {
                let mut out = String::with_capacity(2 + bytes.len() * 2);
                out.push_str("0x");
                for b in bytes {
                    out.push_str(&format!("{b:02x}"));
                }
                out
            }
        }
    }
}

/// Rows plus column headers. Every row is as wide as `headers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A database the shell can query.
pub trait Database {
    /// Run `sql`, replacing any previous statement's rows.
    fn execute(&mut self, sql: &str) -> Result<(), QueryError>;

    /// Next batch of rows; empty once exhausted or once the row cap is hit.
    fn fetch_batch(&mut self) -> Result<Vec<Vec<Cell>>, QueryError>;

    /// Column names of the last executed statement.
    fn column_names(&self) -> &[String];

    /// Declared column types of the last executed statement, where known.
    fn column_types(&self) -> &[Option<String>];

    /// Date constructor syntax used when expanding `#date` macros.
    fn dialect(&self) -> DateDialect;

    /// Upper bound on rows returned by [`Database::query`].
    fn max_rows(&self) -> usize;

    /// Execute and fetch until exhausted or capped.
    fn query(&mut self, sql: &str) -> Result<ResultSet, QueryError> {
        self.execute(sql)?;

        let max_rows = self.max_rows();
        let mut rows = Vec::new();
        while rows.len() < max_rows {
            let batch = self.fetch_batch()?;
            if batch.is_empty() {
                break;
            }
            rows.extend(batch);
        }
        rows.truncate(max_rows);

        Ok(ResultSet::new(self.column_names().to_vec(), rows))
    }
}
