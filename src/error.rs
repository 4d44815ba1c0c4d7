//! Error types for sqlshell.
//!
//! - [`enum@Error`] - top-level error for session plumbing (line editor, I/O)
//! - [`QueryError`] - failures reported by the database source
//! - [`StatementError`] - per-statement faults reported to the user, after
//!   which the shell keeps running

use thiserror::Error;

use crate::statement::MacroError;

/// Main error type for sqlshell operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the database source
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Error from the line editor
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while executing a statement or fetching its rows.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Failed to open the database
    #[error("Cannot open database {target}: {reason}")]
    Open { target: String, reason: String },

    /// Failed to close the database cleanly
    #[error("Cannot close database {target}: {reason}")]
    Close { target: String, reason: String },

    /// The database rejected or failed the statement
    #[error("{0}")]
    Execution(String),

    /// A fetch was requested before any statement was executed
    #[error("No statement has been executed")]
    NoActiveStatement,
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        QueryError::Execution(err.to_string())
    }
}

/// A statement that could not be run. Reported, never fatal.
#[derive(Error, Debug)]
pub enum StatementError {
    /// The statement starts with a disallowed keyword
    #[error(
        "ERROR: Illegal query!\nIn its current form, this tool should only be used for select queries.\n\n{statement}\n"
    )]
    Illegal { statement: String },

    /// A `#date('...')` macro carried an unparseable literal
    #[error("ERROR: Bad Macro!\nIt looks like there is a bad macro specified near.\n{}\n", .0.offending_text())]
    BadMacro(MacroError),

    /// The database failed the statement
    #[error("ERROR: Error executing statement:\n{0}\n")]
    Query(#[from] QueryError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
