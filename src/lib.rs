//! sqlshell - an interactive, read-only SQL shell with mysql-style output.
//!
//! Lines typed at the prompt are buffered until a terminator completes a
//! statement. The terminator picks the display mode:
//!
//! | Terminator   | Effect                                   |
//! |--------------|------------------------------------------|
//! | `;`          | bordered table with a row count          |
//! | `\g`, `\G`   | vertical, one column per line            |
//! | `\c`, `\C`   | cancel the statement typed so far        |
//!
//! Statements starting with a mutating keyword are refused, and
//! `#date('YYYY-MM-DD[ HH:MM:SS]')` expands to the database's date
//! constructor before execution.
//!
//! # Example
//!
//! ```no_run
//! use sqlshell::cli::StdoutSink;
//! use sqlshell::db::SqliteDatabase;
//! use sqlshell::session::{Session, SessionConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let db = SqliteDatabase::open("data.sqlite", true)?;
//!     let mut session = Session::new(db, StdoutSink, SessionConfig::default());
//!     session.execute_statement("SELECT COUNT(*) FROM users;", false)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod db;
pub mod error;
pub mod session;
pub mod statement;

pub use error::{Error, QueryError, Result, StatementError};
pub use session::{Session, SessionConfig, StatementOutcome};
