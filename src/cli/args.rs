//! Command-line argument definitions.

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::db::{DEFAULT_FETCH_SIZE, DEFAULT_MAX_ROWS};
use crate::session::SessionConfig;
use crate::statement::DateDialect;

const HISTORY_FILE_NAME: &str = ".sqlshell_history";

/// Interactive read-only SQL shell with mysql-style output.
#[derive(Parser, Debug)]
#[command(name = "sqlshell")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// SQLite database file (`:memory:` for a scratch database)
    #[arg(value_name = "DATABASE", default_value = ":memory:")]
    pub database: PathBuf,

    /// Execute a single statement, print tab-separated rows and exit
    #[arg(short = 'e', long = "execute", value_name = "SQL")]
    pub execute: Option<String>,

    /// Pipe results through the specified pager program
    #[arg(short = 'P', long = "pager", value_name = "PROGRAM")]
    pub pager: Option<String>,

    /// Text shown for NULL values
    #[arg(long = "null-display", default_value = "NULL", value_name = "TEXT")]
    pub null_display: String,

    /// Maximum number of rows fetched per statement (at least 1)
    #[arg(long = "max-rows", default_value_t = DEFAULT_MAX_ROWS, value_parser = positive_count())]
    pub max_rows: usize,

    /// Rows fetched from the database per batch (at least 1)
    #[arg(long = "fetch-size", default_value_t = DEFAULT_FETCH_SIZE, value_parser = positive_count())]
    pub fetch_size: usize,

    /// History file (default: ~/.sqlshell_history)
    #[arg(long = "history-file", value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    /// Date constructor syntax for #date('...') macros (default: the database's own)
    #[arg(long = "date-dialect", value_enum, value_name = "DIALECT")]
    pub date_dialect: Option<DateDialect>,

    /// Open the database writable (disallowed statements are still refused)
    #[arg(long = "read-write")]
    pub read_write: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn positive_count() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}

impl Args {
    /// Check if we should enter interactive REPL mode.
    pub fn is_interactive(&self) -> bool {
        self.execute.is_none()
    }

    /// History file to use, falling back to one in the home directory.
    pub fn history_path(&self) -> PathBuf {
        self.history_file.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(HISTORY_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME))
        })
    }

    /// Settings handed to the session driver.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            null_display: self.null_display.clone(),
            date_dialect: self.date_dialect,
            ..SessionConfig::default()
        }
    }
}
