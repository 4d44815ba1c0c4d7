//! Statement classification.
//!
//! Decides what happens to a buffered statement: cancelled, refused, broken
//! macro, or runnable in a given display mode. This is prefix/suffix matching
//! only; nothing here parses SQL.

use crate::cli::DisplayMode;

use super::macros::{rewrite, DateDialect, MacroError};

/// Leading keywords that are refused. The shell is for reading data.
pub const ILLEGAL_LEADING_KEYWORDS: [&str; 14] = [
    "alter",
    "checkpoint",
    "comment",
    "commit",
    "constraint",
    "create",
    "delete",
    "drop",
    "insert",
    "merge",
    "savepoint",
    "set",
    "truncate",
    "update",
];

const CANCEL_MARKERS: [&str; 2] = ["\\c", "\\C"];
const VERTICAL_MARKERS: [&str; 2] = ["\\g", "\\G"];

/// What the driver should do with a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition<'a> {
    Cancelled,
    Illegal,
    BadMacro(&'a MacroError),
    Runnable,
}

/// A statement after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedStatement {
    /// SQL with macros expanded and the terminator removed
    pub sql: String,
    pub mode: DisplayMode,
    pub cancelled: bool,
    pub illegal: bool,
    pub macro_error: Option<MacroError>,
}

impl ClassifiedStatement {
    fn new(sql: String) -> Self {
        Self {
            sql,
            mode: DisplayMode::default(),
            cancelled: false,
            illegal: false,
            macro_error: None,
        }
    }

    /// Outcome with precedence cancelled > illegal > bad macro > runnable.
    pub fn disposition(&self) -> Disposition<'_> {
        if self.cancelled {
            Disposition::Cancelled
        } else if self.illegal {
            Disposition::Illegal
        } else if let Some(err) = &self.macro_error {
            Disposition::BadMacro(err)
        } else {
            Disposition::Runnable
        }
    }

    pub fn is_runnable(&self) -> bool {
        matches!(self.disposition(), Disposition::Runnable)
    }
}

fn starts_with_illegal_keyword(statement: &str) -> bool {
    let lowered = statement.trim().to_lowercase();
    ILLEGAL_LEADING_KEYWORDS
        .iter()
        .any(|word| lowered.starts_with(word))
}

fn strip_any_suffix<'a>(text: &'a str, suffixes: &[&str]) -> Option<&'a str> {
    suffixes.iter().find_map(|suffix| text.strip_suffix(suffix))
}

/// Classify a raw statement.
///
/// `single_shot` is set for a statement given on the command line; it always
/// renders tab-separated.
pub fn classify(statement: &str, single_shot: bool, dialect: DateDialect) -> ClassifiedStatement {
    let mut classified = ClassifiedStatement::new(statement.to_string());

    if strip_any_suffix(statement.trim_end(), &CANCEL_MARKERS).is_some() {
        classified.cancelled = true;
        return classified;
    }

    classified.illegal = starts_with_illegal_keyword(statement);

    match rewrite(statement, dialect) {
        Ok(expanded) => classified.sql = expanded,
        Err(err) => classified.macro_error = Some(err),
    }

    if classified.illegal {
        tracing::debug!(statement, "Refusing statement with disallowed keyword");
        return classified;
    }

    let text = classified.sql.trim_end();
    let (sql, mode) = if single_shot {
        (
            text.strip_suffix(';').unwrap_or(text),
            DisplayMode::TabSeparated,
        )
    } else if let Some(stripped) = strip_any_suffix(text, &VERTICAL_MARKERS) {
        (stripped, DisplayMode::Vertical)
    } else if let Some(stripped) = text.strip_suffix(';') {
        (stripped, DisplayMode::BorderedTable)
    } else {
        (classified.sql.as_str(), DisplayMode::BorderedTable)
    };

    classified.sql = sql.to_string();
    classified.mode = mode;
    tracing::debug!(sql = %classified.sql, ?mode, "Classified statement");
    classified
}
