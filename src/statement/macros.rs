//! Date macro expansion.
//!
//! `#date('2020-01-02')` and `#date('2020-01-02 13:45:00')` are shorthands
//! for the target database's date constructor. Expansion always goes through
//! a full timestamp, so a date-only literal becomes midnight.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use regex::Regex;
use thiserror::Error;

/// Upper bound on expansions in a single statement.
pub const MAX_EXPANSIONS: usize = 1024;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#date\('(.*?)'\)").expect("date macro pattern is valid"));

/// Date constructor syntax of the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DateDialect {
    /// `datetime('YYYY-MM-DD HH:MM:SS')`
    #[default]
    Sqlite,
    /// `to_date('YYYY-MM-DD HH:MM:SS', 'YYYY-MM-DD HH24:MI:SS')`
    Oracle,
}

impl DateDialect {
    /// Render a timestamp as a date-construction expression.
    pub fn date_expression(&self, timestamp: &NaiveDateTime) -> String {
        let text = timestamp.format(DATETIME_FORMAT);
        match self {
            DateDialect::Sqlite => format!("datetime('{text}')"),
            DateDialect::Oracle => format!("to_date('{text}', 'YYYY-MM-DD HH24:MI:SS')"),
        }
    }
}

/// Errors from macro expansion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
    /// The literal matched none of the accepted formats
    #[error("cannot parse date literal '{literal}'")]
    BadLiteral { literal: String },

    /// Expansion did not settle within [`MAX_EXPANSIONS`] rounds
    #[error("more than {limit} macro expansions in one statement")]
    TooManyExpansions { limit: usize },
}

impl MacroError {
    /// The text shown to the user next to the diagnostic.
    pub fn offending_text(&self) -> String {
        match self {
            MacroError::BadLiteral { literal } => literal.clone(),
            MacroError::TooManyExpansions { limit } => {
                format!("(more than {limit} #date macros)")
            }
        }
    }
}

/// Parse a macro literal: full timestamp first, then date-only at midnight.
pub fn parse_date_literal(literal: &str) -> Option<NaiveDateTime> {
    let literal = literal.trim();
    NaiveDateTime::parse_from_str(literal, DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(literal, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Expand every `#date('...')` macro in `sql`, leftmost first.
///
/// The search restarts on the rewritten text after each expansion. On failure
/// nothing is returned but the error; the caller's text stays as it was.
pub fn rewrite(sql: &str, dialect: DateDialect) -> Result<String, MacroError> {
    let mut text = sql.to_string();

    for _ in 0..MAX_EXPANSIONS {
        let found = DATE_MACRO.captures(&text).and_then(|caps| {
            let whole = caps.get(0)?;
            let literal = caps.get(1)?;
            Some((whole.range(), literal.as_str().to_string()))
        });
        let Some((range, literal)) = found else {
            return Ok(text);
        };

        let timestamp =
            parse_date_literal(&literal).ok_or_else(|| MacroError::BadLiteral { literal })?;

        let expansion = dialect.date_expression(&timestamp);
        tracing::trace!(macro_text = &text[range.clone()], %expansion, "Expanding date macro");
        text.replace_range(range, &expansion);
    }

    if DATE_MACRO.is_match(&text) {
        Err(MacroError::TooManyExpansions {
            limit: MAX_EXPANSIONS,
        })
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_literal_formats() {
        let full = parse_date_literal("2020-01-02 03:04:05").unwrap();
        assert_eq!(full.to_string(), "2020-01-02 03:04:05");

        let midnight = parse_date_literal(" 2020-01-02 ").unwrap();
        assert_eq!(midnight.to_string(), "2020-01-02 00:00:00");

        assert!(parse_date_literal("2020-13-01").is_none());
        assert!(parse_date_literal("not-a-date").is_none());
        assert!(parse_date_literal("").is_none());
    }

    #[test]
    fn test_rewrite_date_only_is_midnight() {
        let out = rewrite("where d = #date('2020-01-02')", DateDialect::Oracle).unwrap();
        assert_eq!(
            out,
            "where d = to_date('2020-01-02 00:00:00', 'YYYY-MM-DD HH24:MI:SS')"
        );
        assert!(!out.contains("#date"));
    }

    #[test]
    fn test_rewrite_sqlite_dialect() {
        let out = rewrite("select #date('1999-12-31 23:59:59')", DateDialect::Sqlite).unwrap();
        assert_eq!(out, "select datetime('1999-12-31 23:59:59')");
    }

    #[test]
    fn test_rewrite_multiple_macros_left_to_right() {
        let sql = "d between #date('2020-01-01') and #date('2020-02-01 12:00:00');";
        let out = rewrite(sql, DateDialect::Sqlite).unwrap();
        assert_eq!(
            out,
            "d between datetime('2020-01-01 00:00:00') and datetime('2020-02-01 12:00:00');"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let sql = "x > #date('2020-01-02') or y < #date('2021-06-07 08:09:10')";
        for dialect in [DateDialect::Sqlite, DateDialect::Oracle] {
            let once = rewrite(sql, dialect).unwrap();
            let twice = rewrite(&once, dialect).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_rewrite_without_macro_is_identity() {
        let sql = "select '#date' from t where c = '#date(x)'";
        assert_eq!(rewrite(sql, DateDialect::Sqlite).unwrap(), sql);
    }

    #[test]
    fn test_rewrite_bad_literal() {
        let sql = "#date('not-a-date')";
        let err = rewrite(sql, DateDialect::Oracle).unwrap_err();
        assert_eq!(
            err,
            MacroError::BadLiteral {
                literal: "not-a-date".to_string()
            }
        );
        assert_eq!(err.offending_text(), "not-a-date");
    }

    #[test]
    fn test_rewrite_bad_literal_after_good_one() {
        let sql = "a = #date('2020-01-01') and b = #date('2020-99-01')";
        let err = rewrite(sql, DateDialect::Sqlite).unwrap_err();
        assert_eq!(err.offending_text(), "2020-99-01");
    }

    #[test]
    fn test_rewrite_many_macros_within_limit() {
        let sql = vec!["#date('2020-01-01')"; 50].join(", ");
        let out = rewrite(&sql, DateDialect::Sqlite).unwrap();
        assert_eq!(out.matches("datetime(").count(), 50);
    }
}
