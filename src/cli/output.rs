//! Output formatting for query results.
//!
//! Three mysql-style layouts: a bordered table, bare tab-separated rows for
//! scripting, and a vertical one-column-per-line form for wide rows.

use std::io::Write;

use comfy_table::{Cell as TableCell, CellAlignment, ContentArrangement, Table};

use crate::db::{Cell, ResultSet};

/// Vertical labels are padded to at most this width.
const MAX_VERTICAL_LABEL_WIDTH: usize = 40;

/// mysql-style borders: `+` at every intersection, `-` rules above and below
/// the header and at the bottom, and no rules between data rows.
const MYSQL_PRESET: &str = "||--+-++|    ++++++";

/// Supported display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Bordered table with header and row count (`;`)
    #[default]
    BorderedTable,
    /// Tab-separated rows, no header (single-shot `-e`)
    TabSeparated,
    /// One column per line, boxed per row (`\g`, `\G`)
    Vertical,
}

/// Column alignment in the bordered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

impl From<Justify> for CellAlignment {
    fn from(justify: Justify) -> Self {
        match justify {
            Justify::Left => CellAlignment::Left,
            Justify::Right => CellAlignment::Right,
        }
    }
}

/// Decide alignment per column.
///
/// A column is left-aligned if any of its values is text, otherwise
/// right-aligned. A column holding only nulls is right-aligned.
pub fn column_justification(rows: &[Vec<Cell>], columns: usize) -> Vec<Justify> {
    (0..columns)
        .map(|col| {
            let has_text = rows
                .iter()
                .filter_map(|row| row.get(col))
                .any(Cell::is_text);
            if has_text {
                Justify::Left
            } else {
                Justify::Right
            }
        })
        .collect()
}

/// Trailing line for the bordered and vertical layouts.
pub fn summary_line(rows: usize) -> String {
    if rows > 0 {
        format!("{rows} rows in set\n\n")
    } else {
        "Empty set\n\n".to_string()
    }
}

/// Formats query results for output.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    null_display: String,
}

impl OutputFormatter {
    /// Create a formatter that shows NULL as `null_display`.
    pub fn new(null_display: impl Into<String>) -> Self {
        Self {
            null_display: null_display.into(),
        }
    }

    pub fn null_display(&self) -> &str {
        &self.null_display
    }

    /// Render a result set to a single text blob.
    pub fn render(&self, mode: DisplayMode, results: &ResultSet) -> String {
        match mode {
            DisplayMode::BorderedTable => self.render_table(results),
            DisplayMode::TabSeparated => self.render_tabs(results),
            DisplayMode::Vertical => self.render_vertical(results),
        }
    }

    /// Render and write to the given writer.
    pub fn write<W: Write>(
        &self,
        mode: DisplayMode,
        results: &ResultSet,
        writer: &mut W,
    ) -> std::io::Result<()> {
        writer.write_all(self.render(mode, results).as_bytes())
    }

    fn stringify(&self, results: &ResultSet) -> Vec<Vec<String>> {
        results
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.render(&self.null_display)).collect())
            .collect()
    }

    fn render_table(&self, results: &ResultSet) -> String {
        if results.is_empty() {
            return summary_line(0);
        }

        let justify = column_justification(&results.rows, results.headers.len());

        let mut table = Table::new();
        table
            .load_preset(MYSQL_PRESET)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(results.headers.iter().map(TableCell::new));

        for row in self.stringify(results) {
            table.add_row(row);
        }

        for (column, j) in table.column_iter_mut().zip(&justify) {
            column.set_cell_alignment((*j).into());
        }

        format!("{table}\n{}", summary_line(results.len()))
    }

    fn render_tabs(&self, results: &ResultSet) -> String {
        let mut out = String::new();
        for row in self.stringify(results) {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    fn render_vertical(&self, results: &ResultSet) -> String {
        if results.is_empty() {
            return summary_line(0);
        }

        let label_width = results
            .headers
            .iter()
            .map(|h| h.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_VERTICAL_LABEL_WIDTH);
        let stars = "*".repeat(30);

        let mut out = String::new();
        let rows = self.stringify(results);
        for (idx, row) in rows.iter().enumerate() {
            out.push_str(&format!("{stars} {}. row {stars}\n", idx + 1));
            for (label, value) in results.headers.iter().zip(row) {
                out.push_str(&format!("{label:>label_width$}: {value}\n"));
            }
        }
        out.push_str(&summary_line(rows.len()));
        out
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new("NULL")
    }
}
