//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Interactive line input and history via rustyline
//! - Result formatting (bordered table, tab-separated, vertical)
//! - Output sinks (stdout or an external pager)

mod args;
mod output;
mod repl;
mod sink;

pub use args::Args;
pub use output::{column_justification, summary_line, DisplayMode, Justify, OutputFormatter};
pub use repl::{HistoryFile, LineSource, Repl, ReplInput};
pub use sink::{OutputSink, PagerSink, StdoutSink};
