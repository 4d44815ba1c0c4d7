//! Multi-line statement accumulation.
//!
//! The line editor strips the trailing newline from every line it returns, so
//! an incomplete buffer is kept ending in a single space to stop consecutive
//! lines from running together.

use crate::cli::{LineSource, ReplInput};
use crate::error::Result;

/// Statement terminators, in declaration order.
///
/// Declaration order only matters for ties; the earliest occurrence in the
/// buffer always wins.
pub const TERMINATORS: [&str; 5] = [";", "\\c", "\\C", "\\g", "\\G"];

/// Inputs that end the session when they make up the whole buffer.
pub const QUIT_SENTINELS: [&str; 4] = ["quit", "quit;", "exit", "exit;"];

const FRESH_PROMPT: &str = "sqlshell> ";
const CONTINUATION_PROMPT: &str = "       -> ";

/// Result of one round of [`StatementBuffer::next_statement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEvent {
    /// A complete statement, terminator included
    Statement(String),
    /// A line was read but no statement is complete yet
    Incomplete,
    /// The user asked to leave (quit sentinel, Ctrl-D or Ctrl-C)
    EndOfInput,
}

/// Accumulates raw input lines until a terminator completes a statement.
#[derive(Debug, Clone)]
pub struct StatementBuffer {
    pending: String,
    fresh_prompt: String,
    continuation_prompt: String,
}

impl StatementBuffer {
    pub fn new() -> Self {
        Self::with_prompts(FRESH_PROMPT, CONTINUATION_PROMPT)
    }

    /// Create a buffer with custom prompts.
    pub fn with_prompts(fresh: impl Into<String>, continuation: impl Into<String>) -> Self {
        Self {
            pending: String::new(),
            fresh_prompt: fresh.into(),
            continuation_prompt: continuation.into(),
        }
    }

    /// Unterminated input collected so far.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Append a line verbatim.
    pub fn ingest(&mut self, line: &str) {
        self.pending.push_str(line);
    }

    /// Remove and return the first complete statement, terminator included.
    ///
    /// Scans for every terminator and cuts at the one starting earliest in the
    /// buffer. Whatever follows is left-trimmed and kept for the next call.
    pub fn extract_statement(&mut self) -> Option<String> {
        let mut earliest: Option<(usize, &str)> = None;
        for term in TERMINATORS {
            if let Some(idx) = self.pending.find(term) {
                match earliest {
                    Some((best, _)) if best <= idx => {}
                    _ => earliest = Some((idx, term)),
                }
            }
        }

        let (start, term) = earliest?;
        let end = start + term.len();
        let statement = self.pending[..end].to_string();
        self.pending = self.pending[end..].trim_start().to_string();
        Some(statement)
    }

    /// Tidy an incomplete buffer after a line produced no statement.
    ///
    /// An all-whitespace buffer becomes empty, so the fresh prompt comes back.
    /// Anything else ends in exactly one space.
    pub fn normalize_if_incomplete(&mut self) {
        if self.pending.trim().is_empty() {
            self.pending.clear();
        } else {
            let kept = self.pending.trim_end().len();
            self.pending.truncate(kept);
            self.pending.push(' ');
        }
    }

    /// True when the whole buffer is a quit sentinel.
    pub fn is_quit_sentinel(&self) -> bool {
        let candidate = self.pending.trim();
        QUIT_SENTINELS
            .iter()
            .any(|sentinel| candidate.eq_ignore_ascii_case(sentinel))
    }

    /// Prompt matching the buffer state.
    pub fn current_prompt(&self) -> &str {
        if self.pending.is_empty() {
            &self.fresh_prompt
        } else {
            &self.continuation_prompt
        }
    }

    /// Drop everything buffered, including a partially typed next statement.
    pub fn discard(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(pending = %self.pending, "Discarding statement buffer");
        }
        self.pending.clear();
    }

    /// Produce the next statement, reading at most one line.
    ///
    /// A statement already complete in the buffer is returned without reading.
    /// Otherwise one line is read with the prompt for the current state.
    pub fn next_statement<L: LineSource + ?Sized>(&mut self, source: &mut L) -> Result<BufferEvent> {
        if let Some(statement) = self.extract_statement() {
            return Ok(BufferEvent::Statement(statement));
        }

        let line = match source.read_line(self.current_prompt())? {
            ReplInput::Line(line) => line,
            ReplInput::Exit => return Ok(BufferEvent::EndOfInput),
        };

        self.ingest(&line);
        if self.is_quit_sentinel() {
            return Ok(BufferEvent::EndOfInput);
        }

        if let Some(statement) = self.extract_statement() {
            return Ok(BufferEvent::Statement(statement));
        }

        self.normalize_if_incomplete();
        Ok(BufferEvent::Incomplete)
    }
}

impl Default for StatementBuffer {
    fn default() -> Self {
        Self::new()
    }
}
