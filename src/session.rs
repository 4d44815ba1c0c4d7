//! Execution driver.
//!
//! One iteration: take the next statement from the buffer, classify it, then
//! either skip it (cancelled), report it (illegal, bad macro, query failure)
//! or run it and emit the rendered rows. A reported statement discards
//! whatever is still buffered, so a broken fragment cannot bleed into the
//! next statement's boundaries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cli::{DisplayMode, LineSource, OutputFormatter, OutputSink};
use crate::db::Database;
use crate::error::{Result, StatementError};
use crate::statement::{classify, BufferEvent, DateDialect, Disposition, StatementBuffer};

/// Settings for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Text shown for NULL values
    pub null_display: String,
    /// Overrides the database's own date constructor syntax
    pub date_dialect: Option<DateDialect>,
    pub fresh_prompt: String,
    pub continuation_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            null_display: "NULL".to_string(),
            date_dialect: None,
            fresh_prompt: "sqlshell> ".to_string(),
            continuation_prompt: "       -> ".to_string(),
        }
    }
}

/// What happened to one statement.
#[derive(Debug)]
pub enum StatementOutcome {
    /// Ended with `\c`; nothing was run
    Cancelled,
    /// Nothing left after stripping the terminator
    Empty,
    /// Executed and emitted
    Completed { mode: DisplayMode, rows: usize },
    /// Reported to the user and not run (or failed while running)
    Failed(StatementError),
}

impl StatementOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StatementOutcome::Failed(_))
    }
}

/// Drives statements from a line source through to an output sink.
pub struct Session<D, S> {
    db: D,
    sink: S,
    formatter: OutputFormatter,
    buffer: StatementBuffer,
    dialect: DateDialect,
    interrupted: Arc<AtomicBool>,
}

impl<D: Database, S: OutputSink> Session<D, S> {
    pub fn new(db: D, sink: S, config: SessionConfig) -> Self {
        let dialect = config.date_dialect.unwrap_or_else(|| db.dialect());
        Self {
            db,
            sink,
            formatter: OutputFormatter::new(config.null_display),
            buffer: StatementBuffer::with_prompts(config.fresh_prompt, config.continuation_prompt),
            dialect,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop the loop once `flag` is raised, e.g. from a signal handler.
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Take the database source and sink back out of the session.
    pub fn into_parts(self) -> (D, S) {
        (self.db, self.sink)
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn buffer(&self) -> &StatementBuffer {
        &self.buffer
    }

    /// Classify, run, render and emit one statement.
    ///
    /// Faults are reported through the sink and returned as
    /// [`StatementOutcome::Failed`]; only sink I/O errors come back as `Err`.
    pub fn execute_statement(
        &mut self,
        statement: &str,
        single_shot: bool,
    ) -> Result<StatementOutcome> {
        let classified = classify(statement, single_shot, self.dialect);

        let fault = match classified.disposition() {
            Disposition::Cancelled => {
                tracing::debug!("Statement cancelled");
                return Ok(StatementOutcome::Cancelled);
            }
            Disposition::Illegal => Some(StatementError::Illegal {
                statement: classified.sql.clone(),
            }),
            Disposition::BadMacro(err) => Some(StatementError::BadMacro(err.clone())),
            Disposition::Runnable => None,
        };
        if let Some(fault) = fault {
            return self.report(fault);
        }

        if classified.sql.trim().is_empty() {
            return Ok(StatementOutcome::Empty);
        }

        let results = match self.db.query(&classified.sql) {
            Ok(results) => results,
            Err(err) => return self.report(StatementError::Query(err)),
        };

        let rendered = self.formatter.render(classified.mode, &results);
        if !rendered.is_empty() {
            self.sink.emit(&rendered)?;
        }

        Ok(StatementOutcome::Completed {
            mode: classified.mode,
            rows: results.len(),
        })
    }

    fn report(&mut self, fault: StatementError) -> Result<StatementOutcome> {
        tracing::debug!(error = ?fault, "Statement not run");
        self.sink.diagnostic(&fault.to_string())?;
        Ok(StatementOutcome::Failed(fault))
    }

    /// Run one iteration of the loop. Returns false at end of input.
    pub fn step<L: LineSource + ?Sized>(&mut self, lines: &mut L) -> Result<bool> {
        match self.buffer.next_statement(lines)? {
            BufferEvent::EndOfInput => Ok(false),
            BufferEvent::Incomplete => Ok(true),
            BufferEvent::Statement(statement) => {
                let outcome = self.execute_statement(&statement, false)?;
                if outcome.is_failure() {
                    self.buffer.discard();
                }
                Ok(true)
            }
        }
    }

    /// Read and run statements until the user leaves or the session is
    /// interrupted.
    pub fn run<L: LineSource + ?Sized>(&mut self, lines: &mut L) -> Result<()> {
        while !self.is_interrupted() {
            if !self.step(lines)? {
                tracing::info!("End of input");
                return Ok(());
            }
        }
        tracing::info!("Interrupted");
        Ok(())
    }
}
