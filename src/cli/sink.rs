//! Where rendered results and diagnostics go.

use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Receives one rendered blob per statement.
pub trait OutputSink {
    /// Write a rendered result set.
    fn emit(&mut self, rendered: &str) -> io::Result<()>;

    /// Write a diagnostic for a statement that was not run or failed.
    fn diagnostic(&mut self, message: &str) -> io::Result<()> {
        let mut err = io::stderr().lock();
        writeln!(err, "{message}")?;
        err.flush()
    }
}

/// Writes results straight to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, rendered: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(rendered.as_bytes())?;
        out.flush()
    }
}

/// Pipes each result through an external pager program.
///
/// The command line is split on whitespace, so `less -S` works. If the pager
/// cannot be started the output goes to stdout instead.
#[derive(Debug, Clone)]
pub struct PagerSink {
    program: String,
    args: Vec<String>,
}

impl PagerSink {
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn spawn_and_write(&self, rendered: &str) -> io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // The pager may quit before reading everything
            match stdin.write_all(rendered.as_bytes()) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
        }

        let status = child.wait()?;
        if !status.success() {
            tracing::debug!(program = %self.program, %status, "Pager exited with failure");
        }
        Ok(())
    }
}

impl OutputSink for PagerSink {
    fn emit(&mut self, rendered: &str) -> io::Result<()> {
        if self.program.is_empty() {
            return StdoutSink.emit(rendered);
        }
        match self.spawn_and_write(rendered) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(program = %self.program, "Pager failed, writing to stdout: {}", e);
                StdoutSink.emit(rendered)
            }
        }
    }
}
