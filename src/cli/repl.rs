//! Interactive line input with history.

use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::Result;

/// One read from the line source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// A line, newline stripped
    Line(String),
    /// User pressed Ctrl-D or Ctrl-C
    Exit,
}

/// Something that hands out lines of user input.
pub trait LineSource {
    /// Read one line, showing `prompt`.
    fn read_line(&mut self, prompt: &str) -> Result<ReplInput>;

    /// Load history from `path`. Returns false if nothing was loaded.
    fn load_history(&mut self, _path: &Path) -> bool {
        false
    }

    /// Write this session's history to `path`. Returns false on failure.
    fn save_history(&mut self, _path: &Path) -> bool {
        false
    }
}

/// A history file that is never clobbered unless it is ours.
///
/// The file is written back only if it did not exist when the session ended,
/// or if it loaded cleanly as a history file when the session started.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
    loaded: bool,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file into `source`, remembering whether that worked.
    pub fn open<L: LineSource + ?Sized>(&mut self, source: &mut L) {
        self.loaded = source.load_history(&self.path);
    }

    pub fn is_writable(&self) -> bool {
        self.loaded || !self.path.exists()
    }

    /// Save `source`'s history if the file is safe to write.
    pub fn persist<L: LineSource + ?Sized>(&self, source: &mut L) -> bool {
        if !self.is_writable() {
            tracing::warn!(
                path = %self.path.display(),
                "Not overwriting a file that did not load as history"
            );
            return false;
        }
        source.save_history(&self.path)
    }
}

/// Interactive line source using rustyline for line editing and history.
pub struct Repl {
    editor: DefaultEditor,
    history: Option<HistoryFile>,
}

impl Repl {
    /// Create a new REPL instance.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;
        Ok(Self {
            editor,
            history: None,
        })
    }

    /// Load history from `path` and save back to it when dropped.
    pub fn with_history(mut self, path: impl Into<PathBuf>) -> Self {
        let mut history = HistoryFile::new(path);
        history.open(&mut self);
        self.history = Some(history);
        self
    }

    /// Persist history now. Later calls are no-ops.
    pub fn finish(&mut self) {
        if let Some(history) = self.history.take() {
            history.persist(self);
        }
    }
}

impl LineSource for Repl {
    fn read_line(&mut self, prompt: &str) -> Result<ReplInput> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReplInput::Line(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(ReplInput::Exit),
            Err(e) => Err(e.into()),
        }
    }

    fn load_history(&mut self, path: &Path) -> bool {
        match self.editor.load_history(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Could not load history: {}", e);
                false
            }
        }
    }

    fn save_history(&mut self, path: &Path) -> bool {
        match self.editor.save_history(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not save history: {}", e);
                false
            }
        }
    }
}

impl Drop for Repl {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeHistory {
        load_ok: bool,
        saved_to: Vec<PathBuf>,
    }

    impl LineSource for FakeHistory {
        fn read_line(&mut self, _prompt: &str) -> Result<ReplInput> {
            Ok(ReplInput::Exit)
        }

        fn load_history(&mut self, _path: &Path) -> bool {
            self.load_ok
        }

        fn save_history(&mut self, path: &Path) -> bool {
            self.saved_to.push(path.to_path_buf());
            true
        }
    }

    #[test]
    fn test_history_written_when_file_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");

        let mut source = FakeHistory::default();
        let mut history = HistoryFile::new(&path);
        history.open(&mut source);

        assert!(history.persist(&mut source));
        assert_eq!(source.saved_to, vec![path]);
    }

    #[test]
    fn test_history_written_when_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        std::fs::write(&path, "select 1;\n").unwrap();

        let mut source = FakeHistory {
            load_ok: true,
            ..Default::default()
        };
        let mut history = HistoryFile::new(&path);
        history.open(&mut source);

        assert!(history.persist(&mut source));
    }

    #[test]
    fn test_foreign_file_not_clobbered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "important").unwrap();

        let mut source = FakeHistory::default();
        let mut history = HistoryFile::new(&path);
        history.open(&mut source);

        assert!(!history.is_writable());
        assert!(!history.persist(&mut source));
        assert!(source.saved_to.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "important");
    }
}
