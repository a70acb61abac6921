//! Shared test utilities for bddrun integration tests.
//!
//! Provides a throwaway project tree ([`Project`]) and a [`ProgressLog`]
//! that remembers every line it is given ([`RecordingLog`]).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use bddrun_core::{ProgressLog, ReportSink};

/// Severity of a recorded progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// A [`ProgressLog`] that keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged at `level`, in order.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.at(Level::Info)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.at(Level::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.at(Level::Error)
    }

    fn push(&self, level: Level, message: String) {
        self.entries.lock().unwrap().push((level, message));
    }
}

impl ProgressLog for RecordingLog {
    fn info(&self, message: &str) {
        self.push(Level::Info, message.to_owned());
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message.to_owned());
    }

    fn error(&self, message: &str, cause: &(dyn std::error::Error + 'static)) {
        self.push(Level::Error, format!("{message}: {cause}"));
    }
}

/// A temporary project directory, removed on drop.
pub struct Project {
    root: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("failed to create temp project dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Create `rel` (and its parents) inside the project.
    pub fn with_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.root.path().join(rel))
            .unwrap_or_else(|e| panic!("failed to create {rel}: {e}"));
        self
    }

    /// Write `content` to `rel` inside the project.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.path().join("target").join("bdd-reports")
    }

    pub fn sink(&self) -> ReportSink {
        ReportSink::new(self.reports_dir())
    }

    /// Contents of report `name`, or `None` if it was never written.
    pub fn read_report(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.reports_dir().join(name)).ok()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Command line running `script` through `sh -c`.
pub fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_owned(), "-c".to_owned(), script.to_owned()]
}
