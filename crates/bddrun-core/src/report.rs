//! Report destination: one directory, one text artifact per tool.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::StepError;
use crate::log::ProgressLog;

/// Directory that captured tool output is written into.
///
/// Each artifact is a plain file named by the caller. Writing an artifact
/// replaces any previous artifact of the same name; two tools sharing a
/// report name therefore see last-writer-wins.
#[derive(Debug, Clone)]
pub struct ReportSink {
    dir: PathBuf,
}

impl ReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact called `name` is written to.
    pub fn report_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Create the reports directory (and its parents) if it is missing.
    ///
    /// Succeeds without touching anything when the directory already exists.
    pub async fn ensure_reports_folder(&self) -> Result<(), StepError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StepError::Storage {
                path: self.dir.clone(),
                source,
            })
    }

    /// Write `content` verbatim to the artifact `name`.
    ///
    /// A failed write is reported through `log` as a warning and otherwise
    /// swallowed: the outcome of the test run must not depend on it.
    pub async fn write_report(&self, name: &str, content: &str, log: &dyn ProgressLog) {
        let path = self.report_path(name);
        if let Err(e) = fs::write(&path, content).await {
            log.warn(&format!(
                "Failed to write report {}: {e}",
                path.display()
            ));
        } else {
            tracing::debug!(path = %path.display(), bytes = content.len(), "report written");
        }
    }

    /// Copy an existing file into the reports directory as `name`.
    pub async fn copy_into(&self, source: &Path, name: &str) -> std::io::Result<PathBuf> {
        let dest = self.report_path(name);
        fs::copy(source, &dest).await?;
        Ok(dest)
    }
}
