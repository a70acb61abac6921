//! Error taxonomy for a test run.
//!
//! Every failure of [`crate::step::TestRunStep::run`] is a [`StepError`].
//! Variants fall into three groups, exposed through [`StepError::kind`]:
//!
//! - **configuration**: the environment is not set up for a test run (no test
//!   directory, or the tool produced no output at all);
//! - **execution**: the tool ran and failed, could not be spawned, or an I/O
//!   fault occurred while talking to it;
//! - **storage**: the reports directory could not be created.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use crate::step::Outcome;

/// Boxed error used as the cause of [`StepError::Unexpected`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse grouping of [`StepError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not set up for testing; fixable by the operator.
    Configuration,
    /// The tool failed or could not be driven.
    Execution,
    /// The reports destination is unusable.
    Storage,
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("No {tool} unit test(s) found. Please create some in {}", dir.display())]
    TestsMissing { tool: String, dir: PathBuf },

    #[error("{tool} did not return any output. No unit test(s) found?")]
    NoOutput { tool: String, exit_code: Option<i32> },

    #[error("Failed to run {tool} unit test(s)")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} unit test(s) failed")]
    TestsFailed { tool: String, exit_code: Option<i32> },

    #[error("{tool} timed out after {}s", after.as_secs())]
    TimedOut { tool: String, after: Duration },

    #[error("environment setup for {tool} failed ({status})")]
    Setup { tool: String, status: ExitStatus },

    #[error("Failed to run {tool} unit test(s): {context}")]
    Unexpected {
        tool: String,
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to create reports directory {}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StepError {
    /// Wrap an arbitrary failure as an execution error for `tool`.
    pub fn unexpected(
        tool: impl Into<String>,
        context: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Unexpected {
            tool: tool.into(),
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TestsMissing { .. } | Self::NoOutput { .. } => ErrorKind::Configuration,
            Self::Spawn { .. }
            | Self::TestsFailed { .. }
            | Self::TimedOut { .. }
            | Self::Setup { .. }
            | Self::Unexpected { .. } => ErrorKind::Execution,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// The classified run outcome this error corresponds to, if any.
    ///
    /// Hook failures, timeouts and storage errors happen outside the
    /// classification and return `None`.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::TestsMissing { .. } => Some(Outcome::ToolDirectoryMissing),
            Self::NoOutput { .. } => Some(Outcome::NoOutputProduced),
            Self::Spawn { .. } => Some(Outcome::SpawnFailure),
            Self::TestsFailed { .. } => Some(Outcome::NonZeroExit),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub fn is_execution(&self) -> bool {
        self.kind() == ErrorKind::Execution
    }
}
