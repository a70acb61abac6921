//! Progress log boundary.
//!
//! A test run reports human-readable progress (the tool's output lines,
//! warnings, failures) through a [`ProgressLog`]. The core never decides
//! where those lines go; [`TracingLog`] is the implementation the CLI uses.

use std::error::Error;

/// Sink for the human-readable progress lines of a run.
///
/// The trait is object-safe so a run can hold `Arc<dyn ProgressLog>`.
pub trait ProgressLog: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str, cause: &(dyn Error + 'static));
}

/// Forwards progress lines to `tracing` events, tagged with the tool name.
#[derive(Debug, Clone)]
pub struct TracingLog {
    tool: String,
}

impl TracingLog {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl ProgressLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "bddrun::progress", tool = %self.tool, "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "bddrun::progress", tool = %self.tool, "{message}");
    }

    fn error(&self, message: &str, cause: &(dyn Error + 'static)) {
        tracing::error!(
            target: "bddrun::progress",
            tool = %self.tool,
            error = %cause,
            "{message}"
        );
    }
}

// Compile-time assertion: ProgressLog must be usable as `dyn ProgressLog`.
const _: () = {
    fn _assert_object_safe(_: &dyn ProgressLog) {}
};
