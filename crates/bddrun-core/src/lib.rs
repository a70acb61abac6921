//! Core of `bddrun`: run an external test tool, keep its output as a report,
//! and classify the run.
//!
//! - [`step`]: the run lifecycle ([`TestRunStep`]) and its configuration.
//! - [`report`]: the reports directory ([`ReportSink`]).
//! - [`tools`]: built-in tool definitions and the [`ToolCatalog`].
//! - [`error`]: the [`StepError`] taxonomy.
//! - [`log`]: the [`ProgressLog`] boundary.

pub mod error;
pub mod log;
pub mod report;
pub mod step;
pub mod tools;

pub use error::{ErrorKind, StepError};
pub use log::{ProgressLog, TracingLog};
pub use report::ReportSink;
pub use step::{Hooks, Outcome, RunConfiguration, RunResult, TestRunStep};
pub use tools::{ToolCatalog, ToolDefinition};
