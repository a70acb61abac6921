//! Tool definitions: what to run for each supported test tool.
//!
//! A [`ToolDefinition`] is plain configuration data (it deserializes from
//! the `[[tools]]` tables of the config file). It turns into a
//! [`RunConfiguration`] plus the [`Hooks`] its optional `setup` and
//! `native_report` settings call for.
//!
//! Built-in tools come from the factory functions [`nose`], [`behave`] and
//! [`lettuce`]; [`ToolCatalog`] collects built-in and user tools by id.

pub mod catalog;
pub mod hooks;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::report::ReportSink;
use crate::step::{Hooks, RunConfiguration, TestRunStep};

use self::hooks::{copy_native_report, run_setup};

pub use catalog::{CatalogError, ToolCatalog};

/// Configuration data for one external test tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolDefinition {
    /// Short key used on the command line (e.g. `nose`).
    pub id: String,
    /// Display name used in log lines and error messages.
    pub name: String,
    /// File name of the report under the reports directory.
    pub report: String,
    /// Directory the tool runs in, relative to the project directory.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
    /// Directory that must exist for the tool to be run at all.
    pub test_dir: PathBuf,
    /// Program and arguments, executed without a shell.
    pub command: Vec<String>,
    /// Command that prepares the environment before the tests run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<Vec<String>>,
    /// Report file the tool writes itself, relative to `working_dir`. It is
    /// copied into the reports directory after a successful run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_report: Option<PathBuf>,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ToolDefinition {
    pub fn configuration(&self) -> RunConfiguration {
        RunConfiguration::new(
            &self.name,
            &self.report,
            &self.working_dir,
            &self.test_dir,
            self.command.iter().cloned(),
        )
    }

    /// Hooks implementing `setup` and `native_report`. Empty when neither is
    /// set.
    pub fn hooks(&self, sink: &ReportSink) -> Hooks {
        let mut hooks = Hooks::new();

        if let Some(setup) = self.setup.clone() {
            hooks = hooks.with_pre(move |cfg: &RunConfiguration| {
                run_setup(
                    cfg.tool_name().to_owned(),
                    cfg.working_directory().to_path_buf(),
                    setup.clone(),
                )
            });
        }

        if let Some(native) = self.native_report.clone() {
            let sink = sink.clone();
            hooks = hooks.with_post(move |cfg: &RunConfiguration, _output: String| {
                copy_native_report(
                    cfg.tool_name().to_owned(),
                    cfg.working_directory().join(&native),
                    sink.clone(),
                )
            });
        }

        hooks
    }

    /// Build a ready-to-run step for a project rooted at `project_dir`.
    pub fn step(&self, project_dir: &Path, sink: ReportSink) -> TestRunStep {
        let hooks = self.hooks(&sink);
        TestRunStep::new(self.configuration().rooted_at(project_dir), sink).with_hooks(hooks)
    }

    /// Check the definition is usable before it is registered.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidTool {
            id: self.id.clone(),
            reason: reason.to_owned(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.command.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(invalid("command must name a program"));
        }
        if self.setup.as_ref().is_some_and(|s| s.is_empty()) {
            return Err(invalid("setup command must not be empty when given"));
        }
        let report = Path::new(&self.report);
        if self.report.is_empty() || report.file_name() != Some(report.as_os_str()) {
            return Err(invalid("report must be a plain file name"));
        }
        Ok(())
    }
}

/// Python nose with the Freshen BDD plugin, run from `src/test/python`.
pub fn nose() -> ToolDefinition {
    ToolDefinition {
        id: "nose".into(),
        name: "Nose (with Freshen)".into(),
        report: "nose.txt".into(),
        working_dir: PathBuf::from("src/test/python"),
        test_dir: PathBuf::from("src/test/python"),
        command: vec!["nosetests".into(), "--with-freshen".into(), "-v".into()],
        setup: None,
        native_report: None,
    }
}

/// Behave, reading feature files from `features/`.
pub fn behave() -> ToolDefinition {
    ToolDefinition {
        id: "behave".into(),
        name: "Behave".into(),
        report: "behave.txt".into(),
        working_dir: PathBuf::from("."),
        test_dir: PathBuf::from("features"),
        command: vec!["behave".into()],
        setup: None,
        native_report: None,
    }
}

/// Lettuce, reading feature files from `features/`.
pub fn lettuce() -> ToolDefinition {
    ToolDefinition {
        id: "lettuce".into(),
        name: "Lettuce".into(),
        report: "lettuce.txt".into(),
        working_dir: PathBuf::from("."),
        test_dir: PathBuf::from("features"),
        command: vec!["lettuce".into()],
        setup: None,
        native_report: None,
    }
}

/// All built-in tool definitions.
pub fn builtins() -> Vec<ToolDefinition> {
    vec![nose(), behave(), lettuce()]
}
