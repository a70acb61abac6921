use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Fixed identity and invocation details of one test tool.
///
/// Use [`RunConfiguration::new`] for the required fields, then chain the
/// `with_*` setters (builder-style). Values are never mutated once handed to
/// a [`super::TestRunStep`].
///
/// # Equality
///
/// Two configurations are equal iff their [`tool_name`](Self::tool_name)s
/// are equal; every other field is ignored. This is intentionally partial:
/// the tool name is the deduplication key when configurations are collected
/// into sets or maps. Compare fields explicitly when full equality matters.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    tool_name: String,
    report_name: String,
    working_directory: PathBuf,
    test_source_directory: PathBuf,
    command_line: Vec<String>,
}

impl RunConfiguration {
    pub fn new<I, S>(
        tool_name: impl Into<String>,
        report_name: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        test_source_directory: impl Into<PathBuf>,
        command_line: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tool_name: tool_name.into(),
            report_name: report_name.into(),
            working_directory: working_directory.into(),
            test_source_directory: test_source_directory.into(),
            command_line: command_line.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable tool name, used in every log line and error message.
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// File name the captured output is persisted under.
    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Directory whose existence gates the run.
    pub fn test_source_directory(&self) -> &Path {
        &self.test_source_directory
    }

    /// Program followed by its arguments, passed to the OS without a shell.
    pub fn command_line(&self) -> &[String] {
        &self.command_line
    }

    /// Whether `other` configures the same tool. See the type-level docs.
    pub fn same_tool(&self, other: &Self) -> bool {
        self.tool_name == other.tool_name
    }

    /// Resolve relative directories against `base`.
    ///
    /// Absolute directories are kept as they are.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.working_directory = base.join(&self.working_directory);
        self.test_source_directory = base.join(&self.test_source_directory);
        self
    }

    /// Replace the command line.
    pub fn with_command<I, S>(mut self, command_line: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_line = command_line.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_report_name(mut self, report_name: impl Into<String>) -> Self {
        self.report_name = report_name.into();
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = dir.into();
        self
    }

    pub fn with_test_source_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_source_directory = dir.into();
        self
    }
}

impl PartialEq for RunConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.same_tool(other)
    }
}

impl Eq for RunConfiguration {}

impl Hash for RunConfiguration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tool_name.hash(state);
    }
}

/// How a single run was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exit code 0 and at least one line of output.
    Success,
    /// The tool printed nothing at all, whatever its exit code.
    NoOutputProduced,
    /// The test source directory does not exist; nothing was spawned.
    ToolDirectoryMissing,
    /// The tool printed output and exited non-zero (or by signal).
    NonZeroExit,
    /// The tool could not be started.
    SpawnFailure,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::NoOutputProduced => "no output produced",
            Self::ToolDirectoryMissing => "tool directory missing",
            Self::NonZeroExit => "non-zero exit",
            Self::SpawnFailure => "spawn failure",
        };
        f.write_str(s)
    }
}

/// The result of one successful [`super::TestRunStep::run`] call.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The process exit code, or `None` if the process was terminated by a
    /// signal.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr, one newline-terminated line per line
    /// received, in receipt order.
    pub captured_output: String,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn nose_like() -> RunConfiguration {
        RunConfiguration::new(
            "Nose (with Freshen)",
            "nose.txt",
            "src/test/python",
            "src/test/python",
            ["nosetests", "--with-freshen", "-v"],
        )
    }

    #[test]
    fn new_keeps_command_order() {
        let cfg = nose_like();
        assert_eq!(cfg.command_line(), ["nosetests", "--with-freshen", "-v"]);
        assert_eq!(cfg.report_name(), "nose.txt");
    }

    #[test]
    fn equality_only_looks_at_tool_name() {
        let a = nose_like();
        let b = nose_like()
            .with_report_name("other.txt")
            .with_command(["python", "-m", "nose"]);
        let c = RunConfiguration::new("Behave", "nose.txt", ".", "features", ["behave"]);

        assert!(a.same_tool(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_set_dedups_by_tool_name() {
        let set: HashSet<RunConfiguration> = [
            nose_like(),
            nose_like().with_working_directory("/elsewhere"),
            RunConfiguration::new("Behave", "behave.txt", ".", "features", ["behave"]),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rooted_at_joins_relative_dirs_only() {
        let cfg = nose_like()
            .with_working_directory("/abs/work")
            .rooted_at(Path::new("/project"));
        assert_eq!(cfg.working_directory(), Path::new("/abs/work"));
        assert_eq!(
            cfg.test_source_directory(),
            Path::new("/project/src/test/python")
        );
    }
}
