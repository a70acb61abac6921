//! Test run step: runs one external test tool and classifies the result.
//!
//! A [`TestRunStep`] owns a fixed [`RunConfiguration`] and, on every
//! [`TestRunStep::run`], goes through the same lifecycle:
//!
//! 1. make sure the reports directory exists;
//! 2. run the pre hook;
//! 3. refuse to run when the test source directory is missing;
//! 4. spawn the tool (no shell) with stdout and stderr sharing one pipe, and
//!    drain it into a buffer while waiting for the tool to exit, echoing each
//!    line to the progress log;
//! 5. write the buffer as the tool's report, whatever happened;
//! 6. classify: no output, non-zero exit, or success;
//! 7. on success, hand the output to the post hook.

pub mod hooks;
pub mod types;

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{BoxError, StepError};
use crate::log::{ProgressLog, TracingLog};
use crate::report::ReportSink;

pub use hooks::{Hooks, PostHook, PreHook};
pub use types::{Outcome, RunConfiguration, RunResult};

/// What came back from the child process.
#[derive(Debug)]
struct Capture {
    exit_code: Option<i32>,
    output: String,
    timed_out: bool,
}

/// Runs a single test tool according to its [`RunConfiguration`].
///
/// # Example
///
/// ```ignore
/// let step = TestRunStep::new(tools::nose().configuration(), ReportSink::new("target/reports"));
/// let result = step.run().await?;
/// assert_eq!(result.outcome, Outcome::Success);
/// ```
pub struct TestRunStep {
    config: RunConfiguration,
    sink: ReportSink,
    hooks: Hooks,
    log: Arc<dyn ProgressLog>,
    timeout: Option<Duration>,
}

impl TestRunStep {
    /// Create a step with no hooks, no timeout, and a [`TracingLog`].
    pub fn new(config: RunConfiguration, sink: ReportSink) -> Self {
        let log = Arc::new(TracingLog::new(config.tool_name()));
        Self {
            config,
            sink,
            hooks: Hooks::default(),
            log,
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_log(mut self, log: Arc<dyn ProgressLog>) -> Self {
        self.log = log;
        self
    }

    /// Kill the tool and fail the run if it has not exited after `limit`.
    ///
    /// Without a timeout a run waits for the tool indefinitely.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    pub fn sink(&self) -> &ReportSink {
        &self.sink
    }

    /// Run the tool once. See the module docs for the full lifecycle.
    pub async fn run(&self) -> Result<RunResult, StepError> {
        let tool = self.config.tool_name();

        self.sink.ensure_reports_folder().await?;
        self.hooks.pre_execute(&self.config).await?;

        let test_dir = self.config.test_source_directory();
        let present = match tokio::fs::try_exists(test_dir).await {
            Ok(present) => present,
            Err(e) => {
                debug!(tool, dir = %test_dir.display(), error = %e, "cannot check test directory");
                false
            }
        };
        if !present {
            let err = StepError::TestsMissing {
                tool: tool.to_owned(),
                dir: test_dir.to_path_buf(),
            };
            self.log.warn(&err.to_string());
            return Err(err);
        }

        self.log.info("");
        self.log.info(&format!(
            "Running {tool} from {}",
            self.config.working_directory().display()
        ));
        self.log.info("");

        let capture = self.execute().await?;

        self.sink
            .write_report(self.config.report_name(), &capture.output, self.log.as_ref())
            .await;

        if capture.timed_out {
            // `timed_out` is only ever set when a timeout is configured.
            let after = self.timeout.unwrap_or_default();
            let err = StepError::TimedOut {
                tool: tool.to_owned(),
                after,
            };
            self.log.warn(&err.to_string());
            return Err(err);
        }

        let outcome = classify(&capture);
        debug!(tool, exit_code = ?capture.exit_code, %outcome, "run classified");
        match outcome {
            Outcome::NoOutputProduced => {
                let err = StepError::NoOutput {
                    tool: tool.to_owned(),
                    exit_code: capture.exit_code,
                };
                self.log.warn(&err.to_string());
                return Err(err);
            }
            Outcome::NonZeroExit => {
                return Err(StepError::TestsFailed {
                    tool: tool.to_owned(),
                    exit_code: capture.exit_code,
                });
            }
            _ => {}
        }

        self.hooks
            .post_execute(&self.config, capture.output.clone())
            .await?;

        Ok(RunResult {
            exit_code: capture.exit_code,
            captured_output: capture.output,
            outcome,
        })
    }

    /// Spawn the tool and collect its combined output until it exits.
    async fn execute(&self) -> Result<Capture, StepError> {
        let tool = self.config.tool_name();
        let Some((program, args)) = self.config.command_line().split_first() else {
            return Err(self.spawn_failed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty command line",
            )));
        };

        let (reader, stdout, stderr) =
            merged_output().map_err(|e| self.unexpected("creating the output pipe", e))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(self.config.working_directory())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);
        let spawned = command.spawn();
        // The command still owns our write ends. The reader only sees EOF
        // once every write end is closed.
        drop(command);
        let child = spawned.map_err(|e| self.spawn_failed(e))?;
        debug!(tool, pid = child.id(), program = %program, "tool spawned");

        let pipe = async_reader(reader).map_err(|e| self.unexpected("reading the tool output", e))?;
        self.collect(child, pipe).await
    }

    /// Drain `pipe` while waiting for `child` to exit, honouring the timeout.
    async fn collect<R>(&self, mut child: Child, pipe: R) -> Result<Capture, StepError>
    where
        R: AsyncRead + Unpin,
    {
        let tool = self.config.tool_name();
        let mut output = String::new();

        let finished = {
            let drain = drain_output(pipe, &mut output, self.log.as_ref());
            let both = async { tokio::join!(child.wait(), drain) };
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, both).await.ok(),
                None => Some(both.await),
            }
        };

        let Some((status, drained)) = finished else {
            if let Err(e) = child.kill().await {
                tracing::warn!(tool, error = %e, "failed to kill timed out tool");
            }
            return Ok(Capture {
                exit_code: None,
                output,
                timed_out: true,
            });
        };

        let status = status.map_err(|e| self.unexpected("waiting for the tool to exit", e))?;
        drained.map_err(|e| self.unexpected("reading the tool output", e))?;

        Ok(Capture {
            exit_code: status.code(),
            output,
            timed_out: false,
        })
    }

    fn spawn_failed(&self, source: io::Error) -> StepError {
        let tool = self.config.tool_name();
        self.log
            .error(&format!("Failed to run {tool} unit test(s)"), &source);
        StepError::Spawn {
            tool: tool.to_owned(),
            source,
        }
    }

    /// Log an unforeseen failure and wrap it as an execution error.
    fn unexpected(&self, context: &str, cause: io::Error) -> StepError {
        let tool = self.config.tool_name();
        self.log
            .error(&format!("Failed to run {tool} unit test(s)"), &cause);
        StepError::unexpected(tool, context, BoxError::from(cause))
    }
}

impl std::fmt::Debug for TestRunStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRunStep")
            .field("config", &self.config)
            .field("sink", &self.sink)
            .field("hooks", &self.hooks)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn classify(capture: &Capture) -> Outcome {
    if capture.output.is_empty() {
        Outcome::NoOutputProduced
    } else if capture.exit_code != Some(0) {
        Outcome::NonZeroExit
    } else {
        Outcome::Success
    }
}

/// One OS pipe shared by the child's stdout and stderr, so the tool's
/// writes to either stream are read back in the order they were made.
fn merged_output() -> io::Result<(io::PipeReader, Stdio, Stdio)> {
    let (reader, writer) = io::pipe()?;
    let stdout = Stdio::from(writer.try_clone()?);
    Ok((reader, stdout, Stdio::from(writer)))
}

#[cfg(unix)]
fn async_reader(reader: io::PipeReader) -> io::Result<tokio::net::unix::pipe::Receiver> {
    tokio::net::unix::pipe::Receiver::from_owned_fd(reader.into())
}

#[cfg(windows)]
fn async_reader(reader: io::PipeReader) -> io::Result<tokio::fs::File> {
    let handle = std::os::windows::io::OwnedHandle::from(reader);
    Ok(tokio::fs::File::from_std(std::fs::File::from(handle)))
}

/// Read `pipe` to the end, appending each line (newline-terminated) to
/// `buffer` and echoing it to `log`.
async fn drain_output<R>(pipe: R, buffer: &mut String, log: &dyn ProgressLog) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            return Ok(());
        }
        let line = decode_line(&raw);
        log.info(&line);
        buffer.push_str(&line);
        buffer.push('\n');
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
