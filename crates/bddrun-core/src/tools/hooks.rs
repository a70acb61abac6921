//! Stock hooks used by [`super::ToolDefinition::hooks`].

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::StepError;
use crate::report::ReportSink;

/// Run an environment-preparation command in `working_dir`.
///
/// The command's output is logged at debug level and otherwise discarded; a
/// non-zero exit fails the run with [`StepError::Setup`].
pub async fn run_setup(
    tool: String,
    working_dir: PathBuf,
    command: Vec<String>,
) -> Result<(), StepError> {
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };

    info!(tool = %tool, command = %command.join(" "), "preparing test environment");

    let output = Command::new(program)
        .args(args)
        .current_dir(&working_dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            StepError::unexpected(&tool, format!("starting setup command {program:?}"), e)
        })?;

    for line in String::from_utf8_lossy(&output.stdout)
        .lines()
        .chain(String::from_utf8_lossy(&output.stderr).lines())
    {
        debug!(tool = %tool, "setup: {line}");
    }

    if !output.status.success() {
        return Err(StepError::Setup {
            tool,
            status: output.status,
        });
    }
    Ok(())
}

/// Copy the tool's own report file into the reports directory, keeping its
/// file name.
pub async fn copy_native_report(
    tool: String,
    source: PathBuf,
    sink: ReportSink,
) -> Result<(), StepError> {
    let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
        return Err(StepError::unexpected(
            &tool,
            format!("native report path {} has no file name", source.display()),
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        ));
    };

    let dest = sink.copy_into(&source, name).await.map_err(|e| {
        StepError::unexpected(
            &tool,
            format!("copying native report {}", source.display()),
            e,
        )
    })?;
    info!(tool = %tool, report = %dest.display(), "native report copied");
    Ok(())
}
