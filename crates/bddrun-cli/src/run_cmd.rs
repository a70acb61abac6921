//! `bddrun run` command: run one tool against a project.

use std::path::Path;

use anyhow::{Context, Result};

use bddrun_core::ReportSink;

use crate::config::Settings;

/// Run the tool `id` for the project at `project_dir`.
///
/// Returns an error (and so a non-zero exit status) for every outcome other
/// than success.
pub async fn run_tool(settings: &Settings, project_dir: &Path, id: &str) -> Result<()> {
    let tool = settings.catalog.get(id).with_context(|| {
        format!(
            "unknown tool {id:?}; known tools: {}",
            settings.catalog.ids().join(", ")
        )
    })?;

    let reports_dir = settings.reports_dir_for(project_dir);
    let mut step = tool.step(project_dir, ReportSink::new(&reports_dir));
    if let Some(limit) = settings.timeout {
        step = step.with_timeout(limit);
    }

    let result = step.run().await?;

    println!();
    println!("Result: {}", result.outcome);
    println!(
        "  Report: {}",
        reports_dir.join(step.config().report_name()).display()
    );
    Ok(())
}
