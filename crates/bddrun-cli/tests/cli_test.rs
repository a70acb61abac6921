//! End-to-end tests for the `bddrun` binary.
//!
//! Each test writes a config file with a `sh -c` tool into a throwaway
//! project and runs the real binary against it.

#![cfg(unix)]

use std::path::Path;
use std::process::{Command, Output};

use bddrun_test_utils::Project;

fn bddrun(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bddrun"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "info")
        .env_remove("BDDRUN_REPORTS_DIR")
        .env_remove("BDDRUN_TIMEOUT_SECS")
        .output()
        .expect("failed to run bddrun binary")
}

/// Write a config defining the tool `fake` that runs `script`.
fn config_with_tool(project: &Project, script: &str) -> std::path::PathBuf {
    let config = format!(
        r#"
[reports]
dir = "target/bdd-reports"

[[tools]]
id = "fake"
name = "Fake Runner"
report = "fake.txt"
test_dir = "features"
command = ["sh", "-c", {script:?}]
"#
    );
    project.write("bddrun.toml", &config);
    project.path().join("bddrun.toml")
}

fn run_fake(project: &Project, script: &str) -> Output {
    let config = config_with_tool(project, script);
    bddrun(
        &config,
        &["run", "fake", "--project-dir", project.path().to_str().unwrap()],
    )
}

#[test]
fn passing_tool_exits_zero_and_writes_report() {
    let project = Project::new().with_dir("features");

    let out = run_fake(&project, "echo '3 scenarios passed'");

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(
        project.read_report("fake.txt").unwrap(),
        "3 scenarios passed\n"
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Result: success"), "stdout: {stdout}");
}

#[test]
fn failing_tool_exits_non_zero_with_message() {
    let project = Project::new().with_dir("features");

    let out = run_fake(&project, "echo 'FAIL: test_x'; exit 1");

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Fake Runner unit test(s) failed"),
        "stderr: {stderr}"
    );
    assert_eq!(project.read_report("fake.txt").unwrap(), "FAIL: test_x\n");
}

#[test]
fn missing_test_dir_exits_non_zero() {
    let project = Project::new();

    let out = run_fake(&project, "echo never");

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("No Fake Runner unit test(s) found"),
        "stderr: {stderr}"
    );
    assert!(project.read_report("fake.txt").is_none());
}

#[test]
fn reports_dir_flag_wins_over_config() {
    let project = Project::new().with_dir("features");
    let config = config_with_tool(&project, "echo ok");

    let out = bddrun(
        &config,
        &[
            "run",
            "fake",
            "--project-dir",
            project.path().to_str().unwrap(),
            "--reports-dir",
            "custom-reports",
        ],
    );

    assert!(out.status.success());
    let report = std::fs::read_to_string(project.path().join("custom-reports/fake.txt")).unwrap();
    assert_eq!(report, "ok\n");
}

#[test]
fn tools_lists_builtins_and_configured_tools() {
    let project = Project::new();
    let config = config_with_tool(&project, "echo ok");

    let out = bddrun(&config, &["tools"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for id in ["behave", "fake", "lettuce", "nose"] {
        assert!(stdout.contains(id), "missing {id} in: {stdout}");
    }
}

#[test]
fn init_writes_config_once() {
    let project = Project::new();
    let config = project.path().join("conf").join("config.toml");

    let first = bddrun(&config, &["init"]);
    assert!(first.status.success());
    assert!(config.exists());

    let second = bddrun(&config, &["init"]);
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("already exists"));
}
