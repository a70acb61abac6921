//! Configuration file management for bddrun.
//!
//! Provides a TOML-based config file at `~/.config/bddrun/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bddrun_core::{ToolCatalog, ToolDefinition};

/// Reports directory used when nothing else is configured, relative to the
/// project directory.
pub const DEFAULT_REPORTS_DIR: &str = "target/bdd-reports";

pub const REPORTS_DIR_ENV: &str = "BDDRUN_REPORTS_DIR";
pub const TIMEOUT_ENV: &str = "BDDRUN_TIMEOUT_SECS";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub reports: ReportsSection,
    #[serde(default)]
    pub run: RunSection,
    /// Extra tools; an entry replaces the built-in tool with the same id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Kill a tool that runs longer than this. Unset means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the bddrun config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/bddrun` or `~/.config/bddrun`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("bddrun");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bddrun")
}

/// Return the path to the bddrun config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

/// Like [`load_config`], but a missing file yields the empty config.
pub fn load_config_if_present(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(ConfigFile::default())
    }
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))
}

/// The config written by `bddrun init`.
pub fn starter_config() -> ConfigFile {
    ConfigFile {
        reports: ReportsSection {
            dir: Some(PathBuf::from(DEFAULT_REPORTS_DIR)),
        },
        run: RunSection::default(),
        tools: Vec::new(),
    }
}

// -----------------------------------------------------------------------
// Resolved settings
// -----------------------------------------------------------------------

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct Settings {
    /// Reports directory. Relative values are relative to the project dir.
    pub reports_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub catalog: ToolCatalog,
}

impl Settings {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Reports dir: `--reports-dir` > `BDDRUN_REPORTS_DIR` > `reports.dir` > `target/bdd-reports`
    /// - Timeout: `--timeout` > `BDDRUN_TIMEOUT_SECS` > `run.timeout_secs` > none
    /// - Tools: built-ins, then `[[tools]]` entries from the config file
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let path = overrides.config_path.clone().unwrap_or_else(config_path);
        let file = load_config_if_present(&path)?;

        let reports_dir = if let Some(dir) = &overrides.reports_dir {
            dir.clone()
        } else if let Ok(dir) = std::env::var(REPORTS_DIR_ENV) {
            PathBuf::from(dir)
        } else if let Some(dir) = file.reports.dir {
            dir
        } else {
            PathBuf::from(DEFAULT_REPORTS_DIR)
        };

        let timeout_secs = if let Some(secs) = overrides.timeout_secs {
            Some(secs)
        } else if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{TIMEOUT_ENV} is not a number of seconds: {raw:?}"))?,
            )
        } else {
            file.run.timeout_secs
        };

        let mut catalog = ToolCatalog::with_builtins();
        for tool in file.tools {
            let id = tool.id.clone();
            if catalog
                .register(tool)
                .with_context(|| format!("in config file {}", path.display()))?
                .is_some()
            {
                tracing::debug!(tool = %id, "config file overrides built-in tool");
            }
        }

        Ok(Self {
            reports_dir,
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
            catalog,
        })
    }

    /// Reports directory for a project rooted at `project_dir`.
    pub fn reports_dir_for(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.reports_dir)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        unsafe { std::env::remove_var(REPORTS_DIR_ENV) };
        unsafe { std::env::remove_var(TIMEOUT_ENV) };
    }

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        save_config(&path, &starter_config()).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(
            loaded.reports.dir.as_deref(),
            Some(Path::new(DEFAULT_REPORTS_DIR))
        );
        assert!(loaded.run.timeout_secs.is_none());
        assert!(loaded.tools.is_empty());
    }

    #[test]
    fn missing_config_file_is_empty_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = load_config_if_present(&tmp.path().join("absent.toml")).unwrap();
        assert!(cfg.reports.dir.is_none());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[reports]\ndirectory = 3\n");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();

        let settings = Settings::resolve(&Overrides {
            config_path: Some(tmp.path().join("absent.toml")),
            ..Overrides::default()
        })
        .unwrap();

        assert_eq!(settings.reports_dir, PathBuf::from(DEFAULT_REPORTS_DIR));
        assert!(settings.timeout.is_none());
        assert_eq!(settings.catalog.ids(), vec!["behave", "lettuce", "nose"]);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            "[reports]\ndir = \"from-file\"\n[run]\ntimeout_secs = 10\n",
        );
        unsafe { std::env::set_var(REPORTS_DIR_ENV, "from-env") };
        unsafe { std::env::set_var(TIMEOUT_ENV, "20") };

        let settings = Settings::resolve(&Overrides {
            config_path: Some(path),
            reports_dir: Some(PathBuf::from("from-cli")),
            timeout_secs: Some(30),
        });
        clear_env();

        let settings = settings.unwrap();
        assert_eq!(settings.reports_dir, PathBuf::from("from-cli"));
        assert_eq!(settings.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            "[reports]\ndir = \"from-file\"\n[run]\ntimeout_secs = 10\n",
        );
        unsafe { std::env::set_var(REPORTS_DIR_ENV, "from-env") };
        unsafe { std::env::set_var(TIMEOUT_ENV, "20") };

        let settings = Settings::resolve(&Overrides {
            config_path: Some(path),
            ..Overrides::default()
        });
        clear_env();

        let settings = settings.unwrap();
        assert_eq!(settings.reports_dir, PathBuf::from("from-env"));
        assert_eq!(settings.timeout, Some(Duration::from_secs(20)));
    }

    #[test]
    fn resolve_reads_config_file_values() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            "[reports]\ndir = \"from-file\"\n[run]\ntimeout_secs = 10\n",
        );

        let settings = Settings::resolve(&Overrides {
            config_path: Some(path),
            ..Overrides::default()
        })
        .unwrap();

        assert_eq!(settings.reports_dir, PathBuf::from("from-file"));
        assert_eq!(settings.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn resolve_rejects_non_numeric_timeout_env() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var(TIMEOUT_ENV, "soon") };

        let result = Settings::resolve(&Overrides {
            config_path: Some(tmp.path().join("absent.toml")),
            ..Overrides::default()
        });
        clear_env();

        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains(TIMEOUT_ENV), "unexpected error: {msg}");
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();

        let settings = Settings::resolve(&Overrides {
            config_path: Some(tmp.path().join("absent.toml")),
            timeout_secs: Some(0),
            ..Overrides::default()
        })
        .unwrap();

        assert!(settings.timeout.is_none());
    }

    #[test]
    fn config_tools_extend_and_replace_builtins() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[[tools]]
id = "pytest-bdd"
name = "pytest-bdd"
report = "pytest-bdd.txt"
test_dir = "tests/features"
command = ["pytest", "-v"]

[[tools]]
id = "nose"
name = "Nose"
report = "nose.txt"
working_dir = "tests"
test_dir = "tests"
command = ["python", "-m", "nose"]
"#,
        );

        let settings = Settings::resolve(&Overrides {
            config_path: Some(path),
            ..Overrides::default()
        })
        .unwrap();

        assert_eq!(settings.catalog.len(), 4);
        assert!(settings.catalog.get("pytest-bdd").is_some());
        assert_eq!(settings.catalog.get("nose").unwrap().name, "Nose");
    }

    #[test]
    fn invalid_config_tool_is_rejected() {
        let _lock = lock_env();
        clear_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[[tools]]
id = "broken"
name = "Broken"
report = "broken.txt"
test_dir = "t"
command = []
"#,
        );

        let err = Settings::resolve(&Overrides {
            config_path: Some(path),
            ..Overrides::default()
        })
        .unwrap_err();

        assert!(format!("{err:#}").contains("command must name a program"));
    }

    #[test]
    fn reports_dir_for_joins_relative_paths() {
        let settings = Settings {
            reports_dir: PathBuf::from("target/bdd-reports"),
            timeout: None,
            catalog: ToolCatalog::new(),
        };
        assert_eq!(
            settings.reports_dir_for(Path::new("/proj")),
            PathBuf::from("/proj/target/bdd-reports")
        );
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("bddrun/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
