mod config;
mod run_cmd;
#[cfg(test)]
mod test_util;
mod tools_cmd;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use config::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "bddrun", about = "Run BDD/unit test tools and keep their output as reports")]
struct Cli {
    /// Config file path (defaults to ~/.config/bddrun/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a test tool against a project
    Run {
        /// Tool id (see `bddrun tools`)
        tool: String,
        /// Project root that tool directories are relative to
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Reports directory (overrides BDDRUN_REPORTS_DIR and the config file)
        #[arg(long)]
        reports_dir: Option<PathBuf>,
        /// Kill the tool after this many seconds (0 disables the timeout)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List the available tools
    Tools,
    /// Write a starter config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the `bddrun init` command: write the starter config file.
fn cmd_init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    config::save_config(path, &config::starter_config())?;

    println!("Config written to {}", path.display());
    println!("  reports.dir = {}", config::DEFAULT_REPORTS_DIR);
    println!();
    println!("Add [[tools]] entries to run tools other than the built-ins.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            tool,
            project_dir,
            reports_dir,
            timeout,
        } => {
            let settings = Settings::resolve(&Overrides {
                config_path: cli.config,
                reports_dir,
                timeout_secs: timeout,
            })?;
            run_cmd::run_tool(&settings, &project_dir, &tool).await?;
        }
        Commands::Tools => {
            let settings = Settings::resolve(&Overrides {
                config_path: cli.config,
                ..Overrides::default()
            })?;
            tools_cmd::list_tools(&settings.catalog);
        }
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::config_path);
            cmd_init(&path, force)?;
        }
    }

    Ok(())
}
