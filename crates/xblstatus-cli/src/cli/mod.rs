//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use xblstatus_core::config::{self, MonitorConfig};

mod commands;

#[derive(Parser)]
#[command(name = "xblstatus")]
#[command(version)]
#[command(about = "Show your Xbox Live game as your Discord status")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file (TOML, or JSON with a .json extension)
    #[arg(long, global = true, env = "XBLSTATUS_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Poll Xbox Live and update Discord until interrupted (default)
    Run,
    /// Fetch presence once and print the status that would be shown
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Load and validate the config file, then print it with secrets hidden
    Check,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::paths::config_path);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = load_config(&config_path)?;
            block_on(commands::run::run(config))
        }
        Commands::Status => {
            let config = load_config(&config_path)?;
            block_on(commands::status::run(&config))
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path(&config_path);
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(&config_path),
            ConfigCommands::Check => {
                let config = load_config(&config_path)?;
                commands::config::check(&config_path, &config);
                Ok(())
            }
        },
    }
}

fn load_config(path: &std::path::Path) -> Result<MonitorConfig> {
    MonitorConfig::load_from(path).context("Failed to load config")
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(future)
}
