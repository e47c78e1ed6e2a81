//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Yum Metadata - Keep yum repository metadata up to date
#[derive(Parser, Debug)]
#[command(name = "yum-metadata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate yum metadata for a repository
    Generate(commands::generate::GenerateArgs),

    /// Merge the metadata of a group repository's members
    Merge(commands::merge::MergeArgs),

    /// Register all repositories and merge all groups
    Sync(commands::sync::SyncArgs),

    /// Delete leftover merge working directories
    CleanTemp(commands::clean_temp::CleanTempArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Generate(args) => commands::generate::execute(args, &self.color),
            Commands::Merge(args) => commands::merge::execute(args, &self.color),
            Commands::Sync(args) => commands::sync::execute(args, &self.color),
            Commands::CleanTemp(args) => commands::clean_temp::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Logs go to stderr; `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // Already initialised when embedded in tests
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
