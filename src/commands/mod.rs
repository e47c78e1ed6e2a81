//! # CLI Command Implementations
//!
//! Each subcommand of the `yum-metadata` tool lives in its own file with:
//! - An `Args` struct deriving `clap::Args`.
//! - An `execute` function taking the parsed `Args` (and the global color
//!   flag where the command prints status lines).
//!
//! Commands that operate on repositories share [`ConfigArgs`] for locating
//! the server configuration and [`Runtime`] for the services built from it.

pub mod clean_temp;
pub mod completions;
pub mod generate;
pub mod merge;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use yum_metadata::command::{CommandExecutor, SystemCommandExecutor};
use yum_metadata::config::{self, RepositoryCatalog, ServerConfig};
use yum_metadata::defaults;
use yum_metadata::generator::DefaultGeneratorFactory;
use yum_metadata::registry::YumRegistry;
use yum_metadata::scheduler::InProcessScheduler;
use yum_metadata::tempdirs::TempDirCleaner;

/// Location of the server configuration.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the yum-metadata.yaml server configuration.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "YUM_METADATA_CONFIG",
        default_value = defaults::CONFIG_FILE
    )]
    pub config: PathBuf,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<ServerConfig> {
        if !self.config.exists() {
            anyhow::bail!(
                "Configuration file not found: {}\n  hint: pass --config <FILE> or set YUM_METADATA_CONFIG",
                self.config.display()
            );
        }
        config::from_file(&self.config)
            .with_context(|| format!("Failed to load config from {}", self.config.display()))
    }
}

/// Services a command needs, built from the server configuration.
pub struct Runtime {
    pub config: ServerConfig,
    pub catalog: RepositoryCatalog,
    pub scheduler: Arc<InProcessScheduler>,
    pub executor: Arc<dyn CommandExecutor>,
}

impl Runtime {
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        let config = args.load()?;
        Self::new(config, Arc::new(SystemCommandExecutor))
    }

    pub fn new(config: ServerConfig, executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        let scheduler = InProcessScheduler::new(config.max_parallel_threads)
            .context("Failed to start job scheduler")?;
        Ok(Self {
            catalog: config.catalog(),
            config,
            scheduler: Arc::new(scheduler),
            executor,
        })
    }

    /// Registry sharing this runtime's scheduler, and thus its thread limit.
    pub fn registry(&self) -> YumRegistry {
        YumRegistry::new(
            self.config.temp_dir(),
            self.scheduler.clone(),
            Arc::new(DefaultGeneratorFactory),
            Arc::clone(&self.executor),
        )
    }

    pub fn temp_cleaner(&self) -> TempDirCleaner {
        TempDirCleaner::for_current_user(&self.config.merge_temp_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let args = ConfigArgs {
            config: temp_dir.path().join("missing.yaml"),
        };

        let error = args.load().unwrap_err().to_string();

        assert!(error.contains("Configuration file not found"), "{}", error);
        assert!(error.contains("hint:"), "{}", error);
    }

    #[test]
    fn test_load_invalid_config_has_context() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("yum-metadata.yaml");
        std::fs::write(&path, "repositories: [").unwrap();
        let args = ConfigArgs { config: path };

        let error = format!("{:#}", args.load().unwrap_err());

        assert!(error.contains("Failed to load config"), "{}", error);
    }

    #[test]
    fn test_runtime_uses_configured_temp_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            temp_dir: Some(temp_dir.path().join("tmp")),
            merge_temp_root: temp_dir.path().join("var-tmp"),
            max_parallel_threads: 3,
            ..Default::default()
        };

        let runtime = Runtime::new(config, Arc::new(SystemCommandExecutor)).unwrap();

        let registry = runtime.registry();
        assert_eq!(registry.max_parallel_threads(), 3);
        assert_eq!(
            registry.temporary_directory(),
            temp_dir.path().join("tmp/generators")
        );
        assert_eq!(runtime.temp_cleaner().root(), temp_dir.path().join("var-tmp"));
    }
}
