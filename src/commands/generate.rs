//! # Generate Command Implementation
//!
//! Rebuilds the metadata of one repository on demand. This is the operator
//! counterpart of the build dispatched automatically when a hosted
//! repository is registered, with an optional output directory override.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use yum_metadata::generator::{DefaultGeneratorFactory, GeneratorFactory};
use yum_metadata::output::{emoji, job_marker, OutputConfig};
use yum_metadata::scheduler::{JobState, Scheduler};
use yum_metadata::tasks::{GenerateParams, ScanTask};

use super::{ConfigArgs, Runtime};

/// Generate yum metadata for a repository
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Id of the repository to generate metadata for.
    #[arg(short, long, value_name = "ID")]
    pub repo: String,

    /// Write the metadata here instead of the repository root.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl From<&GenerateArgs> for GenerateParams {
    fn from(args: &GenerateArgs) -> Self {
        GenerateParams {
            repository_id: args.repo.clone(),
            output_dir: args.output.clone(),
        }
    }
}

/// Execute the `generate` command.
pub fn execute(args: GenerateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let runtime = Runtime::load(&args.config)?;
    let params = GenerateParams::from(&args);
    run(&runtime, params, &out)
}

fn run(runtime: &Runtime, params: GenerateParams, out: &OutputConfig) -> Result<()> {
    let repository = runtime.catalog.repository(&params.repository_id)?;
    let registry = runtime.registry();
    let generator =
        DefaultGeneratorFactory.create(&registry.temporary_directory(), &repository);

    println!(
        "{} Generating yum metadata of repository '{}'",
        emoji(out, "🔧", "[GEN]"),
        repository.id
    );

    let task = ScanTask::new(Arc::new(generator), Arc::clone(&runtime.executor))
        .with_output_dir(params.output_dir);
    let job = runtime.scheduler.submit(Arc::new(task))?;

    match job.wait() {
        JobState::Success => {
            let base_dir = job
                .result()
                .map(|result| result.base_dir.display().to_string())
                .unwrap_or_default();
            println!("{} Metadata written to {}", job_marker(out, JobState::Success), base_dir);
            Ok(())
        }
        state => anyhow::bail!(
            "Metadata generation of repository '{}' ended {}: {}",
            params.repository_id,
            state,
            job.error().unwrap_or_default()
        ),
    }
}
