//! # Merge Command Implementation
//!
//! Merges the metadata of a group's members into the group's base directory
//! and prints where the merged metadata lives.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use yum_metadata::output::{emoji, job_marker, OutputConfig};
use yum_metadata::scheduler::{JobState, Scheduler};
use yum_metadata::tasks::MergeMetadataTask;

use super::{ConfigArgs, Runtime};

/// Merge the metadata of a group repository's members
#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Id of the group repository to merge.
    #[arg(short, long, value_name = "ID")]
    pub group: String,
}

/// Execute the `merge` command.
pub fn execute(args: MergeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let runtime = Runtime::load(&args.config)?;
    run(&runtime, &args.group, &out)
}

fn run(runtime: &Runtime, group_id: &str, out: &OutputConfig) -> Result<()> {
    let group = runtime.catalog.group(group_id)?;

    println!(
        "{} Merging {} member(s) into group '{}'",
        emoji(out, "🔀", "[MERGE]"),
        group.members.len(),
        group.id()
    );

    let task = MergeMetadataTask::new(Some(group), Arc::clone(&runtime.executor))
        .with_temp_cleaner(runtime.temp_cleaner());
    let job = runtime.scheduler.submit(Arc::new(task))?;

    match job.wait() {
        JobState::Success => {
            match job.result() {
                Some(result) => println!(
                    "{} Group metadata at {}",
                    job_marker(out, JobState::Success),
                    result.base_dir.display()
                ),
                None => println!(
                    "{} Group '{}' has no members, nothing to merge",
                    job_marker(out, JobState::Success),
                    group_id
                ),
            }
            Ok(())
        }
        state => anyhow::bail!(
            "Merge of group '{}' ended {}: {}",
            group_id,
            state,
            job.error().unwrap_or_default()
        ),
    }
}
