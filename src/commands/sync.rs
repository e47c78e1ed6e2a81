//! # Sync Command Implementation
//!
//! Brings every configured repository up to date in one run:
//!
//! 1. Registers all repositories with a fresh registry, which dispatches a
//!    metadata build for each hosted repository.
//! 2. Waits for those builds.
//! 3. Merges every group, one at a time.
//!
//! Prints one line per job, or a JSON report with `--json`. Fails when any
//! job failed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use yum_metadata::output::{emoji, job_marker, OutputConfig};
use yum_metadata::scheduler::{JobHandle, JobState, Scheduler};
use yum_metadata::tasks::MergeMetadataTask;

use super::{ConfigArgs, Runtime};

/// Register all repositories and merge all groups
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the job report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JobSummary {
    id: u64,
    job_type: &'static str,
    action: &'static str,
    message: String,
    state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&JobHandle> for JobSummary {
    fn from(job: &JobHandle) -> Self {
        JobSummary {
            id: job.id(),
            job_type: job.job_type(),
            action: job.action(),
            message: job.message().to_string(),
            state: job.state(),
            base_dir: job.result().map(|result| result.base_dir),
            error: job.error(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SyncReport {
    registered: Vec<String>,
    jobs: Vec<JobSummary>,
}

impl SyncReport {
    fn failed(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| job.state == JobState::Failed)
            .count()
    }
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let runtime = Runtime::load(&args.config)?;
    let report = sync(&runtime)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &out);
    }

    let failed = report.failed();
    if failed > 0 {
        anyhow::bail!("{} of {} job(s) failed", failed, report.jobs.len());
    }
    Ok(())
}

fn sync(runtime: &Runtime) -> Result<SyncReport> {
    let registry = runtime.registry();
    for repository in runtime.catalog.repositories() {
        registry.register(repository);
    }
    let registered = registry.registered_ids();
    runtime.scheduler.wait_all();

    for group in runtime.catalog.groups()? {
        let task = MergeMetadataTask::new(Some(group), Arc::clone(&runtime.executor))
            .with_temp_cleaner(runtime.temp_cleaner());
        runtime.scheduler.submit(Arc::new(task))?.wait();
    }

    registry.shutdown();

    let jobs = runtime
        .scheduler
        .jobs()
        .iter()
        .map(JobSummary::from)
        .collect();
    Ok(SyncReport { registered, jobs })
}

fn print_report(report: &SyncReport, out: &OutputConfig) {
    println!(
        "{} Registered {} repositories: {}",
        emoji(out, "📦", "[REPO]"),
        report.registered.len(),
        report.registered.join(", ")
    );
    for job in &report.jobs {
        match &job.error {
            Some(error) => println!("{} {} ({})", job_marker(out, job.state), job.message, error),
            None => println!("{} {}", job_marker(out, job.state), job.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use yum_metadata::command::{CommandExecutor, CommandLine, CommandOutput};
    use yum_metadata::config;
    use yum_metadata::tasks::{MERGE_TASK_ID, SCAN_TASK_ID};

    const REPOMD: &str = r#"<repomd xmlns="http://linux.duke.edu/metadata/repo">
  <data type="primary"><location href="repodata/primary.xml.gz"/></data>
</repomd>"#;

    #[derive(Default)]
    struct RecordingExecutor {
        commands: Mutex<Vec<CommandLine>>,
    }

    impl CommandExecutor for RecordingExecutor {
        fn run(&self, command: &CommandLine) -> yum_metadata::error::Result<CommandOutput> {
            self.commands.lock().unwrap().push(command.clone());
            Ok(CommandOutput::default())
        }
    }

    fn write_metadata(base_dir: &Path) {
        let repodata = base_dir.join("repodata");
        std::fs::create_dir_all(&repodata).unwrap();
        std::fs::write(repodata.join("repomd.xml"), REPOMD).unwrap();
        std::fs::write(repodata.join("primary.xml.gz"), b"primary").unwrap();
    }

    fn runtime(temp_dir: &TempDir, executor: Arc<RecordingExecutor>) -> Runtime {
        let root = temp_dir.path();
        let yaml = format!(
            r#"
temp_dir: {root}/tmp
merge_temp_root: {root}/var-tmp
repositories:
  - id: releases
    kind: hosted
    path: {root}/releases
  - id: central
    kind: proxy
    path: {root}/central
  - id: public
    name: Public
    kind: group
    path: {root}/public
    members: [releases, central]
"#,
            root = root.display()
        );
        Runtime::new(config::parse(&yaml).unwrap(), executor).unwrap()
    }

    #[test]
    #[serial]
    fn test_sync_scans_hosted_and_merges_groups() {
        let temp_dir = TempDir::new().unwrap();
        write_metadata(&temp_dir.path().join("releases"));
        write_metadata(&temp_dir.path().join("central"));
        let executor = Arc::new(RecordingExecutor::default());
        let runtime = runtime(&temp_dir, executor.clone());

        let report = sync(&runtime).unwrap();

        assert_eq!(report.registered, vec!["central", "public", "releases"]);
        assert_eq!(report.failed(), 0);
        let types: Vec<&str> = report.jobs.iter().map(|job| job.job_type).collect();
        assert_eq!(types, vec![SCAN_TASK_ID, MERGE_TASK_ID]);
        assert_eq!(
            report.jobs[1].base_dir.as_deref(),
            Some(temp_dir.path().join("public").as_path())
        );

        let commands = executor.commands.lock().unwrap();
        let programs: Vec<&str> = commands.iter().map(|c| c.program.as_str()).collect();
        assert_eq!(programs, vec!["createrepo", "mergerepo"]);
        assert_eq!(commands[1].args_with_prefix("--repo=").count(), 2);
    }

    #[test]
    #[serial]
    fn test_sync_report_serializes_states() {
        let temp_dir = TempDir::new().unwrap();
        let runtime = runtime(&temp_dir, Arc::new(RecordingExecutor::default()));

        let report = sync(&runtime).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["jobs"][0]["state"], "SUCCESS");
        assert_eq!(json["jobs"][0]["action"], "GENERATE_YUM_METADATA");
        assert_eq!(
            json["jobs"][1]["message"],
            "Generate yum metadata for group repository public='Public'"
        );
        assert!(json["jobs"][1].get("error").is_none());
    }
}
