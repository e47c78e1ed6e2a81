//! Metadata build job for a single repository.
//!
//! The job rebuilds the metadata tree from the repository's current content
//! by running `createrepo` through the shared [`CommandExecutor`]. What the
//! tool does with the content is its own business; this job only decides
//! where the output goes.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command::CommandExecutor;
use crate::error::Result;
use crate::generator::{MetadataGenerator, YumRepository};
use crate::scheduler::{JobHandle, Scheduler, Task};

/// Job type of metadata builds.
pub const SCAN_TASK_ID: &str = "GenerateMetadataTask";

/// Operator-facing parameters of a metadata build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateParams {
    /// Repository to build metadata for.
    pub repository_id: String,
    /// Where to write the metadata; the repository root when unset.
    pub output_dir: Option<PathBuf>,
}

pub struct ScanTask {
    generator: Arc<MetadataGenerator>,
    executor: Arc<dyn CommandExecutor>,
    output_dir: Option<PathBuf>,
}

impl ScanTask {
    pub fn new(generator: Arc<MetadataGenerator>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            generator,
            executor,
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Submits a build of `generator`'s repository.
    pub fn submit(
        scheduler: &dyn Scheduler,
        generator: Arc<MetadataGenerator>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Result<JobHandle> {
        scheduler.submit(Arc::new(Self::new(generator, executor)))
    }
}

impl Task for ScanTask {
    fn job_type(&self) -> &'static str {
        SCAN_TASK_ID
    }

    fn action(&self) -> &'static str {
        "GENERATE_YUM_METADATA"
    }

    fn message(&self) -> String {
        format!(
            "Generate yum metadata of repository '{}'",
            self.generator.repository_id()
        )
    }

    fn run(&self) -> Result<Option<YumRepository>> {
        let output_dir = self
            .generator
            .output_dir(self.output_dir.as_deref())
            .to_path_buf();
        fs::create_dir_all(&output_dir)?;
        fs::create_dir_all(self.generator.temp_dir())?;

        let command = self.generator.build_command(Some(&output_dir))?;
        self.executor.run(&command)?;

        Ok(Some(YumRepository::new(
            output_dir,
            self.generator.repository_id(),
        )))
    }
}
