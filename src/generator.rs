//! Per-repository metadata generators.
//!
//! A [`MetadataGenerator`] is the handle through which a repository's yum
//! metadata is (re)built. The registry creates exactly one per registered
//! repository through a [`GeneratorFactory`]; running jobs keep their own
//! `Arc` to it, so unregistering a repository never pulls a generator out
//! from under a job.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::command::{createrepo_command, CommandLine};
use crate::repository::Repository;

/// A repository whose yum metadata lives below `base_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YumRepository {
    pub base_dir: PathBuf,
    pub repository_id: String,
}

impl YumRepository {
    pub fn new(base_dir: impl Into<PathBuf>, repository_id: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            repository_id: repository_id.into(),
        }
    }
}

#[derive(Debug)]
pub struct MetadataGenerator {
    repository: Repository,
    temp_dir: PathBuf,
}

impl MetadataGenerator {
    pub fn new(repository: Repository, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            temp_dir: temp_dir.into(),
        }
    }

    pub fn repository_id(&self) -> &str {
        &self.repository.id
    }

    pub fn base_dir(&self) -> &Path {
        self.repository.base_dir()
    }

    /// Scratch directory reserved for this repository's builds.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Where metadata is written: `output_dir` if given, else the base dir.
    pub fn output_dir<'a>(&'a self, output_dir: Option<&'a Path>) -> &'a Path {
        output_dir.unwrap_or_else(|| self.base_dir())
    }

    /// `createrepo` invocation rebuilding this repository's metadata.
    pub fn build_command(&self, output_dir: Option<&Path>) -> crate::error::Result<CommandLine> {
        createrepo_command(self.base_dir(), self.output_dir(output_dir))
    }
}

/// Creates generators for newly registered repositories.
pub trait GeneratorFactory: Send + Sync {
    fn create(&self, temp_dir: &Path, repository: &Repository) -> MetadataGenerator;
}

/// Gives every repository its own subdirectory of the registry's temp dir.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGeneratorFactory;

impl GeneratorFactory for DefaultGeneratorFactory {
    fn create(&self, temp_dir: &Path, repository: &Repository) -> MetadataGenerator {
        MetadataGenerator::new(repository.clone(), temp_dir.join(&repository.id))
    }
}
