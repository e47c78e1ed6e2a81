//! Metadata merge job for a repository group.
//!
//! A group exposes the content of all its members, so its yum metadata has
//! to describe all of them. The job collects the metadata of every member
//! that can provide it and combines it with `mergerepo` into the group's own
//! base directory:
//!
//! 1. Remove stale `mergerepo` temp directories.
//! 2. For each member, in declared order, read `repodata/repomd.xml`, fetch
//!    every component it lists (forcing it onto local disk) and remember the
//!    member's base directory. A member that fails any of these steps is left
//!    out; the remaining members are still merged.
//! 3. With two or more usable members run `mergerepo` once. With fewer there
//!    is nothing to merge, so stale group metadata is removed instead and
//!    clients see the single member (or nothing) directly.
//! 4. Remove stale temp directories again.
//!
//! Only one merge runs at a time, see [`super::admission`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::command::{merge_command, CommandExecutor};
use crate::defaults;
use crate::descriptor::{RepoMd, REPOMD_PATH};
use crate::error::{Error, Result};
use crate::generator::YumRepository;
use crate::repository::{Repository, RepositoryGroup};
use crate::scheduler::{Admission, JobHandle, Scheduler, Task};
use crate::tempdirs::TempDirCleaner;

use super::admission::MergeAdmission;

/// Job type of group merges.
pub const MERGE_TASK_ID: &str = "MergeMetadataTask";

pub struct MergeMetadataTask {
    group: Option<RepositoryGroup>,
    executor: Arc<dyn CommandExecutor>,
    cleaner: TempDirCleaner,
    admission: MergeAdmission,
}

impl MergeMetadataTask {
    /// Creates a merge of `group` using the process-wide admission.
    pub fn new(group: Option<RepositoryGroup>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            group,
            executor,
            cleaner: TempDirCleaner::for_current_user(defaults::MERGE_TEMP_ROOT),
            admission: MergeAdmission::global().clone(),
        }
    }

    pub fn with_temp_cleaner(mut self, cleaner: TempDirCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn with_admission(mut self, admission: MergeAdmission) -> Self {
        self.admission = admission;
        self
    }

    /// Submits a merge of `group`.
    pub fn submit(
        scheduler: &dyn Scheduler,
        group: RepositoryGroup,
        executor: Arc<dyn CommandExecutor>,
    ) -> Result<JobHandle> {
        scheduler.submit(Arc::new(Self::new(Some(group), executor)))
    }

    /// Merges the group's metadata.
    ///
    /// Returns `None` without doing anything when there is no group or the
    /// group has no members.
    pub fn merge(&self) -> Result<Option<YumRepository>> {
        let group = match &self.group {
            Some(group) if !group.members.is_empty() => group,
            _ => return Ok(None),
        };

        self.cleaner.clean();
        let result = self.merge_members(group);
        self.cleaner.clean();

        result.map(Some)
    }

    fn merge_members(&self, group: &RepositoryGroup) -> Result<YumRepository> {
        let group_base_dir = group.base_dir().to_path_buf();
        let member_base_dirs = member_base_dirs(group);

        if member_base_dirs.len() > 1 {
            debug!(
                "Merging repository group '{}' out of {:?}",
                group.id(),
                member_base_dirs
            );
            let command = merge_command(&group_base_dir, &member_base_dirs)?;
            self.executor.run(&command)?;
            debug!("Group repository '{}' merged", group.id());
        } else {
            let repodata = group_base_dir.join("repodata");
            debug!(
                "Removing repodata of group repository '{}', at most one member provides metadata: {}",
                group.id(),
                repodata.display()
            );
            remove_dir_quietly(&repodata);
        }

        Ok(YumRepository::new(group_base_dir, group.id()))
    }
}

/// Base directories of the members whose metadata is locally available.
fn member_base_dirs(group: &RepositoryGroup) -> Vec<PathBuf> {
    group
        .members
        .iter()
        .filter_map(|member| match materialize_metadata(member) {
            Ok(base_dir) => Some(base_dir),
            Err(e) => {
                debug!(
                    "Leaving '{}' out of group '{}': {}",
                    member.id,
                    group.id(),
                    e
                );
                None
            }
        })
        .collect()
}

/// Fetches a member's descriptor and every component it references.
fn materialize_metadata(member: &Repository) -> Result<PathBuf> {
    let descriptor = retrieve(member, &format!("/{}", REPOMD_PATH))?;
    let repomd = RepoMd::from_bytes(&descriptor.read()?)?;

    for location in repomd.locations() {
        retrieve(member, &format!("/{}", location))?;
    }

    Ok(member.base_dir().to_path_buf())
}

fn retrieve(member: &Repository, path: &str) -> Result<crate::storage::StorageItem> {
    member
        .storage
        .retrieve_item(path)?
        .ok_or_else(|| Error::ItemNotFound {
            repository: member.id.clone(),
            path: path.to_string(),
        })
}

fn remove_dir_quietly(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not delete {}: {}", dir.display(), e),
    }
}

impl Task for MergeMetadataTask {
    fn job_type(&self) -> &'static str {
        MERGE_TASK_ID
    }

    fn action(&self) -> &'static str {
        "GENERATE_YUM_GROUP_REPOSITORY"
    }

    fn message(&self) -> String {
        match &self.group {
            Some(group) => format!(
                "Generate yum metadata for group repository {}='{}'",
                group.id(),
                group.name()
            ),
            None => "Generate yum metadata for group repository <none>".to_string(),
        }
    }

    fn admit(&self) -> Admission {
        let Some(group) = &self.group else {
            return Admission::Admitted(Box::new(()));
        };
        match self.admission.try_admit(group.id()) {
            Ok(ticket) => Admission::Admitted(Box::new(ticket)),
            Err(denied) => Admission::Denied(denied.to_string()),
        }
    }

    fn run(&self) -> Result<Option<YumRepository>> {
        self.merge()
    }
}
