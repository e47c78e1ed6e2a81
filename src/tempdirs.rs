//! Cleanup of the temporary directories left behind by yum tooling.
//!
//! `mergerepo` creates working directories named `yum-<user>-<random>` under
//! `/var/tmp` and does not always remove them. Every merge job sweeps them
//! before and after running the tool. The sweep is best effort: a directory
//! that cannot be listed or removed is logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

/// Name of the user the process runs as, as seen by yum tooling.
///
/// This is the account of the effective uid, the same name yum puts into
/// its temp directories. `USER` and `USERNAME` are only consulted when the
/// uid has no account entry.
pub fn current_user() -> String {
    effective_user_name()
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(unix)]
fn effective_user_name() -> Option<String> {
    use nix::unistd::{Uid, User};

    let uid = Uid::effective();
    match User::from_uid(uid) {
        Ok(user) => user.map(|user| user.name),
        Err(e) => {
            warn!("Could not look up the account of uid {}: {}", uid, e);
            None
        }
    }
}

#[cfg(not(unix))]
fn effective_user_name() -> Option<String> {
    None
}

/// Prefix of the temp directories yum tooling creates for the current user.
pub fn yum_temp_prefix() -> String {
    format!("yum-{}", current_user())
}

/// Removes entries with a fixed name prefix directly below a temp root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempDirCleaner {
    root: PathBuf,
    prefix: String,
}

impl TempDirCleaner {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Cleaner for the current user's yum temp directories below `root`.
    pub fn for_current_user(root: impl Into<PathBuf>) -> Self {
        Self::new(root, yum_temp_prefix())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Deletes every matching entry and returns how many were removed.
    pub fn clean(&self) -> usize {
        if !self.root.is_dir() {
            return 0;
        }

        let mut removed = 0;
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Could not list {}: {}", self.root.display(), e);
                    continue;
                }
            };
            if !entry.file_name().to_string_lossy().starts_with(&self.prefix) {
                continue;
            }

            debug!("Deleting yum temp dir : {}", entry.path().display());
            let result = if entry.file_type().is_dir() {
                fs::remove_dir_all(entry.path())
            } else {
                fs::remove_file(entry.path())
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!("Could not delete {}: {}", entry.path().display(), e),
            }
        }
        removed
    }
}
