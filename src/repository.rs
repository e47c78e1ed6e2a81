//! # Repositories and Repository Groups
//!
//! The repository configuration is owned by an external collaborator (see
//! [`crate::config`]); this module only models what the metadata jobs read
//! from it. A [`Repository`] couples an id and a kind with the storage that
//! holds its content, and a [`RepositoryGroup`] lists the members whose
//! metadata is merged into the group.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::RepositoryStorage;

/// Opaque repository identifier.
pub type RepositoryId = String;

/// How a repository obtains its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// Content is deployed directly into the repository.
    Hosted,
    /// Content is fetched from a remote repository on demand.
    Proxy,
    /// Aggregate of other repositories.
    Group,
}

impl RepositoryKind {
    /// Whether metadata for this kind is built by scanning its content.
    pub fn is_hosted(&self) -> bool {
        matches!(self, RepositoryKind::Hosted)
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryKind::Hosted => write!(f, "hosted"),
            RepositoryKind::Proxy => write!(f, "proxy"),
            RepositoryKind::Group => write!(f, "group"),
        }
    }
}

/// A repository and the storage behind it.
#[derive(Debug, Clone)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    pub kind: RepositoryKind,
    pub storage: Arc<dyn RepositoryStorage>,
}

impl Repository {
    pub fn new(
        id: impl Into<RepositoryId>,
        name: impl Into<String>,
        kind: RepositoryKind,
        storage: Arc<dyn RepositoryStorage>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            storage,
        }
    }

    /// Local directory holding the repository's content.
    pub fn base_dir(&self) -> &Path {
        self.storage.base_dir()
    }
}

/// A group repository together with its members in declared order.
#[derive(Debug, Clone)]
pub struct RepositoryGroup {
    pub repository: Repository,
    pub members: Vec<Repository>,
}

impl RepositoryGroup {
    pub fn new(repository: Repository, members: Vec<Repository>) -> Self {
        Self {
            repository,
            members,
        }
    }

    pub fn id(&self) -> &str {
        &self.repository.id
    }

    pub fn name(&self) -> &str {
        &self.repository.name
    }

    pub fn base_dir(&self) -> &Path {
        self.repository.base_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStorage;

    fn repository(id: &str, kind: RepositoryKind) -> Repository {
        Repository::new(
            id,
            id.to_uppercase(),
            kind,
            Arc::new(FileStorage::new(id, format!("/srv/repos/{}", id))),
        )
    }

    #[test]
    fn test_only_hosted_is_scanned() {
        assert!(RepositoryKind::Hosted.is_hosted());
        assert!(!RepositoryKind::Proxy.is_hosted());
        assert!(!RepositoryKind::Group.is_hosted());
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let kind: RepositoryKind = serde_yaml::from_str("group").unwrap();
        assert_eq!(kind, RepositoryKind::Group);
        assert_eq!(kind.to_string(), "group");
    }

    #[test]
    fn test_group_accessors() {
        let group = RepositoryGroup::new(
            repository("public", RepositoryKind::Group),
            vec![
                repository("releases", RepositoryKind::Hosted),
                repository("central", RepositoryKind::Proxy),
            ],
        );

        assert_eq!(group.id(), "public");
        assert_eq!(group.name(), "PUBLIC");
        assert_eq!(group.base_dir(), Path::new("/srv/repos/public"));
        assert_eq!(group.members[1].base_dir(), Path::new("/srv/repos/central"));
    }
}
