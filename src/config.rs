//! # Server Configuration
//!
//! This module defines the `yum-metadata.yaml` file that describes the
//! repositories a server knows about, and turns it into live [`Repository`]
//! and [`RepositoryGroup`] values.
//!
//! ```yaml
//! temp_dir: /var/lib/yum-metadata/tmp
//! max_parallel_threads: 10
//! merge_temp_root: /var/tmp
//! repositories:
//!   - id: releases
//!     name: Releases
//!     kind: hosted
//!     path: /srv/repos/releases
//!   - id: public
//!     kind: group
//!     path: /srv/repos/public
//!     members: [releases]
//! ```
//!
//! ## Parsing
//!
//! [`parse`] deserializes the YAML and then validates it:
//!
//! - ids match `^[A-Za-z0-9._-]+$` and are unique
//! - group members are configured and are not groups themselves
//! - only groups list members
//! - `max_parallel_threads` is at least 1
//!
//! [`from_file`] additionally resolves relative repository paths against the
//! directory holding the file.
//!
//! ## Catalog
//!
//! [`ServerConfig::catalog`] builds one [`FileStorage`] per repository and
//! shares it between every value handed out, so an item stored through one
//! handle is visible through all others.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::repository::{Repository, RepositoryGroup, RepositoryKind};
use crate::storage::FileStorage;

const REPOSITORY_ID_PATTERN: &str = r"^[A-Za-z0-9._-]+$";

fn default_max_parallel_threads() -> usize {
    defaults::MAX_PARALLEL_THREADS
}

fn default_merge_temp_root() -> PathBuf {
    PathBuf::from(defaults::MERGE_TEMP_ROOT)
}

/// One entry of the `repositories` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    pub id: String,
    /// Display name; the id when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: RepositoryKind,
    /// Root directory of the repository's storage.
    pub path: PathBuf,
    /// Member ids, in merge order. Groups only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl RepositoryConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Server temp directory; platform cache directory when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    #[serde(default = "default_max_parallel_threads")]
    pub max_parallel_threads: usize,
    /// Directory the merge tool creates its working directories in.
    #[serde(default = "default_merge_temp_root")]
    pub merge_temp_root: PathBuf,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            max_parallel_threads: default_max_parallel_threads(),
            merge_temp_root: default_merge_temp_root(),
            repositories: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(defaults::default_temp_dir)
    }

    pub fn entry(&self, id: &str) -> Option<&RepositoryConfig> {
        self.repositories.iter().find(|entry| entry.id == id)
    }

    /// Builds live repositories for every configured entry.
    pub fn catalog(&self) -> RepositoryCatalog {
        let repositories = self
            .repositories
            .iter()
            .map(|entry| {
                Repository::new(
                    &entry.id,
                    entry.display_name(),
                    entry.kind,
                    Arc::new(FileStorage::new(&entry.id, &entry.path)),
                )
            })
            .collect();
        RepositoryCatalog {
            config: self.clone(),
            repositories,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_parallel_threads == 0 {
            return Err(Error::ConfigParse {
                message: "max_parallel_threads must be at least 1".to_string(),
                hint: Some("Omit the field to use the default of 10".to_string()),
            });
        }

        let id_pattern = Regex::new(REPOSITORY_ID_PATTERN)?;
        let mut seen = HashSet::new();
        for entry in &self.repositories {
            if !id_pattern.is_match(&entry.id) {
                return Err(Error::ConfigParse {
                    message: format!("Invalid repository id '{}'", entry.id),
                    hint: Some(
                        "Ids may only contain letters, digits, '.', '_' and '-'".to_string(),
                    ),
                });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(Error::ConfigParse {
                    message: format!("Duplicate repository id '{}'", entry.id),
                    hint: Some("Each repository must have a unique id".to_string()),
                });
            }
        }

        for entry in &self.repositories {
            if entry.kind != RepositoryKind::Group {
                if !entry.members.is_empty() {
                    return Err(Error::ConfigParse {
                        message: format!(
                            "Repository '{}' of kind '{}' lists members",
                            entry.id, entry.kind
                        ),
                        hint: Some("Only repositories of kind 'group' have members".to_string()),
                    });
                }
                continue;
            }
            for member in &entry.members {
                match self.entry(member) {
                    None => {
                        return Err(Error::ConfigParse {
                            message: format!(
                                "Group '{}' references unknown member '{}'",
                                entry.id, member
                            ),
                            hint: Some(format!(
                                "Add a repository with id '{}' or remove it from the members",
                                member
                            )),
                        })
                    }
                    Some(found) if found.kind == RepositoryKind::Group => {
                        return Err(Error::ConfigParse {
                            message: format!(
                                "Group '{}' has group '{}' as a member",
                                entry.id, member
                            ),
                            hint: Some("Groups can only contain hosted or proxy repositories".to_string()),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for entry in &mut self.repositories {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }
        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.is_relative() {
                self.temp_dir = Some(base.join(temp_dir));
            }
        }
        if self.merge_temp_root.is_relative() {
            self.merge_temp_root = base.join(&self.merge_temp_root);
        }
    }
}

/// Live repositories built from a [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct RepositoryCatalog {
    config: ServerConfig,
    repositories: Vec<Repository>,
}

impl RepositoryCatalog {
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// All repositories, in configuration order.
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn repository(&self, id: &str) -> Result<Repository> {
        self.repositories
            .iter()
            .find(|repository| repository.id == id)
            .cloned()
            .ok_or_else(|| Error::UnknownRepository { id: id.to_string() })
    }

    /// Resolves a group and its members.
    pub fn group(&self, id: &str) -> Result<RepositoryGroup> {
        let repository = self.repository(id)?;
        if repository.kind != RepositoryKind::Group {
            return Err(Error::ConfigParse {
                message: format!("Repository '{}' is a {} repository, not a group", id, repository.kind),
                hint: Some("Pass the id of a repository of kind 'group'".to_string()),
            });
        }
        let members = self
            .config
            .entry(id)
            .map(|entry| entry.members.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|member| self.repository(member))
            .collect::<Result<Vec<_>>>()?;
        Ok(RepositoryGroup::new(repository, members))
    }

    /// All groups, in configuration order.
    pub fn groups(&self) -> Result<Vec<RepositoryGroup>> {
        self.repositories
            .iter()
            .filter(|repository| repository.kind == RepositoryKind::Group)
            .map(|repository| self.group(&repository.id))
            .collect()
    }
}

/// Parses and validates a YAML server configuration.
pub fn parse(yaml_content: &str) -> Result<ServerConfig> {
    let config: ServerConfig =
        serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some(
                "Expected a mapping with a 'repositories' list of {id, kind, path} entries"
                    .to_string(),
            ),
        })?;
    config.validate()?;
    Ok(config)
}

/// Loads a configuration file, resolving relative paths against its directory.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ServerConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut config = parse(&content)?;
    let base = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    Ok(config)
}
