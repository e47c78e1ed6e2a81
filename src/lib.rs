//! # Yum Metadata Library
//!
//! This library keeps the package-index ("yum") metadata of a set of
//! repositories up to date. It is used by the `yum-metadata` command-line
//! tool but can be embedded in any server that owns repository storage.
//!
//! ## Quick Example
//!
//! ```
//! use yum_metadata::descriptor::RepoMd;
//!
//! let repomd = RepoMd::parse(r#"<?xml version="1.0"?>
//! <repomd xmlns="http://linux.duke.edu/metadata/repo">
//!   <data type="primary"><location href="repodata/primary.xml.gz"/></data>
//! </repomd>"#).unwrap();
//!
//! assert_eq!(repomd.primary_location(), Some("repodata/primary.xml.gz"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Registry (`registry`)**: Process-wide binding from repository id to its
//!   metadata generator. Registering a hosted repository dispatches a
//!   metadata build.
//! - **Generators (`generator`)**: Per-repository metadata builders, created
//!   through a pluggable factory.
//! - **Jobs (`tasks`)**: The metadata build (`scan`) and the group merge
//!   (`merge`), plus the admission policy limiting concurrent merges.
//! - **Scheduler (`scheduler`)**: Runs jobs asynchronously and keeps their
//!   state and history.
//! - **Descriptors (`descriptor`)**: Parser for `repodata/repomd.xml`.
//! - **Storage (`storage`, `repository`)**: Repositories and the storage
//!   their items are retrieved from.
//! - **External tools (`command`)**: Argument assembly and execution of
//!   `createrepo` and `mergerepo`.
//! - **Configuration (`config`)**: The YAML server configuration.
//!
//! ## Merge Flow
//!
//! A group merge:
//!
//! 1.  Deletes leftover `yum-<user>*` working directories of the merge tool.
//! 2.  Retrieves every member's descriptor and the files it lists, skipping
//!     members whose metadata is incomplete.
//! 3.  Runs `mergerepo` over the usable members when there are at least two,
//!     and otherwise removes the group's stale `repodata` directory.
//! 4.  Cleans the working directories again, whatever the outcome.

pub mod command;
pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod output;
pub mod registry;
pub mod repository;
pub mod scheduler;
pub mod storage;
pub mod tasks;
pub mod tempdirs;
