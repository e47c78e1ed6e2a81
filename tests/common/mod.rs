//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! #[cfg_attr(not(feature = "integration-tests"), ignore)]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::SINGLE_MEMBER_GROUP);
//!     fixture.command().arg("merge").arg("--group").arg("public").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::TestFixture;
    #[allow(unused_imports)]
    pub use super::REPOMD;
}

/// Name of the configuration file the fixture writes.
pub const CONFIG_FILE: &str = "yum-metadata.yaml";

/// Descriptor listing a primary and a filelists component.
#[allow(dead_code)]
pub const REPOMD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<repomd xmlns="http://linux.duke.edu/metadata/repo">
  <revision>1700000000</revision>
  <data type="primary">
    <checksum type="sha256">0000</checksum>
    <location href="repodata/primary.xml.gz"/>
  </data>
  <data type="filelists">
    <checksum type="sha256">1111</checksum>
    <location href="repodata/filelists.xml.gz"/>
  </data>
</repomd>
"#;

/// Server configurations. Paths are relative to the configuration file.
#[allow(dead_code)]
pub mod configs {
    /// A group with a single hosted member; merging needs no external tool.
    pub const SINGLE_MEMBER_GROUP: &str = r#"
temp_dir: tmp
merge_temp_root: var-tmp
repositories:
  - id: releases
    name: Releases
    kind: proxy
    path: repos/releases
  - id: public
    name: Public
    kind: group
    path: repos/public
    members: [releases]
"#;

    /// A group with two members.
    pub const TWO_MEMBER_GROUP: &str = r#"
temp_dir: tmp
merge_temp_root: var-tmp
repositories:
  - id: releases
    kind: proxy
    path: repos/releases
  - id: thirdparty
    kind: proxy
    path: repos/thirdparty
  - id: public
    name: Public
    kind: group
    path: repos/public
    members: [releases, thirdparty]
"#;

    /// A group without members.
    pub const EMPTY_GROUP: &str = r#"
temp_dir: tmp
merge_temp_root: var-tmp
repositories:
  - id: public
    kind: group
    path: repos/public
"#;

    /// Structurally invalid configuration.
    pub const INVALID_YAML: &str = "repositories: [unclosed";

    /// Group referencing a member that does not exist.
    pub const UNKNOWN_MEMBER: &str = r#"
repositories:
  - id: public
    kind: group
    path: repos/public
    members: [missing]
"#;
}

/// A temporary server root with a configuration file and repository trees.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `yum-metadata.yaml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(CONFIG_FILE)
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Give the repository at `repo_dir` a descriptor and its components.
    pub fn with_metadata(self, repo_dir: &str) -> Self {
        let repodata = self.temp_dir.child(repo_dir).child("repodata");
        repodata
            .child("repomd.xml")
            .write_str(REPOMD)
            .expect("Failed to write repomd.xml");
        repodata
            .child("primary.xml.gz")
            .write_binary(b"primary")
            .expect("Failed to write primary");
        repodata
            .child("filelists.xml.gz")
            .write_binary(b"filelists")
            .expect("Failed to write filelists");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(CONFIG_FILE)
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command running in the fixture directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("yum-metadata");
        cmd.current_dir(self.path())
            .env_remove("YUM_METADATA_CONFIG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// A command with `--config` pointing at the fixture's configuration.
    pub fn command_with_config(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand).arg("--config").arg(self.config_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::SINGLE_MEMBER_GROUP);
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_fixture_with_metadata() {
        let fixture = TestFixture::new().with_metadata("repos/releases");
        assert!(fixture
            .path()
            .join("repos/releases/repodata/repomd.xml")
            .exists());
        assert!(fixture
            .path()
            .join("repos/releases/repodata/filelists.xml.gz")
            .exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [
            configs::SINGLE_MEMBER_GROUP,
            configs::TWO_MEMBER_GROUP,
            configs::EMPTY_GROUP,
            configs::UNKNOWN_MEMBER,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        assert!(serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML).is_err());
    }
}
