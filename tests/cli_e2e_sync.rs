//! End-to-end tests for the `sync` command.
//!
//! The configurations only contain proxy repositories and groups, so no
//! metadata build (and thus no `createrepo`) is dispatched.

mod common;
use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_merges_every_group() {
    let fixture = TestFixture::new()
        .with_config(configs::SINGLE_MEMBER_GROUP)
        .with_metadata("repos/releases");

    fixture
        .command_with_config("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[REPO] Registered 2 repositories: public, releases",
        ))
        .stdout(predicate::str::contains(
            "[OK] Generate yum metadata for group repository public='Public'",
        ));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_json_report() {
    let fixture = TestFixture::new().with_config(configs::SINGLE_MEMBER_GROUP);

    let output = fixture
        .command_with_config("sync")
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["registered"], serde_json::json!(["public", "releases"]));
    let jobs = report["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["job_type"], "MergeMetadataTask");
    assert_eq!(jobs[0]["action"], "GENERATE_YUM_GROUP_REPOSITORY");
    assert_eq!(jobs[0]["state"], "SUCCESS");
    assert!(jobs[0]["base_dir"]
        .as_str()
        .unwrap()
        .ends_with("repos/public"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_publishes_nothing_without_repositories() {
    let fixture = TestFixture::new().with_config("repositories: []\n");

    fixture
        .command_with_config("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered 0 repositories"));
}

#[test]
fn test_sync_help() {
    let mut cmd = cargo_bin_cmd!("yum-metadata");
    cmd.arg("sync")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"));
}
