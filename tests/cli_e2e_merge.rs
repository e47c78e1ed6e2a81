//! End-to-end tests for the `merge`, `generate` and `clean-temp` commands.
//!
//! The scenarios are chosen so that no external tool is needed: groups with
//! fewer than two usable members never invoke `mergerepo`.

mod common;
use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_merge_single_member_group_removes_stale_metadata() {
    let fixture = TestFixture::new()
        .with_config(configs::SINGLE_MEMBER_GROUP)
        .with_metadata("repos/releases")
        .with_file("repos/public/repodata/repomd.xml", "<repomd/>");

    fixture
        .command_with_config("merge")
        .arg("--group")
        .arg("public")
        .assert()
        .success()
        .stdout(predicate::str::contains("[MERGE] Merging 1 member(s) into group 'public'"))
        .stdout(predicate::str::contains("[OK] Group metadata at"));

    fixture.child("repos/public/repodata").assert(predicate::path::missing());
    fixture
        .child("repos/releases/repodata/repomd.xml")
        .assert(predicate::path::exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_merge_members_without_metadata() {
    let fixture = TestFixture::new()
        .with_config(configs::TWO_MEMBER_GROUP)
        .with_file("repos/public/repodata/repomd.xml", "<repomd/>");

    fixture
        .command_with_config("merge")
        .arg("--group")
        .arg("public")
        .assert()
        .success();

    fixture.child("repos/public/repodata").assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_merge_empty_group() {
    let fixture = TestFixture::new().with_config(configs::EMPTY_GROUP);

    fixture
        .command_with_config("merge")
        .arg("--group")
        .arg("public")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to merge"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_merge_unknown_group() {
    let fixture = TestFixture::new().with_config(configs::SINGLE_MEMBER_GROUP);

    fixture
        .command_with_config("merge")
        .arg("--group")
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown repository: nope"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_merge_uses_config_from_environment() {
    let fixture = TestFixture::new().with_config(configs::EMPTY_GROUP);

    fixture
        .command()
        .env("YUM_METADATA_CONFIG", fixture.config_path())
        .arg("merge")
        .arg("--group")
        .arg("public")
        .assert()
        .success();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_merge_default_config_in_working_directory() {
    let fixture = TestFixture::new().with_config(configs::EMPTY_GROUP);

    fixture
        .command()
        .arg("merge")
        .arg("--group")
        .arg("public")
        .assert()
        .success();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_missing_config_reports_hint() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("merge")
        .arg("--group")
        .arg("public")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("YUM_METADATA_CONFIG"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_invalid_config_is_rejected() {
    let fixture = TestFixture::new().with_config(configs::UNKNOWN_MEMBER);

    fixture
        .command_with_config("merge")
        .arg("--group")
        .arg("public")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown member 'missing'"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_generate_unknown_repository() {
    let fixture = TestFixture::new().with_config(configs::SINGLE_MEMBER_GROUP);

    fixture
        .command_with_config("generate")
        .arg("--repo")
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown repository: nope"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_clean_temp_removes_tool_dirs_without_user_env() {
    let user = yum_metadata::tempdirs::current_user();
    let leftover = format!("var-tmp/yum-{}-abc123/file", user);
    let fixture = TestFixture::new()
        .with_config(configs::SINGLE_MEMBER_GROUP)
        .with_file(&leftover, "x")
        .with_file("var-tmp/unrelated/file", "x");

    fixture
        .command_with_config("clean-temp")
        .env_remove("USER")
        .env_remove("USERNAME")
        .assert()
        .success()
        .stdout(predicate::str::contains("[CLEAN] Deleted 1 temp directory"));

    fixture
        .child(&format!("var-tmp/yum-{}-abc123", user))
        .assert(predicate::path::missing());
    fixture
        .child("var-tmp/unrelated")
        .assert(predicate::path::exists());
}

#[test]
fn test_merge_help() {
    let mut cmd = cargo_bin_cmd!("yum-metadata");
    cmd.arg("merge")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--group"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_merge_requires_group() {
    let mut cmd = cargo_bin_cmd!("yum-metadata");
    cmd.arg("merge").assert().failure().code(2);
}
