//! The `sbt-extract` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use sbt_extract::test_utils::ProjectFixture;

fn sbt_extract(project: &ProjectFixture) -> Command {
    let mut cmd = Command::cargo_bin("sbt-extract").unwrap();
    cmd.current_dir(project.path())
        .env("SBT_EXTRACT_CONFIG", project.path().join("no-user-config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_extract_text_output() {
    let project = ProjectFixture::multi_module().unwrap();
    sbt_extract(&project)
        .arg("extract")
        .assert()
        .success()
        .stdout(predicate::str::contains("core/build.sbt"))
        .stdout(predicate::str::contains("org.scalatest:scalatest_2.13 3.2.17 [sbt-package] Test"))
        .stdout(predicate::str::contains("sbt/sbt 1.9.7 [github-releases]"));
}

#[test]
fn test_extract_json_output() {
    let project = ProjectFixture::multi_module().unwrap();
    let output = sbt_extract(&project).args(["extract", "--format", "json"]).assert().success();

    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    let files = json.as_array().unwrap();
    assert_eq!(files.len(), 6);
    assert_eq!(files[0]["packageFile"], "api/build.sbt");
    assert_eq!(files[0]["deps"][0]["packageName"], "org.http4s:http4s-dsl_2.13");
    assert_eq!(files[0]["deps"][0]["variableName"], "http4sVersion");
}

#[test]
fn test_extract_explicit_path() {
    let project = ProjectFixture::new().unwrap().with_file("app/build.sbt", r#"libraryDependencies += "g" % "a" % "1""#).unwrap();
    sbt_extract(&project)
        .args(["extract", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build.sbt"))
        .stdout(predicate::str::contains("g:a 1"));
}

#[test]
fn test_extract_nothing_found() {
    let project = ProjectFixture::new().unwrap().with_file("build.sbt", "name := \"empty\"\n").unwrap();
    sbt_extract(&project).arg("extract").assert().success().stdout(predicate::str::contains("No dependencies found"));

    sbt_extract(&project)
        .args(["extract", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));
}

#[test]
fn test_files_command() {
    let project = ProjectFixture::multi_module().unwrap().with_file("target/ignored.sbt", "").unwrap();
    sbt_extract(&project).arg("files").assert().success().stdout(predicate::str::diff(
        "api/build.sbt\nbuild.sbt\ncore/build.sbt\nproject/Versions.scala\nproject/build.properties\nproject/plugins.sbt\n",
    ));
}

#[test]
fn test_files_respects_project_config() {
    let project = ProjectFixture::multi_module()
        .unwrap()
        .with_file("sbt-extract.toml", "[discovery]\ninclude = [\"**/*.sbt\"]\n")
        .unwrap();
    sbt_extract(&project)
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::diff("api/build.sbt\nbuild.sbt\ncore/build.sbt\nproject/plugins.sbt\n"));
}

#[test]
fn test_missing_directory_fails() {
    let project = ProjectFixture::new().unwrap();
    sbt_extract(&project)
        .args(["extract", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project directory not found"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let project = ProjectFixture::multi_module().unwrap();
    sbt_extract(&project)
        .args(["extract", "--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_invalid_config_fails() {
    let project = ProjectFixture::multi_module().unwrap().with_file("sbt-extract.toml", "max_concurrent_reads = \"many\"\n").unwrap();
    sbt_extract(&project).arg("extract").assert().failure().stderr(predicate::str::contains("sbt-extract.toml"));
}
