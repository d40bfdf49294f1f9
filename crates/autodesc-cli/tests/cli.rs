// SPDX-License-Identifier: Apache-2.0

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's config and credentials.
fn autodesc(config_home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("autodesc");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("GITHUB_TOKEN")
        .env_remove("OPENAI_API_KEY")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    autodesc(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("autodesc"));
}

#[test]
fn test_help_contains_all_commands() {
    let home = TempDir::new().unwrap();
    autodesc(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn test_models_json_output() {
    let home = TempDir::new().unwrap();
    let output = autodesc(&home)
        .args(["models", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 4);
    assert_eq!(models[0]["id"], "gpt-3.5-turbo");
    assert_eq!(json["max_response_tokens"], 500);
}

#[test]
fn test_models_yaml_output() {
    let home = TempDir::new().unwrap();
    autodesc(&home)
        .args(["models", "--output", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-4-32k"));
}

#[test]
fn test_models_reads_config_file() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.toml");
    std::fs::write(
        &path,
        "[ai]\nmax_response_tokens = 700\n\n[ai.models]\n\"gpt-4o\" = 128000\n",
    )
    .unwrap();

    let output = autodesc(&home)
        .args(["models", "--output", "json", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["models"][0]["id"], "gpt-4o");
    assert_eq!(json["max_response_tokens"], 700);
}

#[test]
fn test_missing_config_file_fails() {
    let home = TempDir::new().unwrap();
    autodesc(&home)
        .args(["models", "--config"])
        .arg(home.path().join("absent.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_describe_without_token_fails() {
    let home = TempDir::new().unwrap();
    autodesc(&home)
        .args(["describe", "--repo", "octocat/hello", "--pr", "7"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn test_describe_rejects_bad_repo() {
    let home = TempDir::new().unwrap();
    autodesc(&home)
        .args(["describe", "--repo", "not-a-repo", "--pr", "7"])
        .env("GITHUB_TOKEN", "ghp_test")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("owner/repo"));
}

#[test]
fn test_describe_requires_pr() {
    let home = TempDir::new().unwrap();
    autodesc(&home)
        .args(["describe", "--repo", "octocat/hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--pr"));
}
