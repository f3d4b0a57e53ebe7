//! Integration tests for the sume binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with HOME pointed at a scratch directory.
fn sume(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sume"));
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn languages_lists_targets() {
    let home = TempDir::new().unwrap();
    sume(&home)
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Afrikaans\n"))
        .stdout(predicate::str::contains("\nFrench\n"))
        .stdout(predicate::str::ends_with("Zulu\n"));
}

#[test]
fn short_text_prints_warning_and_exits_one() {
    let home = TempDir::new().unwrap();
    sume(&home)
        .args(["text", "short"])
        .assert()
        .code(1)
        .stdout("⚠️ Text must be at least 10 characters long\n");
}

#[test]
fn text_from_stdin_is_validated_too() {
    let home = TempDir::new().unwrap();
    sume(&home)
        .args(["text", "-"])
        .write_stdin("tiny")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("⚠️"));
}

#[test]
fn unsupported_file_is_rejected_before_any_backend() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("data.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();
    sume(&home)
        .arg("file")
        .arg(&path)
        .assert()
        .code(1)
        .stdout("⚠️ Unsupported file type: .csv\n");
}

#[test]
fn config_path_is_under_home() {
    let home = TempDir::new().unwrap();
    let expected = home.path().join(".config").join("sume").join("config.toml");
    sume(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn config_init_then_show_round_trips() {
    let home = TempDir::new().unwrap();
    sume(&home).args(["config", "init"]).assert().success();
    assert!(home.path().join(".config/sume/config.toml").exists());

    sume(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    sume(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[cache]"))
        .stdout(predicate::str::contains("max_words = 1000"));
}

#[test]
fn invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("bad.toml");
    std::fs::write(&path, "[model]\nbackend = \"codex\"\n").unwrap();
    sume(&home)
        .arg("--config")
        .arg(&path)
        .args(["text", "A sentence long enough to pass."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn batch_reports_each_line() {
    let home = TempDir::new().unwrap();
    sume(&home)
        .arg("batch")
        .write_stdin("# comment\ntext tiny\n!stats\n!clear\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("# [1] line 2"))
        .stdout(predicate::str::contains("⚠️ Text must be at least 10 characters long"))
        .stdout(predicate::str::contains("Cache size: 0 items"))
        .stdout(predicate::str::contains("Cache cleared successfully!"));
}

#[test]
fn completions_generate_for_bash() {
    let home = TempDir::new().unwrap();
    sume(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("media-file"));
}

#[test]
fn extend_and_focus_conflict() {
    let home = TempDir::new().unwrap();
    sume(&home)
        .args(["web", "example.com", "--extend", "--focus", "prices"])
        .assert()
        .failure();
}
