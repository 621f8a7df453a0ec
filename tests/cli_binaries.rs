use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_usage() {
    let mut command = Command::cargo_bin("snapvault").unwrap();
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("snapvault"));
}

#[test]
fn without_a_subcommand_shows_usage() {
    let mut command = Command::cargo_bin("snapvault").unwrap();
    command
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn backup_rejects_unknown_digest() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();

    let mut command = Command::cargo_bin("snapvault").unwrap();
    command.args([
        "backup",
        "-d",
        src.to_str().unwrap(),
        "-o",
        root.path().join("out").to_str().unwrap(),
        "--digest",
        "not-a-real-digest",
    ]);
    command
        .assert()
        .failure()
        .stderr(predicate::str::contains("digest"));
}

#[test]
fn backup_end_to_end_writes_compressed_artifacts_and_manifest() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();
    fs::write(src.join("b.txt"), b"world").unwrap();
    let output = root.path().join("out");

    let mut command = Command::cargo_bin("snapvault").unwrap();
    command.args([
        "backup",
        "-d",
        src.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--digest",
        "sha1",
        "--compressor",
        "gzip",
    ]);
    command.assert().success();

    assert!(output.join("files/src/a.txt").exists());
    assert!(output.join("files/src/b.txt").exists());
    assert!(output.join("checksums.txt").exists());

    let manifest = fs::read(output.join("checksums.txt")).unwrap();
    assert!(manifest.windows(b"src/a.txt".len()).any(|w| w == b"src/a.txt"));
    assert!(manifest.windows(b"src/b.txt".len()).any(|w| w == b"src/b.txt"));
}

#[test]
fn config_init_then_show_round_trips_as_json() {
    let root = tempfile::tempdir().unwrap();
    let src = root.path().join("src");
    fs::create_dir_all(&src).unwrap();
    let config_path = root.path().join("snapvault.json");

    let mut init = Command::cargo_bin("snapvault").unwrap();
    init.args([
        "config",
        "init",
        "-d",
        src.to_str().unwrap(),
        "-o",
        root.path().join("out").to_str().unwrap(),
        "--save-config",
        config_path.to_str().unwrap(),
    ]);
    init.assert().success();
    assert!(config_path.exists());

    let mut show = Command::cargo_bin("snapvault").unwrap();
    show.args(["config", "show", config_path.to_str().unwrap()]);
    show.assert()
        .success()
        .stdout(predicate::str::contains("directories"));
}
