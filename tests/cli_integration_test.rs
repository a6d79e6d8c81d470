//! Smoke tests for the `sourcelab` binary.

use assert_cmd::Command;
use sourcelab::config::{CONFIG_FILE_NAME, DEFAULT_CONFIG_TOML, SERVER_ENV_VAR};
use tempfile::TempDir;

fn sourcelab() -> Command {
    let mut cmd = Command::cargo_bin("sourcelab").unwrap();
    cmd.env_remove(SERVER_ENV_VAR).env_remove("SOURCELAB_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let output = sourcelab().arg("--help").output().unwrap();
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["tui", "lex", "parse", "upload", "health", "init"] {
        assert!(help.contains(subcommand), "missing {} in help", subcommand);
    }
}

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();

    sourcelab().current_dir(dir.path()).arg("init").assert().success();
    let written = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(written, DEFAULT_CONFIG_TOML);

    sourcelab()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure();

    sourcelab()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_blank_text_fails_before_any_request() {
    let output = sourcelab()
        .args(["lex", "--text", "   ", "--server", "http://127.0.0.1:9"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please enter some code"), "stderr: {}", stderr);
}

#[test]
fn test_unsupported_upload_is_rejected_locally() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("notes.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();

    let output = sourcelab()
        .args(["upload", pdf.to_str().unwrap(), "--server", "http://127.0.0.1:9"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported file type"), "stderr: {}", stderr);
}

#[test]
fn test_unreachable_server_is_reported() {
    let output = sourcelab()
        .args(["parse", "--text", "program p;", "--server", "http://127.0.0.1:9"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Analysis error"), "stderr: {}", stderr);
}
