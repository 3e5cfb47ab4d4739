//! Offline checks of the ydg binary
//!
//! Every case here fails or finishes before the first network request, so
//! the suite runs without credentials or connectivity.

use std::path::Path;
use std::process::{Command, Output};

const TOKEN: &str = "AQAAAAAofflinetesttoken";

fn run_ydg(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ydg"))
        .args(args)
        .env("YDG_CONFIG_DIR", config_dir)
        .env_remove("YDG_OAUTH_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ydg")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn test_help_lists_actions() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ydg(&["--help"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for action in ["upload", "download", "rename", "delete", "list", "exec"] {
        assert!(stdout.contains(action), "help is missing {action}");
    }
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ydg(&[], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ydg(&["completions", "bash"], dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ydg"));
}

#[test]
fn test_missing_token_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ydg(&["--json", "list", "disk:/"], dir.path());

    assert_eq!(output.status.code(), Some(2));
    let result = json_stdout(&output);
    assert_eq!(result["ok"], false);
    assert_eq!(result["action"], "list");
    assert_eq!(result["error"]["kind"], "invalid_arguments");
}

#[test]
fn test_short_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ydg(&["--json", "--token", "abc", "list", "disk:/"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(json_stdout(&output)["error"]["kind"], "invalid_arguments");
}

#[test]
fn test_missing_local_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    let output = run_ydg(
        &[
            "--json",
            "--token",
            TOKEN,
            "upload",
            missing.to_str().unwrap(),
            "disk:/nope.txt",
        ],
        dir.path(),
    );

    assert_eq!(output.status.code(), Some(5));
    assert_eq!(json_stdout(&output)["error"]["kind"], "not_found");
}

#[test]
fn test_existing_destination_is_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("song.mp3");
    std::fs::write(&local, b"partial").unwrap();

    let output = run_ydg(
        &[
            "--json",
            "--token",
            TOKEN,
            "download",
            "disk:/Music/song.mp3",
            local.to_str().unwrap(),
        ],
        dir.path(),
    );

    assert_eq!(output.status.code(), Some(6));
    assert_eq!(json_stdout(&output)["error"]["kind"], "conflict");
    assert_eq!(std::fs::read(&local).unwrap(), b"partial");
}

#[test]
fn test_delete_root_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ydg(&["--token", TOKEN, "delete", "disk:/"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("root"));
}

#[test]
fn test_exec_rejects_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_ydg(
        &["exec", r#"{"action": "list", "recursive": true}"#],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed request"));
}

#[test]
fn test_exec_prints_structured_result() {
    let dir = tempfile::tempdir().unwrap();
    let request = serde_json::json!({
        "action": "rename",
        "oauth_token": TOKEN,
        "disk_path": "disk:/",
        "new_name": "root"
    })
    .to_string();
    let output = run_ydg(&["exec", &request], dir.path());

    assert_eq!(output.status.code(), Some(2));
    let result = json_stdout(&output);
    assert_eq!(result["action"], "rename");
    assert_eq!(result["error"]["kind"], "invalid_arguments");
}

#[test]
fn test_newer_config_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "schema_version = 99\n").unwrap();

    let output = run_ydg(&["--token", TOKEN, "list"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("newer"));
}
