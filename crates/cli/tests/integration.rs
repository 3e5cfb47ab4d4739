//! Integration tests against a live Yandex Disk account
//!
//! These tests create and remove files under a scratch folder of the account
//! whose token is given.
//!
//! Run with:
//! ```bash
//! YDG_TEST_TOKEN=<oauth token> cargo test -p ydg-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Get the test token from the environment
fn test_token() -> Option<String> {
    std::env::var("YDG_TEST_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Run ydg with an isolated config directory and the test token
fn run_ydg(args: &[&str], config_dir: &Path, token: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ydg"))
        .args(args)
        .env("YDG_CONFIG_DIR", config_dir)
        .env("YDG_OAUTH_TOKEN", token)
        .output()
        .expect("Failed to execute ydg command")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON result")
}

/// Generate unique suffix for test resources
fn uuid_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFFFFFF)
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

struct Scratch {
    dir: TempDir,
    token: String,
    remote: String,
}

impl Scratch {
    fn new() -> Option<Self> {
        let token = test_token()?;
        Some(Self {
            dir: tempfile::tempdir().ok()?,
            token,
            remote: format!("disk:/ydg-test-{}", uuid_suffix()),
        })
    }

    fn run(&self, args: &[&str]) -> Output {
        run_ydg(args, self.dir.path(), &self.token)
    }

    fn remote(&self, name: &str) -> String {
        format!("{}-{name}", self.remote)
    }
}

mod transfers {
    use super::*;

    #[test]
    fn test_upload_list_download_round_trip() {
        let Some(scratch) = Scratch::new() else {
            eprintln!("Skipping: YDG_TEST_TOKEN not set");
            return;
        };

        let local = scratch.dir.path().join("round.bin");
        let data = payload(300_000);
        std::fs::write(&local, &data).unwrap();
        let remote = scratch.remote("round.bin");

        let output = scratch.run(&[
            "--json",
            "upload",
            local.to_str().unwrap(),
            &remote,
            "--chunk-size",
            "65536",
        ]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(json(&output)["data"]["bytes_transferred"], 300_000);

        let output = scratch.run(&["--json", "list", "disk:/", "--limit", "1000"]);
        assert!(output.status.success());
        let listing = json(&output);
        let names: Vec<_> = listing["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|item| item["path"].as_str())
            .collect();
        assert!(names.contains(&remote.as_str()));

        let back = scratch.dir.path().join("back.bin");
        let output = scratch.run(&["--json", "download", &remote, back.to_str().unwrap()]);
        assert!(output.status.success());
        assert_eq!(std::fs::read(&back).unwrap(), data);

        let _ = scratch.run(&["delete", &remote]);
    }

    #[test]
    fn test_resume_completes_partial_file() {
        let Some(scratch) = Scratch::new() else {
            eprintln!("Skipping: YDG_TEST_TOKEN not set");
            return;
        };

        let local = scratch.dir.path().join("resume.bin");
        let data = payload(200_000);
        std::fs::write(&local, &data).unwrap();
        let remote = scratch.remote("resume.bin");
        let output = scratch.run(&["upload", local.to_str().unwrap(), &remote]);
        assert!(output.status.success());

        let partial = scratch.dir.path().join("partial.bin");
        std::fs::write(&partial, &data[..50_000]).unwrap();
        let output = scratch.run(&[
            "--json",
            "download",
            &remote,
            partial.to_str().unwrap(),
            "--resume",
        ]);
        assert!(output.status.success());
        let report = json(&output);
        assert_eq!(report["data"]["start_offset"], 50_000);
        assert_eq!(report["data"]["bytes_transferred"], 150_000);
        assert_eq!(std::fs::read(&partial).unwrap(), data);

        let _ = scratch.run(&["delete", &remote]);
    }
}

mod management {
    use super::*;

    #[test]
    fn test_rename_then_delete() {
        let Some(scratch) = Scratch::new() else {
            eprintln!("Skipping: YDG_TEST_TOKEN not set");
            return;
        };

        let local = scratch.dir.path().join("name.txt");
        std::fs::write(&local, b"hello").unwrap();
        let remote = scratch.remote("name.txt");
        assert!(scratch
            .run(&["upload", local.to_str().unwrap(), &remote])
            .status
            .success());

        let renamed = scratch.remote("renamed.txt");
        let new_name = renamed.trim_start_matches("disk:/");
        let output = scratch.run(&["--json", "rename", &remote, new_name]);
        assert!(output.status.success());
        assert_eq!(json(&output)["data"]["to"], renamed.as_str());

        let output = scratch.run(&["--json", "delete", &renamed]);
        assert!(output.status.success());

        let output = scratch.run(&["--json", "delete", &renamed]);
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_bad_token_is_auth_error() {
        if test_token().is_none() {
            eprintln!("Skipping: YDG_TEST_TOKEN not set");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let output = run_ydg(&["--json", "list", "disk:/"], dir.path(), "AQAAAAAnotarealtoken");
        assert_eq!(output.status.code(), Some(4));
        assert_eq!(json(&output)["error"]["kind"], "auth");
    }
}
