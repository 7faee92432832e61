// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the `cadence` binary against a temp config and database.
//!
//! None of these commands call the model, so no API key or network is
//! needed.

use std::path::PathBuf;
use std::process::{Command, Output};

struct Workspace {
    dir: tempfile::TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("cadence.db");
        let config = dir.path().join("cadence.toml");
        std::fs::write(
            &config,
            format!(
                "[agent]\nlog_level = \"warn\"\n\n[storage]\ndatabase_path = \"{}\"\n",
                db.display()
            ),
        )
        .expect("write config");
        Self { dir, config }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_cadence"))
            .arg("--config")
            .arg(&self.config)
            .arg("--plain")
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("OPENAI_API_KEY")
            .env_remove("RUST_LOG")
            .output()
            .expect("run cadence")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn config_check_reports_effective_settings() {
    let ws = Workspace::new();
    let out = ws.run(&["config", "check"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("configuration is valid"));
    assert!(text.contains("gpt-4o -> gpt-4o-mini"));
    assert!(text.contains("cadence.db"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let ws = Workspace::new();
    std::fs::write(&ws.config, "[retry]\nmax_retires = 3\n").unwrap();
    let out = ws.run(&["config", "check"]);
    assert!(!out.status.success());
}

#[test]
fn tone_preview_prints_instructions() {
    let ws = Workspace::new();
    let out = ws.run(&[
        "tone",
        "preview",
        "--formality",
        "0.9",
        "--instructions",
        "Mention the webinar.",
    ]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.trim_end().ends_with("Mention the webinar."));
    assert_eq!(text.trim_end().split("\n\n").count(), 4);
}

#[test]
fn tone_save_then_list() {
    let ws = Workspace::new();
    let out = ws.run(&["tone", "save", "crisp", "--directness", "0.9"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("Saved tone configuration crisp"));

    let out = ws.run(&["tone", "list", "--json"]);
    assert!(out.status.success());
    let configs: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(configs.as_array().unwrap().len(), 1);
    assert_eq!(configs[0]["name"], "crisp");
    assert_eq!(configs[0]["axes"]["directness"], 0.9);
}

#[test]
fn list_on_fresh_database_is_empty() {
    let ws = Workspace::new();
    let out = ws.run(&["list"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "No sequences.\n");
}

#[test]
fn show_unknown_sequence_fails() {
    let ws = Workspace::new();
    let out = ws.run(&["show", "does-not-exist"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does-not-exist"));
}

#[test]
fn generate_without_api_key_fails_before_any_sequence() {
    let ws = Workspace::new();
    let out = ws.run(&["generate", "known-demo-id", "--steps", "3"]);
    assert!(!out.status.success());

    let out = ws.run(&["list", "--json"]);
    let sequences: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(sequences.as_array().unwrap().is_empty());
}

#[test]
fn usage_rejects_malformed_date() {
    let ws = Workspace::new();
    let out = ws.run(&["usage", "--date", "yesterday"]);
    assert!(!out.status.success());

    let out = ws.run(&["usage", "--date", "2026-01-01"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("0 attempts"));
}

#[test]
fn config_show_masks_api_key() {
    let ws = Workspace::new();
    let mut content = std::fs::read_to_string(&ws.config).unwrap();
    content.push_str("\n[provider]\napi_key = \"sk-very-secret\"\n");
    std::fs::write(&ws.config, content).unwrap();

    let out = ws.run(&["config", "show"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(!text.contains("sk-very-secret"));
    assert!(text.contains("[provider]"));
    assert!(text.contains("model = \"gpt-4o\""));
}
