//! CLI integration tests.
//!
//! Each test gets its own config directory and its own emulated GitHub host,
//! so tests can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

mod common;

use assert_cmd::Command;
use common::{MockHost, TEST_LOGIN, TEST_TOKEN};
use predicates::prelude::*;
use promptshelf::config::DEFAULT_REPO_NAME;
use promptshelf::types::METADATA_PATH;
use serde_json::Value;
use tempfile::TempDir;

struct TestContext {
    temp_dir: TempDir,
    host: MockHost,
}

impl TestContext {
    fn new() -> Self {
        Self::with_host(MockHost::with_repo(DEFAULT_REPO_NAME))
    }

    fn with_host(host: MockHost) -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
            host,
        }
    }

    /// Command with an isolated config dir; no token in the environment.
    fn bare_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("promptshelf").expect("failed to find binary");
        cmd.env("NO_COLOR", "1")
            .env("HOME", self.temp_dir.path())
            .env("XDG_CONFIG_HOME", self.temp_dir.path().join("config"))
            .env("PROMPTSHELF_API_URL", &self.host.base_url)
            .env_remove("PROMPTSHELF_TOKEN")
            .env_remove("PROMPTSHELF_REPO")
            .env_remove("RUST_LOG");
        cmd
    }

    fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.env("PROMPTSHELF_TOKEN", TEST_TOKEN);
        cmd
    }

    fn add(&self, title: &str, content: &str, extra: &[&str]) {
        self.cmd()
            .args(["add", "--non-interactive", "--title", title, "--content", content])
            .args(extra)
            .assert()
            .success();
    }

    fn list_json(&self, extra: &[&str]) -> Vec<Value> {
        let output = self
            .cmd()
            .args(["list", "--json"])
            .args(extra)
            .output()
            .expect("run list");
        assert!(output.status.success(), "list failed: {output:?}");
        serde_json::from_slice(&output.stdout).expect("list output is JSON")
    }

    fn only_id(&self) -> String {
        let prompts = self.list_json(&[]);
        assert_eq!(prompts.len(), 1);
        prompts[0]["id"].as_str().expect("id").to_string()
    }
}

#[test]
fn test_models_lists_every_provider() {
    let ctx = TestContext::new();
    ctx.bare_cmd()
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("openai"))
        .stdout(predicate::str::contains("gpt-4o-mini"))
        .stdout(predicate::str::contains("mistral"));
}

#[test]
fn test_models_json_for_one_provider() {
    let ctx = TestContext::new();
    let output = ctx
        .bare_cmd()
        .args(["models", "--provider", "anthropic", "--json"])
        .output()
        .expect("run models");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json[0]["provider"], "anthropic");
    assert_eq!(json[0]["models"][0], "claude-3-5-sonnet-latest");
}

#[test]
fn test_init_creates_repo_once() {
    let ctx = TestContext::with_host(MockHost::spawn());

    ctx.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Created prompt library {TEST_LOGIN}/{DEFAULT_REPO_NAME}"
        )));
    assert!(ctx.host.has_repo(DEFAULT_REPO_NAME));

    ctx.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_missing_library_points_at_init() {
    let ctx = TestContext::with_host(MockHost::spawn());
    let hint = format!("Prompt library {TEST_LOGIN}/{DEFAULT_REPO_NAME} does not exist");

    ctx.cmd()
        .arg("list")
        .assert()
        .failure()
        .stdout(predicate::str::contains("No prompts found").not())
        .stderr(predicate::str::contains(hint.clone()))
        .stderr(predicate::str::contains("promptshelf init"));

    ctx.cmd()
        .args(["add", "--non-interactive", "--title", "X", "--content", "y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(hint));
    assert!(ctx.host.commits().is_empty());
    assert!(!ctx.host.has_repo(DEFAULT_REPO_NAME));
}

#[test]
fn test_auth_login_status_logout() {
    let ctx = TestContext::new();

    ctx.bare_cmd()
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));

    ctx.bare_cmd()
        .args(["auth", "login", "--non-interactive", "--token", TEST_TOKEN])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Logged in as {TEST_LOGIN}")));

    ctx.bare_cmd()
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Logged in as {TEST_LOGIN}")));

    // Stored credentials are enough for library commands.
    ctx.bare_cmd().arg("list").assert().success();

    ctx.bare_cmd()
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    ctx.bare_cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_auth_login_rejects_bad_token() {
    let ctx = TestContext::new();
    ctx.bare_cmd()
        .args(["auth", "login", "--non-interactive", "--token", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bad credentials"));
}

#[test]
fn test_add_then_show() {
    let ctx = TestContext::new();
    ctx.add(
        "Summarize",
        "Summarize the text below in three bullets.",
        &["--tag", "writing", "--provider", "anthropic", "--description", "Short summaries"],
    );

    let id = ctx.only_id();
    let prompts = ctx.list_json(&[]);
    assert_eq!(prompts[0]["title"], "Summarize");
    assert_eq!(prompts[0]["provider"], "anthropic");
    assert_eq!(prompts[0]["model"], "claude-3-5-sonnet-latest");
    assert_eq!(prompts[0]["tags"][0], "writing");

    ctx.cmd()
        .args(["show", &id[id.len() - 8..]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summarize the text below in three bullets."))
        .stdout(predicate::str::contains("anthropic/claude-3-5-sonnet-latest"));

    let files = ctx.host.files(DEFAULT_REPO_NAME);
    assert!(files.contains_key(METADATA_PATH));
    assert!(files.keys().any(|p| p.starts_with("prompts/summarize-")));
}

#[test]
fn test_add_reads_content_from_stdin() {
    let ctx = TestContext::new();
    ctx.cmd()
        .args(["add", "--non-interactive", "--title", "Piped", "--content-file", "-"])
        .write_stdin("Body from stdin\n")
        .assert()
        .success();

    let id = ctx.only_id();
    let output = ctx.cmd().args(["show", &id, "--json"]).output().expect("run show");
    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["content"], "Body from stdin\n");
}

#[test]
fn test_add_rejects_unknown_model() {
    let ctx = TestContext::new();
    ctx.cmd()
        .args([
            "add",
            "--non-interactive",
            "--title",
            "X",
            "--content",
            "y",
            "--provider",
            "google",
            "--model",
            "gpt-4o",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown model 'gpt-4o' for google"));
    assert!(ctx.host.commits().is_empty());
}

#[test]
fn test_add_requires_title_non_interactive() {
    let ctx = TestContext::new();
    ctx.cmd()
        .args(["add", "--non-interactive", "--content", "body"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Title is required"));
    assert!(ctx.host.commits().is_empty());
}

#[test]
fn test_list_filters_and_sorts() {
    let ctx = TestContext::new();
    ctx.add("Beta", "b", &["--tag", "work"]);
    ctx.add("alpha", "a", &["--tag", "home", "--provider", "mistral"]);
    ctx.add("Gamma", "g", &["--tag", "work"]);

    let titles = |prompts: Vec<Value>| -> Vec<String> {
        prompts
            .iter()
            .map(|p| p["title"].as_str().expect("title").to_string())
            .collect()
    };

    assert_eq!(
        titles(ctx.list_json(&["--sort", "title", "--asc"])),
        vec!["alpha", "Beta", "Gamma"]
    );
    assert_eq!(
        titles(ctx.list_json(&["--tag", "work", "--sort", "title", "--desc"])),
        vec!["Gamma", "Beta"]
    );
    assert_eq!(titles(ctx.list_json(&["--provider", "mistral"])), vec!["alpha"]);
    assert_eq!(titles(ctx.list_json(&["--search", "GAM"])), vec!["Gamma"]);

    ctx.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tags: work (2), home (1)"))
        .stdout(predicate::str::contains("Providers: openai (2), mistral (1)"));
}

#[test]
fn test_edit_renames_and_retags() {
    let ctx = TestContext::new();
    ctx.add("Summarize", "v1", &["--tag", "old"]);
    let id = ctx.only_id();

    ctx.cmd()
        .args([
            "edit",
            &id,
            "--non-interactive",
            "--title",
            "Condense",
            "--clear-tags",
            "--tag",
            "new",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 'Condense'"));

    let prompts = ctx.list_json(&[]);
    assert_eq!(prompts[0]["title"], "Condense");
    assert_eq!(prompts[0]["tags"], serde_json::json!(["new"]));
    assert_eq!(prompts[0]["content"], "v1");

    let files = ctx.host.files(DEFAULT_REPO_NAME);
    assert!(files.keys().any(|p| p.starts_with("prompts/condense-")));
    assert!(!files.keys().any(|p| p.starts_with("prompts/summarize-")));
}

#[test]
fn test_edit_needs_body_when_content_unreadable() {
    let ctx = TestContext::new();
    ctx.add("Summarize", "v1", &[]);
    let prompts = ctx.list_json(&[]);
    let id = prompts[0]["id"].as_str().expect("id").to_string();
    let filename = prompts[0]["filename"].as_str().expect("filename").to_string();
    ctx.host
        .remove_file(DEFAULT_REPO_NAME, &format!("prompts/{filename}"));

    ctx.cmd()
        .args(["edit", &id, "--non-interactive", "--description", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be read"));

    ctx.cmd()
        .args(["edit", &id, "--non-interactive", "--content", "restored"])
        .assert()
        .success();
    assert_eq!(ctx.list_json(&[])[0]["content"], "restored");
}

#[test]
fn test_rm_requires_yes_non_interactive() {
    let ctx = TestContext::new();
    ctx.add("Summarize", "v1", &[]);
    let id = ctx.only_id();

    ctx.cmd()
        .args(["rm", &id, "--non-interactive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes is required"));
    assert_eq!(ctx.list_json(&[]).len(), 1);

    ctx.cmd()
        .args(["rm", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 'Summarize'"));
    assert!(ctx.list_json(&[]).is_empty());
}

#[test]
fn test_unknown_id_fails() {
    let ctx = TestContext::new();
    ctx.cmd()
        .args(["show", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Prompt not found"));
}

#[test]
fn test_remote_error_is_shown_verbatim() {
    let ctx = TestContext::new();
    ctx.host.fail_next_write(500, "Server Error: try again later");
    ctx.cmd()
        .args(["add", "--non-interactive", "--title", "X", "--content", "y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server Error: try again later"));
}

#[test]
fn test_invalid_repo_name_is_rejected() {
    let ctx = TestContext::new();
    ctx.cmd()
        .args(["--repo", "bad/name", "list"])
        .assert()
        .failure();
}

#[test]
fn test_config_persists_settings() {
    let ctx = TestContext::new();
    ctx.bare_cmd()
        .args(["--repo", "my-prompts", "config", "--save", "--branch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    let path = ctx.temp_dir.path().join("config/promptshelf/config.toml");
    let saved = std::fs::read_to_string(&path).expect("config file written");
    assert!(saved.contains("repo_name = \"my-prompts\""));
    assert!(saved.contains("branch = \"main\""));

    ctx.bare_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("repo_name    = my-prompts"))
        .stdout(predicate::str::contains("branch       = main"));
}
