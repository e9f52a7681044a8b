//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get the binary to test, isolated from credentials in the caller's environment.
fn linear_report() -> Command {
    let mut cmd = Command::cargo_bin("linear-report").unwrap();
    cmd.env_remove("LINEAR_API_KEY")
        .env_remove("SPREADSHEET_ID")
        .env_remove("GOOGLE_SHEETS_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    linear_report()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily Linear progress report"));
}

#[test]
fn test_help_lists_subcommands() {
    linear_report()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("secrets"));
}

#[test]
fn test_version_flag() {
    linear_report()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_preview_help() {
    linear_report()
        .args(["preview", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_preview_rejects_unknown_format() {
    linear_report()
        .args(["preview", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'yaml'"))
        .stderr(predicate::str::contains("json"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    linear_report()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linear-report"));
}

#[test]
fn test_completions_invalid_shell() {
    linear_report().args(["completions", "tcsh"]).assert().failure();
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_path_with_explicit_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("report.toml");
    config.write_str("[report]\nrecent_done_days = 7\n").unwrap();

    linear_report()
        .current_dir(temp.path())
        .args(["--config", config.path().to_str().unwrap(), "config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.toml"));
}

#[test]
fn test_config_shows_values_and_masks_secrets() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("report.toml");
    config
        .write_str(
            r#"
[linear]
api_key = "lin_api_super_secret"

[report]
recent_done_days = 7
"#,
        )
        .unwrap();

    linear_report()
        .current_dir(temp.path())
        .args(["--config", config.path().to_str().unwrap(), "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recent_done_days = 7"))
        .stdout(predicate::str::contains("エピック"))
        .stdout(predicate::str::contains("[REDACTED]"))
        .stdout(predicate::str::contains("lin_api_super_secret").not());
}

#[test]
fn test_config_parse_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("broken.toml");
    config.write_str("[report\nrecent_done_days = ").unwrap();

    linear_report()
        .current_dir(temp.path())
        .args(["--config", config.path().to_str().unwrap(), "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

// ============================================================================
// Run Command Tests
// ============================================================================

#[test]
fn test_run_without_api_key_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("report.toml");
    config.write_str("[report]\nrecent_done_days = 14\n").unwrap();

    linear_report()
        .current_dir(temp.path())
        .args(["--config", config.path().to_str().unwrap(), "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("linear_api_key"))
        .stderr(predicate::str::contains("LINEAR_API_KEY"));
}

#[test]
fn test_run_without_destination_fails_before_fetch() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("report.toml");
    // An unreachable endpoint: reaching it would surface a fetch error instead
    config.write_str("[linear]\napi_url = \"http://127.0.0.1:9/graphql\"\n").unwrap();

    linear_report()
        .current_dir(temp.path())
        .env("LINEAR_API_KEY", "lin_api_test")
        .args(["--config", config.path().to_str().unwrap(), "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("spreadsheet_id"))
        .stderr(predicate::str::contains("Failed to fetch issues").not());
}

#[test]
fn test_dry_run_reports_transport_failure() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("report.toml");
    config.write_str("[linear]\napi_url = \"http://127.0.0.1:9/graphql\"\n").unwrap();

    linear_report()
        .current_dir(temp.path())
        .env("LINEAR_API_KEY", "lin_api_test")
        .args(["--config", config.path().to_str().unwrap(), "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch issues"));
}

#[test]
fn test_invalid_fetch_limit_rejected() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("report.toml");
    config.write_str("[linear]\nfetch_limit = 0\n").unwrap();

    linear_report()
        .current_dir(temp.path())
        .env("LINEAR_API_KEY", "lin_api_test")
        .args(["--config", config.path().to_str().unwrap(), "preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

// ============================================================================
// Secrets Command Tests
// ============================================================================

#[test]
fn test_secrets_unknown_credential() {
    linear_report()
        .args(["secrets", "set", "github_token", "--value", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("github_token"));
}

#[test]
fn test_secrets_status_reports_environment() {
    linear_report()
        .env("LINEAR_API_KEY", "lin_api_test")
        .args(["secrets", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("environment (LINEAR_API_KEY)"))
        .stdout(predicate::str::contains("lin_api_test").not());
}
