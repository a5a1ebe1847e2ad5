//! CLI integration tests

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the CLI with its history kept under `home`
fn dockwise(home: &Path, args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "dockwise-cli", "--"])
        .args(args)
        .env("DOCKWISE_DATA_DIR", home.join("data"))
        .env_remove("DOCKWISE_API_URL")
        .env_remove("DOCKWISE_SNAPSHOT")
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = dockwise(home.path(), &["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Container resource advisor"), "Should show about");
    for command in ["analyze", "recommendations", "resources", "templates", "history"] {
        assert!(stdout.contains(command), "Should show {command} command");
    }
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("DOCKWISE_API_URL"), "Should show env var");
    assert!(stdout.contains("--snapshot"), "Should show snapshot option");
    assert!(stdout.contains("--format"), "Should show format option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = dockwise(home.path(), &["--version"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("dockwise"), "Should show binary name");
}

/// Test recommendations subcommand help
#[test]
fn test_recommendations_help() {
    let home = TempDir::new().unwrap();
    let output = dockwise(home.path(), &["recommendations", "--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--priority"), "Should show priority option");
    assert!(stdout.contains("--type"), "Should show type option");
}

/// Demo analysis runs locally without an agent
#[test]
fn test_analyze_demo_json() {
    let home = TempDir::new().unwrap();
    let output = dockwise(home.path(), &["--format", "json", "analyze"]);

    let result = stdout_json(&output);
    assert_eq!(result["analysis"]["container_analysis"]["total_containers"], 4);
    assert_eq!(result["analysis"]["container_analysis"]["running_containers"], 3);
    assert!(!result["recommendations"].as_array().unwrap().is_empty());
    assert!(result.get("provider_error").is_none());
}

/// Each local analysis is recorded and visible to later runs
#[test]
fn test_history_after_analysis() {
    let home = TempDir::new().unwrap();
    dockwise(home.path(), &["--format", "json", "analyze"]);
    dockwise(home.path(), &["--format", "json", "resources"]);

    let output = dockwise(home.path(), &["--format", "json", "history", "--limit", "1"]);

    let history = stdout_json(&output);
    assert_eq!(history["containers"].as_array().unwrap().len(), 1);
    assert_eq!(history["system_metrics"].as_array().unwrap().len(), 1);
    assert_eq!(history["trend"]["metric_samples"], 1);
    assert!(home.path().join("data").join("system_metrics.json").exists());
}

/// Snapshot files are analyzed in place of the demo data
#[test]
fn test_snapshot_templates() {
    let home = TempDir::new().unwrap();
    let snapshot = home.path().join("snapshot.json");
    std::fs::write(
        &snapshot,
        r#"{
            "containers": [
                {"id": "1", "name": "db", "image": "mysql:8", "status": "running",
                 "memory_usage": 512.0, "cpu_usage": 4.0, "restart_count": 0}
            ],
            "host": {"cpu_usage": 25.0, "memory_usage": 35.0, "disk_usage": 40.0, "total_memory": 8192.0}
        }"#,
    )
    .unwrap();

    let output = dockwise(
        home.path(),
        &[
            "--snapshot",
            snapshot.to_str().unwrap(),
            "--format",
            "json",
            "templates",
            "--matched",
        ],
    );

    let matched = stdout_json(&output);
    let matched = matched.as_array().unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["template_id"], "database");
}

/// A missing snapshot degrades to an empty analysis instead of failing
#[test]
fn test_missing_snapshot_is_reported() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("nope.json");

    let output = dockwise(
        home.path(),
        &["--snapshot", missing.to_str().unwrap(), "--format", "json", "analyze"],
    );

    let result = stdout_json(&output);
    assert_eq!(result["analysis"]["container_analysis"]["status"], "no_containers");
    assert!(result["provider_error"].is_string());
}

/// Test filter validation
#[test]
fn test_invalid_priority() {
    let home = TempDir::new().unwrap();
    let output = dockwise(home.path(), &["recommendations", "--priority", "urgent"]);

    assert!(!output.status.success(), "Invalid priority should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("urgent"), "Should echo the bad value");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let home = TempDir::new().unwrap();
    let output = dockwise(home.path(), &["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}
