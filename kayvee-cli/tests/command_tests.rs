//! Integration tests for `kayvee validate` and `kayvee route`.
//!
//! Exercises the command handlers against real files on disk.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use kayvee_cli::cli::{OutputFormat, ValidateArgs};
use kayvee_cli::commands::{route, validate};
use kayvee_cli::output::OutputWriter;
use kayvee_core::config::{KayveeConfig, ServiceIdentity};
use kayvee_router::Router;

const VALID_CONFIG: &str = r##"
routes:
  slow-requests:
    matchers:
      title: ["request-finished"]
      slow: [true]
    output:
      type: "metrics"
      series: "http.slow"
      dimensions: ["%{path}"]
  deploys:
    matchers:
      title: ["deploy"]
    output:
      type: "notifications"
      channel: "#deploys"
      icon: ":ship:"
      message: "%{app} deployed"
      user: "kayvee"
"##;

fn write_config(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("should write config");
    path
}

#[tokio::test]
async fn test_validate_reports_rules_for_valid_config() {
    // Given: a valid routing config
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&dir, "kvconfig.yml", VALID_CONFIG);

    // When: validating it
    let report = validate::build_report(&path).await;

    // Then: every rule is listed in document order
    assert!(report.valid, "valid config should pass: {:?}", report.errors);
    let names: Vec<&str> = report.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["slow-requests", "deploys"]);
    assert_eq!(report.rules[0].kind.as_deref(), Some("metrics"));
    assert_eq!(report.rules[0].matchers, 2);
}

#[tokio::test]
async fn test_validate_collects_every_error() {
    // Given: a config with problems in two rules
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_config(
        &dir,
        "bad.yml",
        r#"
routes:
  one:
    matchers:
      title: ["dup", "dup"]
    output:
      type: "analytics"
      series: "s"
  two:
    matchers: {}
    output:
      type: "alerts"
      series: "s"
      dimensions: "not-a-list"
      stat_type: "gauge"
"#,
    );

    // When: validating it
    let report = validate::build_report(&path).await;

    // Then: both rule errors are reported with rule-name prefixes
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("one."));
    assert!(report.errors[1].starts_with("two."));
}

#[tokio::test]
async fn test_validate_missing_file() {
    let report = validate::build_report(std::path::Path::new("/nonexistent/kvconfig.yml")).await;
    assert!(!report.valid);
    assert!(report.errors[0].contains("/nonexistent/kvconfig.yml"));
}

#[tokio::test]
async fn test_validate_missing_file_exits_with_io_code() {
    // Given: a routing config path that does not exist
    let args = ValidateArgs {
        path: Some("/nonexistent/kvconfig.yml".into()),
    };

    // When: running the validate command
    let config = KayveeConfig::default();
    let writer = OutputWriter::new(OutputFormat::Json);
    let err = validate::execute(args, &config, &writer)
        .await
        .expect_err("missing file should fail");

    // Then: it is reported as an IO failure, not a configuration failure
    assert_eq!(err.exit_code(), 10, "unexpected error: {err}");
    assert!(err.to_string().contains("/nonexistent/kvconfig.yml"));
}

#[tokio::test]
async fn test_validate_invalid_config_exits_with_config_code() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&dir, "bad.yml", "routes:\n  r:\n    matchers: {}\n");

    let args = ValidateArgs { path: Some(path) };
    let config = KayveeConfig::default();
    let writer = OutputWriter::new(OutputFormat::Json);
    let err = validate::execute(args, &config, &writer)
        .await
        .expect_err("invalid config should fail");

    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_validate_report_serializes_type_field() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&dir, "kvconfig.yml", VALID_CONFIG);

    let report = validate::build_report(&path).await;
    let value = serde_json::to_value(&report).expect("report should serialize");

    assert_eq!(value["valid"], json!(true));
    assert_eq!(value["rules"][1]["type"], json!("notifications"));
}

#[tokio::test]
async fn test_route_records_from_file_config() {
    // Given: a router loaded from disk
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&dir, "kvconfig.yml", VALID_CONFIG);
    let router = Router::with_identity(ServiceIdentity::new("platform", "kayvee"));
    router
        .load_config_file(&path)
        .await
        .expect("config should load");

    // When: routing newline-delimited records
    let records = route::parse_records(
        "{\"title\": \"request-finished\", \"slow\": true, \"path\": \"/api\"}\n\
         {\"title\": \"request-finished\", \"slow\": false}\n\
         {\"title\": \"deploy\", \"app\": \"billing\"}\n",
    )
    .expect("records should parse");
    let report = route::route_records(&router, records);

    // Then: each record gets its own result
    assert_eq!(report.records, 3);
    assert_eq!(report.matched, 2);
    assert_eq!(report.results[0].routes[0]["dimensions"], json!(["/api"]));
    assert!(report.results[1].is_empty());
    assert_eq!(report.results[2].routes[0]["message"], json!("billing deployed"));
    assert_eq!(report.results[2].app, "kayvee");
}
