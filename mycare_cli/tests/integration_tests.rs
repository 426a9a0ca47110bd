//! Integration tests for the mycare binary.
//!
//! These tests verify end-to-end behavior including:
//! - Logging, ending, listing and deleting cycles
//! - Statistics and predictions from the store and from raw JSON records
//! - CSV import and export
//! - Config-driven fallback policy

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mycare"))
}

fn log_cycle(data_dir: &Path, start: &str, end: Option<&str>) -> String {
    let mut cmd = cli();
    cmd.arg("log")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--start")
        .arg(start);
    if let Some(end) = end {
        cmd.arg("--end").arg(end);
    }

    let output = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&output);
    stdout
        .trim()
        .rsplit(' ')
        .next()
        .expect("Expected cycle id in output")
        .to_string()
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("Expected JSON on stdout")
}

fn log_regular_history(data_dir: &Path) {
    log_cycle(data_dir, "2024-01-01", Some("2024-01-05"));
    log_cycle(data_dir, "2024-01-29", Some("2024-02-02"));
    log_cycle(data_dir, "2024-02-26", Some("2024-03-01"));
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Menstrual cycle statistics and period prediction",
        ));
}

#[test]
fn test_log_creates_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("log")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--start")
        .arg("2024-01-01")
        .arg("--end")
        .arg("2024-01-05")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle logged"));

    let store = fs::read_to_string(data_dir.join("cycles.json")).expect("Failed to read store");
    assert!(store.contains("2024-01-01"));
    assert!(store.contains("\"flow_level\": \"medium\""));
}

#[test]
fn test_log_rejects_bad_dates() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("log")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--start")
        .arg("01/02/2024")
        .assert()
        .failure();

    cli()
        .arg("log")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--start")
        .arg("2024-01-10")
        .arg("--end")
        .arg("2024-01-02")
        .assert()
        .failure();

    assert!(!data_dir.join("cycles.json").exists());
}

#[test]
fn test_log_rejects_years_beyond_four_digits() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("log")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--start")
        .arg("+262142-12-20")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidDate"));

    assert!(!data_dir.join("cycles.json").exists());
}

#[test]
fn test_predict_rejects_far_future_record() {
    let temp_dir = setup_test_dir();
    let records_path = temp_dir.path().join("records.json");
    fs::write(&records_path, r#"[{"start_date": "+262142-12-20"}]"#).unwrap();

    cli()
        .arg("predict")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--records")
        .arg(&records_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Anchor"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_stats_from_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    log_regular_history(&data_dir);

    let stats = json_stdout(cli().arg("stats").arg("--data-dir").arg(&data_dir));

    assert_eq!(stats["average_cycle_length"], 28);
    assert_eq!(stats["average_period_length"], 5);
    assert_eq!(stats["cycle_count"], 3);
    assert_eq!(stats["history"][0]["length"], Value::Null);
    assert_eq!(stats["history"][2]["length"], 28);
}

#[test]
fn test_stats_with_empty_store() {
    let temp_dir = setup_test_dir();

    let stats = json_stdout(cli().arg("stats").arg("--data-dir").arg(temp_dir.path()));
    let obj = stats.as_object().unwrap();

    assert_eq!(obj.len(), 2);
    assert_eq!(stats["average_cycle_length"], 28);
    assert_eq!(stats["average_period_length"], 5);
}

#[test]
fn test_predict_from_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    log_regular_history(&data_dir);

    let prediction = json_stdout(
        cli()
            .arg("predict")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--today")
            .arg("2024-03-08"),
    );

    assert_eq!(prediction["next_period_date"], "2024-03-25");
    assert_eq!(prediction["ovulation_date"], "2024-03-11");
    assert_eq!(prediction["fertile_window_start"], "2024-03-06");
    assert_eq!(prediction["fertile_window_end"], "2024-03-12");
    assert_eq!(prediction["current_cycle_day"], 12);
    assert_eq!(prediction["current_phase"], "ovulation");
    assert_eq!(prediction["future_predictions"].as_array().unwrap().len(), 6);
}

#[test]
fn test_predict_with_no_history() {
    let temp_dir = setup_test_dir();

    let prediction = json_stdout(cli().arg("predict").arg("--data-dir").arg(temp_dir.path()));

    assert_eq!(prediction["current_phase"], "unknown");
    assert_eq!(prediction["next_period_date"], Value::Null);
    assert_eq!(prediction.as_object().unwrap().len(), 8);
}

#[test]
fn test_predict_from_raw_records() {
    let temp_dir = setup_test_dir();
    let records_path = temp_dir.path().join("records.json");
    fs::write(
        &records_path,
        r#"[
            {"start_date": "2024-02-26", "end_date": "2024-03-01"},
            {"start_date": "2024-01-01", "end_date": "2024-01-05"},
            {"start_date": "2024-01-29", "end_date": "not a date"}
        ]"#,
    )
    .unwrap();

    let prediction = json_stdout(
        cli()
            .arg("predict")
            .arg("--data-dir")
            .arg(temp_dir.path())
            .arg("--records")
            .arg(&records_path)
            .arg("--today")
            .arg("2024-03-01"),
    );

    assert_eq!(prediction["next_period_date"], "2024-03-25");
    assert_eq!(prediction["average_period_length"], 5);
    assert_eq!(prediction["current_phase"], "menstruation");
}

#[test]
fn test_predict_fails_on_bad_anchor() {
    let temp_dir = setup_test_dir();
    let records_path = temp_dir.path().join("records.json");
    fs::write(
        &records_path,
        r#"[{"start_date": "2024-01-01"}, {"start_date": "someday"}]"#,
    )
    .unwrap();

    cli()
        .arg("predict")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--records")
        .arg(&records_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Anchor"));
}

#[test]
fn test_predict_is_repeatable() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    log_regular_history(&data_dir);

    let run = || {
        cli()
            .arg("predict")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--today")
            .arg("2024-03-15")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_user_averages_policy_from_config() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[profile]
average_cycle_length = 30
average_period_length = 6
fallback_policy = "user_averages"
"#,
    )
    .unwrap();

    log_cycle(&data_dir, "2024-03-01", None);

    let prediction = json_stdout(
        cli()
            .arg("predict")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--config")
            .arg(&config_path)
            .arg("--today")
            .arg("2024-03-02"),
    );

    assert_eq!(prediction["average_cycle_length"], 30);
    assert_eq!(prediction["average_period_length"], 6);
    assert_eq!(prediction["next_period_date"], "2024-03-31");
}

#[test]
fn test_implausible_profile_is_rejected() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[profile]\naverage_cycle_length = 5\n").unwrap();

    cli()
        .arg("predict")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config("));
}

#[test]
fn test_dashboard_combines_prediction_and_stats() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    log_regular_history(&data_dir);

    let dashboard = json_stdout(
        cli()
            .arg("dashboard")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--today")
            .arg("2024-03-20"),
    );

    assert_eq!(dashboard["prediction"]["current_phase"], "luteal");
    assert_eq!(dashboard["stats"]["cycle_count"], 3);
}

#[test]
fn test_end_and_list() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let id = log_cycle(&data_dir, "2024-02-26", None);

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("ongoing"));

    cli()
        .arg("end")
        .arg(&id)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--end")
        .arg("2024-03-01")
        .assert()
        .success()
        .stdout(predicate::str::contains("(5 days)"));

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-01"))
        .stdout(predicate::str::contains("5 days"));
}

#[test]
fn test_delete() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let id = log_cycle(&data_dir, "2024-01-01", Some("2024-01-05"));

    cli()
        .arg("delete")
        .arg(&id)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted cycle starting 2024-01-01"));

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No cycles logged yet"));
}

#[test]
fn test_delete_unknown_id_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("delete")
        .arg("00000000-0000-0000-0000-000000000000")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotFound"));
}

#[test]
fn test_export_then_import() {
    let temp_dir = setup_test_dir();
    let source_dir = temp_dir.path().join("source");
    let target_dir = temp_dir.path().join("target");
    let csv_path = temp_dir.path().join("cycles.csv");
    log_regular_history(&source_dir);

    cli()
        .arg("export")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&source_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 cycles"));

    let csv_content = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    assert!(csv_content.starts_with("id,start_date,end_date"));

    cli()
        .arg("import")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&target_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 cycles"));

    // Same ids again are skipped
    cli()
        .arg("import")
        .arg(&csv_path)
        .arg("--data-dir")
        .arg(&target_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 cycles"));

    let stats = json_stdout(cli().arg("stats").arg("--data-dir").arg(&target_dir));
    assert_eq!(stats["cycle_count"], 3);
}
