//! End-to-end tests of the `signoff` binary
//!
//! ## Exit Code Contract
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Every requested report type was generated |
//! | 1 | A report type, the completion data or the command itself failed |
//!
//! Unmatched records never change the exit code.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const RECORDS: &str = "\
Datetime,Name,Room Number,Frequency,Task Type
2025-01-06 08:00:00,Alice,1.94,Weekly,Production
2025-01-07 09:30:00,Bob,9.99,Weekly,Production
2025-01-08 10:00:00,Carol,8.77A,Daily,Warehouse
2025-02-03 08:00:00,Dave,1.95,Weekly,Production
";

fn signoff(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_signoff"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("SIGNOFF_CONFIG_DIR")
        .env_remove("SIGNOFF_DATA_DIR")
        .env_remove("SIGNOFF_OUTPUT_DIR")
        .env_remove("SIGNOFF_REVIEW_DIR")
        .args(args)
        .output()
        .expect("failed to execute signoff")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn init(dir: &Path) {
    let output = signoff(dir, &["init-configs"]);
    assert!(output.status.success(), "init-configs failed: {output:?}");
}

// =============================================================================
// init-configs / check-config
// =============================================================================

#[test]
fn init_configs_writes_three_documents() {
    let dir = TempDir::new().unwrap();
    let output = signoff(dir.path(), &["init-configs"]);
    assert_eq!(output.status.code(), Some(0));

    for name in ["production_config.json", "warehouse_config.json", "idf_config.json"] {
        assert!(dir.path().join("configs").join(name).exists(), "{name} missing");
    }

    // A second run leaves existing files alone
    let again = signoff(dir.path(), &["init-configs"]);
    assert_eq!(again.status.code(), Some(0));
    assert!(stdout(&again).contains("already exist"));
}

#[test]
fn check_config_reports_layout() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    let output = signoff(dir.path(), &["check-config", "configs/warehouse_config.json"]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("per-frequency layout"));
    assert!(text.contains("2x Weekly"));
}

#[test]
fn check_config_rejects_broken_document() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"Production": {"Weekly": {"description": "x"}}}"#).unwrap();

    let output = signoff(dir.path(), &["check-config", "bad.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

// =============================================================================
// generate
// =============================================================================

#[test]
fn generate_with_records_writes_workbooks_and_review() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    fs::write(dir.path().join("records.csv"), RECORDS).unwrap();

    let output = signoff(
        dir.path(),
        &["generate", "--month", "1", "--year", "2025", "--records", "records.csv"],
    );
    assert_eq!(output.status.code(), Some(0), "{output:?}");

    let sheets = dir.path().join("data/signoff_sheets");
    assert!(sheets.join("Production_Tasks_Jan2025.xlsx").exists());
    assert!(sheets.join("Warehouse_Tasks_Jan2025.xlsx").exists());
    assert!(sheets.join("Idf_Tasks_Jan2025.xlsx").exists());

    let review = dir.path().join("data/review/unmatched_tasks_Production_2025_01.txt");
    let text = fs::read_to_string(review).unwrap();
    assert!(text.contains("Frequency: 'Weekly', Room: '9.99' - 1 occurrences"));
    assert!(!dir
        .path()
        .join("data/review/unmatched_tasks_Warehouse_2025_01.txt")
        .exists());

    let summary = stdout(&output);
    assert!(summary.contains("2 attempted, 1 matched, 1 unmatched"));
    assert!(summary.contains("Generated 3 of 3 workbooks for January 2025"));
}

#[test]
fn generate_single_type() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    let output = signoff(
        dir.path(),
        &["generate", "--month", "3", "--year", "2024", "--config", "idf"],
    );
    assert_eq!(output.status.code(), Some(0));

    let sheets = dir.path().join("data/signoff_sheets");
    assert!(sheets.join("Idf_Tasks_Mar2024.xlsx").exists());
    assert!(!sheets.join("Production_Tasks_Mar2024.xlsx").exists());
}

#[test]
fn generate_without_data_warns_and_succeeds() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    let output = signoff(dir.path(), &["generate", "--month", "1", "--year", "2025"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Will generate empty sign-off sheets."));
    assert!(dir
        .path()
        .join("data/signoff_sheets/Production_Tasks_Jan2025.xlsx")
        .exists());
}

#[test]
fn broken_config_fails_only_its_type() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    fs::write(dir.path().join("configs/production_config.json"), "{}").unwrap();

    let output = signoff(dir.path(), &["generate", "--month", "1", "--year", "2025"]);
    assert_eq!(output.status.code(), Some(1));

    let sheets = dir.path().join("data/signoff_sheets");
    assert!(!sheets.join("Production_Tasks_Jan2025.xlsx").exists());
    assert!(sheets.join("Warehouse_Tasks_Jan2025.xlsx").exists());
    assert!(sheets.join("Idf_Tasks_Jan2025.xlsx").exists());
    assert!(stdout(&output).contains("Continuing with next report..."));
}

#[test]
fn invalid_records_still_produce_skeletons() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    fs::write(dir.path().join("records.csv"), "Datetime,Name\n2025-01-06,Alice\n").unwrap();

    let output = signoff(
        dir.path(),
        &["generate", "--month", "1", "--year", "2025", "--records", "records.csv"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Missing required columns in CSV"));
    assert!(dir
        .path()
        .join("data/signoff_sheets/Warehouse_Tasks_Jan2025.xlsx")
        .exists());
}

#[test]
fn month_requires_year() {
    let dir = TempDir::new().unwrap();
    let output = signoff(dir.path(), &["generate", "--month", "1"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_month_is_an_error() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    let output = signoff(dir.path(), &["generate", "--month", "13", "--year", "2025"]);
    assert_eq!(output.status.code(), Some(1));
}

// =============================================================================
// process
// =============================================================================

#[test]
fn process_writes_snapshot_used_by_generate() {
    let dir = TempDir::new().unwrap();
    init(dir.path());
    let raw = dir.path().join("data/raw_tasks");
    fs::create_dir_all(&raw).unwrap();
    fs::write(
        raw.join("page_1.json"),
        r#"[{"sequenceId": 7, "title": "Weekly Production clean", "user": "u1",
             "createdAt": "2025-01-06T09:15:00.000Z",
             "area": {"location": {"name": "Plant"}, "point": {"name": "Corridor (1.94)"}}}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("users.json"),
        r#"[{"user": {"_id": "u1", "fullName": "Alice"}}]"#,
    )
    .unwrap();

    let output = signoff(dir.path(), &["process", "--users", "users.json"]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let snapshots: Vec<_> = fs::read_dir(dir.path().join("data/processed"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(snapshots.len(), 1);
    assert!(snapshots[0].starts_with("task_data_2025_01_"));

    let output = signoff(dir.path(), &["generate", "--month", "1", "--year", "2025"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("1 attempted, 1 matched, 0 unmatched"));
}

#[test]
fn process_without_raw_dir_fails() {
    let dir = TempDir::new().unwrap();
    let output = signoff(dir.path(), &["process"]);
    assert_eq!(output.status.code(), Some(1));
}
