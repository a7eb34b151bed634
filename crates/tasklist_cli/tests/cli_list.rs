use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
}

fn run(store_path: &PathBuf, config_path: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(args)
        .env("TASKLIST_STORE_PATH", store_path)
        .env("TASKLIST_CONFIG_PATH", config_path)
        .output()
        .expect("failed to run tasklist")
}

fn write_store(store_path: &PathBuf, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "entries": {
            "tasks": serde_json::to_string(&tasks).unwrap()
        }
    });
    std::fs::write(store_path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn sample_tasks() -> serde_json::Value {
    serde_json::json!([
        {"id": 1, "title": "Write report", "priority": "High", "deadline": "2025-01-01T10:00", "completed": false},
        {"id": 2, "title": "Buy milk", "priority": "low", "deadline": "2025-01-01T09:00", "completed": false},
        {"id": 3, "title": "Call mom", "priority": "Medium", "deadline": "2025-01-02T08:00", "completed": true},
        {"id": 4, "title": "Pay rent", "priority": "High", "deadline": "2024-12-31T23:00", "completed": true}
    ])
}

fn titles(list: &serde_json::Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn list_json_sorts_by_date_ascending_by_default() {
    let store_path = temp_path("cli-list-default.json");
    let config_path = temp_path("cli-list-default-config.json");
    write_store(&store_path, sample_tasks());

    let output = run(&store_path, &config_path, &["list", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["sort_type"], "date");
    assert_eq!(payload["sort_order"], "asc");
    assert_eq!(titles(&payload["active"]), vec!["Buy milk", "Write report"]);
    assert_eq!(titles(&payload["completed"]), vec!["Pay rent", "Call mom"]);
}

#[test]
fn list_json_sorts_by_priority_flags() {
    let store_path = temp_path("cli-list-priority.json");
    let config_path = temp_path("cli-list-priority-config.json");
    write_store(&store_path, sample_tasks());

    let asc = run(&store_path, &config_path, &["list", "--json", "--sort", "priority"]);
    let desc = run(
        &store_path,
        &config_path,
        &["list", "--json", "--sort", "Priority", "--order", "DESC"],
    );
    std::fs::remove_file(&store_path).ok();

    let asc: serde_json::Value = serde_json::from_slice(&asc.stdout).unwrap();
    assert_eq!(titles(&asc["active"]), vec!["Write report", "Buy milk"]);
    assert_eq!(titles(&asc["completed"]), vec!["Pay rent", "Call mom"]);

    let desc: serde_json::Value = serde_json::from_slice(&desc.stdout).unwrap();
    assert_eq!(desc["sort_order"], "desc");
    assert_eq!(titles(&desc["active"]), vec!["Buy milk", "Write report"]);
    assert_eq!(titles(&desc["completed"]), vec!["Call mom", "Pay rent"]);
}

#[test]
fn list_uses_config_defaults() {
    let store_path = temp_path("cli-list-config.json");
    let config_path = temp_path("cli-list-config-config.json");
    write_store(&store_path, sample_tasks());
    std::fs::write(&config_path, r#"{"sort": "priority", "order": "desc"}"#).unwrap();

    let output = run(&store_path, &config_path, &["list", "--json"]);
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&config_path).ok();

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["sort_type"], "priority");
    assert_eq!(payload["sort_order"], "desc");
}

#[test]
fn list_applies_config_override_flag() {
    let store_path = temp_path("cli-list-override.json");
    let config_path = temp_path("cli-list-override-config.json");
    write_store(&store_path, sample_tasks());

    let output = run(
        &store_path,
        &config_path,
        &["list", "--json", "--config-override", "sort=priority"],
    );
    std::fs::remove_file(&store_path).ok();

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["sort_type"], "priority");
    assert_eq!(titles(&payload["active"]), vec!["Write report", "Buy milk"]);
}

#[test]
fn list_config_override_beats_saved_selection() {
    let store_path = temp_path("cli-list-override-saved.json");
    let config_path = temp_path("cli-list-override-saved-config.json");
    write_store(&store_path, sample_tasks());

    let saved = run(&store_path, &config_path, &["sort", "date"]);
    let output = run(
        &store_path,
        &config_path,
        &[
            "list",
            "--json",
            "--config-override",
            "sort=priority",
            "--config-override",
            "order=desc",
        ],
    );
    let flagged = run(
        &store_path,
        &config_path,
        &["list", "--json", "--config-override", "sort=priority", "--sort", "date"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(saved.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["sort_type"], "priority");
    assert_eq!(payload["sort_order"], "desc");
    assert_eq!(titles(&payload["active"]), vec!["Buy milk", "Write report"]);

    let payload: serde_json::Value = serde_json::from_slice(&flagged.stdout).unwrap();
    assert_eq!(payload["sort_type"], "date");
    assert_eq!(payload["sort_order"], "desc");
}

#[test]
fn list_plain_text_shows_both_sections() {
    let store_path = temp_path("cli-list-plain.json");
    let config_path = temp_path("cli-list-plain-config.json");
    write_store(&store_path, sample_tasks());

    let output = run(&store_path, &config_path, &["list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let tasks_heading = stdout.find("Tasks: (by date ↑)").unwrap();
    let completed_heading = stdout.find("Completed Tasks:").unwrap();
    let milk = stdout.find("Buy milk").unwrap();
    let report = stdout.find("Write report").unwrap();
    let rent = stdout.find("Pay rent").unwrap();

    assert!(tasks_heading < milk);
    assert!(milk < report);
    assert!(report < completed_heading);
    assert!(completed_heading < rent);
}

#[test]
fn list_empty_store_prints_none() {
    let store_path = temp_path("cli-list-empty.json");
    let config_path = temp_path("cli-list-empty-config.json");

    let output = run(&store_path, &config_path, &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("(none)").count(), 2);
}

#[test]
fn list_fails_closed_on_malformed_store() {
    let store_path = temp_path("cli-list-malformed.json");
    let config_path = temp_path("cli-list-malformed-config.json");
    write_store(
        &store_path,
        serde_json::json!([{"id": 1, "title": "x", "priority": "Critical", "deadline": "2025-01-01"}]),
    );
    let before = std::fs::read_to_string(&store_path).unwrap();

    let list = run(&store_path, &config_path, &["list"]);
    let add = run(&store_path, &config_path, &["add", "y", "--deadline", "2025-01-01"]);
    let after = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(!list.status.success());
    assert!(String::from_utf8_lossy(&list.stderr).contains("ERROR: invalid_data"));
    assert!(!add.status.success());
    assert_eq!(before, after);
}

#[test]
fn list_rejects_unknown_sort_flag() {
    let store_path = temp_path("cli-list-bad-sort.json");
    let config_path = temp_path("cli-list-bad-sort-config.json");

    let output = run(&store_path, &config_path, &["list", "--sort", "title"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid sort type 'title'"));
}
