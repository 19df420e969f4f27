#![allow(deprecated)]

#[allow(unused_imports)]
use assert_cmd::cargo::CommandCargoExt;
use chrono::Local;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("jotterxpress").unwrap();
    c.env("JOTTERXPRESS_DIR", temp.path())
        .env("NO_COLOR", "1")
        .env_remove("JOTTERXPRESS_LOG");
    c
}

fn stdout_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}

fn note_json(
    id: &str,
    note_type: &str,
    content: &str,
    date: &str,
    updated: &str,
    metadata: &str,
) -> String {
    format!(
        r#"{{
    "id": "{id}",
    "type": "{note_type}",
    "content": "{content}",
    "created_at": "{date}T08:00:00+00:00",
    "updated_at": "{date}T{updated}+00:00",
    "date": "{date}",
    "metadata": {metadata}
  }}"#
    )
}

fn write_bucket(dir: &Path, date: &str, notes: &[String]) {
    fs::write(
        dir.join(format!("{date}.json")),
        format!("[\n  {}\n]\n", notes.join(",\n  ")),
    )
    .unwrap();
}

#[test]
fn no_args_prints_help() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--list-month"))
        .stdout(predicate::str::contains("JOTTERXPRESS_DIR"));
    cmd(&temp).arg("--help").assert().success().stdout(predicate::str::contains("Usage:"));
}

#[test]
fn add_and_list_today() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["buy", "oat", "milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Note saved successfully!"));
    cmd(&temp).arg("call the plumber").assert().success();

    let today = Local::now().format("%Y-%m-%d").to_string();
    assert!(temp.path().join(format!("{today}.json")).exists());

    let out = stdout_of(cmd(&temp).arg("-l").assert().success());
    assert!(out.starts_with("Today's Notes\n\nNotes (2 found):"), "{out}");
    // Newest first.
    let plumber = out.find("] call the plumber").unwrap();
    let milk = out.find("] buy oat milk").unwrap();
    assert!(plumber < milk);
    assert!(out.contains("1. ["));
}

#[test]
fn add_creates_missing_notes_directory() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("deep").join("notes");
    assert_cmd::Command::cargo_bin("jotterxpress")
        .unwrap()
        .env("JOTTERXPRESS_DIR", &nested)
        .env("NO_COLOR", "1")
        .args(["nested", "note"])
        .assert()
        .success();
    assert!(nested.is_dir());
}

#[test]
fn empty_listings_say_so() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes found for today."));
    cmd(&temp)
        .args(["--list-date", "2020-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes found for 2020-01-01."));
    cmd(&temp)
        .arg("-i")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes found for today."));
}

#[test]
fn single_word_is_rejected() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .arg("groceries")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("'groceries' is not a valid command"));
    assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
}

#[test]
fn flag_errors_exit_with_one() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["-l", "-i"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Only one command flag"));
    cmd(&temp)
        .arg("--frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown flag: --frobnicate"));
    cmd(&temp)
        .arg("--list-date")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Provide a value after --list-date"));
    cmd(&temp)
        .args(["--list-month", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month"));
}

#[test]
fn invalid_date_and_month_formats() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["--list-date", "2025/01/01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date format"));
    cmd(&temp)
        .args(["--list-month", "2025-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid month format"));
}

#[test]
fn interactive_creation_needs_a_tty() {
    let temp = TempDir::new().unwrap();
    for flag in ["-n", "-t", "-c", "-r"] {
        cmd(&temp)
            .arg(flag)
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Interactive mode requires a TTY environment",
            ));
    }
}

#[test]
fn list_month_covers_only_that_month() {
    let temp = TempDir::new().unwrap();
    write_bucket(
        temp.path(),
        "2025-02-01",
        &[note_json("1", "text", "first of february", "2025-02-01", "08:00:00", "{}")],
    );
    write_bucket(
        temp.path(),
        "2025-02-28",
        &[note_json("2", "idea", "last of february", "2025-02-28", "08:00:00", "{}")],
    );
    write_bucket(
        temp.path(),
        "2025-03-01",
        &[note_json("3", "text", "march already", "2025-03-01", "08:00:00", "{}")],
    );

    cmd(&temp)
        .args(["--list-month", "2025-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes for 2025-02"))
        .stdout(predicate::str::contains("Notes (2 found):"))
        .stdout(predicate::str::contains("first of february"))
        .stdout(predicate::str::contains("last of february"))
        .stdout(predicate::str::contains("march already").not());
}

#[test]
fn pending_reminders_are_listed_first() {
    let temp = TempDir::new().unwrap();
    write_bucket(
        temp.path(),
        "2025-01-10",
        &[
            note_json(
                "10",
                "reminder",
                "done reminder",
                "2025-01-10",
                "11:00:00",
                r#"{"reminder_time": "07:00", "status": "completed"}"#,
            ),
            note_json(
                "11",
                "task",
                "write report",
                "2025-01-10",
                "12:00:00",
                r#"{"priority": "high", "status": "to-do"}"#,
            ),
            note_json(
                "12",
                "reminder",
                "pay rent",
                "2025-01-10",
                "09:00:00",
                r#"{"reminder_time": "08:30", "status": "por_hacer"}"#,
            ),
        ],
    );

    let out = stdout_of(cmd(&temp).args(["--list-date", "2025-01-10"]).assert().success());
    let lines: Vec<&str> = out.lines().filter(|l| l.contains(". [")).collect();
    assert_eq!(lines.len(), 3, "{out}");
    assert!(lines[0].starts_with("1. ") && lines[0].ends_with("pay rent [08:30, to-do]"));
    assert!(lines[1].ends_with("write report [high, to-do]"));
    assert!(lines[2].ends_with("done reminder [07:00, completed]"));
}

#[test]
fn legacy_text_file_is_migrated() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("2024-01-05.txt"),
        "[09:00:00] buy milk\nnot a note\n\n[18:30:00] call mom\n",
    )
    .unwrap();

    cmd(&temp)
        .args(["--list-date", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes (2 found):"))
        .stdout(predicate::str::contains("[09:00:00] buy milk"))
        .stdout(predicate::str::contains("[18:30:00] call mom"));

    assert!(!temp.path().join("2024-01-05.txt").exists());
    let json = fs::read_to_string(temp.path().join("2024-01-05.json")).unwrap();
    assert!(json.contains("\"id\": \"2024-01-05-09:00:00\""));
    assert!(json.contains("\"type\": \"text\""));
}

#[test]
fn corrupt_bucket_is_reported_not_overwritten() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("2024-02-02.json"), "[{ nope").unwrap();
    cmd(&temp)
        .args(["--list-date", "2024-02-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decode notes"));
    assert_eq!(
        fs::read_to_string(temp.path().join("2024-02-02.json")).unwrap(),
        "[{ nope"
    );
}

#[test]
fn jtx_alias_behaves_the_same() {
    let temp = TempDir::new().unwrap();
    assert_cmd::Command::cargo_bin("jtx")
        .unwrap()
        .env("JOTTERXPRESS_DIR", temp.path())
        .env("NO_COLOR", "1")
        .args(["from", "the", "alias"])
        .assert()
        .success();
    cmd(&temp)
        .arg("-l")
        .assert()
        .success()
        .stdout(predicate::str::contains("] from the alias"));
}
