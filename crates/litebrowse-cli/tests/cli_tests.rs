//! CLI integration tests for litebrowse.
//!
//! These tests verify command-line argument parsing, help output, the
//! scriptable subcommands against scratch databases, and exit codes for
//! the error categories.

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command for the litebrowse binary.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("litebrowse").unwrap();
    cmd.env_remove("DB_PATH");
    cmd
}

/// Create a database with a few tables and a view in a fresh directory.
fn sample_db() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE people (
             id INTEGER PRIMARY KEY,
             email TEXT UNIQUE,
             name TEXT,
             age INT
         );
         INSERT INTO people VALUES (1, 'ann@example.com', 'Ann', 41);
         INSERT INTO people VALUES (2, 'bob@example.com', 'Bob', 17);
         CREATE TABLE pair (a INT, b INT, PRIMARY KEY (a, b));
         INSERT INTO pair VALUES (1, 2);
         CREATE VIEW adults AS SELECT name FROM people WHERE age >= 18;",
    )
    .unwrap();
    (dir, path)
}

fn db_arg(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

fn count(path: &Path, sql: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("schema"))
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("duplicate"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("drop"));
}

#[test]
fn test_update_subcommand_help() {
    cmd()
        .args(["update", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--row"))
        .stdout(predicate::str::contains("--column"))
        .stdout(predicate::str::contains("--value"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("litebrowse"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_db_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--db"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

// =============================================================================
// Exit Code Tests - Config Errors (Exit Code 1)
// =============================================================================

#[test]
fn test_missing_db_file_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["--db", "nonexistent.db", "tables"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("database file not found"));
}

#[test]
fn test_no_db_found_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .arg("tables")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--db"));
}

// =============================================================================
// Database Path Resolution Tests
// =============================================================================

#[test]
fn test_db_path_from_env() {
    let (_dir, path) = sample_db();
    let elsewhere = tempfile::tempdir().unwrap();
    cmd()
        .current_dir(elsewhere.path())
        .env("DB_PATH", &path)
        .arg("tables")
        .assert()
        .success()
        .stdout(predicate::str::contains("people"));
}

#[test]
fn test_db_discovered_in_instance_dir() {
    let (dir, path) = sample_db();
    let instance = dir.path().join("instance");
    std::fs::create_dir(&instance).unwrap();
    std::fs::rename(&path, instance.join("app.db")).unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("tables")
        .assert()
        .success()
        .stdout(predicate::str::contains("adults"));
}

// =============================================================================
// Read-only Commands
// =============================================================================

#[test]
fn test_tables_lists_tables_and_views() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "tables"])
        .assert()
        .success()
        .stdout("view   adults\ntable  pair\ntable  people\n");
}

#[test]
fn test_tables_json() {
    let (_dir, path) = sample_db();
    let output = cmd()
        .args(["--db", &db_arg(&path), "--output-json", "tables"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let objects: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(objects.as_array().unwrap().len(), 3);
}

#[test]
fn test_schema_shows_columns_and_unique_indexes() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "schema", "people"])
        .assert()
        .success()
        .stdout(predicate::str::contains("table people"))
        .stdout(predicate::str::contains("  id INTEGER PRIMARY KEY(1)"))
        .stdout(predicate::str::contains("UNIQUE"))
        .stdout(predicate::str::contains("(email)"));
}

#[test]
fn test_preview_grid() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "preview", "people"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ann@example.com"))
        .stdout(predicate::str::contains("(2 rows)"));
}

#[test]
fn test_preview_of_view() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "preview", "adults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann"))
        .stdout(predicate::str::contains("(1 rows)"));
}

#[test]
fn test_preview_missing_object_exits_with_code_4() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "preview", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("no such table or view: nope"));
}

// =============================================================================
// Mutating Commands
// =============================================================================

#[test]
fn test_duplicate_rewrites_unique_columns() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "duplicate", "people", "--row", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicated row 0 of people"))
        .stdout(predicate::str::contains("email = ann@example.com-"));

    assert_eq!(count(&path, "SELECT COUNT(*) FROM people"), 3);
    assert_eq!(
        count(&path, "SELECT COUNT(*) FROM people WHERE name = 'Ann' AND age = 41"),
        2
    );
    assert_eq!(count(&path, "SELECT MAX(id) FROM people"), 3);
}

#[test]
fn test_duplicate_composite_key_exits_with_code_3() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "duplicate", "pair", "--row", "0"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("composite primary keys"));

    assert_eq!(count(&path, "SELECT COUNT(*) FROM pair"), 1);
}

#[test]
fn test_delete_row() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "delete", "people", "--row", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 row(s) from people"));

    assert_eq!(count(&path, "SELECT COUNT(*) FROM people WHERE name = 'Bob'"), 0);
}

#[test]
fn test_row_out_of_range_exits_with_code_2() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "delete", "people", "--row", "5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("row 5 out of range"));

    assert_eq!(count(&path, "SELECT COUNT(*) FROM people"), 2);
}

#[test]
fn test_delete_from_view_exits_with_code_5() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "delete", "adults", "--row", "0"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("cannot resolve row identifier"));
}

#[test]
fn test_update_to_null() {
    let (_dir, path) = sample_db();
    cmd()
        .args([
            "--db",
            &db_arg(&path),
            "update",
            "people",
            "--row",
            "0",
            "--column",
            "name",
            "--value",
            "null",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated people.name on 1 row(s)"));

    assert_eq!(count(&path, "SELECT COUNT(*) FROM people WHERE name IS NULL"), 1);
}

#[test]
fn test_update_keeps_value_verbatim() {
    let (_dir, path) = sample_db();
    cmd()
        .args([
            "--db",
            &db_arg(&path),
            "update",
            "people",
            "--row",
            "1",
            "--column",
            "name",
            "--value",
            "-Bobby ",
        ])
        .assert()
        .success();

    assert_eq!(
        count(&path, "SELECT COUNT(*) FROM people WHERE name = '-Bobby '"),
        1
    );
}

#[test]
fn test_update_unknown_column_exits_with_code_2() {
    let (_dir, path) = sample_db();
    cmd()
        .args([
            "--db",
            &db_arg(&path),
            "update",
            "people",
            "--row",
            "0",
            "--column",
            "nope",
            "--value",
            "x",
        ])
        .assert()
        .code(2);
}

#[test]
fn test_update_unique_conflict_exits_with_code_6() {
    let (_dir, path) = sample_db();
    cmd()
        .args([
            "--db",
            &db_arg(&path),
            "update",
            "people",
            "--row",
            "1",
            "--column",
            "email",
            "--value",
            "ann@example.com",
        ])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("update error:"));
}

#[test]
fn test_drop_view() {
    let (_dir, path) = sample_db();
    cmd()
        .args(["--db", &db_arg(&path), "drop", "adults"])
        .assert()
        .success()
        .stdout("Dropped view adults\n");

    assert_eq!(
        count(&path, "SELECT COUNT(*) FROM sqlite_master WHERE name = 'adults'"),
        0
    );
}
