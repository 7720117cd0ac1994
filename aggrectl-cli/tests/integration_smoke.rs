//! Smoke tests for the aggrectl binary
//!
//! None of these need a database: they cover argument handling, the dry-run
//! script, configuration errors and the connection-failure exit path.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with an isolated HOME/cwd and no AGGRE_DB_* variables leaking in
fn aggrectl(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aggrectl").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("AGGRE_DB_HOST")
        .env_remove("AGGRE_DB_PORT")
        .env_remove("AGGRE_DB_NAME")
        .env_remove("AGGRE_DB_USER")
        .env_remove("AGGRE_DB_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

// === Help ===

#[test]
fn test_init_help() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .args(["init", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AGGRE_DB_NAME"))
        .stdout(predicate::str::contains("--no-staging"));
}

#[test]
fn test_password_env_value_is_hidden_in_help() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .env("AGGRE_DB_PASSWORD", "hunter2")
        .args(["init", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not());
}

// === Plan ===

#[test]
fn test_plan_prints_full_script() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("BEGIN;"))
        .stdout(predicate::str::contains("DROP TABLE IF EXISTS news_article;"))
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS news ("))
        .stdout(predicate::str::contains(
            "CREATE TEMPORARY TABLE IF NOT EXISTS temp_news",
        ))
        .stdout(predicate::str::contains("COMMIT;"));
}

#[test]
fn test_plan_single_table() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .args(["plan", "--table", "sample", "--no-staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DROP TABLE IF EXISTS sample;"))
        .stdout(predicate::str::contains("news").not());
}

#[test]
fn test_plan_unknown_table_fails() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .args(["plan", "--table", "articles"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown table 'articles'"));
}

// === Tables ===

#[test]
fn test_tables_lists_catalog() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .arg("tables")
        .assert()
        .success()
        .stdout(predicate::str::contains("news_article"))
        .stdout(predicate::str::contains("temp_news (session)"))
        .stdout(predicate::str::contains("SERIAL PRIMARY KEY"));
}

// === Verify ===

#[test]
fn test_verify_session_table_only_is_rejected() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .args(["verify", "--table", "temp_news"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("in sync").not())
        .stderr(predicate::str::contains("nothing to verify"))
        .stderr(predicate::str::contains("temp_news"));
}

#[test]
fn test_verify_has_no_staging_flag() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .args(["verify", "--no-staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

// === Init failure paths ===

#[test]
fn test_init_without_database_name_fails() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .args(["init", "--user", "postgres"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AGGRE_DB_NAME"));
}

#[test]
fn test_init_unreachable_database_exits_nonzero() {
    let home = TempDir::new().unwrap();
    aggrectl(&home)
        .args(["init", "--host", "127.0.0.1", "--port", "1"])
        .env("AGGRE_DB_NAME", "Aggre")
        .env("AGGRE_DB_USER", "postgres")
        .env("AGGRE_DB_PASSWORD", "hunter2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("database unreachable"))
        .stderr(predicate::str::contains("postgres://postgres@127.0.0.1:1/Aggre"))
        .stderr(predicate::str::contains("hunter2").not());
}

#[test]
fn test_init_reads_local_config_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("aggrectl.toml"),
        "[database]\nhost = \"127.0.0.1\"\nport = 1\nname = \"FromFile\"\nuser = \"filer\"\n",
    )
    .unwrap();

    aggrectl(&home)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("postgres://filer@127.0.0.1:1/FromFile"));
}
