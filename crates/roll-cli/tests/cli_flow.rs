//! Drives the `roll` binary through a full class session against a temp database.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Run `roll` in `dir`, with `dir/home` standing in for the user's home so
/// no global config on the host leaks into the run.
fn roll(dir: &Path, args: &[&str]) -> Output {
    let home = dir.join("home");
    Command::new(env!("CARGO_BIN_EXE_roll"))
        .current_dir(dir)
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("ROLLCALL_AS")
        .env_remove("ROLLCALL_LOG")
        .env_remove("ROLLCALL_ATTENDANCE__CODE_TTL_MINUTES")
        .env_remove("ROLLCALL_ATTENDANCE__BASE_URL")
        .env("ROLLCALL_DATABASE__PATH", dir.join("roll.db"))
        .args(args)
        .output()
        .expect("roll should run")
}

fn roll_json(dir: &Path, args: &[&str]) -> Value {
    let out = roll(dir, args);
    assert!(
        out.status.success(),
        "roll {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout should be JSON")
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id").to_string()
}

#[test]
fn open_mark_and_export() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    roll_json(dir, &["user", "create", "prof", "prof@example.edu", "--role", "lecturer"]);
    roll_json(dir, &["user", "create", "alice", "alice@example.edu", "--role", "student"]);
    let course = id_of(&roll_json(dir, &["course", "create", "CS101", "Intro"]));
    let section = id_of(&roll_json(
        dir,
        &["section", "create", "--course", &course, "--code", "A", "--instructor", "prof"],
    ));
    roll_json(dir, &["enroll", &section, "alice"]);

    let session = id_of(&roll_json(
        dir,
        &[
            "--as", "prof", "session", "create", "--section", &section, "--start",
            "2020-01-01T09:00", "--end", "2999-01-01T10:00",
        ],
    ));
    let opened = roll_json(dir, &["--as", "prof", "session", "open", &session]);
    let code = opened["code"].as_str().expect("code").to_string();
    assert_eq!(code.len(), 6);

    let first = roll_json(dir, &["--as", "alice", "mark", &session, &code]);
    assert_eq!(first["already_recorded"], false);
    let again = roll_json(dir, &["--as", "alice", "mark", &session, &code]);
    assert_eq!(again["already_recorded"], true);

    let denied = roll(dir, &["--as", "prof", "mark", &session, &code]);
    assert!(!denied.status.success());
    let stderr = String::from_utf8_lossy(&denied.stderr);
    assert!(stderr.contains("roll error:"), "stderr: {stderr}");
    assert!(stderr.contains("Access denied"), "stderr: {stderr}");

    let csv = roll(dir, &["--as", "prof", "export", "session", &session]);
    assert!(csv.status.success());
    let csv = String::from_utf8_lossy(&csv.stdout);
    assert!(csv.starts_with("session_id,section_code,"));
    assert!(csv.lines().any(|line| line.contains("alice") && line.contains(",present,")));
    assert!(!csv.contains(&code));
}

#[test]
fn actor_is_required_for_lifecycle_commands() {
    let tmp = TempDir::new().unwrap();
    let out = roll(tmp.path(), &["session", "feed"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--as"));
}

#[cfg(target_os = "linux")]
#[test]
fn user_config_is_read_from_isolated_home() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let config_dir = dir.join("home/.config/rollcall");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[attendance]\nbase_url = \"https://attend.example.edu\"\n",
    )
    .unwrap();

    let config = roll_json(dir, &["--format", "json", "config"]);
    assert_eq!(config["attendance"]["base_url"], "https://attend.example.edu");
    assert_eq!(config["attendance"]["code_ttl_minutes"], 15);
}
