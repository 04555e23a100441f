use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn multidock() -> Command { test_bin::get_test_bin("multidock") }

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

const MONITOR_ADDED: &str = r#"{"monitor_added":{"name":"HDMI-1","enabled":true,"rect":{"x":0,"y":0,"width":1920,"height":1080},"primary":true}}"#;

#[test]
fn validate_accepts_the_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), include_str!("../multidock.default.toml"));

    let output = multidock().arg("--config").arg(&path).arg("--validate").output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn validate_reports_out_of_range_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[settings]\nopacity = 3.0\nwindow_size_efficient = 500\n");

    let output = multidock().arg("--config").arg(&path).arg("--validate").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("opacity"), "{stderr}");
    assert!(stderr.contains("window_size_efficient"), "{stderr}");
}

#[test]
fn unknown_config_keys_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[settings]\nfavourite_colour = \"blue\"\n");

    let output = multidock().arg("--config").arg(&path).arg("--validate").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn events_on_stdin_settle_at_eof_and_replay_matches() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), include_str!("../multidock.default.toml"));
    let record = dir.path().join("session.ron");

    let mut live = multidock();
    live.arg("--config").arg(&config).arg("--record").arg(&record);
    let output = run_with_stdin(live, &format!("{MONITOR_ADDED}\nnot json\n"));
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let live_stdout = String::from_utf8(output.stdout).unwrap();

    let frontend = live_stdout
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .find(|v| v["type"] == "update_frontend_geometry")
        .expect("no frontend geometry published");
    assert_eq!(frontend["screen"], "HDMI-1");
    assert_eq!(
        frontend["rect"],
        serde_json::json!({"x": 0, "y": 1040, "width": 1920, "height": 40})
    );

    let output = multidock()
        .arg("--config")
        .arg(&config)
        .arg("--replay")
        .arg(&record)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), live_stdout);
}
