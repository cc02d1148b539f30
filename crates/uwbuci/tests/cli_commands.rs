#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn uwbuci(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_uwbuci"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("uwbuci should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn temp_params(tag: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "uwbuci-{tag}-{}-{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::write(&path, json).expect("params file should be writable");
    path
}

#[test]
fn version_prints_package_version() {
    let output = uwbuci(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("uwbuci {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn decode_session_status_notification() {
    let output = uwbuci(&["decode", "61 02 00 06 78 56 34 12 02 00"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"message_type\":\"NTF\""));
    assert!(out.contains("\"gid\":\"SESSION\""));
    assert!(out.contains("\"kind\":\"session_status\""));
    assert!(out.contains("\"session_id\":305419896"));
}

#[test]
fn decode_rejects_corrupted_crc_trailer() {
    let output = uwbuci(&["decode", "--crc", "4100000100FFFF"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("crc mismatch"));
}

#[test]
fn decode_rejects_bad_hex() {
    let output = uwbuci(&["decode", "61020"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn crc_reports_missing_trailer() {
    let output = uwbuci(&["crc", "4100000100"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"trailer\":null"));
    assert!(out.contains("\"valid\":null"));
}

#[test]
fn tlv_ccc_demo_lists_mandatory_set() {
    let output = uwbuci(&["tlv", "--profile", "ccc"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"name\":\"DEVICE_TYPE\""));
    assert!(out.contains("\"name\":\"SLOTS_PER_RR\""));
}

#[test]
fn tlv_fira_without_destination_is_invalid_data() {
    let path = temp_params("fira", r#"{ "session_id": 5, "device_mac_addr": 1 }"#);
    let output = uwbuci(&["tlv", "--profile", "fira", "--params", path.to_str().unwrap_or("")]);
    let _ = std::fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("dst_mac_addr"));
}

#[test]
fn simulate_prints_one_line_per_round() {
    let output = uwbuci(&["simulate", "--profile", "ccc", "--count", "3"]);
    assert!(output.status.success());
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines
        .iter()
        .all(|line| line.contains("\"kind\":\"ccc_controller_exp_range\"")));
}

#[test]
fn simulate_fira_from_params_file() {
    let path = temp_params(
        "sim",
        r#"{ "session_id": 9, "device_mac_addr": 1, "dst_mac_addr": [2, 3], "anchor_num": 2 }"#,
    );
    let output = uwbuci(&[
        "simulate",
        "--profile",
        "fira",
        "--params",
        path.to_str().unwrap_or(""),
        "--count",
        "2",
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 2);
    assert!(out.contains("\"kind\":\"fira_range\""));
    assert!(out.contains("\"session_id\":9"));
}
