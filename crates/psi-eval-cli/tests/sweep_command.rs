// crates/psi-eval-cli/tests/sweep_command.rs
// ============================================================================
// Module: CLI Sweep and Report Command Tests
// Description: End-to-end runs against shell-script stand-ins.
// Purpose: Ensure a sweep persists results and produces the report, and that
// failures abort without output.
// Dependencies: psi-eval-cli binary, sh
// ============================================================================
//! ## Overview
//! The protocol and the typesetter are replaced with `sh` scripts. The
//! protocol script records each invocation and writes fixed artifacts; the
//! typesetter script writes an empty document next to the source.

#![cfg(unix)]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use psi_eval_core::ResultSnapshot;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const PROTOCOL: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.txt"
head -c 2048 /dev/zero > encrypted_table.tmp
head -c 1024 /dev/zero > q0_E_0.tmp
head -c 512 /dev/zero > q0_R_0.tmp
printf '10\n20\n40\n' > runtime.log
"#;

const FAILING_PROTOCOL: &str = r#"#!/bin/sh
echo "out of memory" >&2
exit 3
"#;

const TYPESETTER: &str = r#"#!/bin/sh
: > "${1%.tex}.pdf"
"#;

fn psi_eval_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_psi-eval"))
}

fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

fn write_config(root: &Path, protocol_body: &str) {
    let protocol = write_script(root, "protocol.sh", protocol_body);
    let typesetter = write_script(root, "typeset.sh", TYPESETTER);
    let config = format!(
        r#"
[protocol]
workdir = "stage"
command = ["sh", "{protocol}"]
build_command = []
threads = 2

[report]
output_dir = "out"
typesetter = ["sh", "{typesetter}"]
"#
    );
    fs::write(root.join("psi-eval.toml"), config).unwrap();
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(psi_eval_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("PSI_EVAL_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("run psi-eval")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn sweep_persists_results_and_typesets_the_report() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path(), PROTOCOL);

    let output = run_in(root.path(), &["sweep"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let calls = fs::read_to_string(root.path().join("calls.txt")).unwrap();
    let lines: Vec<&str> = calls.lines().collect();
    assert_eq!(lines.len(), 36);
    assert_eq!(lines[0], "0 16 4 1 2");
    assert!(lines.iter().all(|line| line.ends_with(" 2")));

    let snapshot = ResultSnapshot::read(&root.path().join("out/results.json")).unwrap();
    assert_eq!(snapshot.entries.len(), 36);

    let tex = fs::read_to_string(root.path().join("out/main.tex")).unwrap();
    assert!(tex.contains("\\label{tab:round_trip24}"));
    assert!(root.path().join("out/artifact-evaluation.pdf").is_file());
    assert!(!root.path().join("out/main.pdf").exists());

    let leftovers = fs::read_dir(root.path().join("stage")).unwrap().count();
    assert_eq!(leftovers, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("artifact-evaluation.pdf"), "{stdout}");
}

#[test]
fn report_rebuilds_from_saved_results() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path(), PROTOCOL);
    let sweep = run_in(root.path(), &["sweep", "--tex-only"]);
    assert!(sweep.status.success(), "stderr: {}", String::from_utf8_lossy(&sweep.stderr));
    assert!(!root.path().join("out/artifact-evaluation.pdf").exists());

    let first = fs::read_to_string(root.path().join("out/main.tex")).unwrap();
    fs::remove_file(root.path().join("out/main.tex")).unwrap();
    fs::remove_file(root.path().join("calls.txt")).unwrap();

    let report = run_in(root.path(), &["report", "--results", "out/results.json", "--tex-only"]);
    assert!(report.status.success(), "stderr: {}", String::from_utf8_lossy(&report.stderr));
    let second = fs::read_to_string(root.path().join("out/main.tex")).unwrap();
    assert_eq!(first, second);
    assert!(!root.path().join("calls.txt").exists());
}

#[test]
fn failing_protocol_aborts_without_results() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path(), FAILING_PROTOCOL);

    let output = run_in(root.path(), &["sweep"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("protocol run failed"), "{stderr}");
    assert!(stderr.contains("out of memory"), "{stderr}");
    assert!(!root.path().join("out/results.json").exists());
    assert!(!root.path().join("out/main.tex").exists());
}

#[test]
fn run_cell_prints_one_summary() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path(), PROTOCOL);

    let output = run_in(root.path(), &["run-cell", "0", "20", "64", "4"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let calls = fs::read_to_string(root.path().join("calls.txt")).unwrap();
    assert_eq!(calls.trim(), "0 20 64 4 2");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("From     One-time Recurrent").count(), 6);
}

#[test]
fn corrupt_results_file_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path(), PROTOCOL);
    fs::write(root.path().join("results.json"), "{\"model\": \"additive_rtt\"}").unwrap();
    let output = run_in(root.path(), &["report", "--results", "results.json", "--tex-only"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid results file"), "{stderr}");
}
