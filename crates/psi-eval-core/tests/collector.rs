// crates/psi-eval-core/tests/collector.rs
// ============================================================================
// Module: Artifact Collector Tests
// Description: Directory scanning, classification, and runtime log handling.
// ============================================================================
//! ## Overview
//! Exercises the collector against real scratch directories: per-category
//! sums, ignored files, and every fatal collection error.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use psi_eval_core::ArtifactCollector;
use psi_eval_core::CollectError;

use crate::common::write_runtime_log;
use crate::common::write_sized;
use crate::common::write_typical_run;

type TestResult = Result<(), String>;

#[test]
fn collect_sums_sizes_per_category() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    write_typical_run(dir.path(), 300, 200, 101);
    write_runtime_log(dir.path(), ["1000", "2000", "4000"]);

    let raw = ArtifactCollector::new().collect(dir.path(), 4).map_err(|err| err.to_string())?;
    if raw.manifest.sender_one_time != 300
        || raw.manifest.sender_recurrent != 200
        || raw.manifest.receiver_recurrent != 101
    {
        return Err(format!("unexpected manifest {:?}", raw.manifest));
    }
    if raw.manifest.file_count != 5 || raw.recurrences != 4 {
        return Err(format!("unexpected counts {raw:?}"));
    }
    Ok(())
}

#[test]
fn collect_ignores_non_artifact_files() {
    let dir = tempfile::tempdir().unwrap();
    write_typical_run(dir.path(), 10, 10, 10);
    write_sized(dir.path(), "Makefile", 999);
    write_sized(dir.path(), "protocol.exe", 999);
    write_sized(dir.path(), "notes.tmp.bak", 999);
    std::fs::create_dir(dir.path().join("nested.tmp")).unwrap();
    write_runtime_log(dir.path(), ["1", "2", "3"]);

    let raw = ArtifactCollector::new().collect(dir.path(), 1).unwrap();
    assert_eq!(raw.manifest.total_bytes(), 30);
    assert_eq!(raw.runtime.receiver_recurrent_ms, 3.0);
}

#[test]
fn unknown_artifact_aborts_collection() {
    let dir = tempfile::tempdir().unwrap();
    write_typical_run(dir.path(), 10, 10, 10);
    write_sized(dir.path(), "q0_Z_0.tmp", 1);
    write_runtime_log(dir.path(), ["1", "2", "3"]);

    let err = ArtifactCollector::new().collect(dir.path(), 1).unwrap_err();
    assert_eq!(
        err,
        CollectError::UnknownArtifact {
            file_name: "q0_Z_0.tmp".to_string()
        }
    );
}

#[test]
fn bare_suffix_file_is_classified_not_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_sized(dir.path(), "encrypted_table.tmp", 10);
    write_sized(dir.path(), ".tmp", 777);
    write_runtime_log(dir.path(), ["1", "2", "3"]);

    let err = ArtifactCollector::new().collect(dir.path(), 1).unwrap_err();
    assert_eq!(
        err,
        CollectError::UnknownArtifact {
            file_name: ".tmp".to_string()
        }
    );
}

#[cfg(unix)]
#[test]
fn linked_artifacts_count_with_their_target_size() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    write_sized(dir.path(), "encrypted_table.tmp", 10);
    write_sized(outside.path(), "payload.bin", 500);
    std::os::unix::fs::symlink(outside.path().join("payload.bin"), dir.path().join("q0_E_0.tmp"))
        .unwrap();
    write_runtime_log(dir.path(), ["1", "2", "3"]);

    let raw = ArtifactCollector::new().collect(dir.path(), 1).unwrap();
    assert_eq!(raw.manifest.sender_recurrent, 500);
    assert_eq!(raw.manifest.file_count, 2);
}

#[cfg(unix)]
#[test]
fn dangling_artifact_link_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    write_sized(dir.path(), "encrypted_table.tmp", 10);
    let link = dir.path().join("q0_E_0.tmp");
    std::os::unix::fs::symlink(dir.path().join("gone.bin"), &link).unwrap();
    write_runtime_log(dir.path(), ["1", "2", "3"]);

    let err = ArtifactCollector::new().collect(dir.path(), 1).unwrap_err();
    assert!(matches!(err, CollectError::Io(_)), "{err:?}");
}

#[test]
fn artifact_without_origin_marker_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_sized(dir.path(), "a.tmp", 1);
    write_runtime_log(dir.path(), ["1", "2", "3"]);
    let err = ArtifactCollector::new().collect(dir.path(), 1).unwrap_err();
    assert!(matches!(err, CollectError::UnknownArtifact { .. }), "{err}");
}

#[test]
fn empty_directory_has_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    write_runtime_log(dir.path(), ["1", "2", "3"]);
    let err = ArtifactCollector::new().collect(dir.path(), 1).unwrap_err();
    assert!(matches!(err, CollectError::NoArtifacts { .. }), "{err}");
}

#[test]
fn missing_runtime_log_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_typical_run(dir.path(), 10, 10, 10);
    let err = ArtifactCollector::new().collect(dir.path(), 1).unwrap_err();
    assert!(matches!(err, CollectError::RuntimeLogMissing { .. }), "{err}");
}

#[test]
fn malformed_runtime_log_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_typical_run(dir.path(), 10, 10, 10);
    std::fs::write(dir.path().join("runtime.log"), "1000\n2000\n").unwrap();
    let err = ArtifactCollector::new().collect(dir.path(), 1).unwrap_err();
    assert!(matches!(err, CollectError::RuntimeLogMalformed(_)), "{err}");
}

#[test]
fn zero_recurrences_are_rejected_before_scanning() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArtifactCollector::new().collect(dir.path(), 0).unwrap_err();
    assert_eq!(err, CollectError::InvalidRecurrence);
}

#[test]
fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArtifactCollector::new().collect(&dir.path().join("absent"), 1).unwrap_err();
    assert!(matches!(err, CollectError::Io(_)), "{err}");
}
