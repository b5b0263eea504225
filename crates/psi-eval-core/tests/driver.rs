// crates/psi-eval-core/tests/driver.rs
// ============================================================================
// Module: Sweep Driver Tests
// Description: Grid execution through a mock executor.
// ============================================================================
//! ## Overview
//! Validates sweep order, the sparsity law, clean staging between cells, and
//! that every failure aborts the sweep without a partial result.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use psi_eval_core::CellKey;
use psi_eval_core::CollectError;
use psi_eval_core::HarnessError;
use psi_eval_core::LOG2_X_SIZES;
use psi_eval_core::MetricsDeriver;
use psi_eval_core::Mode;
use psi_eval_core::ModelKind;
use psi_eval_core::ParameterGrid;
use psi_eval_core::RECURRENCES;
use psi_eval_core::RunParameters;
use psi_eval_core::StagingDirectory;
use psi_eval_core::StoreError;
use psi_eval_core::SweepDriver;
use psi_eval_core::Y_SIZES;

use crate::common::MockExecutor;

fn driver(executor: MockExecutor, dir: &std::path::Path) -> SweepDriver<'static, MockExecutor> {
    SweepDriver::new(
        executor,
        StagingDirectory::acquire(dir).unwrap(),
        MetricsDeriver::for_kind(ModelKind::AdditiveRtt),
        ParameterGrid::new(4),
    )
}

#[test]
fn sweep_runs_every_grid_cell_once_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = driver(MockExecutor::default(), dir.path());
    let store = driver.sweep().unwrap();

    assert_eq!(store.len(), 36);
    assert_eq!(driver.executor().builds, 1);
    let expected: Vec<_> = ParameterGrid::new(4).cells();
    assert_eq!(driver.executor().runs, expected);
    assert_eq!(driver.executor().stale_files_seen, 0);
}

#[test]
fn sweep_respects_the_sparsity_law() {
    let dir = tempfile::tempdir().unwrap();
    let store = driver(MockExecutor::default(), dir.path()).sweep().unwrap();
    for mode in Mode::ALL {
        for log2_x_size in LOG2_X_SIZES {
            for y_size in Y_SIZES {
                for recurrences in RECURRENCES {
                    let key = CellKey::new(mode, log2_x_size, y_size, recurrences);
                    let expected = recurrences == 1 || log2_x_size == 20;
                    assert_eq!(store.get(key).is_some(), expected, "{key}");
                }
            }
        }
    }
}

#[test]
fn sweep_leaves_the_staging_directory_clean() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Makefile"), "protocol:\n").unwrap();
    driver(MockExecutor::default(), dir.path()).sweep().unwrap();
    let remaining: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(remaining, vec!["Makefile".to_string()]);
}

#[test]
fn stored_metrics_reflect_each_cells_recurrences() {
    let dir = tempfile::tempdir().unwrap();
    let store = driver(MockExecutor::default(), dir.path()).sweep().unwrap();
    for recurrences in RECURRENCES {
        let metrics = store.get(CellKey::new(Mode::FastSetup, 20, 16, recurrences)).unwrap();
        assert_eq!(metrics.comp_time.sender.recurrent, 2.0 / f64::from(recurrences));
        assert_eq!(metrics.comm_cost.sender.recurrent, 2048.0 / 1_048_576.0);
    }
}

#[test]
fn build_failure_stops_before_any_cell() {
    let dir = tempfile::tempdir().unwrap();
    let executor = MockExecutor {
        fail_build: true,
        ..MockExecutor::default()
    };
    let mut driver = driver(executor, dir.path());
    let err = driver.sweep().unwrap_err();
    assert!(matches!(err, HarnessError::BuildFailure { .. }), "{err}");
    assert!(driver.executor().runs.is_empty());
}

#[test]
fn run_failure_aborts_the_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let executor = MockExecutor {
        fail_on_run: Some(5),
        ..MockExecutor::default()
    };
    let mut driver = driver(executor, dir.path());
    let err = driver.sweep().unwrap_err();
    match err {
        HarnessError::RunFailure {
            params,
            stderr,
            ..
        } => {
            assert_eq!(params, ParameterGrid::new(4).cells()[5]);
            assert_eq!(stderr, "segfault");
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(driver.executor().runs.len(), 6);
}

#[test]
fn collection_failure_aborts_the_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let executor = MockExecutor {
        bad_artifact_on_run: Some(2),
        ..MockExecutor::default()
    };
    let mut driver = driver(executor, dir.path());
    let err = driver.sweep().unwrap_err();
    assert!(
        matches!(err, HarnessError::CollectionFailure(CollectError::UnknownArtifact { .. })),
        "{err}"
    );
    assert_eq!(driver.executor().runs.len(), 3);
    assert!(!dir.path().join("q0_X_0.tmp").exists());
}

#[test]
fn run_single_rejects_sparse_holes() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = driver(MockExecutor::default(), dir.path());
    let params = RunParameters {
        mode: Mode::FastIntersection,
        log2_x_size: 24,
        y_size: 4,
        recurrences: 64,
        threads: 4,
    };
    let err = driver.run_single(&params).unwrap_err();
    assert!(matches!(err, HarnessError::Store(StoreError::OutsideGrid(_))), "{err}");
    assert_eq!(driver.executor().builds, 0);
}

#[test]
fn run_single_builds_and_derives_one_cell() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = driver(MockExecutor::default(), dir.path());
    let params = ParameterGrid::new(4).cell(Mode::FastSetup, 20, 64, 4).unwrap();
    let metrics = driver.run_single(&params).unwrap();
    assert_eq!(metrics.comp_time.receiver.recurrent, 1.0);
    assert_eq!(driver.executor().builds, 1);
    assert_eq!(driver.executor().runs, vec![params]);
}
