// crates/psi-eval-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared artifact writers, mock executors, and populated stores.
// Purpose: Keep integration tests focused on behavior instead of setup.
// Dependencies: psi-eval-core, tempfile
// ============================================================================

//! ## Overview
//! Helpers that write protocol-shaped artifacts into a directory, a mock
//! [`Executor`] that fabricates them per cell, and a fully populated
//! [`ResultStore`] whose values encode their own cell.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use psi_eval_core::CellKey;
use psi_eval_core::DerivedMetrics;
use psi_eval_core::Executor;
use psi_eval_core::HarnessError;
use psi_eval_core::Mode;
use psi_eval_core::ParameterGrid;
use psi_eval_core::ResultStore;
use psi_eval_core::RunParameters;

// ============================================================================
// SECTION: Artifact Writers
// ============================================================================

/// Writes a file of `size` zero bytes.
pub fn write_sized(dir: &Path, name: &str, size: usize) {
    fs::write(dir.join(name), vec![0_u8; size]).unwrap();
}

/// Writes a three-line runtime log.
pub fn write_runtime_log(dir: &Path, millis: [&str; 3]) {
    fs::write(dir.join("runtime.log"), format!("{}\n{}\n{}\n", millis[0], millis[1], millis[2]))
        .unwrap();
}

/// Writes a typical set of artifacts: one table, two sender and two receiver
/// files.
pub fn write_typical_run(dir: &Path, table: usize, sender: usize, receiver: usize) {
    write_sized(dir, "encrypted_table.tmp", table);
    write_sized(dir, "q0_E_0.tmp", sender / 2);
    write_sized(dir, "q0_E_1.tmp", sender - sender / 2);
    write_sized(dir, "q0_D_0.tmp", receiver / 2);
    write_sized(dir, "q0_R_0.tmp", receiver - receiver / 2);
}

// ============================================================================
// SECTION: Mock Executor
// ============================================================================

/// Executor that writes fabricated artifacts and records every call.
#[derive(Debug, Default)]
pub struct MockExecutor {
    /// Number of build calls.
    pub builds: usize,
    /// Cells run, in order.
    pub runs: Vec<RunParameters>,
    /// Stale transient files seen at the start of a run.
    pub stale_files_seen: usize,
    /// Fail the build.
    pub fail_build: bool,
    /// Fail on the run with this zero-based index.
    pub fail_on_run: Option<usize>,
    /// Write an unclassifiable artifact on the run with this index.
    pub bad_artifact_on_run: Option<usize>,
}

impl Executor for MockExecutor {
    fn build(&mut self) -> Result<(), HarnessError> {
        self.builds += 1;
        if self.fail_build {
            return Err(HarnessError::BuildFailure {
                command: "make protocol".to_string(),
                status: "exited with code 2".to_string(),
                stderr: "missing compiler".to_string(),
            });
        }
        Ok(())
    }

    fn run(&mut self, params: &RunParameters, workdir: &Path) -> Result<(), HarnessError> {
        let index = self.runs.len();
        self.runs.push(*params);
        self.stale_files_seen += fs::read_dir(workdir)
            .unwrap()
            .filter(|entry| {
                let name = entry.as_ref().unwrap().file_name();
                let name = name.to_string_lossy();
                name.ends_with(".tmp") || name == "runtime.log"
            })
            .count();
        if self.fail_on_run == Some(index) {
            return Err(HarnessError::RunFailure {
                params: *params,
                command: "./protocol.exe".to_string(),
                status: "exited with code 1".to_string(),
                stderr: "segfault".to_string(),
            });
        }
        let m = params.recurrences as usize;
        write_typical_run(workdir, 4096, 2048 * m, 1024 * m);
        if self.bad_artifact_on_run == Some(index) {
            write_sized(workdir, "q0_X_0.tmp", 1);
        }
        write_runtime_log(workdir, ["1000", "2000", "4000"]);
        Ok(())
    }
}

// ============================================================================
// SECTION: Stores
// ============================================================================

/// Returns a value that encodes its cell: `mode·1000 + log2x·10 + y/4 + m/100`.
pub fn cell_marker(key: CellKey) -> f64 {
    f64::from(key.mode.code()) * 1000.0
        + f64::from(key.log2_x_size) * 10.0
        + f64::from(key.y_size) / 4.0
        + f64::from(key.recurrences) / 100.0
}

/// Builds metrics whose every entry equals `value`.
pub fn uniform_metrics(value: f64) -> DerivedMetrics {
    let mut metrics = DerivedMetrics::default();
    for record in [
        &mut metrics.comp_time,
        &mut metrics.comm_cost,
        &mut metrics.comm_time_10g,
        &mut metrics.comm_time_100m,
        &mut metrics.total_time_10g,
        &mut metrics.total_time_100m,
    ] {
        for split in [&mut record.sender, &mut record.receiver, &mut record.total] {
            split.one_time = value;
            split.recurrent = value;
        }
    }
    metrics
}

/// Returns a store holding every grid cell, valued by [`cell_marker`].
pub fn full_store() -> ResultStore {
    let mut store = ResultStore::new();
    for params in ParameterGrid::default().cells() {
        let key = params.key();
        store.insert(key, uniform_metrics(cell_marker(key))).unwrap();
    }
    store
}

/// Returns the key for a Fast Setup cell.
pub const fn fast_setup(log2_x_size: u32, y_size: u32, recurrences: u32) -> CellKey {
    CellKey::new(Mode::FastSetup, log2_x_size, y_size, recurrences)
}
