// crates/psi-eval-core/src/runtime/driver.rs
// ============================================================================
// Module: Parameter Sweep Driver
// Description: Sequential execution of the evaluation grid.
// Purpose: Build once, then run, collect and derive every grid cell in order.
// Dependencies: crate::core, crate::interfaces, crate::runtime, tracing
// ============================================================================

//! ## Overview
//! The driver owns the staging directory and an [`Executor`]. It builds the
//! protocol once and then walks [`ParameterGrid::cells`] one cell at a time:
//! clean, run, collect, derive, store, clean. The first error ends the sweep
//! and the partially filled store is dropped with it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::info;

use crate::core::DerivedMetrics;
use crate::core::ParameterGrid;
use crate::core::RunParameters;
use crate::error::HarnessError;
use crate::interfaces::Executor;
use crate::runtime::collector::ArtifactCollector;
use crate::runtime::deriver::MetricsDeriver;
use crate::runtime::staging::StagingDirectory;
use crate::runtime::store::ResultStore;
use crate::runtime::store::StoreError;

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Runs grid cells through an executor and accumulates their metrics.
#[derive(Debug)]
pub struct SweepDriver<'a, E> {
    /// Protocol executor.
    executor: E,
    /// Shared working directory.
    staging: StagingDirectory,
    /// Artifact collector.
    collector: ArtifactCollector,
    /// Metrics deriver.
    deriver: MetricsDeriver<'a>,
    /// Grid to sweep.
    grid: ParameterGrid,
}

impl<'a, E: Executor> SweepDriver<'a, E> {
    /// Creates a driver.
    #[must_use]
    pub fn new(
        executor: E,
        staging: StagingDirectory,
        deriver: MetricsDeriver<'a>,
        grid: ParameterGrid,
    ) -> Self {
        Self {
            executor,
            staging,
            collector: ArtifactCollector::new(),
            deriver,
            grid,
        }
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Builds the protocol and sweeps the whole grid.
    ///
    /// # Errors
    ///
    /// Returns the first [`HarnessError`] raised by the build, any cell, or
    /// the store.
    pub fn sweep(&mut self) -> Result<ResultStore, HarnessError> {
        self.executor.build()?;
        let cells = self.grid.cells();
        let total = cells.len();
        info!(
            cells = total,
            threads = self.grid.threads(),
            model = self.deriver.model_name(),
            "starting sweep"
        );
        let mut store = ResultStore::new();
        for (index, params) in cells.iter().enumerate() {
            info!(cell = %params.key(), index = index + 1, total, "running cell");
            let metrics = self.run_cell(params)?;
            store.insert(params.key(), metrics)?;
        }
        info!(cells = store.len(), "sweep complete");
        Ok(store)
    }

    /// Builds the protocol and runs a single grid cell.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Store`] when the cell is excluded by the
    /// sparsity rule, otherwise any build or cell error.
    pub fn run_single(&mut self, params: &RunParameters) -> Result<DerivedMetrics, HarnessError> {
        if !params.is_grid_cell() {
            return Err(StoreError::OutsideGrid(params.key()).into());
        }
        self.executor.build()?;
        info!(cell = %params.key(), "running cell");
        self.run_cell(params)
    }

    /// Runs one cell inside a fresh staging scope.
    fn run_cell(&mut self, params: &RunParameters) -> Result<DerivedMetrics, HarnessError> {
        let scope = self.staging.enter_cell()?;
        self.executor.run(params, scope.path())?;
        let raw = self.collector.collect(scope.path(), params.recurrences)?;
        scope.finish()?;
        Ok(self.deriver.derive(&raw))
    }
}
