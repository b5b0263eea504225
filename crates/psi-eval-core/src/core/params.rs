// crates/psi-eval-core/src/core/params.rs
// ============================================================================
// Module: Run Parameters
// Description: Workload parameters and the sparse evaluation grid.
// Purpose: Enumerate grid cells in sweep order and enforce the sparsity rule.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A grid cell is identified by `(mode, log2_x_size, y_size, m)`. The grid is
//! sparse: recurrence counts other than `1` are only evaluated at
//! [`RECURRENCE_SWEEP_LOG2_X`]. The thread count is forwarded to the protocol
//! binary but is not part of a cell's identity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sender set sizes swept by the harness, as powers of two.
pub const LOG2_X_SIZES: [u32; 3] = [16, 20, 24];
/// Receiver set sizes swept by the harness.
pub const Y_SIZES: [u32; 3] = [4, 16, 64];
/// Recurrence counts swept by the harness.
pub const RECURRENCES: [u32; 4] = [1, 4, 16, 64];
/// The only sender set size at which recurrences other than 1 are executed.
pub const RECURRENCE_SWEEP_LOG2_X: u32 = 20;
/// Default thread count forwarded to the protocol binary.
pub const DEFAULT_THREADS: u32 = 4;

// ============================================================================
// SECTION: Mode
// ============================================================================

/// Operating configuration of the external protocol.
///
/// # Invariants
/// - Ordering follows the numeric code, so `FastSetup` sorts first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Mode `0`: cheap setup, more expensive intersections.
    FastSetup,
    /// Mode `1`: expensive setup, cheap intersections.
    FastIntersection,
}

impl Mode {
    /// Both modes in report column order.
    pub const ALL: [Self; 2] = [Self::FastSetup, Self::FastIntersection];

    /// Returns the numeric code passed to the protocol binary.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::FastSetup => 0,
            Self::FastIntersection => 1,
        }
    }

    /// Parses a numeric mode code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::FastSetup),
            1 => Some(Self::FastIntersection),
            _ => None,
        }
    }

    /// Returns the human-readable label used in report headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FastSetup => "Fast Setup",
            Self::FastIntersection => "Fast Intersection",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// SECTION: Grid Keys
// ============================================================================

/// Returns true when a `(log2_x_size, m)` pair belongs to the sparse grid.
#[must_use]
pub const fn is_grid_cell(log2_x_size: u32, recurrences: u32) -> bool {
    recurrences == 1 || log2_x_size == RECURRENCE_SWEEP_LOG2_X
}

/// Identity of a grid cell, excluding the thread count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellKey {
    /// Protocol mode.
    pub mode: Mode,
    /// Sender set size as a power of two.
    pub log2_x_size: u32,
    /// Receiver set size.
    pub y_size: u32,
    /// Recurrence count `m`.
    pub recurrences: u32,
}

impl CellKey {
    /// Creates a cell key.
    #[must_use]
    pub const fn new(mode: Mode, log2_x_size: u32, y_size: u32, recurrences: u32) -> Self {
        Self {
            mode,
            log2_x_size,
            y_size,
            recurrences,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={}, log2|X|={}, |Y|={}, m={}",
            self.mode, self.log2_x_size, self.y_size, self.recurrences
        )
    }
}

// ============================================================================
// SECTION: Run Parameters
// ============================================================================

/// Parameters for a single invocation of the protocol binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Protocol mode.
    pub mode: Mode,
    /// Sender set size as a power of two.
    pub log2_x_size: u32,
    /// Receiver set size.
    pub y_size: u32,
    /// Recurrence count `m`.
    pub recurrences: u32,
    /// Thread count forwarded to the protocol.
    pub threads: u32,
}

impl RunParameters {
    /// Returns the grid identity of these parameters.
    #[must_use]
    pub const fn key(&self) -> CellKey {
        CellKey::new(self.mode, self.log2_x_size, self.y_size, self.recurrences)
    }

    /// Returns true when these parameters lie on the sparse grid.
    #[must_use]
    pub const fn is_grid_cell(&self) -> bool {
        is_grid_cell(self.log2_x_size, self.recurrences)
    }

    /// Returns the positional arguments expected by the protocol binary:
    /// `mode log2_x_size y_size m threads`.
    #[must_use]
    pub fn protocol_args(&self) -> [String; 5] {
        [
            self.mode.code().to_string(),
            self.log2_x_size.to_string(),
            self.y_size.to_string(),
            self.recurrences.to_string(),
            self.threads.to_string(),
        ]
    }
}

impl fmt::Display for RunParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, threads={}", self.key(), self.threads)
    }
}

// ============================================================================
// SECTION: Parameter Grid
// ============================================================================

/// The fixed evaluation grid with a configurable thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterGrid {
    /// Thread count forwarded to every cell.
    threads: u32,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self::new(DEFAULT_THREADS)
    }
}

impl ParameterGrid {
    /// Creates the grid with the given thread count.
    #[must_use]
    pub const fn new(threads: u32) -> Self {
        Self {
            threads,
        }
    }

    /// Returns the thread count forwarded to every cell.
    #[must_use]
    pub const fn threads(&self) -> u32 {
        self.threads
    }

    /// Enumerates executed cells in sweep order: mode, then `log2_x_size`,
    /// then `y_size`, then `m`. Cells excluded by the sparsity rule are skipped.
    #[must_use]
    pub fn cells(&self) -> Vec<RunParameters> {
        let mut cells = Vec::new();
        for mode in Mode::ALL {
            for log2_x_size in LOG2_X_SIZES {
                for y_size in Y_SIZES {
                    for recurrences in RECURRENCES {
                        if !is_grid_cell(log2_x_size, recurrences) {
                            continue;
                        }
                        cells.push(RunParameters {
                            mode,
                            log2_x_size,
                            y_size,
                            recurrences,
                            threads: self.threads,
                        });
                    }
                }
            }
        }
        cells
    }

    /// Builds parameters for a single cell, rejecting cells outside the grid.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] naming the offending value when the cell is not
    /// part of the grid.
    pub fn cell(
        &self,
        mode: Mode,
        log2_x_size: u32,
        y_size: u32,
        recurrences: u32,
    ) -> Result<RunParameters, GridError> {
        if !LOG2_X_SIZES.contains(&log2_x_size) {
            return Err(GridError::UnknownLog2XSize(log2_x_size));
        }
        if !Y_SIZES.contains(&y_size) {
            return Err(GridError::UnknownYSize(y_size));
        }
        if !RECURRENCES.contains(&recurrences) {
            return Err(GridError::UnknownRecurrence(recurrences));
        }
        if !is_grid_cell(log2_x_size, recurrences) {
            return Err(GridError::SparseCell {
                log2_x_size,
                recurrences,
            });
        }
        Ok(RunParameters {
            mode,
            log2_x_size,
            y_size,
            recurrences,
            threads: self.threads,
        })
    }
}

/// Reasons a requested cell is not part of the evaluation grid.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// The sender set size is not swept.
    #[error("log2|X|={0} is not one of 16, 20, 24")]
    UnknownLog2XSize(u32),
    /// The receiver set size is not swept.
    #[error("|Y|={0} is not one of 4, 16, 64")]
    UnknownYSize(u32),
    /// The recurrence count is not swept.
    #[error("m={0} is not one of 1, 4, 16, 64")]
    UnknownRecurrence(u32),
    /// The cell is excluded by the sparsity rule.
    #[error("m={recurrences} is only evaluated at log2|X|=20, not {log2_x_size}")]
    SparseCell {
        /// Requested sender set size.
        log2_x_size: u32,
        /// Requested recurrence count.
        recurrences: u32,
    },
}

// ============================================================================
// SECTION: Tests
// ============================================================================
