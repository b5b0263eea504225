// crates/psi-eval-core/src/runtime/store.rs
// ============================================================================
// Module: Result Store
// Description: In-memory accumulation of derived metrics keyed by grid cell.
// Purpose: Hold the sweep's results and persist them as JSON snapshots.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The store is a four-level map `mode → log2_x_size → y_size → m`. Inserts
//! are checked against the grid, so a cell the sparsity rule excludes can
//! never be present. A cell may be written only once.
//!
//! A [`ResultSnapshot`] is the serialized form, written after a successful
//! sweep so reports can be regenerated without re-running the protocol.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::CellKey;
use crate::core::DerivedMetrics;
use crate::core::LOG2_X_SIZES;
use crate::core::Mode;
use crate::core::RECURRENCES;
use crate::core::Y_SIZES;
use crate::core::is_grid_cell;
use crate::error::HarnessError;
use crate::runtime::deriver::ModelKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Metrics for one `log2_x_size`, keyed by `y_size` then `m`.
type BySize = BTreeMap<u32, BTreeMap<u32, DerivedMetrics>>;

/// Accumulated metrics for the whole grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    /// `mode → log2_x_size → y_size → m → metrics`.
    cells: BTreeMap<Mode, BTreeMap<u32, BySize>>,
    /// Number of stored cells.
    len: usize,
}

impl ResultStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores metrics for a cell.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OutsideGrid`] for a cell not on the grid and
    /// [`StoreError::DuplicateCell`] when the cell already has metrics.
    pub fn insert(&mut self, key: CellKey, metrics: DerivedMetrics) -> Result<(), StoreError> {
        if !on_grid(key) {
            return Err(StoreError::OutsideGrid(key));
        }
        let slot = self
            .cells
            .entry(key.mode)
            .or_default()
            .entry(key.log2_x_size)
            .or_default()
            .entry(key.y_size)
            .or_default();
        if slot.contains_key(&key.recurrences) {
            return Err(StoreError::DuplicateCell(key));
        }
        slot.insert(key.recurrences, metrics);
        self.len += 1;
        Ok(())
    }

    /// Returns the metrics for a cell, if stored.
    #[must_use]
    pub fn get(&self, key: CellKey) -> Option<&DerivedMetrics> {
        self.cells
            .get(&key.mode)?
            .get(&key.log2_x_size)?
            .get(&key.y_size)?
            .get(&key.recurrences)
    }

    /// Returns the number of stored cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates stored cells in key order.
    pub fn iter(&self) -> impl Iterator<Item = (CellKey, &DerivedMetrics)> + '_ {
        self.cells.iter().flat_map(|(mode, by_x)| {
            by_x.iter().flat_map(move |(log2_x_size, by_y)| {
                by_y.iter().flat_map(move |(y_size, by_m)| {
                    by_m.iter().map(move |(recurrences, metrics)| {
                        (CellKey::new(*mode, *log2_x_size, *y_size, *recurrences), metrics)
                    })
                })
            })
        })
    }

    /// Captures the store as a serializable snapshot.
    #[must_use]
    pub fn snapshot(&self, model: ModelKind) -> ResultSnapshot {
        ResultSnapshot {
            model,
            entries: self
                .iter()
                .map(|(key, metrics)| ResultEntry {
                    key,
                    metrics: *metrics,
                })
                .collect(),
        }
    }

    /// Rebuilds a store from a snapshot, re-checking every entry.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] raised by [`Self::insert`].
    pub fn from_snapshot(snapshot: &ResultSnapshot) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for entry in &snapshot.entries {
            store.insert(entry.key, entry.metrics)?;
        }
        Ok(store)
    }
}

/// Returns true when every coordinate of `key` is part of the grid.
fn on_grid(key: CellKey) -> bool {
    LOG2_X_SIZES.contains(&key.log2_x_size)
        && Y_SIZES.contains(&key.y_size)
        && RECURRENCES.contains(&key.recurrences)
        && is_grid_cell(key.log2_x_size, key.recurrences)
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Serialized form of a [`ResultStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultSnapshot {
    /// Communication model the metrics were derived with.
    pub model: ModelKind,
    /// Stored cells in key order.
    pub entries: Vec<ResultEntry>,
}

/// One stored cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultEntry {
    /// Cell identity.
    pub key: CellKey,
    /// Derived metrics.
    pub metrics: DerivedMetrics,
}

impl ResultSnapshot {
    /// Writes the snapshot to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Output`] when serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<(), HarnessError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| HarnessError::Output(format!("cannot serialize results: {err}")))?;
        fs::write(path, json).map_err(|err| {
            HarnessError::Output(format!("cannot write {}: {err}", path.display()))
        })
    }

    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Output`] when the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, HarnessError> {
        let bytes = fs::read(path).map_err(|err| {
            HarnessError::Output(format!("cannot read {}: {err}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|err| {
            HarnessError::Output(format!("invalid results file {}: {err}", path.display()))
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Result store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The cell already has metrics.
    #[error("duplicate result for cell ({0})")]
    DuplicateCell(CellKey),
    /// The cell is not part of the evaluation grid.
    #[error("cell ({0}) is not part of the evaluation grid")]
    OutsideGrid(CellKey),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn insert_rejects_sparse_holes() {
        let mut store = ResultStore::new();
        let key = CellKey::new(Mode::FastSetup, 24, 4, 16);
        assert_eq!(
            store.insert(key, DerivedMetrics::default()),
            Err(StoreError::OutsideGrid(key))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut store = ResultStore::new();
        let key = CellKey::new(Mode::FastIntersection, 20, 64, 16);
        store.insert(key, DerivedMetrics::default()).unwrap();
        assert_eq!(
            store.insert(key, DerivedMetrics::default()),
            Err(StoreError::DuplicateCell(key))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn iter_follows_key_order() {
        let mut store = ResultStore::new();
        let later = CellKey::new(Mode::FastIntersection, 16, 4, 1);
        let earlier = CellKey::new(Mode::FastSetup, 24, 64, 1);
        store.insert(later, DerivedMetrics::default()).unwrap();
        store.insert(earlier, DerivedMetrics::default()).unwrap();
        let keys: Vec<CellKey> = store.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![earlier, later]);
    }

    #[test]
    fn snapshot_file_rebuilds_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut store = ResultStore::new();
        let mut metrics = DerivedMetrics::default();
        metrics.comp_time.sender.one_time = 1.25;
        store.insert(CellKey::new(Mode::FastSetup, 20, 16, 4), metrics).unwrap();
        store.snapshot(ModelKind::TcpOverheadConstant).write(&path).unwrap();

        let snapshot = ResultSnapshot::read(&path).unwrap();
        assert_eq!(snapshot.model, ModelKind::TcpOverheadConstant);
        assert_eq!(ResultStore::from_snapshot(&snapshot).unwrap(), store);
    }
}
