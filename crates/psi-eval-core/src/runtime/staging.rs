// crates/psi-eval-core/src/runtime/staging.rs
// ============================================================================
// Module: Staging Directory
// Description: Scoped ownership of the protocol's shared working directory.
// Purpose: Guarantee a clean directory before and after every grid cell.
// Dependencies: crate::core, crate::error, tracing
// ============================================================================

//! ## Overview
//! The protocol binary writes its artifacts into its current working
//! directory, so every cell shares one directory. [`StagingDirectory`] owns
//! that directory and hands out at most one [`CellScope`] at a time; the
//! mutable borrow makes concurrent cells unrepresentable.
//!
//! Only transient files are touched: files whose name ends in `.tmp`
//! and the runtime log. Everything else in the directory (sources, build
//! outputs) is left alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::core::is_artifact_name;
use crate::core::RUNTIME_LOG_NAME;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Staging Directory
// ============================================================================

/// The shared working directory the protocol writes into.
#[derive(Debug)]
pub struct StagingDirectory {
    /// Directory path.
    root: PathBuf,
}

impl StagingDirectory {
    /// Takes ownership of `root`, creating it when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Staging`] when the path cannot be created or is
    /// not a directory.
    pub fn acquire(root: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            HarnessError::Staging(format!("cannot create {}: {err}", root.display()))
        })?;
        if !root.is_dir() {
            return Err(HarnessError::Staging(format!("{} is not a directory", root.display())));
        }
        Ok(Self {
            root,
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Removes every transient file and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Staging`] when the directory cannot be listed or
    /// a transient file cannot be removed.
    pub fn clean(&self) -> Result<usize, HarnessError> {
        let entries = fs::read_dir(&self.root).map_err(|err| {
            HarnessError::Staging(format!("cannot list {}: {err}", self.root.display()))
        })?;
        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|err| HarnessError::Staging(err.to_string()))?;
            let path = entry.path();
            if !path.is_file() || !is_transient(&path) {
                continue;
            }
            fs::remove_file(&path).map_err(|err| {
                HarnessError::Staging(format!("cannot remove {}: {err}", path.display()))
            })?;
            removed += 1;
        }
        if removed > 0 {
            debug!(dir = %self.root.display(), removed, "cleaned staging directory");
        }
        Ok(removed)
    }

    /// Cleans the directory and opens a scope for one grid cell.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Staging`] when the initial clean fails.
    pub fn enter_cell(&mut self) -> Result<CellScope<'_>, HarnessError> {
        self.clean()?;
        Ok(CellScope {
            staging: self,
            finished: false,
        })
    }
}

/// Returns true for files the protocol leaves behind between cells.
fn is_transient(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| is_artifact_name(name) || name == RUNTIME_LOG_NAME)
}

// ============================================================================
// SECTION: Cell Scope
// ============================================================================

/// Exclusive use of the staging directory for one grid cell.
///
/// Dropping an unfinished scope cleans the directory on a best-effort basis.
#[derive(Debug)]
pub struct CellScope<'a> {
    /// Borrowed staging directory.
    staging: &'a mut StagingDirectory,
    /// Set once [`CellScope::finish`] has cleaned up.
    finished: bool,
}

impl CellScope<'_> {
    /// Returns the directory the cell runs in.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.staging.path()
    }

    /// Cleans the directory and closes the scope.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Staging`] when cleaning fails.
    pub fn finish(mut self) -> Result<(), HarnessError> {
        self.finished = true;
        self.staging.clean().map(|_| ())
    }
}

impl Drop for CellScope<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.staging.clean() {
            warn!(error = %err, "failed to clean staging directory after an aborted cell");
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
