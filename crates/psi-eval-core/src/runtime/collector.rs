// crates/psi-eval-core/src/runtime/collector.rs
// ============================================================================
// Module: Artifact Collector
// Description: Harvests artifact sizes and the runtime log from a directory.
// Purpose: Turn one protocol run's side effects into raw measurements.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! The collector lists every file whose name ends in `.tmp`, following
//! symlinks, classifies each by name and sums its size into an
//! [`ArtifactManifest`]. File contents are never read. It then parses the
//! runtime log beside them. Any file that cannot be classified aborts
//! collection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::core::ArtifactManifest;
use crate::core::CollectError;
use crate::core::RUNTIME_LOG_NAME;
use crate::core::RawMeasurements;
use crate::core::RuntimeLog;
use crate::core::classify_artifact;
use crate::core::is_artifact_name;

// ============================================================================
// SECTION: Collector
// ============================================================================

/// Collects raw measurements from a protocol working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactCollector;

impl ArtifactCollector {
    /// Creates a collector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classifies and sums every `.tmp` artifact in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Io`] when the directory cannot be listed,
    /// [`CollectError::UnknownArtifact`] for an unclassifiable name, and
    /// [`CollectError::NoArtifacts`] when no artifact is present.
    pub fn manifest(&self, dir: &Path) -> Result<ArtifactManifest, CollectError> {
        let entries = fs::read_dir(dir)
            .map_err(|err| CollectError::Io(format!("cannot list {}: {err}", dir.display())))?;
        let mut sizes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| CollectError::Io(err.to_string()))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !is_artifact_name(&file_name) {
                continue;
            }
            let path = entry.path();
            // Follows symlinks: a linked artifact counts with its target's size.
            let metadata = fs::metadata(&path).map_err(|err| {
                CollectError::Io(format!("cannot stat {}: {err}", path.display()))
            })?;
            if !metadata.is_file() {
                continue;
            }
            sizes.push((file_name, metadata.len()));
        }
        if sizes.is_empty() {
            return Err(CollectError::NoArtifacts {
                dir: dir.to_path_buf(),
            });
        }
        sizes.sort();
        let mut manifest = ArtifactManifest::default();
        for (file_name, bytes) in sizes {
            let category = classify_artifact(&file_name)?;
            debug!(file = %file_name, bytes, %category, "classified artifact");
            manifest.add(category, bytes);
        }
        Ok(manifest)
    }

    /// Reads and parses the runtime log in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::RuntimeLogMissing`] when the log cannot be read
    /// and [`CollectError::RuntimeLogMalformed`] when it is not three numbers.
    pub fn runtime_log(&self, dir: &Path) -> Result<RuntimeLog, CollectError> {
        let path = dir.join(RUNTIME_LOG_NAME);
        let content = fs::read_to_string(&path).map_err(|err| CollectError::RuntimeLogMissing {
            path: path.clone(),
            reason: err.to_string(),
        })?;
        RuntimeLog::parse(&content)
    }

    /// Collects everything one run left in `dir`, executed with `recurrences`
    /// intersections.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidRecurrence`] when `recurrences` is zero,
    /// plus any error from [`Self::manifest`] or [`Self::runtime_log`].
    pub fn collect(&self, dir: &Path, recurrences: u32) -> Result<RawMeasurements, CollectError> {
        if recurrences == 0 {
            return Err(CollectError::InvalidRecurrence);
        }
        let manifest = self.manifest(dir)?;
        let runtime = self.runtime_log(dir)?;
        debug!(
            files = manifest.file_count,
            total_bytes = manifest.total_bytes(),
            recurrences,
            "collected raw measurements"
        );
        Ok(RawMeasurements {
            manifest,
            runtime,
            recurrences,
        })
    }
}
