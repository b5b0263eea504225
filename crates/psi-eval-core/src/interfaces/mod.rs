// crates/psi-eval-core/src/interfaces/mod.rs
// ============================================================================
// Module: PSI Eval Interfaces
// Description: Seams between the harness and the external tools it drives.
// Purpose: Let the protocol binary and the typesetter be replaced in tests.
// Dependencies: crate::core, crate::error
// ============================================================================

//! ## Overview
//! The harness never talks to external programs directly. The sweep driver
//! goes through an [`Executor`] and the report renderer goes through a
//! [`Typesetter`]. Process-backed implementations live in
//! [`crate::runtime::ExternalProtocol`] and [`crate::report::ProcessTypesetter`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use crate::core::RunParameters;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Runs the protocol under test.
///
/// Implementations block until the protocol finishes. No timeout applies.
pub trait Executor {
    /// Builds the protocol once, before any cell runs.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::BuildFailure`] when the build does not succeed.
    fn build(&mut self) -> Result<(), HarnessError>;

    /// Runs one grid cell. Artifacts and the runtime log must be written into
    /// `workdir`; the driver collects the [`crate::core::ArtifactManifest`]
    /// from there once the run succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::RunFailure`] when the protocol does not succeed.
    fn run(&mut self, params: &RunParameters, workdir: &Path) -> Result<(), HarnessError>;
}

// ============================================================================
// SECTION: Typesetter
// ============================================================================

/// Turns a document source file into the final report document.
pub trait Typesetter {
    /// Typesets `source` and returns the path of the produced document.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::RenderFailure`] when the tool does not succeed.
    fn typeset(&mut self, source: &Path) -> Result<PathBuf, HarnessError>;
}
