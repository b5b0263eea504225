// crates/psi-eval-core/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Failure taxonomy for the sweep and report pipeline.
// Purpose: Give every fatal condition a stable, programmatically matchable variant.
// Dependencies: crate::core, crate::report, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! No failure is retried or recovered locally. Any [`HarnessError`] ends the
//! current pipeline invocation and discards metrics collected so far. Variants
//! for external tools carry the captured stderr so it can be surfaced as-is.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::ExitStatus;

use thiserror::Error;

use crate::core::CollectError;
use crate::core::RunParameters;
use crate::report::TableError;
use crate::runtime::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal pipeline errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The protocol build command failed.
    #[error("build failed: `{command}` {status}\n{stderr}")]
    BuildFailure {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured stderr.
        stderr: String,
    },
    /// The protocol binary failed for one grid cell.
    #[error("protocol run failed ({params}): `{command}` {status}\n{stderr}")]
    RunFailure {
        /// Cell being executed.
        params: RunParameters,
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured stderr.
        stderr: String,
    },
    /// Artifacts or the runtime log could not be collected.
    #[error("collection failed: {0}")]
    CollectionFailure(#[from] CollectError),
    /// The typesetting tool failed.
    #[error("render failed: `{command}` {status}\n{stderr}")]
    RenderFailure {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured stderr.
        stderr: String,
    },
    /// The staging directory could not be prepared or cleaned.
    #[error("staging directory error: {0}")]
    Staging(String),
    /// A derived result conflicted with the result store.
    #[error("result store error: {0}")]
    Store(#[from] StoreError),
    /// Report tables could not be assembled.
    #[error("report assembly failed: {0}")]
    Report(#[from] TableError),
    /// A report or results file could not be written or read.
    #[error("output error: {0}")]
    Output(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Describes how a child process ended, for error messages.
#[must_use]
pub fn describe_status(status: ExitStatus) -> String {
    status.code().map_or_else(
        || "terminated by a signal".to_string(),
        |code| format!("exited with code {code}"),
    )
}

/// Describes a child process that could not be started.
#[must_use]
pub fn describe_spawn_error(error: &std::io::Error) -> String {
    format!("could not be started ({error})")
}
