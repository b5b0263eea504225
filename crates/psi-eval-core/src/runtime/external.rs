// crates/psi-eval-core/src/runtime/external.rs
// ============================================================================
// Module: External Protocol
// Description: Process-backed executor for the protocol binary.
// Purpose: Build and run the protocol as child processes.
// Dependencies: crate::interfaces, crate::runtime::process, tracing
// ============================================================================

//! ## Overview
//! [`ExternalProtocol`] runs the build command in the protocol directory and
//! then runs the protocol binary once per cell in the staging directory, with
//! the five cell parameters appended as positional arguments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use tracing::error;
use tracing::info;

use crate::core::RunParameters;
use crate::error::HarnessError;
use crate::interfaces::Executor;
use crate::runtime::process::CommandSpec;

// ============================================================================
// SECTION: External Protocol
// ============================================================================

/// Executor that shells out to the real protocol build and binary.
#[derive(Debug, Clone)]
pub struct ExternalProtocol {
    /// Directory the build command runs in.
    build_dir: PathBuf,
    /// Build command; `None` skips the build step.
    build: Option<CommandSpec>,
    /// Protocol command; cell parameters are appended.
    run: CommandSpec,
}

impl ExternalProtocol {
    /// Creates an executor.
    #[must_use]
    pub fn new(build_dir: impl Into<PathBuf>, build: Option<CommandSpec>, run: CommandSpec) -> Self {
        Self {
            build_dir: build_dir.into(),
            build,
            run,
        }
    }
}

impl Executor for ExternalProtocol {
    fn build(&mut self) -> Result<(), HarnessError> {
        let Some(build) = &self.build else {
            return Ok(());
        };
        let command = build.render(&[]);
        info!(%command, "building protocol");
        build.run_in(&self.build_dir, &[]).map_err(|failure| {
            error!(%command, status = %failure.status, stderr = %failure.stderr, "build failed");
            HarnessError::BuildFailure {
                command,
                status: failure.status,
                stderr: failure.stderr,
            }
        })
    }

    fn run(&mut self, params: &RunParameters, workdir: &Path) -> Result<(), HarnessError> {
        let args = params.protocol_args();
        let command = self.run.render(&args);
        self.run.run_in(workdir, &args).map_err(|failure| {
            error!(%command, status = %failure.status, stderr = %failure.stderr, "protocol run failed");
            HarnessError::RunFailure {
                params: *params,
                command,
                status: failure.status,
                stderr: failure.stderr,
            }
        })
    }
}
