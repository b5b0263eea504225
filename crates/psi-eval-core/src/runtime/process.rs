// crates/psi-eval-core/src/runtime/process.rs
// ============================================================================
// Module: Process Helpers
// Description: Command lines for external tools and captured execution.
// Purpose: Run a child to completion and surface stderr on failure.
// Dependencies: serde, std::process
// ============================================================================

//! ## Overview
//! External tools are described by a [`CommandSpec`]: a program plus leading
//! arguments. Call sites append their own trailing arguments. Output is fully
//! captured; the caller blocks until the child exits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use serde::Serialize;

use crate::error::describe_spawn_error;
use crate::error::describe_status;

// ============================================================================
// SECTION: Command Spec
// ============================================================================

/// A program and its leading arguments.
///
/// # Invariants
/// - `program` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program name or path.
    program: String,
    /// Arguments placed before any call-site arguments.
    args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command spec.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a spec from an argv-style list, returning `None` when it is empty.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Returns the program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Renders the full command line for logs and errors.
    #[must_use]
    pub fn render(&self, extra: &[String]) -> String {
        let mut parts = Vec::with_capacity(1 + self.args.len() + extra.len());
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.extend(extra.iter().map(String::as_str));
        parts.join(" ")
    }

    /// Runs the command in `dir` with `extra` arguments appended and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessFailure`] when the child cannot be started or exits
    /// unsuccessfully.
    pub fn run_in(&self, dir: &Path, extra: &[String]) -> Result<(), ProcessFailure> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .current_dir(dir)
            .output()
            .map_err(|err| ProcessFailure {
                status: describe_spawn_error(&err),
                stderr: String::new(),
            })?;
        if output.status.success() {
            return Ok(());
        }
        Err(ProcessFailure {
            status: describe_status(output.status),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Captured outcome of a failed child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    /// How the child ended.
    pub status: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
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
    fn from_argv_rejects_empty() {
        assert_eq!(CommandSpec::from_argv(&[]), None);
        assert_eq!(CommandSpec::from_argv(&[" ".to_string()]), None);
    }

    #[test]
    fn render_joins_all_parts() {
        let spec = CommandSpec::from_argv(&["make".to_string(), "protocol".to_string()]).unwrap();
        assert_eq!(spec.render(&[]), "make protocol");
        assert_eq!(spec.render(&["-j4".to_string()]), "make protocol -j4");
    }

    #[cfg(unix)]
    #[test]
    fn run_in_captures_stderr_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new(
            "sh",
            vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
        );
        let failure = spec.run_in(dir.path(), &[]).unwrap_err();
        assert_eq!(failure.status, "exited with code 3");
        assert_eq!(failure.stderr.trim(), "boom");
    }

    #[test]
    fn run_in_reports_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("psi-eval-definitely-missing-program", Vec::new());
        let failure = spec.run_in(dir.path(), &[]).unwrap_err();
        assert!(failure.status.starts_with("could not be started"), "{}", failure.status);
    }
}
