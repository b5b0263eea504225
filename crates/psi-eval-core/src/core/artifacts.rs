// crates/psi-eval-core/src/core/artifacts.rs
// ============================================================================
// Module: Artifact Measurements
// Description: Raw byte and timing measurements harvested from one protocol run.
// Purpose: Define the artifact naming contract and its classification rules.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The protocol binary leaves transient `.tmp` files and a three-line
//! `runtime.log` in its working directory. File sizes are aggregated per
//! [`ArtifactCategory`] into an [`ArtifactManifest`]; the log is parsed into a
//! [`RuntimeLog`]. Both are raw: no unit conversion happens here.
//!
//! Classification is exhaustive. A file that matches no rule is an error, so
//! no bytes are ever dropped silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name suffix carried by every transient artifact file.
pub const ARTIFACT_SUFFIX: &str = ".tmp";
/// Literal name of the one-time sender artifact (the encrypted table).
pub const ONE_TIME_ARTIFACT_NAME: &str = "encrypted_table.tmp";
/// Name of the runtime log written by the protocol binary.
pub const RUNTIME_LOG_NAME: &str = "runtime.log";
/// Character index that encodes an artifact's origin.
pub const ORIGIN_INDEX: usize = 3;

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Category an artifact's bytes are aggregated into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    /// Sent once by the sender during setup.
    SenderOneTime,
    /// Sent by the sender on every intersection.
    SenderRecurrent,
    /// Sent by the receiver on every intersection.
    ReceiverRecurrent,
}

impl ArtifactCategory {
    /// All categories in report order.
    pub const ALL: [Self; 3] = [Self::SenderOneTime, Self::SenderRecurrent, Self::ReceiverRecurrent];

    /// Returns a stable label for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SenderOneTime => "sender_one_time",
            Self::SenderRecurrent => "sender_recurrent",
            Self::ReceiverRecurrent => "receiver_recurrent",
        }
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when `file_name` names a transient artifact.
///
/// Any name ending in the artifact suffix qualifies, including the bare
/// suffix itself.
#[must_use]
pub fn is_artifact_name(file_name: &str) -> bool {
    file_name.ends_with(ARTIFACT_SUFFIX)
}

/// Classifies a transient artifact by file name.
///
/// The one-time table is matched by its literal name. Every other file is
/// classified by the character at [`ORIGIN_INDEX`]: `E` marks sender output,
/// `D` and `R` mark receiver output.
///
/// # Errors
///
/// Returns [`CollectError::UnknownArtifact`] when no rule matches, including
/// names too short to carry an origin character.
pub fn classify_artifact(file_name: &str) -> Result<ArtifactCategory, CollectError> {
    if file_name == ONE_TIME_ARTIFACT_NAME {
        return Ok(ArtifactCategory::SenderOneTime);
    }
    match file_name.chars().nth(ORIGIN_INDEX) {
        Some('E') => Ok(ArtifactCategory::SenderRecurrent),
        Some('D' | 'R') => Ok(ArtifactCategory::ReceiverRecurrent),
        _ => Err(CollectError::UnknownArtifact {
            file_name: file_name.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Aggregated byte counts per artifact category for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    /// Bytes in the one-time sender artifact.
    pub sender_one_time: u64,
    /// Bytes in recurrent sender artifacts.
    pub sender_recurrent: u64,
    /// Bytes in recurrent receiver artifacts.
    pub receiver_recurrent: u64,
    /// Number of files that contributed to the totals.
    pub file_count: usize,
}

impl ArtifactManifest {
    /// Classifies and aggregates `(file name, size)` pairs.
    ///
    /// The result does not depend on enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::UnknownArtifact`] on the first unclassifiable name.
    pub fn from_sizes<'a, I>(entries: I) -> Result<Self, CollectError>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut manifest = Self::default();
        for (file_name, bytes) in entries {
            manifest.add(classify_artifact(file_name)?, bytes);
        }
        Ok(manifest)
    }

    /// Adds bytes to a category.
    pub fn add(&mut self, category: ArtifactCategory, bytes: u64) {
        let slot = match category {
            ArtifactCategory::SenderOneTime => &mut self.sender_one_time,
            ArtifactCategory::SenderRecurrent => &mut self.sender_recurrent,
            ArtifactCategory::ReceiverRecurrent => &mut self.receiver_recurrent,
        };
        *slot = slot.saturating_add(bytes);
        self.file_count += 1;
    }

    /// Returns the aggregated bytes for a category.
    #[must_use]
    pub const fn bytes(&self, category: ArtifactCategory) -> u64 {
        match category {
            ArtifactCategory::SenderOneTime => self.sender_one_time,
            ArtifactCategory::SenderRecurrent => self.sender_recurrent,
            ArtifactCategory::ReceiverRecurrent => self.receiver_recurrent,
        }
    }

    /// Returns the total bytes across all categories.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.sender_one_time
            .saturating_add(self.sender_recurrent)
            .saturating_add(self.receiver_recurrent)
    }
}

// ============================================================================
// SECTION: Runtime Log
// ============================================================================

/// Wall-clock timings reported by the protocol binary, in milliseconds.
///
/// # Invariants
/// - All values are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuntimeLog {
    /// Sender setup time.
    pub sender_one_time_ms: f64,
    /// Sender time summed over all recurrences.
    pub sender_recurrent_ms: f64,
    /// Receiver time summed over all recurrences.
    pub receiver_recurrent_ms: f64,
}

impl RuntimeLog {
    /// Parses the three-line log format.
    ///
    /// Surrounding whitespace on each line and a trailing newline are tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::RuntimeLogMalformed`] unless the content is
    /// exactly three finite, non-negative numbers, one per line.
    pub fn parse(content: &str) -> Result<Self, CollectError> {
        let lines: Vec<&str> = content.trim_end().lines().map(str::trim).collect();
        if lines.len() != 3 {
            return Err(CollectError::RuntimeLogMalformed(format!(
                "expected 3 lines, found {}",
                lines.len()
            )));
        }
        let sender_one_time_ms = parse_millis(1, lines[0])?;
        let sender_recurrent_ms = parse_millis(2, lines[1])?;
        let receiver_recurrent_ms = parse_millis(3, lines[2])?;
        Ok(Self {
            sender_one_time_ms,
            sender_recurrent_ms,
            receiver_recurrent_ms,
        })
    }
}

/// Parses one log line as milliseconds.
fn parse_millis(line_no: usize, raw: &str) -> Result<f64, CollectError> {
    let value: f64 = raw.parse().map_err(|_| {
        CollectError::RuntimeLogMalformed(format!("line {line_no} is not a number: {raw:?}"))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(CollectError::RuntimeLogMalformed(format!(
            "line {line_no} must be a finite, non-negative number: {raw:?}"
        )));
    }
    Ok(value)
}

// ============================================================================
// SECTION: Raw Measurements
// ============================================================================

/// Everything harvested from one protocol run, before unit conversion.
///
/// # Invariants
/// - `recurrences` is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawMeasurements {
    /// Aggregated artifact sizes.
    pub manifest: ArtifactManifest,
    /// Parsed runtime log.
    pub runtime: RuntimeLog,
    /// Recurrence count `m` the run was executed with.
    pub recurrences: u32,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Artifact collection errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    /// An artifact name matched no classification rule.
    #[error("unknown artifact: {file_name}")]
    UnknownArtifact {
        /// Offending file name.
        file_name: String,
    },
    /// The working directory contained no transient artifacts.
    #[error("no .tmp artifacts found in {}", .dir.display())]
    NoArtifacts {
        /// Scanned directory.
        dir: PathBuf,
    },
    /// The runtime log could not be read.
    #[error("runtime log {} unreadable: {reason}", .path.display())]
    RuntimeLogMissing {
        /// Expected log location.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },
    /// The runtime log content is not three numeric lines.
    #[error("runtime log malformed: {0}")]
    RuntimeLogMalformed(String),
    /// The recurrence count was zero.
    #[error("recurrence count must be at least 1")]
    InvalidRecurrence,
    /// Listing or inspecting the working directory failed.
    #[error("artifact scan failed: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
