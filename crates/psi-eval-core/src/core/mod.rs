// crates/psi-eval-core/src/core/mod.rs
// ============================================================================
// Module: PSI Eval Core Types
// Description: Canonical grid, artifact, and metric structures.
// Purpose: Provide stable, serializable types shared by every pipeline stage.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types describe the evaluation grid, the raw measurements harvested
//! from one protocol run, and the metrics derived from them. They carry no
//! I/O and no policy beyond their own invariants.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod artifacts;
pub mod metrics;
pub mod params;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use artifacts::ARTIFACT_SUFFIX;
pub use artifacts::ArtifactCategory;
pub use artifacts::ArtifactManifest;
pub use artifacts::CollectError;
pub use artifacts::ONE_TIME_ARTIFACT_NAME;
pub use artifacts::RUNTIME_LOG_NAME;
pub use artifacts::RawMeasurements;
pub use artifacts::RuntimeLog;
pub use artifacts::classify_artifact;
pub use artifacts::is_artifact_name;
pub use metrics::Actor;
pub use metrics::DerivedMetrics;
pub use metrics::MetricCategory;
pub use metrics::MetricRecord;
pub use metrics::NetworkProfile;
pub use metrics::Split;
pub use metrics::bytes_to_mib;
pub use metrics::millis_to_seconds;
pub use params::CellKey;
pub use params::DEFAULT_THREADS;
pub use params::GridError;
pub use params::LOG2_X_SIZES;
pub use params::Mode;
pub use params::ParameterGrid;
pub use params::RECURRENCE_SWEEP_LOG2_X;
pub use params::RECURRENCES;
pub use params::RunParameters;
pub use params::Y_SIZES;
pub use params::is_grid_cell;
