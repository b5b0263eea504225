// crates/psi-eval-core/src/lib.rs
// ============================================================================
// Module: PSI Eval Core Library
// Description: Artifact-evaluation harness for a PSI protocol binary.
// Purpose: Sweep the parameter grid, derive metrics, and build the report.
// Dependencies: serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! PSI Eval drives an external private-set-intersection protocol across a
//! fixed, sparse parameter grid. For each cell it runs the protocol, measures
//! the artifacts the protocol leaves behind, and derives computation and
//! communication metrics. The populated results feed five report tables.
//! Invariants:
//! - Cells run one at a time in a shared staging directory.
//! - Recurrence counts other than 1 exist only at `|X| = 2^20`.
//! - Any external failure aborts the whole run; nothing partial is reported.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod error;
pub mod interfaces;
pub mod report;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;
pub use error::HarnessError;
pub use interfaces::Executor;
pub use interfaces::Typesetter;
pub use report::ProcessTypesetter;
pub use report::ReportRenderer;
pub use report::ReportTableBuilder;
pub use report::TableBlock;
pub use report::TableError;
pub use report::render_summary;
pub use runtime::AdditiveRttModel;
pub use runtime::ArtifactCollector;
pub use runtime::CommandSpec;
pub use runtime::CommunicationModel;
pub use runtime::ExternalProtocol;
pub use runtime::MetricsDeriver;
pub use runtime::ModelKind;
pub use runtime::ResultSnapshot;
pub use runtime::ResultStore;
pub use runtime::StagingDirectory;
pub use runtime::StoreError;
pub use runtime::SweepDriver;
pub use runtime::TcpOverheadConstantModel;
