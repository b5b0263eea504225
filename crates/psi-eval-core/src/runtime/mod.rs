// crates/psi-eval-core/src/runtime/mod.rs
// ============================================================================
// Module: PSI Eval Runtime
// Description: Staging, collection, derivation, and the sweep driver.
// Purpose: Execute the evaluation grid and accumulate derived metrics.
// Dependencies: crate::core, crate::interfaces, serde_json, tracing
// ============================================================================

//! ## Overview
//! The runtime turns grid cells into stored metrics. Execution is strictly
//! sequential: one cell owns the staging directory at a time.
//! Invariants:
//! - The staging directory holds no transient files between cells.
//! - The first failure aborts the sweep; no partial store is returned.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod collector;
pub mod deriver;
pub mod driver;
pub mod external;
pub mod process;
pub mod staging;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use collector::ArtifactCollector;
pub use deriver::AdditiveRttModel;
pub use deriver::CommunicationModel;
pub use deriver::MetricsDeriver;
pub use deriver::ModelKind;
pub use deriver::TCP_OVERHEAD_FACTOR;
pub use deriver::TcpOverheadConstantModel;
pub use driver::SweepDriver;
pub use external::ExternalProtocol;
pub use process::CommandSpec;
pub use process::ProcessFailure;
pub use staging::CellScope;
pub use staging::StagingDirectory;
pub use store::ResultEntry;
pub use store::ResultSnapshot;
pub use store::ResultStore;
pub use store::StoreError;
