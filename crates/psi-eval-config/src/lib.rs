// crates/psi-eval-config/src/lib.rs
// ============================================================================
// Module: PSI Eval Config Library
// Description: Canonical harness config model and validation.
// Purpose: Single source of truth for psi-eval.toml semantics.
// Dependencies: psi-eval-core, serde, toml
// ============================================================================

//! ## Overview
//! `psi-eval-config` defines the configuration model for the PSI evaluation
//! harness: where the protocol runs, how metrics are derived, where the
//! report goes, and how verbose logging is. Loading is strict and fails
//! closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
