// crates/psi-eval-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and option resolution.
// Purpose: Ensure flags, config, and environment combine predictably.
// Dependencies: psi-eval-cli main helpers
// ============================================================================

//! ## Overview
//! Validates model and log-level resolution, cell parsing, and the clap
//! definitions of every subcommand.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::CommandFactory;
use clap::Parser;
use psi_eval_config::EvalConfig;
use psi_eval_core::Mode;
use psi_eval_core::ModelKind;

use super::Cli;
use super::Commands;
use super::ModelArg;
use super::RunCellCommand;
use super::log_directive;
use super::parse_cell;
use super::resolve_model;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn run_cell(mode: u8, log2_x_size: u32, y_size: u32, recurrences: u32) -> RunCellCommand {
    RunCellCommand {
        mode,
        log2_x_size,
        y_size,
        recurrences,
        model: None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn rust_log_wins_over_verbose_and_config() {
    assert_eq!(log_directive(Some("psi_eval_core=trace"), true, "warn"), "psi_eval_core=trace");
}

#[test]
fn verbose_raises_the_configured_level() {
    assert_eq!(log_directive(None, true, "warn"), "debug");
    assert_eq!(log_directive(Some("  "), true, "warn"), "debug");
    assert_eq!(log_directive(None, false, "warn"), "warn");
}

#[test]
fn model_flag_overrides_config() {
    let mut config = EvalConfig::default();
    config.metrics.model = ModelKind::TcpOverheadConstant;
    assert_eq!(resolve_model(None, &config), ModelKind::TcpOverheadConstant);
    assert_eq!(resolve_model(Some(ModelArg::AdditiveRtt), &config), ModelKind::AdditiveRtt);
}

#[test]
fn model_values_match_config_spelling() {
    let cli = Cli::try_parse_from(["psi-eval", "sweep", "--model", "tcp_overhead_constant"]).unwrap();
    match cli.command {
        Commands::Sweep(command) => {
            assert_eq!(command.model, Some(ModelArg::TcpOverheadConstant));
            assert!(!command.tex_only);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn cells_use_the_configured_thread_count() {
    let mut config = EvalConfig::default();
    config.protocol.threads = 12;
    let params = parse_cell(&config, &run_cell(1, 20, 16, 4)).unwrap();
    assert_eq!(params.mode, Mode::FastIntersection);
    assert_eq!(params.threads, 12);
    assert_eq!(params.protocol_args(), ["1", "20", "16", "4", "12"]);
}

#[test]
fn cells_outside_the_grid_are_refused() {
    let config = EvalConfig::default();
    let err = parse_cell(&config, &run_cell(0, 24, 4, 64)).unwrap_err();
    assert!(err.to_string().starts_with("invalid cell:"), "{err}");
    assert!(parse_cell(&config, &run_cell(0, 18, 4, 1)).is_err());
}

#[test]
fn mode_codes_are_range_checked() {
    assert!(Cli::try_parse_from(["psi-eval", "run-cell", "2", "20", "4", "1"]).is_err());
    assert!(Cli::try_parse_from(["psi-eval", "run-cell", "1", "20", "4", "1"]).is_ok());
}

#[test]
fn collect_requires_positive_recurrences() {
    assert!(Cli::try_parse_from(["psi-eval", "collect", "--recurrences", "0"]).is_err());
    assert!(Cli::try_parse_from(["psi-eval", "collect"]).is_err());
    let cli = Cli::try_parse_from(["psi-eval", "--verbose", "collect", "-m", "16", "--dir", "out"])
        .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Collect(command) => {
            assert_eq!(command.recurrences, 16);
            assert_eq!(command.dir.as_deref(), Some(std::path::Path::new("out")));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn global_config_flag_follows_subcommands() {
    let cli = Cli::try_parse_from(["psi-eval", "config", "validate", "--config", "alt.toml"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("alt.toml")));
}
