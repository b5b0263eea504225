// crates/psi-eval-cli/src/main.rs
// ============================================================================
// Module: PSI Eval CLI Entry Point
// Description: Command dispatcher for sweeps, single cells, and reports.
// Purpose: Wire configuration, logging, and the process-backed tools together.
// Dependencies: clap, psi-eval-config, psi-eval-core, serde_json, thiserror,
// tracing, tracing-subscriber.
// ============================================================================

//! ## Overview
//! `psi-eval` drives the external PSI protocol over the evaluation grid and
//! turns the results into the report document. Every subcommand loads the
//! config first, then installs logging on stderr. Summaries, JSON, and output
//! paths go to stdout. Any failure ends the command with a nonzero exit code
//! and the captured diagnostics on stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use psi_eval_config::EvalConfig;
use psi_eval_core::ArtifactCollector;
use psi_eval_core::DerivedMetrics;
use psi_eval_core::ExternalProtocol;
use psi_eval_core::MetricsDeriver;
use psi_eval_core::Mode;
use psi_eval_core::ModelKind;
use psi_eval_core::ProcessTypesetter;
use psi_eval_core::ReportRenderer;
use psi_eval_core::ReportTableBuilder;
use psi_eval_core::ResultSnapshot;
use psi_eval_core::ResultStore;
use psi_eval_core::RunParameters;
use psi_eval_core::StagingDirectory;
use psi_eval_core::SweepDriver;
use psi_eval_core::render_summary;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "psi-eval", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to `PSI_EVAL_CONFIG`, then psi-eval.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless `RUST_LOG` is set.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the protocol, sweep the whole grid, and produce the report.
    Sweep(SweepCommand),
    /// Summarize the artifacts already present in a directory.
    Collect(CollectCommand),
    /// Build the protocol and run a single grid cell.
    RunCell(RunCellCommand),
    /// Produce the report from a saved results file.
    Report(ReportCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `sweep` command.
#[derive(Args, Debug)]
struct SweepCommand {
    /// Communication model (overrides `[metrics] model`).
    #[arg(long, value_enum)]
    model: Option<ModelArg>,
    /// Write the document source without typesetting it.
    #[arg(long)]
    tex_only: bool,
}

/// Arguments for the `collect` command.
#[derive(Args, Debug)]
struct CollectCommand {
    /// Number of recurrent intersections the artifacts cover.
    #[arg(long, short = 'm', value_parser = clap::value_parser!(u32).range(1 ..))]
    recurrences: u32,
    /// Directory holding the artifacts (defaults to `[protocol] workdir`).
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
    /// Communication model (overrides `[metrics] model`).
    #[arg(long, value_enum)]
    model: Option<ModelArg>,
}

/// Arguments for the `run-cell` command.
#[derive(Args, Debug)]
struct RunCellCommand {
    /// Protocol mode code: 0 for Fast Setup, 1 for Fast Intersection.
    #[arg(value_parser = clap::value_parser!(u8).range(0 ..= 1))]
    mode: u8,
    /// Sender set size as a power of two.
    log2_x_size: u32,
    /// Receiver set size.
    y_size: u32,
    /// Number of recurrent intersections.
    recurrences: u32,
    /// Communication model (overrides `[metrics] model`).
    #[arg(long, value_enum)]
    model: Option<ModelArg>,
}

/// Arguments for the `report` command.
#[derive(Args, Debug)]
struct ReportCommand {
    /// Results file written by a previous sweep.
    #[arg(long, value_name = "FILE")]
    results: PathBuf,
    /// Write the document source without typesetting it.
    #[arg(long)]
    tex_only: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the config and print the effective settings as JSON.
    Validate,
}

/// Communication model selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModelArg {
    /// RTT added per direction, everything averaged over the recurrences.
    #[value(name = "additive_rtt")]
    AdditiveRtt,
    /// 4% protocol overhead and two RTTs per exchange.
    #[value(name = "tcp_overhead_constant")]
    TcpOverheadConstant,
}

impl From<ModelArg> for ModelKind {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::AdditiveRtt => Self::AdditiveRtt,
            ModelArg::TcpOverheadConstant => Self::TcpOverheadConstant,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads config, installs logging, and dispatches the command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = EvalConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let rust_log = std::env::var("RUST_LOG").ok();
    init_logging(&log_directive(rust_log.as_deref(), cli.verbose, &config.logging.level));

    match cli.command {
        Commands::Sweep(command) => command_sweep(&config, &command),
        Commands::Collect(command) => command_collect(&config, &command),
        Commands::RunCell(command) => command_run_cell(&config, &command),
        Commands::Report(command) => command_report(&config, &command),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(&config),
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Returns the filter directive: `RUST_LOG` first, then `--verbose`, then the
/// configured level.
fn log_directive(rust_log: Option<&str>, verbose: bool, configured: &str) -> String {
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None if verbose => "debug".to_string(),
        None => configured.to_string(),
    }
}

/// Installs the stderr fmt subscriber.
fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `sweep` command.
fn command_sweep(config: &EvalConfig, command: &SweepCommand) -> CliResult<ExitCode> {
    let model = resolve_model(command.model, config);
    let mut driver = sweep_driver(config, model)?;
    let store = driver.sweep().map_err(|err| CliError::new(err.to_string()))?;
    if let Some(path) = config.report.results_path() {
        ensure_dir(&config.report.output_dir)?;
        store.snapshot(model).write(&path).map_err(|err| CliError::new(err.to_string()))?;
        info!(path = %path.display(), cells = store.len(), "saved results");
        write_stdout_line(&format!("results: {}", path.display()))?;
    }
    produce_report(config, &store, command.tex_only)
}

/// Executes the `collect` command.
fn command_collect(config: &EvalConfig, command: &CollectCommand) -> CliResult<ExitCode> {
    let model = resolve_model(command.model, config);
    let dir = command.dir.as_deref().unwrap_or(config.protocol.workdir.as_path());
    let raw = ArtifactCollector::new()
        .collect(dir, command.recurrences)
        .map_err(|err| CliError::new(format!("collection failed: {err}")))?;
    let metrics = MetricsDeriver::for_kind(model).derive(&raw);
    write_summary(&metrics)
}

/// Executes the `run-cell` command.
fn command_run_cell(config: &EvalConfig, command: &RunCellCommand) -> CliResult<ExitCode> {
    let params = parse_cell(config, command)?;
    let model = resolve_model(command.model, config);
    let mut driver = sweep_driver(config, model)?;
    let metrics = driver.run_single(&params).map_err(|err| CliError::new(err.to_string()))?;
    write_summary(&metrics)
}

/// Executes the `report` command.
fn command_report(config: &EvalConfig, command: &ReportCommand) -> CliResult<ExitCode> {
    let snapshot =
        ResultSnapshot::read(&command.results).map_err(|err| CliError::new(err.to_string()))?;
    let store = ResultStore::from_snapshot(&snapshot)
        .map_err(|err| CliError::new(format!("invalid results file: {err}")))?;
    info!(cells = store.len(), model = %snapshot.model, "loaded results");
    produce_report(config, &store, command.tex_only)
}

/// Executes the `config validate` command.
fn command_config_validate(config: &EvalConfig) -> CliResult<ExitCode> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|err| CliError::new(format!("failed to serialize config: {err}")))?;
    write_stdout_line(&json)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the command-line model, or the configured one.
fn resolve_model(arg: Option<ModelArg>, config: &EvalConfig) -> ModelKind {
    arg.map_or(config.metrics.model, ModelKind::from)
}

/// Builds parameters for the requested cell, refusing cells off the grid.
fn parse_cell(config: &EvalConfig, command: &RunCellCommand) -> CliResult<RunParameters> {
    let mode = Mode::from_code(command.mode)
        .ok_or_else(|| CliError::new(format!("unknown mode {}", command.mode)))?;
    config
        .protocol
        .grid()
        .cell(mode, command.log2_x_size, command.y_size, command.recurrences)
        .map_err(|err| CliError::new(format!("invalid cell: {err}")))
}

/// Wires the process-backed executor into a sweep driver.
fn sweep_driver(
    config: &EvalConfig,
    model: ModelKind,
) -> CliResult<SweepDriver<'static, ExternalProtocol>> {
    let run = config.protocol.run_command().map_err(|err| CliError::new(err.to_string()))?;
    let workdir = &config.protocol.workdir;
    let staging = StagingDirectory::acquire(workdir).map_err(|err| CliError::new(err.to_string()))?;
    let protocol = ExternalProtocol::new(workdir, config.protocol.build_command(), run);
    Ok(SweepDriver::new(protocol, staging, MetricsDeriver::for_kind(model), config.protocol.grid()))
}

/// Builds the tables and writes, and optionally typesets, the document.
fn produce_report(config: &EvalConfig, store: &ResultStore, tex_only: bool) -> CliResult<ExitCode> {
    let blocks = ReportTableBuilder::new(store)
        .build()
        .map_err(|err| CliError::new(format!("report assembly failed: {err}")))?;
    let report = &config.report;
    let renderer = ReportRenderer::new(&report.output_dir, &report.tex_file, &report.pdf_file);
    if tex_only {
        let source = renderer.write_source(&blocks).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("source: {}", source.display()))?;
        return Ok(ExitCode::SUCCESS);
    }
    let command = report.typesetter_command().map_err(|err| CliError::new(err.to_string()))?;
    let mut typesetter = ProcessTypesetter::new(command);
    let output =
        renderer.render(&blocks, &mut typesetter).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("source: {}", output.source.display()))?;
    if let Some(document) = output.document {
        write_stdout_line(&format!("document: {}", document.display()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Creates `dir` and its parents.
fn ensure_dir(dir: &Path) -> CliResult<()> {
    fs::create_dir_all(dir)
        .map_err(|err| CliError::new(format!("cannot create {}: {err}", dir.display())))
}

/// Prints the text summary of one cell.
fn write_summary(metrics: &DerivedMetrics) -> CliResult<ExitCode> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(render_summary(metrics).as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
