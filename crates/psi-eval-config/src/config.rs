// crates/psi-eval-config/src/config.rs
// ============================================================================
// Module: PSI Eval Configuration
// Description: Configuration loading and validation for the harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: psi-eval-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then [`CONFIG_ENV_VAR`], then
//! [`DEFAULT_CONFIG_NAME`] in the working directory. Only the default file
//! may be absent, in which case the built-in defaults apply. Any other
//! missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use psi_eval_core::CommandSpec;
use psi_eval_core::DEFAULT_THREADS;
use psi_eval_core::ModelKind;
use psi_eval_core::ParameterGrid;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "psi-eval.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PSI_EVAL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of entries in a configured command line.
pub(crate) const MAX_COMMAND_ARGS: usize = 64;
/// Maximum worker thread count passed to the protocol.
pub(crate) const MAX_THREADS: u32 = 1024;
/// Accepted log levels.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    /// Protocol build and execution.
    #[serde(default)]
    pub protocol: ProtocolConfig,
    /// Metric derivation.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Report output.
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EvalConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env::var(CONFIG_ENV_VAR).ok())?;
        validate_path(&resolved.path)?;
        let bytes = match fs::read(&resolved.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound && resolved.is_default => {
                let mut config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.path.display())));
            }
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.protocol.validate()?;
        self.report.validate()?;
        self.logging.validate()
    }
}

/// Protocol build and execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Staging directory the protocol runs in and writes artifacts to.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Program and leading arguments; the five cell parameters are appended.
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Build command run once before a sweep. Empty to skip the build.
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,
    /// Worker thread count passed to every run.
    #[serde(default = "default_threads")]
    pub threads: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
            command: default_command(),
            build_command: default_build_command(),
            threads: default_threads(),
        }
    }
}

impl ProtocolConfig {
    /// Returns the protocol command.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the command is empty.
    pub fn run_command(&self) -> Result<CommandSpec, ConfigError> {
        CommandSpec::from_argv(&self.command)
            .ok_or_else(|| ConfigError::Invalid("protocol.command must be non-empty".to_string()))
    }

    /// Returns the build command, or `None` when the build is skipped.
    #[must_use]
    pub fn build_command(&self) -> Option<CommandSpec> {
        CommandSpec::from_argv(&self.build_command)
    }

    /// Returns the parameter grid for the configured thread count.
    #[must_use]
    pub const fn grid(&self) -> ParameterGrid {
        ParameterGrid::new(self.threads)
    }

    /// Validates protocol settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("protocol.workdir", &self.workdir.to_string_lossy())?;
        validate_command("protocol.command", &self.command, false)?;
        validate_command("protocol.build_command", &self.build_command, true)?;
        if self.threads == 0 {
            return Err(ConfigError::Invalid(
                "protocol.threads must be greater than zero".to_string(),
            ));
        }
        if self.threads > MAX_THREADS {
            return Err(ConfigError::Invalid(format!(
                "protocol.threads must be at most {MAX_THREADS}"
            )));
        }
        Ok(())
    }
}

/// Metric derivation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Communication-time model.
    #[serde(default)]
    pub model: ModelKind,
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory receiving the document source and the final document.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Document source file name.
    #[serde(default = "default_tex_file")]
    pub tex_file: String,
    /// Final document file name.
    #[serde(default = "default_pdf_file")]
    pub pdf_file: String,
    /// Typesetter program and leading arguments; the source name is appended.
    #[serde(default = "default_typesetter")]
    pub typesetter: Vec<String>,
    /// Results file written after a successful sweep, inside `output_dir`.
    #[serde(default = "default_results_file")]
    pub results_file: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            tex_file: default_tex_file(),
            pdf_file: default_pdf_file(),
            typesetter: default_typesetter(),
            results_file: default_results_file(),
        }
    }
}

impl ReportConfig {
    /// Returns the typesetter command.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the command is empty.
    pub fn typesetter_command(&self) -> Result<CommandSpec, ConfigError> {
        CommandSpec::from_argv(&self.typesetter)
            .ok_or_else(|| ConfigError::Invalid("report.typesetter must be non-empty".to_string()))
    }

    /// Returns the full results file path, when persistence is enabled.
    #[must_use]
    pub fn results_path(&self) -> Option<PathBuf> {
        self.results_file.as_ref().map(|name| self.output_dir.join(name))
    }

    /// Validates report settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("report.output_dir", &self.output_dir.to_string_lossy())?;
        validate_file_name("report.tex_file", &self.tex_file)?;
        validate_file_name("report.pdf_file", &self.pdf_file)?;
        if let Some(results) = &self.results_file {
            validate_file_name("report.results_file", results)?;
        }
        if self.tex_file == self.pdf_file {
            return Err(ConfigError::Invalid(
                "report.tex_file and report.pdf_file must differ".to_string(),
            ));
        }
        validate_command("report.typesetter", &self.typesetter, false)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Validates and normalizes the level.
    fn validate(&mut self) -> Result<(), ConfigError> {
        let level = self.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        self.level = level;
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// A resolved config path and whether it is the implicit default.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedPath {
    /// Path to read.
    path: PathBuf,
    /// True when neither the caller nor the environment named a file.
    is_default: bool,
}

/// Resolves the config path from the caller, the environment, or the default.
fn resolve_path(path: Option<&Path>, env_value: Option<String>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            is_default: false,
        });
    }
    if let Some(env_path) = env_value.filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            is_default: false,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        is_default: true,
    })
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates that a value is a single, plain file name.
fn validate_file_name(field: &str, value: &str) -> Result<(), ConfigError> {
    validate_path_string(field, value)?;
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == value => Ok(()),
        _ => Err(ConfigError::Invalid(format!("{field} must be a plain file name"))),
    }
}

/// Validates a command line. An empty list is accepted only when `optional`.
fn validate_command(field: &str, argv: &[String], optional: bool) -> Result<(), ConfigError> {
    if argv.is_empty() {
        if optional {
            return Ok(());
        }
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if argv.len() > MAX_COMMAND_ARGS {
        return Err(ConfigError::Invalid(format!(
            "{field} exceeds {MAX_COMMAND_ARGS} entries"
        )));
    }
    if argv.iter().any(|arg| arg.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!("{field} entries must be non-blank")));
    }
    validate_path_string(field, &argv[0])
}

/// Default staging directory.
fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

/// Default protocol command.
fn default_command() -> Vec<String> {
    vec!["./protocol.exe".to_string()]
}

/// Default build command.
fn default_build_command() -> Vec<String> {
    vec!["make".to_string(), "protocol".to_string()]
}

/// Default worker thread count.
const fn default_threads() -> u32 {
    DEFAULT_THREADS
}

/// Default report directory.
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Default document source name.
fn default_tex_file() -> String {
    "main.tex".to_string()
}

/// Default final document name.
fn default_pdf_file() -> String {
    "artifact-evaluation.pdf".to_string()
}

/// Default typesetter command.
fn default_typesetter() -> Vec<String> {
    vec!["pdflatex".to_string()]
}

/// Default results file name.
#[allow(clippy::unnecessary_wraps, reason = "Serde default for an optional field.")]
fn default_results_file() -> Option<String> {
    Some("results.json".to_string())
}

/// Default log level.
fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
