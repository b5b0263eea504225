// crates/psi-eval-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for psi-eval-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use psi_eval_config::ConfigError;
use psi_eval_config::EvalConfig;

/// Parses a TOML string into an `EvalConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<EvalConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<EvalConfig, toml::de::Error> {
    config_from_toml("")
}

/// Checks that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
