//! Tool configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file overrides only the keys it names.
//!
//! ## Config File Location
//!
//! `print-grade` looks for `config.toml` in the current directory, or uses the
//! file given with `--config`. A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [print]
//! sizes = []                # Catalog sizes to evaluate, e.g. ["16x20", "24x36"]; empty = all
//! min_dpi = 150             # Default threshold for `check-size`
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [batch]
//! recursive = true          # Descend into subdirectories
//! cache = true              # Reuse reports for unchanged files
//! ```
//!
//! Analyzer thresholds and score weights are compile-time constants and are
//! not configurable. Unknown keys are rejected to catch typos early.

use crate::print_size::{self, PrintSize};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintGradeConfig {
    /// Print-size evaluation settings.
    pub print: PrintConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Folder analysis settings.
    pub batch: BatchConfig,
}

impl PrintGradeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.print.size_filter()?;
        if self.print.min_dpi == 0 {
            return Err(ConfigError::Validation(
                "print.min_dpi must be greater than 0".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Print-size evaluation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    /// Catalog sizes as `"WxH"` strings. Empty evaluates the whole catalog.
    pub sizes: Vec<String>,
    /// Minimum DPI for `check-size` when `--min-dpi` is not given.
    pub min_dpi: u32,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            sizes: Vec::new(),
            min_dpi: print_size::SELLABLE_DPI,
        }
    }
}

impl PrintConfig {
    /// Parse `sizes` into a filter for the print grader.
    pub fn size_filter(&self) -> Result<Vec<PrintSize>, ConfigError> {
        print_size::parse_sizes(&self.sizes)
            .map_err(|e| ConfigError::Validation(format!("print.sizes: {e}")))
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel analysis workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Folder analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub recursive: bool,
    pub cache: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            cache: true,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PrintGradeConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(file: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !file.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(file)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PrintGradeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrintGradeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from the given directory.
pub fn load_config(dir: &Path) -> Result<PrintGradeConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE_NAME))
}

/// Load an explicit config file, merged over stock defaults.
pub fn load_config_file(file: &Path) -> Result<PrintGradeConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(file)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# print-grade Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Print sizes
# ---------------------------------------------------------------------------
[print]
# Catalog sizes to evaluate, as "WxH" inches. Empty evaluates all of:
# 8x10 11x14 12x18 16x20 18x24 20x30 24x36 30x40 40x60
sizes = []

# Minimum DPI a `check-size` run must reach to pass.
min_dpi = 150

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel analysis workers for folder runs.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Folder analysis
# ---------------------------------------------------------------------------
[batch]
# Descend into subdirectories.
recursive = true

# Reuse stored reports for files whose contents have not changed.
cache = true
"##
}
