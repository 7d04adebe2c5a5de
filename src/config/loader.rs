// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::source::SyntheticSourceConfig;

/// Complete configuration for one processing chain.
///
/// Loaded from YAML (or TOML, chosen by file extension). Modules are listed in
/// processing order; every module receives every source buffer.
///
/// # Example
/// ```yaml
/// logging:
///   level: debug
/// source:
///   signal: c4fm
///   buffer_count: 500
/// modules:
///   - id: c4fm
///     type: c4fm_decoder
///     options:
///       batch_size: 32
///   - id: power
///     type: power_meter
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub source: SyntheticSourceConfig,
    pub modules: Vec<ModuleConfig>,
}

/// Logging settings handed to `observability::init_tracing`.
///
/// # Fields
/// * `level` - Default filter level; `RUST_LOG` overrides it when set
/// * `show_target` - Include the module path in each line
/// * `ansi` - Colourise output
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub show_target: bool,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_target: false,
            ansi: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration for a single module in the chain.
///
/// # Fields
/// * `id` - Unique identifier, also the module's tap owner name
/// * `module_type` - Implementation to build (`type` in the file)
/// * `options` - Implementation-specific settings
///
/// # Example
/// ```yaml
/// id: "qpsk"
/// type: qpsk_demodulator
/// options:
///   samples_per_symbol: 8
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

/// Module implementations that can be named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    FmDemodulator,
    C4fmDecoder,
    QpskDemodulator,
    PowerMeter,
}

impl ModuleType {
    pub const ALL: [ModuleType; 4] = [
        ModuleType::FmDemodulator,
        ModuleType::C4fmDecoder,
        ModuleType::QpskDemodulator,
        ModuleType::PowerMeter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::FmDemodulator => "fm_demodulator",
            ModuleType::C4fmDecoder => "c4fm_decoder",
            ModuleType::QpskDemodulator => "qpsk_demodulator",
            ModuleType::PowerMeter => "power_meter",
        }
    }

    /// Option keys this module type understands.
    pub fn supported_options(&self) -> &'static [&'static str] {
        match self {
            ModuleType::FmDemodulator => &["batch_size"],
            ModuleType::C4fmDecoder => &[
                "batch_size",
                "samples_per_symbol",
                "deviation_hz",
                "sync_pattern",
                "max_sync_bit_errors",
            ],
            ModuleType::QpskDemodulator => &["batch_size", "samples_per_symbol"],
            ModuleType::PowerMeter => &["interval"],
        }
    }
}

/// Load a config from a YAML or TOML file, picked by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        "toml" => Ok(toml::from_str(&content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Load a config and run `validate_config` over it.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
