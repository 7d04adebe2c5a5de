// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation run before a chain is built.
//!
//! Checks run in order and accumulate, so one pass reports every problem:
//!
//! 1. **Module list**: at least one module is declared
//! 2. **Uniqueness**: module ids are unique (they name tap owners)
//! 3. **Options**: each option is understood by its module type and has a
//!    usable value
//! 4. **Source**: rates, sizes and deviations are in range
//!
//! # Example
//! ```rust
//! use tapline::config::{validate_config, Config, ModuleConfig, ModuleType};
//! use tapline::errors::ValidationError;
//! use std::collections::HashMap;
//!
//! let module = |id: &str| ModuleConfig {
//!     id: id.to_string(),
//!     module_type: ModuleType::FmDemodulator,
//!     options: HashMap::new(),
//! };
//! let config = Config {
//!     logging: Default::default(),
//!     source: Default::default(),
//!     modules: vec![module("fm"), module("fm")],
//! };
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::DuplicateModuleId { module_id: "fm".to_string() }]
//! );
//! ```

use std::collections::HashSet;

use crate::config::consts::MAX_BUFFER_SIZE;
use crate::config::{Config, ModuleConfig};
use crate::errors::ValidationError;
use crate::modules::factory::ModuleOptions;
use crate::observability::messages::validation::{
    DuplicateModuleId, ModuleOptionRejected, ValidationCompleted, ValidationFailed,
    ValidationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::source::{SignalKind, SyntheticSourceConfig};

/// Validate a whole configuration, returning every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    ValidationStarted {
        module_count: config.modules.len(),
    }
    .log();

    let mut errors = Vec::new();
    if config.modules.is_empty() {
        errors.push(ValidationError::EmptyModuleList);
    }
    errors.extend(validate_unique_module_ids(&config.modules));
    for module in &config.modules {
        errors.extend(validate_module_options(module));
    }
    errors.extend(validate_source(&config.source));

    if errors.is_empty() {
        ValidationCompleted {
            module_count: config.modules.len(),
        }
        .log();
        Ok(())
    } else {
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn validate_unique_module_ids(modules: &[ModuleConfig]) -> Vec<ValidationError> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for module in modules {
        if !seen_ids.insert(module.id.as_str()) {
            DuplicateModuleId {
                module_id: &module.id,
            }
            .log();
            errors.push(ValidationError::DuplicateModuleId {
                module_id: module.id.clone(),
            });
        }
    }
    errors
}

fn validate_module_options(module: &ModuleConfig) -> Vec<ValidationError> {
    let supported = module.module_type.supported_options();
    let options = ModuleOptions::new(module);

    // Sorted so error order does not depend on map iteration.
    let mut keys: Vec<&String> = module.options.keys().collect();
    keys.sort();

    let mut errors = Vec::new();
    for key in keys {
        let result = if supported.contains(&key.as_str()) {
            options.check(key)
        } else {
            Err(ValidationError::UnsupportedOption {
                module_id: module.id.clone(),
                option: key.clone(),
            })
        };

        if let Err(error) = result {
            let reason = error.to_string();
            ModuleOptionRejected {
                module_id: &module.id,
                option: key,
                reason: &reason,
            }
            .log();
            errors.push(error);
        }
    }
    errors
}

fn validate_source(source: &SyntheticSourceConfig) -> Vec<ValidationError> {
    let invalid = |field: &'static str, reason: String| ValidationError::InvalidSource { field, reason };

    if !(source.sample_rate.is_finite() && source.sample_rate > 0.0) {
        return vec![invalid("sample_rate", "must be a positive number".to_string())];
    }
    let nyquist = source.sample_rate / 2.0;
    let mut errors = Vec::new();

    if source.buffer_size == 0 || source.buffer_size > MAX_BUFFER_SIZE {
        errors.push(invalid(
            "buffer_size",
            format!("must be between 1 and {}", MAX_BUFFER_SIZE),
        ));
    }
    if source.signal != SignalKind::Tone && source.samples_per_symbol < 2 {
        errors.push(invalid("samples_per_symbol", "must be at least 2".to_string()));
    }
    if (source.tone_hz as f64).abs() >= nyquist {
        errors.push(invalid("tone_hz", format!("must be below {} Hz", nyquist)));
    }
    // Outer C4FM symbols deviate by three times the inner deviation.
    if !(source.deviation_hz > 0.0 && 3.0 * (source.deviation_hz as f64) < nyquist) {
        errors.push(invalid(
            "deviation_hz",
            format!("must be positive and below {} Hz", nyquist / 3.0),
        ));
    }
    if source.sync_pattern >> 48 != 0 {
        errors.push(invalid("sync_pattern", "must fit in 48 bits".to_string()));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleType;
    use std::collections::HashMap;

    fn module(id: &str, module_type: ModuleType, options: &[(&str, serde_yaml::Value)]) -> ModuleConfig {
        ModuleConfig {
            id: id.to_string(),
            module_type,
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn int(n: u64) -> serde_yaml::Value {
        serde_yaml::Value::from(n)
    }

    fn config(modules: Vec<ModuleConfig>) -> Config {
        Config {
            logging: Default::default(),
            source: Default::default(),
            modules,
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = config(vec![
            module("fm", ModuleType::FmDemodulator, &[("batch_size", int(32))]),
            module("c4fm", ModuleType::C4fmDecoder, &[("max_sync_bit_errors", int(2))]),
            module("power", ModuleType::PowerMeter, &[]),
        ]);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_empty_module_list() {
        let errors = validate_config(&config(vec![])).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyModuleList]);
    }

    #[test]
    fn test_duplicate_ids_reported_once_per_repeat() {
        let cfg = config(vec![
            module("a", ModuleType::FmDemodulator, &[]),
            module("a", ModuleType::QpskDemodulator, &[]),
            module("a", ModuleType::PowerMeter, &[]),
        ]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::DuplicateModuleId { module_id } if module_id == "a")));
    }

    #[test]
    fn test_unsupported_and_invalid_options() {
        let cfg = config(vec![module(
            "power",
            ModuleType::PowerMeter,
            &[("batch_size", int(8)), ("interval", int(0))],
        )]);
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnsupportedOption {
                    module_id: "power".to_string(),
                    option: "batch_size".to_string(),
                },
                ValidationError::InvalidOption {
                    module_id: "power".to_string(),
                    option: "interval".to_string(),
                    reason: format!("must be between 1 and {}", u64::MAX),
                },
            ]
        );
    }

    #[test]
    fn test_source_bounds() {
        let mut cfg = config(vec![module("fm", ModuleType::FmDemodulator, &[])]);
        cfg.source.buffer_size = 0;
        cfg.source.deviation_hz = 9_000.0;
        cfg.source.tone_hz = 30_000.0;

        let fields: Vec<&str> = validate_config(&cfg)
            .unwrap_err()
            .into_iter()
            .filter_map(|e| match e {
                ValidationError::InvalidSource { field, .. } => Some(field),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["buffer_size", "tone_hz", "deviation_hz"]);
    }

    #[test]
    fn test_deviation_bound_is_a_third_of_nyquist() {
        let mut cfg = config(vec![module("fm", ModuleType::FmDemodulator, &[])]);
        cfg.source.deviation_hz = 7_999.0;
        assert!(validate_config(&cfg).is_ok());

        cfg.source.deviation_hz = 8_000.0;
        let errors = validate_config(&cfg).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidSource { field: "deviation_hz", .. }]
        ));
    }

    #[test]
    fn test_non_positive_sample_rate_stops_source_checks() {
        let mut cfg = config(vec![module("fm", ModuleType::FmDemodulator, &[])]);
        cfg.source.sample_rate = 0.0;
        cfg.source.buffer_size = 0;
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
