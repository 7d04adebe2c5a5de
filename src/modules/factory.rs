// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde_yaml::Value;

use super::{C4fmDecoder, C4fmDecoderConfig, FmDemodulator, PowerMeter, QpskDemodulator};
use crate::config::consts::{
    DEFAULT_BATCH_SIZE, DEFAULT_DEVIATION_HZ, DEFAULT_MAX_SYNC_BIT_ERRORS,
    DEFAULT_POWER_INTERVAL, DEFAULT_SAMPLES_PER_SYMBOL, MAX_BATCH_SIZE, P25_SYNC_PATTERN,
};
use crate::config::{ModuleConfig, ModuleType};
use crate::errors::ValidationError;
use crate::traits::Module;

/// Factory for building chain modules from configuration
pub struct ModuleFactory;

impl ModuleFactory {
    /// Create a module instance from configuration
    ///
    /// The `type` field selects the implementation; `options` tune it:
    /// - "fm_demodulator" -> FmDemodulator (`batch_size`)
    /// - "c4fm_decoder" -> C4fmDecoder (`batch_size`, `samples_per_symbol`,
    ///   `deviation_hz`, `sync_pattern`, `max_sync_bit_errors`)
    /// - "qpsk_demodulator" -> QpskDemodulator (`batch_size`, `samples_per_symbol`)
    /// - "power_meter" -> PowerMeter (`interval`)
    pub fn create_module(config: &ModuleConfig, sample_rate: f64) -> Result<Arc<dyn Module>, String> {
        Self::build(config, sample_rate).map_err(|e| e.to_string())
    }

    fn build(config: &ModuleConfig, sample_rate: f64) -> Result<Arc<dyn Module>, ValidationError> {
        let options = ModuleOptions::new(config);
        let module: Arc<dyn Module> = match config.module_type {
            ModuleType::FmDemodulator => {
                Arc::new(FmDemodulator::new(config.id.as_str(), options.batch_size()?))
            }
            ModuleType::C4fmDecoder => Arc::new(C4fmDecoder::new(
                config.id.as_str(),
                C4fmDecoderConfig {
                    sample_rate: sample_rate as f32,
                    samples_per_symbol: options.samples_per_symbol()?,
                    deviation_hz: options.deviation_hz()?,
                    sync_pattern: options.sync_pattern()?,
                    max_sync_bit_errors: options.max_sync_bit_errors()?,
                    batch_size: options.batch_size()?,
                },
            )),
            ModuleType::QpskDemodulator => Arc::new(QpskDemodulator::new(
                config.id.as_str(),
                options.samples_per_symbol()?,
                options.batch_size()?,
            )),
            ModuleType::PowerMeter => {
                Arc::new(PowerMeter::new(config.id.as_str(), options.interval()?))
            }
        };
        Ok(module)
    }

    /// List all module implementations by their config name
    pub fn list_available_implementations() -> Vec<&'static str> {
        ModuleType::ALL.iter().map(ModuleType::as_str).collect()
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(impl_name: &str) -> bool {
        Self::list_available_implementations().contains(&impl_name)
    }
}

/// Typed access to a module's `options` map with defaults.
pub(crate) struct ModuleOptions<'a> {
    config: &'a ModuleConfig,
}

impl<'a> ModuleOptions<'a> {
    pub(crate) fn new(config: &'a ModuleConfig) -> Self {
        Self { config }
    }

    /// Parse one option by key, discarding the value.
    pub(crate) fn check(&self, key: &str) -> Result<(), ValidationError> {
        match key {
            "batch_size" => self.batch_size().map(drop),
            "samples_per_symbol" => self.samples_per_symbol().map(drop),
            "deviation_hz" => self.deviation_hz().map(drop),
            "sync_pattern" => self.sync_pattern().map(drop),
            "max_sync_bit_errors" => self.max_sync_bit_errors().map(drop),
            "interval" => self.interval().map(drop),
            _ => Err(ValidationError::UnsupportedOption {
                module_id: self.config.id.clone(),
                option: key.to_string(),
            }),
        }
    }

    pub(crate) fn batch_size(&self) -> Result<usize, ValidationError> {
        self.bounded_u64("batch_size", DEFAULT_BATCH_SIZE as u64, 1, MAX_BATCH_SIZE as u64)
            .map(|v| v as usize)
    }

    pub(crate) fn samples_per_symbol(&self) -> Result<usize, ValidationError> {
        self.bounded_u64("samples_per_symbol", DEFAULT_SAMPLES_PER_SYMBOL as u64, 2, 1_000)
            .map(|v| v as usize)
    }

    pub(crate) fn deviation_hz(&self) -> Result<f32, ValidationError> {
        self.positive_f32("deviation_hz", DEFAULT_DEVIATION_HZ)
    }

    pub(crate) fn max_sync_bit_errors(&self) -> Result<u32, ValidationError> {
        self.bounded_u64("max_sync_bit_errors", DEFAULT_MAX_SYNC_BIT_ERRORS as u64, 0, 48)
            .map(|v| v as u32)
    }

    pub(crate) fn interval(&self) -> Result<u64, ValidationError> {
        self.bounded_u64("interval", DEFAULT_POWER_INTERVAL, 1, u64::MAX)
    }

    /// Accepts an integer or a `0x`-prefixed hex string.
    pub(crate) fn sync_pattern(&self) -> Result<u64, ValidationError> {
        let pattern = match self.get("sync_pattern") {
            None => return Ok(P25_SYNC_PATTERN),
            Some(Value::String(text)) => {
                let digits = text.trim_start_matches("0x").replace('_', "");
                u64::from_str_radix(&digits, 16)
                    .map_err(|e| self.invalid("sync_pattern", e.to_string()))?
            }
            Some(value) => value
                .as_u64()
                .ok_or_else(|| self.invalid("sync_pattern", "must be an integer or hex string"))?,
        };
        if pattern >> 48 != 0 {
            return Err(self.invalid("sync_pattern", "must fit in 48 bits"));
        }
        Ok(pattern)
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.config.options.get(key)
    }

    fn invalid(&self, key: &str, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidOption {
            module_id: self.config.id.clone(),
            option: key.to_string(),
            reason: reason.into(),
        }
    }

    fn bounded_u64(&self, key: &str, default: u64, min: u64, max: u64) -> Result<u64, ValidationError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        let number = value
            .as_u64()
            .ok_or_else(|| self.invalid(key, "must be a non-negative integer"))?;
        if number < min || number > max {
            return Err(self.invalid(key, format!("must be between {} and {}", min, max)));
        }
        Ok(number)
    }

    fn positive_f32(&self, key: &str, default: f32) -> Result<f32, ValidationError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value.as_f64() {
            Some(number) if number > 0.0 && number.is_finite() => Ok(number as f32),
            _ => Err(self.invalid(key, "must be a positive number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn create_test_config(id: &str, module_type: ModuleType) -> ModuleConfig {
        ModuleConfig {
            id: id.to_string(),
            module_type,
            options: HashMap::new(),
        }
    }

    fn with_option(mut config: ModuleConfig, key: &str, value: Value) -> ModuleConfig {
        config.options.insert(key.to_string(), value);
        config
    }

    #[test]
    fn test_create_every_module_type() {
        for module_type in ModuleType::ALL {
            let config = create_test_config(module_type.as_str(), module_type);
            let module = ModuleFactory::create_module(&config, 48_000.0)
                .unwrap_or_else(|e| panic!("failed to create {}: {}", module_type.as_str(), e));
            assert_eq!(module.id(), module_type.as_str());
            assert_eq!(module.name(), module_type.as_str());
        }
    }

    #[test]
    fn test_only_power_meter_is_not_instrumentable() {
        for module_type in ModuleType::ALL {
            let module =
                ModuleFactory::create_module(&create_test_config("m", module_type), 48_000.0).unwrap();
            assert_eq!(
                module.instrumentable().is_none(),
                module_type == ModuleType::PowerMeter
            );
        }
    }

    #[test]
    fn test_batch_size_option_applies_to_taps() {
        let config = with_option(
            create_test_config("fm", ModuleType::FmDemodulator),
            "batch_size",
            Value::from(128),
        );
        let module = ModuleFactory::create_module(&config, 48_000.0).unwrap();
        let groups = module.instrumentable().unwrap().tap_groups();
        assert!(groups[0].taps().all(|t| t.batch_size() == 128));
    }

    #[test]
    fn test_invalid_option_values() {
        let zero_batch = with_option(
            create_test_config("fm", ModuleType::FmDemodulator),
            "batch_size",
            Value::from(0),
        );
        let err = ModuleFactory::create_module(&zero_batch, 48_000.0).err().unwrap();
        assert!(err.contains("batch_size"));

        let negative_deviation = with_option(
            create_test_config("c4fm", ModuleType::C4fmDecoder),
            "deviation_hz",
            Value::from(-600.0),
        );
        assert!(ModuleFactory::create_module(&negative_deviation, 48_000.0).is_err());
    }

    #[test]
    fn test_sync_pattern_accepts_hex_string() {
        let config = with_option(
            create_test_config("c4fm", ModuleType::C4fmDecoder),
            "sync_pattern",
            Value::from("0x5575_F5FF_77FF"),
        );
        assert_eq!(ModuleOptions::new(&config).sync_pattern(), Ok(P25_SYNC_PATTERN));

        let too_wide = with_option(
            create_test_config("c4fm", ModuleType::C4fmDecoder),
            "sync_pattern",
            Value::from("0x1_0000_0000_0000"),
        );
        assert!(matches!(
            ModuleOptions::new(&too_wide).sync_pattern(),
            Err(ValidationError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_list_available_implementations() {
        let implementations = ModuleFactory::list_available_implementations();
        assert_eq!(
            implementations,
            vec!["fm_demodulator", "c4fm_decoder", "qpsk_demodulator", "power_meter"]
        );
        assert!(ModuleFactory::is_implementation_available("c4fm_decoder"));
        assert!(!ModuleFactory::is_implementation_available("reverse_text"));
    }
}
