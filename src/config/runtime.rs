// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::chain::ProcessingChain;
use crate::config::Config;
use crate::errors::ConfigError;
use crate::modules::ModuleFactory;
use crate::source::SyntheticSource;
use crate::traits::Module;

/// Chain builder - turns a configuration into a ready-to-start chain.
///
/// Modules are created in configuration order, attached to a fresh
/// [`ProcessingChain`], and the configured synthetic source is bound. Message
/// listeners and taps can be added before `start`.
///
/// # Examples
///
/// ```
/// use tapline::config::{ChainBuilder, Config, ModuleConfig, ModuleType};
/// use tapline::chain::ChainState;
/// use std::collections::HashMap;
///
/// let config = Config {
///     logging: Default::default(),
///     source: Default::default(),
///     modules: vec![ModuleConfig {
///         id: "fm".to_string(),
///         module_type: ModuleType::FmDemodulator,
///         options: HashMap::new(),
///     }],
/// };
///
/// let chain = ChainBuilder::from_config(&config).unwrap();
/// assert_eq!(chain.state(), ChainState::ModulesAttached);
/// assert!(chain.module("fm").is_some());
/// ```
pub struct ChainBuilder;

impl ChainBuilder {
    /// Build the chain described by `cfg`.
    ///
    /// # Errors
    /// `ModuleCreation` when a module rejects its options, `Chain` when the
    /// module list is empty or ids collide.
    pub fn from_config(cfg: &Config) -> Result<ProcessingChain, ConfigError> {
        let modules = Self::create_modules(cfg)?;
        let mut chain = ProcessingChain::new();
        chain.add_modules(modules)?;
        chain.set_source(Box::new(SyntheticSource::new(cfg.source.clone())))?;
        Ok(chain)
    }

    pub fn create_modules(cfg: &Config) -> Result<Vec<Arc<dyn Module>>, ConfigError> {
        cfg.modules
            .iter()
            .map(|module| {
                ModuleFactory::create_module(module, cfg.source.sample_rate).map_err(|reason| {
                    ConfigError::ModuleCreation {
                        module_id: module.id.clone(),
                        reason,
                    }
                })
            })
            .collect()
    }
}
