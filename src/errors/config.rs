// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use thiserror::Error;

/// Problems found while validating a chain configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The configuration declares no modules
    EmptyModuleList,
    /// Two modules share an id
    DuplicateModuleId {
        /// The duplicated id
        module_id: String,
    },
    /// A module option is present but has an unusable value
    InvalidOption {
        /// Module carrying the option
        module_id: String,
        /// Option key
        option: String,
        /// What is wrong with it
        reason: String,
    },
    /// A module option is not understood by that module type
    UnsupportedOption {
        /// Module carrying the option
        module_id: String,
        /// Option key
        option: String,
    },
    /// A source setting is out of range
    InvalidSource {
        /// Source field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyModuleList => {
                write!(f, "Chain configuration declares no modules")
            }
            ValidationError::DuplicateModuleId { module_id } => {
                write!(f, "Duplicate module ID: '{}'", module_id)
            }
            ValidationError::InvalidOption {
                module_id,
                option,
                reason,
            } => {
                write!(
                    f,
                    "Module '{}' has invalid option '{}': {}",
                    module_id, option, reason
                )
            }
            ValidationError::UnsupportedOption { module_id, option } => {
                write!(
                    f,
                    "Module '{}' does not support option '{}'",
                    module_id, option
                )
            }
            ValidationError::InvalidSource { field, reason } => {
                write!(f, "Invalid source setting '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors from loading a configuration and building a chain from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported configuration format '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Failed to create module '{module_id}': {reason}")]
    ModuleCreation { module_id: String, reason: String },

    #[error(transparent)]
    Chain(#[from] crate::errors::ChainError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
