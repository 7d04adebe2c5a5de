// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation warnings and errors.
//!
//! This module contains message types for logging events related to:
//! * Chain configuration validation start and outcome
//! * Duplicate module ID detection
//! * Rejected module options

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Duplicate module ID detected in configuration.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use tapline::observability::messages::validation::DuplicateModuleId;
///
/// let msg = DuplicateModuleId {
///     module_id: "c4fm",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct DuplicateModuleId<'a> {
    pub module_id: &'a str,
}

impl Display for DuplicateModuleId<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate module ID: '{}'", self.module_id)
    }
}

impl StructuredLog for DuplicateModuleId<'_> {
    fn log(&self) {
        tracing::error!(module_id = self.module_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            module_id = self.module_id,
        )
    }
}

/// A module option was rejected.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ModuleOptionRejected<'a> {
    pub module_id: &'a str,
    pub option: &'a str,
    pub reason: &'a str,
}

impl Display for ModuleOptionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' option '{}' rejected: {}",
            self.module_id, self.option, self.reason
        )
    }
}

impl StructuredLog for ModuleOptionRejected<'_> {
    fn log(&self) {
        tracing::error!(
            module_id = self.module_id,
            option = self.option,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            module_id = self.module_id,
            option = self.option,
        )
    }
}

/// Configuration validation started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationStarted {
    pub module_count: usize,
}

impl Display for ValidationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting configuration validation for {} modules",
            self.module_count
        )
    }
}

impl StructuredLog for ValidationStarted {
    fn log(&self) {
        tracing::info!(module_count = self.module_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            module_count = self.module_count,
        )
    }
}

/// Configuration validation completed successfully.
pub struct ValidationCompleted {
    pub module_count: usize,
}

impl Display for ValidationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validation completed successfully for {} modules",
            self.module_count
        )
    }
}

impl StructuredLog for ValidationCompleted {
    fn log(&self) {
        tracing::info!(module_count = self.module_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            module_count = self.module_count,
        )
    }
}

/// Configuration validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use tapline::observability::messages::validation::ValidationFailed;
///
/// let msg = ValidationFailed {
///     error_count: 3,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ValidationFailed {
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validation failed with {} errors",
            self.error_count
        )
    }
}

impl StructuredLog for ValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            error_count = self.error_count,
        )
    }
}
