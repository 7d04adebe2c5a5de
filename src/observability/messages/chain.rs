// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processing chain lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Chain start and stop transitions
//! * Source exhaustion on the producer thread
//! * Fan-out of module messages to message listeners

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Chain began pulling from its source.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tapline::observability::messages::chain::ChainStarted;
///
/// let msg = ChainStarted {
///     module_count: 3,
///     sample_rate: 48_000.0,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ChainStarted {
    pub module_count: usize,
    pub sample_rate: f64,
}

impl Display for ChainStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processing chain started: {} modules, sample_rate={} Hz",
            self.module_count, self.sample_rate
        )
    }
}

impl StructuredLog for ChainStarted {
    fn log(&self) {
        tracing::info!(
            module_count = self.module_count,
            sample_rate = self.sample_rate,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain",
            span_name = name,
            module_count = self.module_count,
            sample_rate = self.sample_rate,
        )
    }
}

/// Chain stopped; taps cleared and modules flushed.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tapline::observability::messages::chain::ChainStopped;
/// use std::time::Duration;
///
/// let msg = ChainStopped {
///     buffers_processed: 120,
///     taps_cleared: 2,
///     duration: Duration::from_secs(3),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ChainStopped {
    pub buffers_processed: u64,
    pub taps_cleared: usize,
    pub duration: Duration,
}

impl Display for ChainStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processing chain stopped: {} buffers in {:?}, {} tap(s) cleared",
            self.buffers_processed, self.duration, self.taps_cleared
        )
    }
}

impl StructuredLog for ChainStopped {
    fn log(&self) {
        tracing::info!(
            buffers_processed = self.buffers_processed,
            taps_cleared = self.taps_cleared,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain_stopped",
            span_name = name,
            buffers_processed = self.buffers_processed,
            duration = ?self.duration,
        )
    }
}

/// Source returned no more buffers; the producer loop ended.
///
/// # Log Level
/// `info!` - Expected for finite sources
pub struct SourceExhausted {
    pub buffers_processed: u64,
}

impl Display for SourceExhausted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Sample source exhausted after {} buffers",
            self.buffers_processed
        )
    }
}

impl StructuredLog for SourceExhausted {
    fn log(&self) {
        tracing::info!(buffers_processed = self.buffers_processed, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "source_exhausted",
            span_name = name,
            buffers_processed = self.buffers_processed,
        )
    }
}

/// A message listener returned an error or panicked.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct MessageDeliveryFailed<'a> {
    pub listener_index: usize,
    pub source_module: &'a str,
    pub reason: &'a str,
}

impl Display for MessageDeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message listener #{} failed on message from '{}': {}",
            self.listener_index, self.source_module, self.reason
        )
    }
}

impl StructuredLog for MessageDeliveryFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            listener_index = self.listener_index,
            source_module = self.source_module,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::WARN,
            "message_delivery_failed",
            span_name = name,
            listener_index = self.listener_index,
        )
    }
}

/// A module message, as seen by the logging listener.
///
/// # Log Level
/// `info!` - Decoder status output
pub struct MessageReceived<'a> {
    pub source_module: &'a str,
    pub sample_index: u64,
    pub text: &'a str,
}

impl Display for MessageReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{} @{}] {}",
            self.source_module, self.sample_index, self.text
        )
    }
}

impl StructuredLog for MessageReceived<'_> {
    fn log(&self) {
        tracing::info!(
            source_module = self.source_module,
            sample_index = self.sample_index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "message",
            span_name = name,
            source_module = self.source_module,
        )
    }
}

/// A chain dropped while running could not stop cleanly.
///
/// # Log Level
/// `error!` - The failure has no caller left to return to
pub struct ChainDropFailed<'a> {
    pub error: &'a crate::errors::ChainError,
}

impl Display for ChainDropFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Chain dropped while running did not stop cleanly: {}", self.error)
    }
}

impl StructuredLog for ChainDropFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("chain_drop_failed", span_name = name, error = %self.error)
    }
}
