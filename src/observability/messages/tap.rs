// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for tap lifecycle and delivery events.
//!
//! This module contains message types for logging events related to:
//! * Tap registration, rebinding and removal on a module
//! * Delivery failures isolated from the producer thread
//! * Selection requests from a view binding

use crate::observability::messages::StructuredLog;
use crate::tap::TapType;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Tap attached to a module.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use tapline::observability::messages::tap::TapRegistered;
/// use tapline::tap::TapType;
///
/// let msg = TapRegistered {
///     module_id: "c4fm",
///     tap_name: "Dibit Stream",
///     tap_type: TapType::StreamDibit,
///     batch_size: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct TapRegistered<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub tap_type: TapType,
    pub batch_size: usize,
}

impl Display for TapRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Tap '{}' [{}] registered on module '{}': batch_size={}",
            self.tap_name, self.tap_type, self.module_id, self.batch_size
        )
    }
}

impl StructuredLog for TapRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
            batch_size = self.batch_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "tap_registered",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
        )
    }
}

/// An already registered tap was given a new listener.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TapRebound<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub tap_type: TapType,
}

impl Display for TapRebound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Tap '{}' [{}] on module '{}' rebound to a new listener",
            self.tap_name, self.tap_type, self.module_id
        )
    }
}

impl StructuredLog for TapRebound<'_> {
    fn log(&self) {
        tracing::info!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "tap_rebound",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
        )
    }
}

/// Tap detached from a module.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TapUnregistered<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub tap_type: TapType,
}

impl Display for TapUnregistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Tap '{}' [{}] unregistered from module '{}'",
            self.tap_name, self.tap_type, self.module_id
        )
    }
}

impl StructuredLog for TapUnregistered<'_> {
    fn log(&self) {
        tracing::info!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "tap_unregistered",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
        )
    }
}

/// Every tap on a module was dropped at once. `closed` is set when the
/// registry also stopped accepting registrations (chain shutdown).
pub struct TapsCleared<'a> {
    pub module_id: &'a str,
    pub count: usize,
    pub closed: bool,
}

impl Display for TapsCleared<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cleared {} active tap(s) from module '{}'",
            self.count, self.module_id
        )?;
        if self.closed {
            write!(f, ", registry closed")?;
        }
        Ok(())
    }
}

impl StructuredLog for TapsCleared<'_> {
    fn log(&self) {
        tracing::info!(
            module_id = self.module_id,
            count = self.count,
            closed = self.closed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "taps_cleared",
            span_name = name,
            module_id = self.module_id,
            count = self.count,
            closed = self.closed,
        )
    }
}

/// A tap change requested by a listener from inside a delivery on the same
/// module. It is applied when the delivery returns.
///
/// # Log Level
/// `debug!` - Detailed operational information
pub struct TapChangeDeferred<'a> {
    pub module_id: &'a str,
    pub change: &'a str,
}

impl Display for TapChangeDeferred<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Deferred {} on module '{}' until the current delivery returns",
            self.change, self.module_id
        )
    }
}

impl StructuredLog for TapChangeDeferred<'_> {
    fn log(&self) {
        tracing::debug!(module_id = self.module_id, change = self.change, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "tap_change_deferred",
            span_name = name,
            module_id = self.module_id,
            change = self.change,
        )
    }
}

/// Registration refused because the module's taps were closed by shutdown.
///
/// # Log Level
/// `warn!` - Request that cannot be honored
pub struct TapRegistrationRejected<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub tap_type: TapType,
}

impl Display for TapRegistrationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected tap '{}' [{}] on module '{}': taps are closed",
            self.tap_name, self.tap_type, self.module_id
        )
    }
}

impl StructuredLog for TapRegistrationRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "tap_registration_rejected",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
        )
    }
}

/// A tap listener returned an error or panicked. The tap stays registered.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
///
/// # Example
/// ```
/// use tapline::observability::messages::tap::TapDeliveryFailed;
/// use tapline::tap::TapType;
///
/// let msg = TapDeliveryFailed {
///     module_id: "fm",
///     tap_name: "Demodulated",
///     tap_type: TapType::StreamFloat,
///     reason: "viewer closed",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct TapDeliveryFailed<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub tap_type: TapType,
    pub reason: &'a str,
}

impl Display for TapDeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Delivery to tap '{}' [{}] on module '{}' failed: {}",
            self.tap_name, self.tap_type, self.module_id, self.reason
        )
    }
}

impl StructuredLog for TapDeliveryFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::WARN,
            "tap_delivery_failed",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
        )
    }
}

/// A module fed a unit of the wrong kind into a tap.
///
/// # Log Level
/// `error!` - Wiring bug in the producing module
pub struct TapTypeMismatch<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub expected: TapType,
    pub actual: TapType,
}

impl Display for TapTypeMismatch<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' fed a {} unit to tap '{}' expecting {}; unit dropped",
            self.module_id, self.actual, self.tap_name, self.expected
        )
    }
}

impl StructuredLog for TapTypeMismatch<'_> {
    fn log(&self) {
        tracing::error!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            expected = self.expected.as_str(),
            actual = self.actual.as_str(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "tap_type_mismatch",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
        )
    }
}

/// Registration requested for a tap the module does not advertise.
///
/// # Log Level
/// `warn!` - Caller error, returned as `TapError::UnknownTap`
pub struct UnknownTapRequested<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub tap_type: TapType,
}

impl Display for UnknownTapRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' was asked to register unknown tap '{}' [{}]",
            self.module_id, self.tap_name, self.tap_type
        )
    }
}

impl StructuredLog for UnknownTapRequested<'_> {
    fn log(&self) {
        tracing::warn!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::WARN,
            "unknown_tap_requested",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
        )
    }
}

/// The view factory has nothing that can show this tap type, so the
/// selection was skipped.
///
/// # Log Level
/// `info!` - Expected for event taps without a viewer
pub struct TapViewUnavailable<'a> {
    pub module_id: &'a str,
    pub tap_name: &'a str,
    pub tap_type: TapType,
}

impl Display for TapViewUnavailable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No view available for tap '{}' [{}] on module '{}'; not registered",
            self.tap_name, self.tap_type, self.module_id
        )
    }
}

impl StructuredLog for TapViewUnavailable<'_> {
    fn log(&self) {
        tracing::info!(
            module_id = self.module_id,
            tap_name = self.tap_name,
            tap_type = self.tap_type.as_str(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "tap_view_unavailable",
            span_name = name,
            module_id = self.module_id,
            tap_name = self.tap_name,
        )
    }
}
