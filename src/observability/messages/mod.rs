// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its designated level with typed fields.
//!
//! * `chain` - processing chain lifecycle events
//! * `tap` - tap registration and delivery events
//! * `validation` - configuration validation problems
//!
//! # Usage Pattern
//!
//! ```rust
//! use tapline::observability::messages::{chain::ChainStarted, StructuredLog};
//!
//! let msg = ChainStarted {
//!     module_count: 3,
//!     sample_rate: 48_000.0,
//! };
//!
//! msg.log();
//! ```

use std::fmt::Display;

use tracing::Span;

pub mod chain;
pub mod tap;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message at its designated level.
    fn log(&self);

    /// A span carrying the message's fields, for scoping related events.
    fn span(&self, name: &str) -> Span;
}
