// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic the crate emits is a small message struct implementing
//! `Display` and [`messages::StructuredLog`], so log text lives in one place
//! and each event carries typed fields for the subscriber.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::chain` - processing chain lifecycle and message fan-out
//! * `messages::tap` - tap registration, delivery and binding events
//! * `messages::validation` - configuration validation problems
//!
//! # Usage
//!
//! ```rust
//! use tapline::observability::messages::{tap::TapUnregistered, StructuredLog};
//! use tapline::tap::TapType;
//!
//! TapUnregistered {
//!     module_id: "c4fm",
//!     tap_name: "Dibit Stream",
//!     tap_type: TapType::StreamDibit,
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_thread_names(true)
        .with_ansi(config.ansi);

    // Err only means a subscriber is already installed.
    let _ = builder.try_init();
}
