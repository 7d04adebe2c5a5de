// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::chain::Message;
use crate::traits::{Instrumentable, SampleBuffer};

/// One stage of a processing chain.
///
/// The chain calls `receive` and `flush` from its single producer thread.
/// Anything else (enumeration, tap registration) may arrive from other
/// threads at the same time, hence `&self` everywhere and `Send + Sync`.
pub trait Module: Send + Sync {
    /// Unique id within a chain.
    fn id(&self) -> &str;

    /// Implementation name, e.g. `"c4fm_decoder"`.
    fn name(&self) -> &'static str;

    /// Process one source buffer, appending any status messages.
    fn receive(&self, buffer: &SampleBuffer, messages: &mut Vec<Message>);

    /// Called once while the chain stops, after the last buffer.
    fn flush(&self, _messages: &mut Vec<Message>) {}

    /// Opt-in tap capability. Modules without taps keep the default.
    fn instrumentable(&self) -> Option<&dyn Instrumentable> {
        None
    }
}
