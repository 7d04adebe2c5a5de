// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::tap::{Tap, TapPayload};

/// Consumer side of a tap, supplied by whoever selected it.
///
/// `receive` runs on the producer thread while the owning module's registry
/// lock is held, so implementations must return quickly. Registering or
/// unregistering taps on the same module from inside the call is allowed: the
/// change is queued and applied as soon as the current delivery returns. A
/// returned error (or a panic) is reported and counted; the tap stays
/// registered.
pub trait TapListener: Send + Sync {
    fn receive(&self, tap: &Tap, payload: &TapPayload) -> anyhow::Result<()>;
}

impl<F> TapListener for F
where
    F: Fn(&Tap, &TapPayload) -> anyhow::Result<()> + Send + Sync,
{
    fn receive(&self, tap: &Tap, payload: &TapPayload) -> anyhow::Result<()> {
        self(tap, payload)
    }
}

/// Listener that keeps every payload it receives, in order.
#[derive(Debug, Default)]
pub struct CollectingListener {
    payloads: std::sync::Mutex<Vec<TapPayload>>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payloads(&self) -> Vec<TapPayload> {
        self.payloads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Total units received across all payloads.
    pub fn unit_count(&self) -> usize {
        self.payloads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(TapPayload::len)
            .sum()
    }
}

impl TapListener for CollectingListener {
    fn receive(&self, _tap: &Tap, payload: &TapPayload) -> anyhow::Result<()> {
        self.payloads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(payload.clone());
        Ok(())
    }
}
