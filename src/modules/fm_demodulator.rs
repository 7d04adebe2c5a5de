// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError};

use crate::chain::Message;
use crate::errors::TapError;
use crate::modules::dsp::FmDiscriminator;
use crate::tap::{Tap, TapGroup, TapListener, TapRegistry, TapStats, TapType, TapUnit};
use crate::traits::instrumentable::register_advertised;
use crate::traits::{Instrumentable, Module, SampleBuffer};

pub const FM_GROUP: &str = "FM Demodulator";
pub const BASEBAND_TAP: &str = "Baseband";
pub const DEMODULATED_TAP: &str = "Demodulated";

/// FM discriminator stage exposing its input and output streams.
pub struct FmDemodulator {
    id: String,
    batch_size: usize,
    discriminator: Mutex<FmDiscriminator>,
    registry: TapRegistry,
}

impl FmDemodulator {
    pub fn new(id: impl Into<String>, batch_size: usize) -> Self {
        let id = id.into();
        Self {
            registry: TapRegistry::new(id.as_str()),
            id,
            batch_size,
            discriminator: Mutex::new(FmDiscriminator::default()),
        }
    }

    /// Demodulate a block, returning radians per sample for each input.
    pub fn demodulate(&self, buffer: &SampleBuffer) -> Vec<f32> {
        let mut discriminator = self
            .discriminator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        buffer
            .samples
            .iter()
            .map(|&sample| {
                self.registry
                    .dispatch_with(TapType::StreamComplexSample, || TapUnit::ComplexSample(sample));
                let demodulated = discriminator.demodulate(sample);
                self.registry
                    .dispatch_with(TapType::StreamFloat, || TapUnit::Float(demodulated));
                demodulated
            })
            .collect()
    }
}

impl Module for FmDemodulator {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "fm_demodulator"
    }

    fn receive(&self, buffer: &SampleBuffer, _messages: &mut Vec<Message>) {
        self.demodulate(buffer);
    }

    fn instrumentable(&self) -> Option<&dyn Instrumentable> {
        Some(self)
    }
}

impl Instrumentable for FmDemodulator {
    fn tap_groups(&self) -> Vec<TapGroup> {
        vec![TapGroup::new(FM_GROUP)
            .with_tap(Tap::with_batch_size(
                BASEBAND_TAP,
                TapType::StreamComplexSample,
                self.batch_size,
            ))
            .with_tap(Tap::with_batch_size(
                DEMODULATED_TAP,
                TapType::StreamFloat,
                self.batch_size,
            ))]
    }

    fn register_tap(&self, tap: &Tap, listener: Arc<dyn TapListener>) -> Result<(), TapError> {
        register_advertised(&self.registry, &self.tap_groups(), tap, listener)
    }

    fn unregister_tap(&self, tap: &Tap) -> Result<(), TapError> {
        self.registry.unbind(tap);
        Ok(())
    }

    fn active_taps(&self) -> Vec<Tap> {
        self.registry.active_taps()
    }

    fn clear_taps(&self) -> usize {
        self.registry.clear().len()
    }

    fn close_taps(&self) -> usize {
        self.registry.close().len()
    }

    fn tap_stats(&self) -> Vec<TapStats> {
        self.registry.stats()
    }
}
