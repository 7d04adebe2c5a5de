// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError};

use crate::chain::Message;
use crate::errors::TapError;
use crate::tap::{
    Complex, Tap, TapGroup, TapListener, TapRegistry, TapStats, TapType, TapUnit,
};
use crate::traits::instrumentable::register_advertised;
use crate::traits::{Instrumentable, Module, SampleBuffer};

pub const QPSK_GROUP: &str = "QPSK Demodulator";
pub const BASEBAND_TAP: &str = "Baseband";
pub const CONSTELLATION_TAP: &str = "Constellation";
pub const BIT_STREAM_TAP: &str = "Bit Stream";

#[derive(Debug, Default)]
struct SymbolAccumulator {
    sum: Complex,
    count: usize,
}

/// Integrate-and-dump QPSK demodulator.
///
/// Each symbol is sliced on the signs of I and Q; a negative component maps
/// to a `true` bit, I first.
pub struct QpskDemodulator {
    id: String,
    samples_per_symbol: usize,
    batch_size: usize,
    accumulator: Mutex<SymbolAccumulator>,
    registry: TapRegistry,
}

impl QpskDemodulator {
    pub fn new(id: impl Into<String>, samples_per_symbol: usize, batch_size: usize) -> Self {
        let id = id.into();
        Self {
            registry: TapRegistry::new(id.as_str()),
            id,
            samples_per_symbol: samples_per_symbol.max(1),
            batch_size,
            accumulator: Mutex::new(SymbolAccumulator::default()),
        }
    }

    /// Process a block, returning the symbols completed within it.
    pub fn demodulate(&self, buffer: &SampleBuffer) -> Vec<Complex> {
        let mut accumulator = self
            .accumulator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut symbols = Vec::new();

        for &sample in &buffer.samples {
            self.registry
                .dispatch_with(TapType::StreamComplex, || TapUnit::Complex(sample));
            accumulator.sum += sample;
            accumulator.count += 1;
            if accumulator.count < self.samples_per_symbol {
                continue;
            }

            let symbol = accumulator.sum.scale(1.0 / self.samples_per_symbol as f32);
            *accumulator = SymbolAccumulator::default();

            self.registry
                .dispatch_with(TapType::StreamQpsk, || TapUnit::Qpsk(symbol));
            if self.registry.is_active(TapType::StreamBinary) {
                self.registry.dispatch(TapUnit::Binary(symbol.i < 0.0));
                self.registry.dispatch(TapUnit::Binary(symbol.q < 0.0));
            }
            symbols.push(symbol);
        }
        symbols
    }
}

impl Module for QpskDemodulator {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "qpsk_demodulator"
    }

    fn receive(&self, buffer: &SampleBuffer, _messages: &mut Vec<Message>) {
        self.demodulate(buffer);
    }

    fn instrumentable(&self) -> Option<&dyn Instrumentable> {
        Some(self)
    }
}

impl Instrumentable for QpskDemodulator {
    fn tap_groups(&self) -> Vec<TapGroup> {
        vec![TapGroup::new(QPSK_GROUP)
            .with_tap(Tap::with_batch_size(
                BASEBAND_TAP,
                TapType::StreamComplex,
                self.batch_size,
            ))
            .with_tap(Tap::with_batch_size(
                CONSTELLATION_TAP,
                TapType::StreamQpsk,
                self.batch_size,
            ))
            .with_tap(Tap::with_batch_size(
                BIT_STREAM_TAP,
                TapType::StreamBinary,
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
