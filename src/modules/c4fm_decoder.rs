// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError};

use crate::chain::{Message, MessageKind};
use crate::errors::TapError;
use crate::modules::dsp::{radians_per_sample, FmDiscriminator, SampleHistory, SymbolIntegrator};
use crate::modules::sync_detector::SyncDetector;
use crate::tap::{
    find_advertised, Dibit, EyeDiagramData, SymbolEvent, Tap, TapGroup, TapListener, TapRegistry,
    TapStats, TapType, TapUnit,
};
use crate::traits::instrumentable::register_advertised;
use crate::traits::{Instrumentable, Module, SampleBuffer};

pub const SYMBOL_TIMING_GROUP: &str = "Symbol Timing";
pub const SYMBOL_TAP: &str = "Symbol";
pub const EYE_DIAGRAM_TAP: &str = "Eye Diagram";

#[derive(Debug, Clone, Copy)]
pub struct C4fmDecoderConfig {
    pub sample_rate: f32,
    pub samples_per_symbol: usize,
    /// Frequency deviation of the inner (+1/-1) symbols.
    pub deviation_hz: f32,
    pub sync_pattern: u64,
    pub max_sync_bit_errors: u32,
    pub batch_size: usize,
}

struct DecoderState {
    discriminator: FmDiscriminator,
    integrator: SymbolIntegrator,
    history: SampleHistory,
}

/// Four-level FM symbol decoder.
///
/// Demodulates, integrates each symbol period, slices to dibits and feeds an
/// embedded [`SyncDetector`]. Its own taps cover symbol timing; the detector's
/// group is re-advertised alongside them and registrations for it are
/// forwarded.
pub struct C4fmDecoder {
    id: String,
    config: C4fmDecoderConfig,
    level_scale: f32,
    state: Mutex<DecoderState>,
    registry: TapRegistry,
    sync: SyncDetector,
}

impl C4fmDecoder {
    pub fn new(id: impl Into<String>, config: C4fmDecoderConfig) -> Self {
        let id = id.into();
        let samples_per_symbol = config.samples_per_symbol.max(1);
        Self {
            registry: TapRegistry::new(id.as_str()),
            sync: SyncDetector::new(id.as_str(), config.sync_pattern, config.max_sync_bit_errors),
            level_scale: 1.0 / radians_per_sample(config.deviation_hz, config.sample_rate),
            state: Mutex::new(DecoderState {
                discriminator: FmDiscriminator::default(),
                integrator: SymbolIntegrator::new(samples_per_symbol),
                history: SampleHistory::new(2 * samples_per_symbol),
            }),
            id,
            config,
        }
    }

    pub fn sync_detector(&self) -> &SyncDetector {
        &self.sync
    }

    fn timing_group(&self) -> TapGroup {
        TapGroup::new(SYMBOL_TIMING_GROUP)
            .with_tap(Tap::with_batch_size(
                SYMBOL_TAP,
                TapType::StreamSymbol,
                self.config.batch_size,
            ))
            .with_tap(Tap::new(EYE_DIAGRAM_TAP, TapType::StreamEyeDiagram))
    }
}

impl Module for C4fmDecoder {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "c4fm_decoder"
    }

    fn receive(&self, buffer: &SampleBuffer, messages: &mut Vec<Message>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let DecoderState {
            discriminator,
            integrator,
            history,
        } = &mut *state;
        let samples_per_symbol = integrator.samples_per_symbol();

        for (offset, &sample) in buffer.samples.iter().enumerate() {
            let sample_index = buffer.first_sample_index + offset as u64;
            let level = discriminator.demodulate(sample) * self.level_scale;
            history.push(level);

            let Some(decision) = integrator.push(level) else {
                continue;
            };

            self.registry.dispatch_with(TapType::StreamSymbol, || {
                TapUnit::Symbol(SymbolEvent {
                    sample_index,
                    samples_per_symbol: samples_per_symbol as f32,
                    value: decision.value,
                    timing_error: decision.timing_error,
                })
            });
            if history.is_full() {
                self.registry.dispatch_with(TapType::StreamEyeDiagram, || {
                    TapUnit::EyeDiagram(EyeDiagramData {
                        samples: history.to_vec(),
                        samples_per_symbol,
                        decision_offset: samples_per_symbol + samples_per_symbol / 2,
                    })
                });
            }

            let dibit = Dibit::decide(decision.value);
            if let Some(event) = self.sync.receive_dibit(dibit, sample_index) {
                messages.push(Message::new(
                    self.id.as_str(),
                    sample_index,
                    MessageKind::SyncDetected {
                        bit_errors: event.bit_errors,
                    },
                ));
            }
        }
    }

    fn instrumentable(&self) -> Option<&dyn Instrumentable> {
        Some(self)
    }
}

impl Instrumentable for C4fmDecoder {
    fn tap_groups(&self) -> Vec<TapGroup> {
        let mut groups = vec![self.timing_group()];
        groups.extend(self.sync.tap_groups());
        groups
    }

    fn register_tap(&self, tap: &Tap, listener: Arc<dyn TapListener>) -> Result<(), TapError> {
        let own = [self.timing_group()];
        if find_advertised(&own, tap).is_some() {
            register_advertised(&self.registry, &own, tap, listener)
        } else {
            self.sync.register_tap(tap, listener)
        }
    }

    fn unregister_tap(&self, tap: &Tap) -> Result<(), TapError> {
        self.registry.unbind(tap);
        self.sync.unregister_tap(tap)
    }

    fn active_taps(&self) -> Vec<Tap> {
        let mut taps = self.registry.active_taps();
        taps.extend(self.sync.active_taps());
        taps
    }

    fn clear_taps(&self) -> usize {
        self.registry.clear().len() + self.sync.clear_taps()
    }

    fn close_taps(&self) -> usize {
        self.registry.close().len() + self.sync.close_taps()
    }

    fn tap_stats(&self) -> Vec<TapStats> {
        let mut stats = self.registry.stats();
        stats.extend(self.sync.tap_stats());
        stats
    }
}
