// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};

use serde::Deserialize;

use crate::config::consts::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DEVIATION_HZ, DEFAULT_SAMPLES_PER_SYMBOL, DEFAULT_SAMPLE_RATE,
    DEFAULT_SYNC_INTERVAL, DEFAULT_TONE_HZ, P25_SYNC_PATTERN,
};
use crate::modules::sync_detector::{pattern_dibits, SYNC_DIBITS};
use crate::source::Pn9;
use crate::tap::{Complex, Dibit};
use crate::traits::{SampleBuffer, SampleSource};

/// Waveform produced by a [`SyntheticSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Constant-frequency complex tone at `tone_hz`.
    #[default]
    Tone,
    /// Four-level FM carrying a PN9 dibit stream, with the sync pattern
    /// inserted ahead of every `sync_interval` dibits.
    C4fm,
    /// Rectangular QPSK carrying PN9 bits.
    Qpsk,
}

/// Synthetic source settings.
///
/// # Example
/// ```yaml
/// source:
///   signal: c4fm
///   sample_rate: 48000
///   buffer_size: 1024
///   buffer_count: 200
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticSourceConfig {
    pub signal: SignalKind,
    pub sample_rate: f64,
    pub buffer_size: usize,
    /// Stop after this many buffers; run until stopped when absent.
    pub buffer_count: Option<u64>,
    pub samples_per_symbol: usize,
    pub tone_hz: f32,
    /// Deviation of the inner C4FM symbols.
    pub deviation_hz: f32,
    /// Payload dibits between sync patterns; 0 disables sync insertion.
    pub sync_interval: usize,
    pub sync_pattern: u64,
}

impl Default for SyntheticSourceConfig {
    fn default() -> Self {
        Self {
            signal: SignalKind::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            buffer_count: None,
            samples_per_symbol: DEFAULT_SAMPLES_PER_SYMBOL,
            tone_hz: DEFAULT_TONE_HZ,
            deviation_hz: DEFAULT_DEVIATION_HZ,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            sync_pattern: P25_SYNC_PATTERN,
        }
    }
}

/// Deterministic test-signal generator. Symbol boundaries line up with
/// sample 0, so integrate-and-dump receivers need no timing recovery.
pub struct SyntheticSource {
    config: SyntheticSourceConfig,
    pn: Pn9,
    sync_dibits: Vec<Dibit>,
    frame_position: usize,
    phase: f64,
    /// Phase step (C4FM) or constellation point (QPSK) of the current symbol.
    step: f64,
    point: Complex,
    samples_left: usize,
    next_sample_index: u64,
    buffers_emitted: u64,
}

impl SyntheticSource {
    pub fn new(config: SyntheticSourceConfig) -> Self {
        Self {
            sync_dibits: pattern_dibits(config.sync_pattern),
            config,
            pn: Pn9::default(),
            frame_position: 0,
            phase: 0.0,
            step: 0.0,
            point: Complex::default(),
            samples_left: 0,
            next_sample_index: 0,
            buffers_emitted: 0,
        }
    }

    pub fn config(&self) -> &SyntheticSourceConfig {
        &self.config
    }

    fn next_dibit(&mut self) -> Dibit {
        if self.config.sync_interval == 0 {
            return self.pn.next_dibit();
        }
        let position = self.frame_position;
        self.frame_position = (position + 1) % (SYNC_DIBITS as usize + self.config.sync_interval);
        match self.sync_dibits.get(position) {
            Some(dibit) => *dibit,
            None => self.pn.next_dibit(),
        }
    }

    fn advance_phase(&mut self, step: f64) -> Complex {
        self.phase = (self.phase + step + PI).rem_euclid(TAU) - PI;
        Complex::from_phase(self.phase as f32)
    }

    fn next_sample(&mut self) -> Complex {
        let hz_to_step = TAU / self.config.sample_rate;
        match self.config.signal {
            SignalKind::Tone => self.advance_phase(self.config.tone_hz as f64 * hz_to_step),
            SignalKind::C4fm => {
                if self.samples_left == 0 {
                    let level = self.next_dibit().symbol_value() as f64;
                    self.step = level * self.config.deviation_hz as f64 * hz_to_step;
                    self.samples_left = self.config.samples_per_symbol.max(1);
                }
                self.samples_left -= 1;
                self.advance_phase(self.step)
            }
            SignalKind::Qpsk => {
                if self.samples_left == 0 {
                    let axis = |negative: bool| if negative { -FRAC_1_SQRT_2 } else { FRAC_1_SQRT_2 };
                    let i = axis(self.pn.next_bit());
                    let q = axis(self.pn.next_bit());
                    self.point = Complex::new(i as f32, q as f32);
                    self.samples_left = self.config.samples_per_symbol.max(1);
                }
                self.samples_left -= 1;
                self.point
            }
        }
    }
}

impl SampleSource for SyntheticSource {
    fn next_buffer(&mut self) -> Option<SampleBuffer> {
        if self
            .config
            .buffer_count
            .is_some_and(|count| self.buffers_emitted >= count)
        {
            return None;
        }

        let samples: Vec<Complex> = (0..self.config.buffer_size)
            .map(|_| self.next_sample())
            .collect();
        let buffer = SampleBuffer::new(samples, self.next_sample_index);
        self.next_sample_index += buffer.len() as u64;
        self.buffers_emitted += 1;
        Some(buffer)
    }

    fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MessageKind;
    use crate::modules::{C4fmDecoder, C4fmDecoderConfig, QpskDemodulator};
    use crate::traits::Module;

    fn config(signal: SignalKind) -> SyntheticSourceConfig {
        SyntheticSourceConfig {
            signal,
            buffer_size: 480,
            buffer_count: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_buffer_count_bounds_the_run() {
        let mut source = SyntheticSource::new(config(SignalKind::Tone));
        let indices: Vec<u64> = std::iter::from_fn(|| source.next_buffer())
            .map(|b| b.first_sample_index)
            .collect();
        assert_eq!(indices, vec![0, 480, 960]);
        assert!(source.next_buffer().is_none());
    }

    #[test]
    fn test_tone_has_unit_magnitude() {
        let mut source = SyntheticSource::new(config(SignalKind::Tone));
        let buffer = source.next_buffer().unwrap();
        assert!(buffer
            .samples
            .iter()
            .all(|s| (s.magnitude() - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_c4fm_carries_sync() {
        let mut source = SyntheticSource::new(SyntheticSourceConfig {
            sync_interval: 24,
            ..config(SignalKind::C4fm)
        });
        let decoder = C4fmDecoder::new(
            "c4fm",
            C4fmDecoderConfig {
                sample_rate: DEFAULT_SAMPLE_RATE as f32,
                samples_per_symbol: DEFAULT_SAMPLES_PER_SYMBOL,
                deviation_hz: DEFAULT_DEVIATION_HZ,
                sync_pattern: P25_SYNC_PATTERN,
                max_sync_bit_errors: 0,
                batch_size: 1,
            },
        );

        let mut messages = Vec::new();
        while let Some(buffer) = source.next_buffer() {
            decoder.receive(&buffer, &mut messages);
        }

        // 144 symbols in 1440 samples: frames of 48 dibits, sync first.
        assert_eq!(messages.len(), 3);
        assert!(messages
            .iter()
            .all(|m| m.kind == MessageKind::SyncDetected { bit_errors: 0 }));
        assert_eq!(messages[0].sample_index, 239);
    }

    #[test]
    fn test_qpsk_points_on_constellation() {
        let mut source = SyntheticSource::new(config(SignalKind::Qpsk));
        let qpsk = QpskDemodulator::new("qpsk", DEFAULT_SAMPLES_PER_SYMBOL, 1);
        let symbols = qpsk.demodulate(&source.next_buffer().unwrap());
        assert_eq!(symbols.len(), 48);
        assert!(symbols
            .iter()
            .all(|s| (s.i.abs() - FRAC_1_SQRT_2 as f32).abs() < 1e-5
                && (s.q.abs() - FRAC_1_SQRT_2 as f32).abs() < 1e-5));
    }
}
