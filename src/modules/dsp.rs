// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Small stateful DSP building blocks shared by the modules.

use std::collections::VecDeque;
use std::f32::consts::PI;

use crate::tap::Complex;

/// Quadrature FM discriminator: phase difference between consecutive
/// samples, in radians per sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct FmDiscriminator {
    previous: Complex,
}

impl FmDiscriminator {
    pub fn demodulate(&mut self, sample: Complex) -> f32 {
        let product = sample * self.previous.conj();
        self.previous = sample;
        if product.magnitude_squared() == 0.0 {
            0.0
        } else {
            product.phase()
        }
    }
}

/// Radians per sample produced by a frequency offset of `hz`.
pub fn radians_per_sample(hz: f32, sample_rate: f32) -> f32 {
    2.0 * PI * hz / sample_rate
}

/// Output of one integrate-and-dump period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolDecision {
    pub value: f32,
    /// Late-half mean minus early-half mean.
    pub timing_error: f32,
}

/// Integrate-and-dump over a fixed number of samples per symbol.
#[derive(Debug, Clone)]
pub struct SymbolIntegrator {
    samples_per_symbol: usize,
    count: usize,
    early: f32,
    late: f32,
}

impl SymbolIntegrator {
    pub fn new(samples_per_symbol: usize) -> Self {
        Self {
            samples_per_symbol: samples_per_symbol.max(1),
            count: 0,
            early: 0.0,
            late: 0.0,
        }
    }

    pub fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    pub fn push(&mut self, sample: f32) -> Option<SymbolDecision> {
        if self.count < self.samples_per_symbol / 2 {
            self.early += sample;
        } else {
            self.late += sample;
        }
        self.count += 1;

        if self.count < self.samples_per_symbol {
            return None;
        }

        let early_len = (self.samples_per_symbol / 2).max(1) as f32;
        let late_len = (self.samples_per_symbol - self.samples_per_symbol / 2) as f32;
        let decision = SymbolDecision {
            value: (self.early + self.late) / self.samples_per_symbol as f32,
            timing_error: if self.samples_per_symbol > 1 {
                self.late / late_len - self.early / early_len
            } else {
                0.0
            },
        };
        self.count = 0;
        self.early = 0.0;
        self.late = 0.0;
        Some(decision)
    }
}

/// Fixed-length window over the most recent samples.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    capacity: usize,
    samples: VecDeque<f32>,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }
}
