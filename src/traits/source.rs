// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::tap::Complex;

/// A block of complex baseband samples handed to every module in turn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    pub samples: Vec<Complex>,
    /// Index of `samples[0]` in the source's overall sample stream.
    pub first_sample_index: u64,
}

impl SampleBuffer {
    pub fn new(samples: Vec<Complex>, first_sample_index: u64) -> Self {
        Self {
            samples,
            first_sample_index,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Upstream of a processing chain. Pulled from the producer thread only.
///
/// Sources are one-shot: after `next_buffer` returns `None` the chain stops
/// pulling and a new source (and chain) is needed to run again.
pub trait SampleSource: Send {
    fn next_buffer(&mut self) -> Option<SampleBuffer>;

    fn sample_rate(&self) -> f64;
}
