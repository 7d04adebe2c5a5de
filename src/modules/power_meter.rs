// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Mutex, PoisonError};

use crate::chain::{Message, MessageKind};
use crate::traits::{Module, SampleBuffer};

/// Floor reported for silent input.
pub const MIN_DBFS: f32 = -150.0;

#[derive(Debug, Default)]
struct PowerWindow {
    energy: f64,
    samples: u64,
    buffers: u64,
}

/// Average signal power reporter. Offers no taps; it only emits a
/// `SignalPower` message every `interval` buffers.
pub struct PowerMeter {
    id: String,
    interval: u64,
    window: Mutex<PowerWindow>,
}

impl PowerMeter {
    pub fn new(id: impl Into<String>, interval: u64) -> Self {
        Self {
            id: id.into(),
            interval: interval.max(1),
            window: Mutex::new(PowerWindow::default()),
        }
    }
}

pub fn power_dbfs(mean_power: f64) -> f32 {
    if mean_power <= 0.0 {
        return MIN_DBFS;
    }
    ((10.0 * mean_power.log10()) as f32).max(MIN_DBFS)
}

impl Module for PowerMeter {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "power_meter"
    }

    fn receive(&self, buffer: &SampleBuffer, messages: &mut Vec<Message>) {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.energy += buffer
            .samples
            .iter()
            .map(|s| s.magnitude_squared() as f64)
            .sum::<f64>();
        window.samples += buffer.len() as u64;
        window.buffers += 1;

        if window.buffers < self.interval {
            return;
        }
        let mean = if window.samples == 0 {
            0.0
        } else {
            window.energy / window.samples as f64
        };
        messages.push(Message::new(
            self.id.as_str(),
            buffer.first_sample_index + buffer.len() as u64,
            MessageKind::SignalPower {
                dbfs: power_dbfs(mean),
            },
        ));
        *window = PowerWindow::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tap::Complex;

    #[test]
    fn test_reports_every_interval() {
        let meter = PowerMeter::new("power", 2);
        let buffer = SampleBuffer::new(vec![Complex::new(0.5, 0.0); 10], 0);
        let mut messages = Vec::new();

        meter.receive(&buffer, &mut messages);
        assert!(messages.is_empty());
        meter.receive(&buffer, &mut messages);
        assert_eq!(messages.len(), 1);

        match messages[0].kind {
            MessageKind::SignalPower { dbfs } => assert!((dbfs - -6.0206).abs() < 1e-3),
            ref other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_not_instrumentable() {
        let meter = PowerMeter::new("power", 1);
        assert!(meter.instrumentable().is_none());
    }

    #[test]
    fn test_silence_floors() {
        assert_eq!(power_dbfs(0.0), MIN_DBFS);
        assert_eq!(power_dbfs(1.0), 0.0);
    }
}
