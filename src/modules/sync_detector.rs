// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::TapError;
use crate::tap::{
    Dibit, SyncDetectEvent, Tap, TapGroup, TapListener, TapRegistry, TapStats, TapType, TapUnit,
};
use crate::traits::instrumentable::register_advertised;
use crate::traits::Instrumentable;

pub const SYNC_GROUP: &str = "Sync Detector";
pub const DIBIT_STREAM_TAP: &str = "Dibit Stream";
pub const SYNC_EVENT_TAP: &str = "Sync Event";

/// Number of dibits in a sync pattern (48 bits).
pub const SYNC_DIBITS: u64 = 24;
const SYNC_MASK: u64 = (1 << (2 * SYNC_DIBITS)) - 1;

#[derive(Debug, Default)]
struct Correlator {
    history: u64,
    dibits_seen: u64,
}

/// Sliding 48-bit correlator over a dibit stream.
///
/// Usable on its own or embedded in a decoder module, which then re-exports
/// its tap group.
pub struct SyncDetector {
    pattern: u64,
    max_bit_errors: u32,
    correlator: Mutex<Correlator>,
    registry: TapRegistry,
}

impl SyncDetector {
    pub fn new(owner: impl Into<Arc<str>>, pattern: u64, max_bit_errors: u32) -> Self {
        Self {
            pattern: pattern & SYNC_MASK,
            max_bit_errors,
            correlator: Mutex::new(Correlator::default()),
            registry: TapRegistry::new(owner),
        }
    }

    pub fn pattern(&self) -> u64 {
        self.pattern
    }

    /// Feed one dibit. Returns the detection when the last 24 dibits match
    /// the pattern within the bit-error tolerance.
    pub fn receive_dibit(&self, dibit: Dibit, sample_index: u64) -> Option<SyncDetectEvent> {
        self.registry.dispatch(TapUnit::Dibit(dibit));

        let mut correlator = self.correlator.lock().unwrap_or_else(PoisonError::into_inner);
        correlator.history = ((correlator.history << 2) | dibit.bits() as u64) & SYNC_MASK;
        correlator.dibits_seen += 1;
        if correlator.dibits_seen < SYNC_DIBITS {
            return None;
        }

        let bit_errors = (correlator.history ^ self.pattern).count_ones();
        if bit_errors > self.max_bit_errors {
            return None;
        }
        drop(correlator);

        let event = SyncDetectEvent {
            sample_index,
            pattern: self.pattern,
            bit_errors,
        };
        self.registry.dispatch(TapUnit::SyncDetect(event));
        Some(event)
    }
}

/// The 24 dibits of a 48-bit pattern, most significant first.
pub fn pattern_dibits(pattern: u64) -> Vec<Dibit> {
    (0..SYNC_DIBITS)
        .rev()
        .map(|n| Dibit::from_bits(((pattern >> (2 * n)) & 0b11) as u8))
        .collect()
}

impl Instrumentable for SyncDetector {
    fn tap_groups(&self) -> Vec<TapGroup> {
        vec![TapGroup::new(SYNC_GROUP)
            .with_tap(Tap::new(DIBIT_STREAM_TAP, TapType::StreamDibit))
            .with_tap(Tap::new(SYNC_EVENT_TAP, TapType::EventSyncDetect))]
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::P25_SYNC_PATTERN;
    use crate::tap::{CollectingListener, TapPayload};

    fn dibit_tap() -> Tap {
        Tap::new(DIBIT_STREAM_TAP, TapType::StreamDibit)
    }

    fn synthetic_dibits(count: usize) -> Vec<Dibit> {
        (0..count).map(|n| Dibit::from_bits((n % 4) as u8)).collect()
    }

    fn received_dibits(listener: &CollectingListener) -> Vec<Dibit> {
        listener
            .payloads()
            .into_iter()
            .flat_map(|payload| match payload {
                TapPayload::StreamDibit(dibits) => dibits,
                other => panic!("unexpected payload {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_register_feed_unregister_scenario() {
        let detector = SyncDetector::new("sync", P25_SYNC_PATTERN, 0);
        let groups = detector.tap_groups();
        assert_eq!(groups[0].name(), SYNC_GROUP);
        let listed: Vec<_> = groups[0].taps().map(|t| (t.name().to_string(), t.tap_type())).collect();
        assert_eq!(
            listed,
            vec![
                (DIBIT_STREAM_TAP.to_string(), TapType::StreamDibit),
                (SYNC_EVENT_TAP.to_string(), TapType::EventSyncDetect),
            ]
        );

        let listener = Arc::new(CollectingListener::new());
        detector.register_tap(&dibit_tap(), listener.clone()).unwrap();

        let first = synthetic_dibits(100);
        for (n, dibit) in first.iter().enumerate() {
            detector.receive_dibit(*dibit, n as u64);
        }
        assert_eq!(received_dibits(&listener), first);

        detector.unregister_tap(&dibit_tap()).unwrap();
        for dibit in synthetic_dibits(50) {
            detector.receive_dibit(dibit, 0);
        }
        assert_eq!(listener.unit_count(), 100);
    }

    #[test]
    fn test_detects_exact_pattern() {
        let detector = SyncDetector::new("sync", P25_SYNC_PATTERN, 0);
        let events = Arc::new(CollectingListener::new());
        detector
            .register_tap(&Tap::new(SYNC_EVENT_TAP, TapType::EventSyncDetect), events.clone())
            .unwrap();

        let mut detections = Vec::new();
        for (n, dibit) in pattern_dibits(P25_SYNC_PATTERN).into_iter().enumerate() {
            if let Some(event) = detector.receive_dibit(dibit, n as u64) {
                detections.push(event);
            }
        }

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].bit_errors, 0);
        assert_eq!(detections[0].sample_index, 23);
        assert_eq!(events.unit_count(), 1);
    }

    #[test]
    fn test_tolerates_configured_bit_errors() {
        let corrupted = P25_SYNC_PATTERN ^ 0b101;
        let strict = SyncDetector::new("strict", P25_SYNC_PATTERN, 1);
        let lenient = SyncDetector::new("lenient", P25_SYNC_PATTERN, 2);

        let mut strict_hits = 0;
        let mut lenient_hits = Vec::new();
        for dibit in pattern_dibits(corrupted) {
            strict_hits += strict.receive_dibit(dibit, 0).is_some() as usize;
            lenient_hits.extend(lenient.receive_dibit(dibit, 0));
        }

        assert_eq!(strict_hits, 0);
        assert_eq!(lenient_hits.len(), 1);
        assert_eq!(lenient_hits[0].bit_errors, 2);
    }

    #[test]
    fn test_no_detection_before_full_window() {
        let detector = SyncDetector::new("sync", 0, 48);
        let hits: usize = (0..23)
            .filter(|_| detector.receive_dibit(Dibit::D00Plus1, 0).is_some())
            .count();
        assert_eq!(hits, 0);
        assert!(detector.receive_dibit(Dibit::D00Plus1, 0).is_some());
    }

    #[test]
    fn test_pattern_dibits_round_trip() {
        let dibits = pattern_dibits(P25_SYNC_PATTERN);
        assert_eq!(dibits.len(), 24);
        let rebuilt = dibits
            .iter()
            .fold(0u64, |acc, d| (acc << 2) | d.bits() as u64);
        assert_eq!(rebuilt, P25_SYNC_PATTERN);
        assert_eq!(dibits[0], Dibit::D01Plus3);
    }

    #[test]
    fn test_unregister_never_registered_is_ok() {
        let detector = SyncDetector::new("sync", P25_SYNC_PATTERN, 0);
        assert!(detector.unregister_tap(&dibit_tap()).is_ok());
        assert!(detector.unregister_tap(&dibit_tap()).is_ok());
        assert!(detector.active_taps().is_empty());
    }
}
