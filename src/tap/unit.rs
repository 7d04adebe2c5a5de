// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Payload shapes carried by taps.
//!
//! [`TapUnit`] is one produced unit tagged with its [`TapType`]; [`TapPayload`]
//! is the homogeneous batch a listener receives. Keeping the batch as one
//! `Vec` per variant means a listener matches once per delivery and the
//! element type can never disagree with the tap it was registered for.

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::Serialize;

use crate::errors::TapError;
use crate::tap::TapType;

/// Complex baseband sample (in-phase / quadrature).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Complex {
    pub i: f32,
    pub q: f32,
}

impl Complex {
    pub const fn new(i: f32, q: f32) -> Self {
        Self { i, q }
    }

    /// Unit phasor at `radians`.
    pub fn from_phase(radians: f32) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    pub fn conj(self) -> Self {
        Self::new(self.i, -self.q)
    }

    pub fn phase(self) -> f32 {
        self.q.atan2(self.i)
    }

    pub fn magnitude_squared(self) -> f32 {
        self.i * self.i + self.q * self.q
    }

    pub fn magnitude(self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.i * factor, self.q * factor)
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.i + rhs.i, self.q + rhs.q)
    }
}

impl AddAssign for Complex {
    fn add_assign(&mut self, rhs: Complex) {
        self.i += rhs.i;
        self.q += rhs.q;
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.i - rhs.i, self.q - rhs.q)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.i * rhs.i - self.q * rhs.q,
            self.i * rhs.q + self.q * rhs.i,
        )
    }
}

/// Four-level symbol as used by C4FM: two bits mapped onto +3/+1/-1/-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dibit {
    D01Plus3,
    D00Plus1,
    D10Minus1,
    D11Minus3,
}

impl Dibit {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => Dibit::D01Plus3,
            0b00 => Dibit::D00Plus1,
            0b10 => Dibit::D10Minus1,
            _ => Dibit::D11Minus3,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Dibit::D01Plus3 => 0b01,
            Dibit::D00Plus1 => 0b00,
            Dibit::D10Minus1 => 0b10,
            Dibit::D11Minus3 => 0b11,
        }
    }

    /// Nominal symbol level in units of the inner deviation.
    pub fn symbol_value(self) -> f32 {
        match self {
            Dibit::D01Plus3 => 3.0,
            Dibit::D00Plus1 => 1.0,
            Dibit::D10Minus1 => -1.0,
            Dibit::D11Minus3 => -3.0,
        }
    }

    /// Hard decision against the +/-2 and 0 thresholds.
    pub fn decide(level: f32) -> Self {
        if level >= 2.0 {
            Dibit::D01Plus3
        } else if level >= 0.0 {
            Dibit::D00Plus1
        } else if level >= -2.0 {
            Dibit::D10Minus1
        } else {
            Dibit::D11Minus3
        }
    }
}

/// Symbol timing decision point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymbolEvent {
    pub sample_index: u64,
    pub samples_per_symbol: f32,
    /// Integrated level at the decision point.
    pub value: f32,
    /// Difference between the late and early half-symbol energies.
    pub timing_error: f32,
}

/// Demodulated samples spanning two symbol periods around one decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EyeDiagramData {
    pub samples: Vec<f32>,
    pub samples_per_symbol: usize,
    /// Index into `samples` of the decision point.
    pub decision_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncDetectEvent {
    pub sample_index: u64,
    pub pattern: u64,
    pub bit_errors: u32,
}

/// One produced unit, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TapUnit {
    SyncDetect(SyncDetectEvent),
    Binary(bool),
    Complex(Complex),
    ComplexSample(Complex),
    Dibit(Dibit),
    EyeDiagram(EyeDiagramData),
    Float(f32),
    Qpsk(Complex),
    Symbol(SymbolEvent),
}

impl TapUnit {
    pub fn tap_type(&self) -> TapType {
        match self {
            TapUnit::SyncDetect(_) => TapType::EventSyncDetect,
            TapUnit::Binary(_) => TapType::StreamBinary,
            TapUnit::Complex(_) => TapType::StreamComplex,
            TapUnit::ComplexSample(_) => TapType::StreamComplexSample,
            TapUnit::Dibit(_) => TapType::StreamDibit,
            TapUnit::EyeDiagram(_) => TapType::StreamEyeDiagram,
            TapUnit::Float(_) => TapType::StreamFloat,
            TapUnit::Qpsk(_) => TapType::StreamQpsk,
            TapUnit::Symbol(_) => TapType::StreamSymbol,
        }
    }
}

impl From<Dibit> for TapUnit {
    fn from(dibit: Dibit) -> Self {
        TapUnit::Dibit(dibit)
    }
}

impl From<SyncDetectEvent> for TapUnit {
    fn from(event: SyncDetectEvent) -> Self {
        TapUnit::SyncDetect(event)
    }
}

impl From<SymbolEvent> for TapUnit {
    fn from(event: SymbolEvent) -> Self {
        TapUnit::Symbol(event)
    }
}

impl From<EyeDiagramData> for TapUnit {
    fn from(data: EyeDiagramData) -> Self {
        TapUnit::EyeDiagram(data)
    }
}

/// Homogeneous batch delivered to a tap listener.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "units", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TapPayload {
    EventSyncDetect(Vec<SyncDetectEvent>),
    StreamBinary(Vec<bool>),
    StreamComplex(Vec<Complex>),
    StreamComplexSample(Vec<Complex>),
    StreamDibit(Vec<Dibit>),
    StreamEyeDiagram(Vec<EyeDiagramData>),
    StreamFloat(Vec<f32>),
    StreamQpsk(Vec<Complex>),
    StreamSymbol(Vec<SymbolEvent>),
}

impl TapPayload {
    pub fn with_capacity(tap_type: TapType, capacity: usize) -> Self {
        match tap_type {
            TapType::EventSyncDetect => TapPayload::EventSyncDetect(Vec::with_capacity(capacity)),
            TapType::StreamBinary => TapPayload::StreamBinary(Vec::with_capacity(capacity)),
            TapType::StreamComplex => TapPayload::StreamComplex(Vec::with_capacity(capacity)),
            TapType::StreamComplexSample => {
                TapPayload::StreamComplexSample(Vec::with_capacity(capacity))
            }
            TapType::StreamDibit => TapPayload::StreamDibit(Vec::with_capacity(capacity)),
            TapType::StreamEyeDiagram => TapPayload::StreamEyeDiagram(Vec::with_capacity(capacity)),
            TapType::StreamFloat => TapPayload::StreamFloat(Vec::with_capacity(capacity)),
            TapType::StreamQpsk => TapPayload::StreamQpsk(Vec::with_capacity(capacity)),
            TapType::StreamSymbol => TapPayload::StreamSymbol(Vec::with_capacity(capacity)),
        }
    }

    pub fn tap_type(&self) -> TapType {
        match self {
            TapPayload::EventSyncDetect(_) => TapType::EventSyncDetect,
            TapPayload::StreamBinary(_) => TapType::StreamBinary,
            TapPayload::StreamComplex(_) => TapType::StreamComplex,
            TapPayload::StreamComplexSample(_) => TapType::StreamComplexSample,
            TapPayload::StreamDibit(_) => TapType::StreamDibit,
            TapPayload::StreamEyeDiagram(_) => TapType::StreamEyeDiagram,
            TapPayload::StreamFloat(_) => TapType::StreamFloat,
            TapPayload::StreamQpsk(_) => TapType::StreamQpsk,
            TapPayload::StreamSymbol(_) => TapType::StreamSymbol,
        }
    }

    /// Append one unit. The unit's tag must equal the payload's.
    pub fn push(&mut self, unit: TapUnit) -> Result<(), TapError> {
        match (self, unit) {
            (TapPayload::EventSyncDetect(v), TapUnit::SyncDetect(u)) => v.push(u),
            (TapPayload::StreamBinary(v), TapUnit::Binary(u)) => v.push(u),
            (TapPayload::StreamComplex(v), TapUnit::Complex(u)) => v.push(u),
            (TapPayload::StreamComplexSample(v), TapUnit::ComplexSample(u)) => v.push(u),
            (TapPayload::StreamDibit(v), TapUnit::Dibit(u)) => v.push(u),
            (TapPayload::StreamEyeDiagram(v), TapUnit::EyeDiagram(u)) => v.push(u),
            (TapPayload::StreamFloat(v), TapUnit::Float(u)) => v.push(u),
            (TapPayload::StreamQpsk(v), TapUnit::Qpsk(u)) => v.push(u),
            (TapPayload::StreamSymbol(v), TapUnit::Symbol(u)) => v.push(u),
            (payload, unit) => {
                return Err(TapError::TypeMismatch {
                    expected: payload.tap_type(),
                    actual: unit.tap_type(),
                })
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        match self {
            TapPayload::EventSyncDetect(v) => v.len(),
            TapPayload::StreamBinary(v) => v.len(),
            TapPayload::StreamComplex(v) => v.len(),
            TapPayload::StreamComplexSample(v) => v.len(),
            TapPayload::StreamDibit(v) => v.len(),
            TapPayload::StreamEyeDiagram(v) => v.len(),
            TapPayload::StreamFloat(v) => v.len(),
            TapPayload::StreamQpsk(v) => v.len(),
            TapPayload::StreamSymbol(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand over the accumulated batch, leaving an empty one of the same type.
    pub fn take(&mut self, capacity: usize) -> TapPayload {
        let empty = TapPayload::with_capacity(self.tap_type(), capacity);
        std::mem::replace(self, empty)
    }

    /// Split back into tagged units, mostly useful to generic consumers.
    pub fn into_units(self) -> Vec<TapUnit> {
        match self {
            TapPayload::EventSyncDetect(v) => v.into_iter().map(TapUnit::SyncDetect).collect(),
            TapPayload::StreamBinary(v) => v.into_iter().map(TapUnit::Binary).collect(),
            TapPayload::StreamComplex(v) => v.into_iter().map(TapUnit::Complex).collect(),
            TapPayload::StreamComplexSample(v) => {
                v.into_iter().map(TapUnit::ComplexSample).collect()
            }
            TapPayload::StreamDibit(v) => v.into_iter().map(TapUnit::Dibit).collect(),
            TapPayload::StreamEyeDiagram(v) => v.into_iter().map(TapUnit::EyeDiagram).collect(),
            TapPayload::StreamFloat(v) => v.into_iter().map(TapUnit::Float).collect(),
            TapPayload::StreamQpsk(v) => v.into_iter().map(TapUnit::Qpsk).collect(),
            TapPayload::StreamSymbol(v) => v.into_iter().map(TapUnit::Symbol).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dibit_bits_and_levels() {
        for bits in 0..4u8 {
            assert_eq!(Dibit::from_bits(bits).bits(), bits);
        }
        assert_eq!(Dibit::D01Plus3.symbol_value(), 3.0);
        assert_eq!(Dibit::D11Minus3.symbol_value(), -3.0);
    }

    #[test]
    fn test_dibit_decisions() {
        assert_eq!(Dibit::decide(2.7), Dibit::D01Plus3);
        assert_eq!(Dibit::decide(0.8), Dibit::D00Plus1);
        assert_eq!(Dibit::decide(-1.2), Dibit::D10Minus1);
        assert_eq!(Dibit::decide(-3.3), Dibit::D11Minus3);
    }

    #[test]
    fn test_complex_arithmetic() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, -1.0);
        assert_eq!(a * b, Complex::new(5.0, 5.0));
        assert_eq!(a + b, Complex::new(4.0, 1.0));
        assert_eq!(a.conj(), Complex::new(1.0, -2.0));
        assert!((Complex::from_phase(0.5).phase() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unit_tags() {
        assert_eq!(TapUnit::Float(1.0).tap_type(), TapType::StreamFloat);
        assert_eq!(TapUnit::Qpsk(Complex::default()).tap_type(), TapType::StreamQpsk);
        assert_eq!(TapUnit::from(Dibit::D00Plus1).tap_type(), TapType::StreamDibit);
    }

    #[test]
    fn test_payload_push_matching_type() {
        let mut payload = TapPayload::with_capacity(TapType::StreamFloat, 4);
        payload.push(TapUnit::Float(0.25)).unwrap();
        payload.push(TapUnit::Float(0.5)).unwrap();
        assert_eq!(payload, TapPayload::StreamFloat(vec![0.25, 0.5]));
    }

    #[test]
    fn test_payload_rejects_mismatch() {
        let mut payload = TapPayload::with_capacity(TapType::StreamComplex, 4);
        let err = payload
            .push(TapUnit::ComplexSample(Complex::new(1.0, 0.0)))
            .unwrap_err();
        assert!(matches!(
            err,
            TapError::TypeMismatch {
                expected: TapType::StreamComplex,
                actual: TapType::StreamComplexSample
            }
        ));
        assert!(payload.is_empty());
    }

    #[test]
    fn test_payload_take_leaves_empty_batch_of_same_type() {
        let mut payload = TapPayload::with_capacity(TapType::StreamBinary, 2);
        payload.push(TapUnit::Binary(true)).unwrap();
        let taken = payload.take(2);
        assert_eq!(taken.len(), 1);
        assert!(payload.is_empty());
        assert_eq!(payload.tap_type(), TapType::StreamBinary);
    }

    #[test]
    fn test_payload_serializes_with_type_tag() {
        let payload = TapPayload::StreamDibit(vec![Dibit::D01Plus3]);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"type":"STREAM_DIBIT","units":["D01Plus3"]}"#);
    }
}
