// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of stream and event kinds a tap can expose.
///
/// Each variant owns one bit of a `u16` mask so registries can answer
/// "is anything of this type attached?" without taking a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TapType {
    EventSyncDetect,
    StreamBinary,
    StreamComplex,
    StreamComplexSample,
    StreamDibit,
    StreamEyeDiagram,
    StreamFloat,
    StreamQpsk,
    StreamSymbol,
}

impl TapType {
    pub const ALL: [TapType; 9] = [
        TapType::EventSyncDetect,
        TapType::StreamBinary,
        TapType::StreamComplex,
        TapType::StreamComplexSample,
        TapType::StreamDibit,
        TapType::StreamEyeDiagram,
        TapType::StreamFloat,
        TapType::StreamQpsk,
        TapType::StreamSymbol,
    ];

    /// Event taps deliver discrete occurrences and are never batched.
    pub fn is_event(self) -> bool {
        matches!(self, TapType::EventSyncDetect)
    }

    pub(crate) fn mask_bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TapType::EventSyncDetect => "EVENT_SYNC_DETECT",
            TapType::StreamBinary => "STREAM_BINARY",
            TapType::StreamComplex => "STREAM_COMPLEX",
            TapType::StreamComplexSample => "STREAM_COMPLEX_SAMPLE",
            TapType::StreamDibit => "STREAM_DIBIT",
            TapType::StreamEyeDiagram => "STREAM_EYE_DIAGRAM",
            TapType::StreamFloat => "STREAM_FLOAT",
            TapType::StreamQpsk => "STREAM_QPSK",
            TapType::StreamSymbol => "STREAM_SYMBOL",
        }
    }
}

impl fmt::Display for TapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
