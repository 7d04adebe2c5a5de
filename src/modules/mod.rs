// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Concrete processing modules and the factory that builds them from config.

pub mod c4fm_decoder;
pub mod dsp;
pub mod factory;
pub mod fm_demodulator;
pub mod power_meter;
pub mod qpsk_demodulator;
pub mod sync_detector;

pub use c4fm_decoder::{C4fmDecoder, C4fmDecoderConfig};
pub use factory::ModuleFactory;
pub use fm_demodulator::FmDemodulator;
pub use power_meter::PowerMeter;
pub use qpsk_demodulator::QpskDemodulator;
pub use sync_detector::SyncDetector;
