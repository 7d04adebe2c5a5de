// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Instrumentation taps: typed probe points on a module's internal streams.
//!
//! * [`Tap`] / [`TapGroup`] - identity and grouping, plain values
//! * [`TapUnit`] / [`TapPayload`] - what flows through a tap
//! * [`TapListener`] - consumer supplied at registration time
//! * [`TapRegistry`] - module-owned bindings and the dispatch path

mod group;
mod listener;
mod registry;
#[allow(clippy::module_inception)]
mod tap;
mod tap_type;
mod unit;

pub use group::{find_advertised, TapGroup};
pub use listener::{CollectingListener, TapListener};
pub use registry::{TapRegistry, TapStats};
pub use tap::{Tap, TapKey};
pub use tap_type::TapType;
pub use unit::{
    Complex, Dibit, EyeDiagramData, SymbolEvent, SyncDetectEvent, TapPayload, TapUnit,
};
