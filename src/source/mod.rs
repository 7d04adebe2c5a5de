// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sample sources that feed a processing chain.

mod pn;
mod synthetic;

pub use pn::Pn9;
pub use synthetic::{SignalKind, SyntheticSource, SyntheticSourceConfig};
