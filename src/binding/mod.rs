// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Connects a chain's advertised taps to viewers.
//!
//! [`TapBinding`] enumerates the tap menu across a chain's modules and turns
//! selection requests into register/unregister calls. Modules stay the single
//! source of truth for what is selected; the binding keeps no shadow state.

mod tap_binding;
mod view;

pub use tap_binding::TapBinding;
pub use view::{JsonLinesView, JsonLinesViewFactory, TapViewFactory};
