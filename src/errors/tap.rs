// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors returned to callers of the tap lifecycle operations.
//!
//! None of these ever cross the producer thread: they are returned from
//! `register_tap` / binding calls to whoever made the request.

use thiserror::Error;

use crate::tap::TapType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TapError {
    /// The module does not currently advertise the requested tap.
    #[error("Module '{module_id}' does not advertise tap '{tap_name}' [{tap_type}]")]
    UnknownTap {
        module_id: String,
        tap_name: String,
        tap_type: TapType,
    },

    /// A unit of one type was fed to a tap of another. This is a wiring bug
    /// in the producing module, never a user error.
    #[error("Tap type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: TapType, actual: TapType },

    /// The module's taps were closed by chain shutdown; nothing new binds.
    #[error("Module '{0}' no longer accepts taps")]
    Closed(String),

    /// Binding-level request named a module that is not in the chain.
    #[error("No module with id '{0}'")]
    UnknownModule(String),

    /// Binding-level request named a module without the tap capability.
    #[error("Module '{0}' does not expose any taps")]
    NotInstrumentable(String),
}

impl TapError {
    pub fn unknown_tap(module_id: &str, tap: &crate::tap::Tap) -> Self {
        TapError::UnknownTap {
            module_id: module_id.to_string(),
            tap_name: tap.name().to_string(),
            tap_type: tap.tap_type(),
        }
    }
}
