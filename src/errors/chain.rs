// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::chain::ChainState;

/// Errors from processing chain lifecycle operations.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The requested operation is not valid from the chain's current state.
    #[error("Cannot {action} a processing chain in state {state}")]
    InvalidTransition {
        action: &'static str,
        state: ChainState,
    },

    #[error("Duplicate module id: '{0}'")]
    DuplicateModule(String),

    #[error("A processing chain needs at least one module")]
    NoModules,

    #[error("No sample source bound to the processing chain")]
    MissingSource,

    #[error("Failed to spawn producer thread: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Producer thread panicked: {0}")]
    ProducerPanicked(String),
}
