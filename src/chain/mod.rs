// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The processing chain host: an ordered set of modules driven by one
//! source on one producer thread.

mod message;
mod processing_chain;

#[cfg(test)]
mod integration_tests;

pub use message::{LoggingMessageListener, Message, MessageKind, MessageListener};
pub use processing_chain::{ChainState, ChainStats, ProcessingChain};
