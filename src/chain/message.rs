// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use serde::Serialize;

use crate::observability::messages::chain::MessageReceived;
use crate::observability::messages::StructuredLog;

/// Module-level status or control message fanned out to chain listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub source_module: String,
    /// Source sample index the message refers to.
    pub sample_index: u64,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageKind {
    SyncDetected { bit_errors: u32 },
    SignalPower { dbfs: f32 },
}

impl Message {
    pub fn new(source_module: impl Into<String>, sample_index: u64, kind: MessageKind) -> Self {
        Self {
            source_module: source_module.into(),
            sample_index,
            kind,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::SyncDetected { bit_errors } => {
                write!(f, "sync detected ({} bit errors)", bit_errors)
            }
            MessageKind::SignalPower { dbfs } => write!(f, "signal power {:.1} dBFS", dbfs),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} @{}] {}", self.source_module, self.sample_index, self.kind)
    }
}

/// Receiver of module messages. Called on the producer thread.
pub trait MessageListener: Send + Sync {
    fn receive(&self, message: &Message) -> anyhow::Result<()>;
}

impl<F> MessageListener for F
where
    F: Fn(&Message) -> anyhow::Result<()> + Send + Sync,
{
    fn receive(&self, message: &Message) -> anyhow::Result<()> {
        self(message)
    }
}

/// Writes every message to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMessageListener;

impl MessageListener for LoggingMessageListener {
    fn receive(&self, message: &Message) -> anyhow::Result<()> {
        let text = message.kind.to_string();
        MessageReceived {
            source_module: &message.source_module,
            sample_index: message.sample_index,
            text: &text,
        }
        .log();
        Ok(())
    }
}
