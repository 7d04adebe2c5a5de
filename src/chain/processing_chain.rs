// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::chain::{Message, MessageListener};
use crate::errors::ChainError;
use crate::observability::messages::chain::{
    ChainDropFailed, ChainStarted, ChainStopped, MessageDeliveryFailed, SourceExhausted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Module, SampleSource};
use crate::utils::{call_isolated, describe_panic};

/// Lifecycle of a [`ProcessingChain`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Created,
    ModulesAttached,
    Running,
    Stopped,
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainState::Created => "CREATED",
            ChainState::ModulesAttached => "MODULES_ATTACHED",
            ChainState::Running => "RUNNING",
            ChainState::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// Snapshot of producer-side counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainStats {
    pub buffers_processed: u64,
    pub samples_processed: u64,
    pub messages_emitted: u64,
}

#[derive(Debug, Default)]
struct ChainCounters {
    buffers: AtomicU64,
    samples: AtomicU64,
    messages: AtomicU64,
}

impl ChainCounters {
    fn snapshot(&self) -> ChainStats {
        ChainStats {
            buffers_processed: self.buffers.load(Ordering::Relaxed),
            samples_processed: self.samples.load(Ordering::Relaxed),
            messages_emitted: self.messages.load(Ordering::Relaxed),
        }
    }
}

/// Ordered modules driven by a single source on a dedicated producer thread.
///
/// ```text
/// CREATED --add_modules--> MODULES_ATTACHED --start--> RUNNING --stop--> STOPPED
/// ```
///
/// Stopping detaches the source, flushes every module and closes every
/// module's taps. A stopped chain cannot be restarted.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tapline::chain::{ChainState, ProcessingChain};
/// use tapline::modules::FmDemodulator;
/// use tapline::source::{SignalKind, SyntheticSource, SyntheticSourceConfig};
/// use tapline::traits::Module;
///
/// let mut chain = ProcessingChain::new();
/// let fm: Arc<dyn Module> = Arc::new(FmDemodulator::new("fm", 64));
/// chain.add_modules(vec![fm]).unwrap();
/// chain.set_source(Box::new(SyntheticSource::new(SyntheticSourceConfig {
///     signal: SignalKind::Tone,
///     buffer_count: Some(4),
///     ..Default::default()
/// })))
/// .unwrap();
///
/// chain.start().unwrap();
/// chain.stop().unwrap();
/// assert_eq!(chain.state(), ChainState::Stopped);
/// ```
pub struct ProcessingChain {
    state: ChainState,
    modules: Vec<Arc<dyn Module>>,
    message_listeners: Vec<Arc<dyn MessageListener>>,
    source: Option<Box<dyn SampleSource>>,
    cancel: CancellationToken,
    producer: Option<JoinHandle<()>>,
    counters: Arc<ChainCounters>,
    started_at: Option<Instant>,
}

impl ProcessingChain {
    pub fn new() -> Self {
        Self {
            state: ChainState::Created,
            modules: Vec::new(),
            message_listeners: Vec::new(),
            source: None,
            cancel: CancellationToken::new(),
            producer: None,
            counters: Arc::new(ChainCounters::default()),
            started_at: None,
        }
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Supply the chain's modules, in processing order. Allowed once.
    ///
    /// # Errors
    /// `InvalidTransition` outside `CREATED`, `NoModules` for an empty list,
    /// `DuplicateModule` when two modules share an id.
    pub fn add_modules(&mut self, modules: Vec<Arc<dyn Module>>) -> Result<(), ChainError> {
        self.expect_state(ChainState::Created, "attach modules to")?;

        if modules.is_empty() {
            return Err(ChainError::NoModules);
        }

        let mut seen = HashSet::new();
        for module in &modules {
            if !seen.insert(module.id().to_string()) {
                return Err(ChainError::DuplicateModule(module.id().to_string()));
            }
        }

        self.modules = modules;
        self.state = ChainState::ModulesAttached;
        Ok(())
    }

    /// Register a listener for module messages. Must happen before `start`.
    pub fn add_message_listener(
        &mut self,
        listener: Arc<dyn MessageListener>,
    ) -> Result<(), ChainError> {
        self.expect_setup("add a message listener to")?;
        self.message_listeners.push(listener);
        Ok(())
    }

    /// Bind the upstream source, replacing any previously bound one.
    pub fn set_source(&mut self, source: Box<dyn SampleSource>) -> Result<(), ChainError> {
        self.expect_setup("bind a source to")?;
        self.source = Some(source);
        Ok(())
    }

    /// Spawn the producer thread and begin pulling from the source.
    pub fn start(&mut self) -> Result<(), ChainError> {
        self.expect_state(ChainState::ModulesAttached, "start")?;
        let source = self.source.take().ok_or(ChainError::MissingSource)?;

        let started = ChainStarted {
            module_count: self.modules.len(),
            sample_rate: source.sample_rate(),
        };
        started.log();
        let span = started.span("producer");

        let modules = self.modules.clone();
        let listeners = self.message_listeners.clone();
        let cancel = self.cancel.clone();
        let counters = Arc::clone(&self.counters);

        let handle = thread::Builder::new()
            .name("tapline-producer".to_string())
            .spawn(move || {
                let _entered = span.enter();
                run_producer(source, &modules, &listeners, &cancel, &counters)
            })?;

        self.producer = Some(handle);
        self.started_at = Some(Instant::now());
        self.state = ChainState::Running;
        Ok(())
    }

    /// Stop producing, flush modules and close every module's taps.
    ///
    /// Closed taps release their listeners, and later registrations on the
    /// chain's modules fail with `TapError::Closed`. Calling `stop` on a
    /// chain that never started moves it straight to `STOPPED`; calling it
    /// again is a no-op.
    ///
    /// # Errors
    /// `ProducerPanicked` when a module panicked on the producer thread. The
    /// chain is still fully stopped in that case.
    pub fn stop(&mut self) -> Result<(), ChainError> {
        if self.state == ChainState::Stopped {
            return Ok(());
        }

        self.cancel.cancel();
        let joined = self.producer.take().map(JoinHandle::join);
        self.source = None;

        let mut messages = Vec::new();
        for module in &self.modules {
            module.flush(&mut messages);
        }
        broadcast(&self.message_listeners, &mut messages, &self.counters);

        let taps_cleared = self
            .modules
            .iter()
            .filter_map(|module| module.instrumentable())
            .map(|instrumentable| instrumentable.close_taps())
            .sum();

        self.state = ChainState::Stopped;
        ChainStopped {
            buffers_processed: self.counters.buffers.load(Ordering::Relaxed),
            taps_cleared,
            duration: self
                .started_at
                .map(|started| started.elapsed())
                .unwrap_or(Duration::ZERO),
        }
        .log();

        match joined {
            Some(Err(panic)) => Err(ChainError::ProducerPanicked(describe_panic(panic.as_ref()))),
            _ => Ok(()),
        }
    }

    /// Ordered snapshot of the attached modules.
    pub fn modules(&self) -> Vec<Arc<dyn Module>> {
        self.modules.clone()
    }

    pub fn module(&self, id: &str) -> Option<Arc<dyn Module>> {
        self.modules.iter().find(|m| m.id() == id).cloned()
    }

    /// `true` while the producer thread is still pulling from the source.
    pub fn is_producing(&self) -> bool {
        self.producer
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn stats(&self) -> ChainStats {
        self.counters.snapshot()
    }

    fn expect_state(&self, expected: ChainState, action: &'static str) -> Result<(), ChainError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ChainError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn expect_setup(&self, action: &'static str) -> Result<(), ChainError> {
        match self.state {
            ChainState::Created | ChainState::ModulesAttached => Ok(()),
            state => Err(ChainError::InvalidTransition { action, state }),
        }
    }
}

impl Default for ProcessingChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessingChain {
    fn drop(&mut self) {
        if self.state == ChainState::Running {
            if let Err(error) = self.stop() {
                ChainDropFailed { error: &error }.log();
            }
        }
    }
}

impl fmt::Debug for ProcessingChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingChain")
            .field("state", &self.state)
            .field(
                "modules",
                &self.modules.iter().map(|m| m.id()).collect::<Vec<_>>(),
            )
            .field("message_listeners", &self.message_listeners.len())
            .field("stats", &self.counters.snapshot())
            .finish()
    }
}

fn run_producer(
    mut source: Box<dyn SampleSource>,
    modules: &[Arc<dyn Module>],
    listeners: &[Arc<dyn MessageListener>],
    cancel: &CancellationToken,
    counters: &ChainCounters,
) {
    let mut messages = Vec::new();

    while !cancel.is_cancelled() {
        let Some(buffer) = source.next_buffer() else {
            SourceExhausted {
                buffers_processed: counters.buffers.load(Ordering::Relaxed),
            }
            .log();
            break;
        };

        for module in modules {
            module.receive(&buffer, &mut messages);
        }

        counters.buffers.fetch_add(1, Ordering::Relaxed);
        counters
            .samples
            .fetch_add(buffer.len() as u64, Ordering::Relaxed);
        broadcast(listeners, &mut messages, counters);
    }
}

fn broadcast(
    listeners: &[Arc<dyn MessageListener>],
    messages: &mut Vec<Message>,
    counters: &ChainCounters,
) {
    for message in messages.drain(..) {
        counters.messages.fetch_add(1, Ordering::Relaxed);
        for (index, listener) in listeners.iter().enumerate() {
            if let Err(reason) = call_isolated(|| listener.receive(&message)) {
                MessageDeliveryFailed {
                    listener_index: index,
                    source_module: &message.source_module,
                    reason: &reason,
                }
                .log();
            }
        }
    }
}
