// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module-owned registry of active taps and the dispatch path into them.
//!
//! A module owns exactly one `TapRegistry` per tappable component. Every
//! mutation of the bindings and every "check attached, then forward" step run
//! under the same mutex, which gives two guarantees:
//!
//! * once `bind` returns, the next matching unit produced is delivered;
//! * once `unbind` returns, no further unit reaches that listener, because an
//!   in-flight delivery holds the lock that `unbind` waits on.
//!
//! A listener that changes taps on the same registry from inside `receive`
//! would wait on the lock its own thread holds. Such changes are queued
//! instead: taps they name receive nothing more from the current dispatch,
//! and the queue is applied before the lock is released.
//!
//! The per-type bitmask lets the producer skip the lock entirely when nothing
//! of a unit's type is attached. It is written only while the lock is held.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::errors::TapError;
use crate::observability::messages::tap::{
    TapChangeDeferred, TapDeliveryFailed, TapRebound, TapRegistered, TapRegistrationRejected,
    TapTypeMismatch, TapUnregistered, TapsCleared,
};
use crate::observability::messages::StructuredLog;
use crate::tap::{Tap, TapListener, TapPayload, TapType, TapUnit};
use crate::utils::call_isolated;

struct Binding {
    tap: Tap,
    listener: Arc<dyn TapListener>,
    pending: TapPayload,
    delivered_units: u64,
    failed_deliveries: u64,
}

impl Binding {
    fn new(tap: Tap, listener: Arc<dyn TapListener>) -> Self {
        let pending = TapPayload::with_capacity(tap.tap_type(), tap.batch_size());
        Self {
            tap,
            listener,
            pending,
            delivered_units: 0,
            failed_deliveries: 0,
        }
    }

    fn accept(&mut self, unit: TapUnit, owner: &str) {
        if let Err(error) = self.pending.push(unit) {
            debug_assert!(false, "tap {} fed a foreign unit: {}", self.tap, error);
            if let TapError::TypeMismatch { expected, actual } = error {
                TapTypeMismatch {
                    module_id: owner,
                    tap_name: self.tap.name(),
                    expected,
                    actual,
                }
                .log();
            }
            return;
        }

        if self.pending.len() >= self.tap.batch_size() {
            let payload = self.pending.take(self.tap.batch_size());
            self.deliver(&payload, owner);
        }
    }

    fn deliver(&mut self, payload: &TapPayload, owner: &str) {
        let listener = &self.listener;
        let tap = &self.tap;
        match call_isolated(|| listener.receive(tap, payload)) {
            Ok(()) => self.delivered_units += payload.len() as u64,
            Err(reason) => {
                self.failed_deliveries += 1;
                TapDeliveryFailed {
                    module_id: owner,
                    tap_name: tap.name(),
                    tap_type: tap.tap_type(),
                    reason: &reason,
                }
                .log();
            }
        }
    }
}

fn type_mask(bindings: &[Binding]) -> u16 {
    bindings
        .iter()
        .fold(0, |mask, binding| mask | binding.tap.tap_type().mask_bit())
}

/// A binding change requested from inside a delivery.
enum Change {
    Bind(Tap, Arc<dyn TapListener>),
    Unbind(Tap),
    Clear { close: bool },
}

impl Change {
    fn touches(&self, tap: &Tap) -> bool {
        match self {
            Change::Bind(target, _) | Change::Unbind(target) => target == tap,
            Change::Clear { .. } => true,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Change::Bind(..) => "bind",
            Change::Unbind(_) => "unbind",
            Change::Clear { close: false } => "clear",
            Change::Clear { close: true } => "close",
        }
    }
}

#[derive(Default)]
struct Delivery {
    thread: Option<ThreadId>,
    deferred: Vec<Change>,
}

/// Delivery counters for one active tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapStats {
    pub tap: Tap,
    pub delivered_units: u64,
    pub failed_deliveries: u64,
    /// Units accumulated toward the next batch.
    pub pending_units: usize,
}

pub struct TapRegistry {
    owner: Arc<str>,
    active_types: AtomicU16,
    closed: AtomicBool,
    bindings: Mutex<Vec<Binding>>,
    delivery: Mutex<Delivery>,
}

impl TapRegistry {
    pub fn new(owner: impl Into<Arc<str>>) -> Self {
        Self {
            owner: owner.into(),
            active_types: AtomicU16::new(0),
            closed: AtomicBool::new(false),
            bindings: Mutex::new(Vec::new()),
            delivery: Mutex::new(Delivery::default()),
        }
    }

    /// Identifier of the owning module, used in diagnostics.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    // A listener panic is caught inside the critical section, so poisoning
    // only follows a bug in the registry itself; the bindings stay coherent.
    fn lock(&self) -> MutexGuard<'_, Vec<Binding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Never held across a listener call, and never held while waiting on
    // `bindings`.
    fn delivery(&self) -> MutexGuard<'_, Delivery> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `change` when the calling thread is inside this registry's
    /// dispatch. Hands it back otherwise.
    fn defer(&self, change: Change) -> Option<Change> {
        let mut delivery = self.delivery();
        if delivery.thread != Some(thread::current().id()) {
            return Some(change);
        }
        TapChangeDeferred {
            module_id: &self.owner,
            change: change.describe(),
        }
        .log();
        delivery.deferred.push(change);
        None
    }

    fn has_deferred_change(&self, tap: &Tap) -> bool {
        self.delivery().deferred.iter().any(|change| change.touches(tap))
    }

    fn reject(&self, tap: &Tap) -> TapError {
        TapRegistrationRejected {
            module_id: &self.owner,
            tap_name: tap.name(),
            tap_type: tap.tap_type(),
        }
        .log();
        TapError::Closed(self.owner.to_string())
    }

    /// `true` once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Attach `listener` to `tap`. Returns `true` when an existing binding
    /// with the same identity was replaced; the previous listener receives
    /// nothing further and its partial batch is dropped.
    ///
    /// Called from inside a delivery on this registry, the bind is applied
    /// when that delivery returns and `false` is reported.
    ///
    /// # Errors
    /// `TapError::Closed` after [`close`](Self::close).
    pub fn bind(&self, tap: Tap, listener: Arc<dyn TapListener>) -> Result<bool, TapError> {
        if self.is_closed() {
            return Err(self.reject(&tap));
        }
        let (tap, listener) = match self.defer(Change::Bind(tap, listener)) {
            Some(Change::Bind(tap, listener)) => (tap, listener),
            _ => return Ok(false),
        };

        let mut bindings = self.lock();
        if self.is_closed() {
            drop(bindings);
            return Err(self.reject(&tap));
        }
        Ok(self.attach(&mut bindings, tap, listener))
    }

    /// Detach `tap`. Returns `false` (and changes nothing) when it was not
    /// bound. Called from inside a delivery on this registry, the tap gets
    /// nothing further from that delivery, the removal is applied when it
    /// returns, and `true` is reported.
    pub fn unbind(&self, tap: &Tap) -> bool {
        if self.defer(Change::Unbind(tap.clone())).is_none() {
            return true;
        }
        let mut bindings = self.lock();
        self.detach(&mut bindings, tap)
    }

    /// Drop every binding, returning the taps that were active. The registry
    /// keeps accepting new bindings.
    pub fn clear(&self) -> Vec<Tap> {
        self.clear_bindings(false)
    }

    /// Drop every binding and refuse all later ones, returning the taps that
    /// were active. Releases every listener reference the registry held.
    pub fn close(&self) -> Vec<Tap> {
        self.clear_bindings(true)
    }

    fn clear_bindings(&self, close: bool) -> Vec<Tap> {
        if self.defer(Change::Clear { close }).is_none() {
            return Vec::new();
        }
        let mut bindings = self.lock();
        self.drain(&mut bindings, close)
    }

    fn apply(&self, bindings: &mut Vec<Binding>, change: Change) {
        match change {
            Change::Bind(tap, listener) => {
                if self.is_closed() {
                    self.reject(&tap);
                } else {
                    self.attach(bindings, tap, listener);
                }
            }
            Change::Unbind(tap) => {
                self.detach(bindings, &tap);
            }
            Change::Clear { close } => {
                self.drain(bindings, close);
            }
        }
    }

    fn attach(&self, bindings: &mut Vec<Binding>, tap: Tap, listener: Arc<dyn TapListener>) -> bool {
        let rebound = match bindings.iter_mut().find(|b| b.tap == tap) {
            Some(existing) => {
                *existing = Binding::new(tap.clone(), listener);
                true
            }
            None => {
                bindings.push(Binding::new(tap.clone(), listener));
                false
            }
        };
        self.active_types.store(type_mask(bindings), Ordering::SeqCst);

        if rebound {
            TapRebound {
                module_id: &self.owner,
                tap_name: tap.name(),
                tap_type: tap.tap_type(),
            }
            .log();
        } else {
            TapRegistered {
                module_id: &self.owner,
                tap_name: tap.name(),
                tap_type: tap.tap_type(),
                batch_size: tap.batch_size(),
            }
            .log();
        }
        rebound
    }

    fn detach(&self, bindings: &mut Vec<Binding>, tap: &Tap) -> bool {
        let before = bindings.len();
        bindings.retain(|b| b.tap != *tap);
        let removed = bindings.len() != before;
        if removed {
            self.active_types.store(type_mask(bindings), Ordering::SeqCst);
            TapUnregistered {
                module_id: &self.owner,
                tap_name: tap.name(),
                tap_type: tap.tap_type(),
            }
            .log();
        }
        removed
    }

    fn drain(&self, bindings: &mut Vec<Binding>, close: bool) -> Vec<Tap> {
        let removed: Vec<Tap> = bindings.drain(..).map(|b| b.tap).collect();
        self.active_types.store(0, Ordering::SeqCst);
        if close {
            self.closed.store(true, Ordering::SeqCst);
        }

        if !removed.is_empty() || close {
            TapsCleared {
                module_id: &self.owner,
                count: removed.len(),
                closed: close,
            }
            .log();
        }
        removed
    }

    pub fn is_bound(&self, tap: &Tap) -> bool {
        self.lock().iter().any(|b| b.tap == *tap)
    }

    pub fn active_taps(&self) -> Vec<Tap> {
        self.lock().iter().map(|b| b.tap.clone()).collect()
    }

    /// Delivery counters for every active tap, in registration order.
    pub fn stats(&self) -> Vec<TapStats> {
        self.lock()
            .iter()
            .map(|b| TapStats {
                tap: b.tap.clone(),
                delivered_units: b.delivered_units,
                failed_deliveries: b.failed_deliveries,
                pending_units: b.pending.len(),
            })
            .collect()
    }

    /// Lock-free presence check for the producer's fast path.
    pub fn is_active(&self, tap_type: TapType) -> bool {
        self.active_types.load(Ordering::SeqCst) & tap_type.mask_bit() != 0
    }

    /// Forward `unit` to every bound tap of the unit's type.
    pub fn dispatch(&self, unit: TapUnit) {
        let tap_type = unit.tap_type();
        if !self.is_active(tap_type) {
            return;
        }

        let mut bindings = self.lock();
        self.delivery().thread = Some(thread::current().id());

        let mut matching = bindings.iter_mut().filter(|b| b.tap.matches(tap_type)).peekable();
        while let Some(binding) = matching.next() {
            if self.has_deferred_change(&binding.tap) {
                continue;
            }
            if matching.peek().is_some() {
                binding.accept(unit.clone(), &self.owner);
            } else {
                binding.accept(unit, &self.owner);
                break;
            }
        }

        let deferred = {
            let mut delivery = self.delivery();
            delivery.thread = None;
            std::mem::take(&mut delivery.deferred)
        };
        for change in deferred {
            self.apply(&mut bindings, change);
        }
    }

    /// Like [`dispatch`](Self::dispatch) but only builds the unit when a tap
    /// of `tap_type` is attached.
    pub fn dispatch_with<F>(&self, tap_type: TapType, build: F)
    where
        F: FnOnce() -> TapUnit,
    {
        if self.is_active(tap_type) {
            self.dispatch(build());
        }
    }
}

impl std::fmt::Debug for TapRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapRegistry")
            .field("owner", &self.owner)
            .field("closed", &self.is_closed())
            .field("active_taps", &self.active_taps())
            .finish()
    }
}
