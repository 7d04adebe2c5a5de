// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The tap capability a module opts into.

use std::sync::Arc;

use crate::errors::TapError;
use crate::observability::messages::tap::UnknownTapRequested;
use crate::observability::messages::StructuredLog;
use crate::tap::{find_advertised, Tap, TapGroup, TapListener, TapRegistry, TapStats};

/// Capability to advertise tap groups and accept tap registrations.
///
/// All methods may be called from any thread while the owning module is
/// processing.
pub trait Instrumentable: Send + Sync {
    /// Fresh snapshot of the groups currently on offer.
    fn tap_groups(&self) -> Vec<TapGroup>;

    /// Start forwarding units of `tap`'s type to `listener`, beginning with
    /// the next unit produced. Registering an identity that is already
    /// registered replaces its listener.
    ///
    /// # Errors
    /// `TapError::UnknownTap` when `tap` is not in any current group, and
    /// `TapError::Closed` once [`close_taps`](Self::close_taps) has run;
    /// nothing changes in either case.
    fn register_tap(&self, tap: &Tap, listener: Arc<dyn TapListener>) -> Result<(), TapError>;

    /// Stop forwarding to `tap`. Always succeeds, including for taps that were
    /// never registered or are no longer advertised. No unit reaches the
    /// listener after this returns.
    fn unregister_tap(&self, tap: &Tap) -> Result<(), TapError>;

    /// Taps currently registered.
    fn active_taps(&self) -> Vec<Tap>;

    fn is_tap_registered(&self, tap: &Tap) -> bool {
        self.active_taps().contains(tap)
    }

    /// Unregister everything in one step, returning how many taps were active.
    fn clear_taps(&self) -> usize;

    /// Unregister everything and refuse later registrations, releasing every
    /// listener the module holds. Used when the owning chain stops.
    fn close_taps(&self) -> usize;

    /// Delivery counters for every registered tap.
    fn tap_stats(&self) -> Vec<TapStats>;
}

/// `register_tap` for components that own a single registry.
///
/// The advertised instance is bound, so the module's batch size applies even
/// when the caller built `tap` by hand.
pub fn register_advertised(
    registry: &TapRegistry,
    groups: &[TapGroup],
    tap: &Tap,
    listener: Arc<dyn TapListener>,
) -> Result<(), TapError> {
    match find_advertised(groups, tap) {
        Some(advertised) => {
            registry.bind(advertised.clone(), listener)?;
            Ok(())
        }
        None => {
            UnknownTapRequested {
                module_id: registry.owner(),
                tap_name: tap.name(),
                tap_type: tap.tap_type(),
            }
            .log();
            Err(TapError::unknown_tap(registry.owner(), tap))
        }
    }
}
