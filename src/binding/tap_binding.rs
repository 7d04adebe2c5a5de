// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::binding::TapViewFactory;
use crate::errors::TapError;
use crate::observability::messages::tap::TapViewUnavailable;
use crate::observability::messages::StructuredLog;
use crate::tap::{Tap, TapGroup, TapListener, TapStats};
use crate::traits::{Instrumentable, Module};

/// Selection front-end over a chain's modules.
///
/// Every call may be made while the chain is running; each one resolves the
/// module, then delegates to its [`Instrumentable`] implementation.
pub struct TapBinding {
    modules: Vec<Arc<dyn Module>>,
}

impl TapBinding {
    pub fn new(modules: Vec<Arc<dyn Module>>) -> Self {
        Self { modules }
    }

    /// Every advertised group, tagged with its module id, in chain order.
    /// Modules without the tap capability are skipped.
    pub fn menu(&self) -> Vec<(String, TapGroup)> {
        self.modules
            .iter()
            .filter_map(|module| {
                module
                    .instrumentable()
                    .map(|instrumentable| (module.id(), instrumentable.tap_groups()))
            })
            .flat_map(|(id, groups)| groups.into_iter().map(move |g| (id.to_string(), g)))
            .collect()
    }

    pub fn select(
        &self,
        module_id: &str,
        tap: &Tap,
        listener: Arc<dyn TapListener>,
    ) -> Result<(), TapError> {
        self.instrumentable(module_id)?.register_tap(tap, listener)
    }

    pub fn deselect(&self, module_id: &str, tap: &Tap) -> Result<(), TapError> {
        self.instrumentable(module_id)?.unregister_tap(tap)
    }

    /// Flip the selection of one tap, returning whether it is now selected.
    ///
    /// Selecting asks `views` for a listener; when it has none the tap is
    /// left unselected.
    pub fn toggle(
        &self,
        module_id: &str,
        tap: &Tap,
        views: &dyn TapViewFactory,
    ) -> Result<bool, TapError> {
        let instrumentable = self.instrumentable(module_id)?;
        if instrumentable.is_tap_registered(tap) {
            instrumentable.unregister_tap(tap)?;
            return Ok(false);
        }
        self.attach_view(module_id, instrumentable, tap, views)
    }

    /// Select every tap of `group` that is not already selected. Returns how
    /// many taps were newly selected.
    pub fn select_all(
        &self,
        module_id: &str,
        group: &TapGroup,
        views: &dyn TapViewFactory,
    ) -> Result<usize, TapError> {
        let instrumentable = self.instrumentable(module_id)?;
        group.taps().try_fold(0, |selected, tap| {
            if instrumentable.is_tap_registered(tap) {
                return Ok(selected);
            }
            let attached = self.attach_view(module_id, instrumentable, tap, views)?;
            Ok(selected + attached as usize)
        })
    }

    /// Asks the module; `false` for unknown or non-instrumentable modules.
    pub fn is_selected(&self, module_id: &str, tap: &Tap) -> bool {
        self.instrumentable(module_id)
            .map(|instrumentable| instrumentable.is_tap_registered(tap))
            .unwrap_or(false)
    }

    /// All registered taps across the chain, tagged with their module id.
    pub fn selected(&self) -> Vec<(String, Tap)> {
        self.modules
            .iter()
            .filter_map(|module| module.instrumentable().map(|i| (module.id(), i.active_taps())))
            .flat_map(|(id, taps)| taps.into_iter().map(move |t| (id.to_string(), t)))
            .collect()
    }

    /// Delivery counters for every registered tap, tagged with its module id.
    pub fn tap_stats(&self) -> Vec<(String, TapStats)> {
        self.modules
            .iter()
            .filter_map(|module| module.instrumentable().map(|i| (module.id(), i.tap_stats())))
            .flat_map(|(id, stats)| stats.into_iter().map(move |s| (id.to_string(), s)))
            .collect()
    }

    /// Unregister everything, returning how many taps were removed.
    pub fn deselect_all(&self) -> usize {
        self.modules
            .iter()
            .filter_map(|module| module.instrumentable())
            .map(|instrumentable| instrumentable.clear_taps())
            .sum()
    }

    fn instrumentable(&self, module_id: &str) -> Result<&dyn Instrumentable, TapError> {
        let module = self
            .modules
            .iter()
            .find(|module| module.id() == module_id)
            .ok_or_else(|| TapError::UnknownModule(module_id.to_string()))?;
        module
            .instrumentable()
            .ok_or_else(|| TapError::NotInstrumentable(module_id.to_string()))
    }

    fn attach_view(
        &self,
        module_id: &str,
        instrumentable: &dyn Instrumentable,
        tap: &Tap,
        views: &dyn TapViewFactory,
    ) -> Result<bool, TapError> {
        match views.create_view(module_id, tap) {
            Some(view) => {
                instrumentable.register_tap(tap, view)?;
                Ok(true)
            }
            None => {
                TapViewUnavailable {
                    module_id,
                    tap_name: tap.name(),
                    tap_type: tap.tap_type(),
                }
                .log();
                Ok(false)
            }
        }
    }
}
