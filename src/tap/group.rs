// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::tap::Tap;

/// Ordered set of related taps advertised by one module.
///
/// Groups are rebuilt every time a module is asked for them, so they are
/// plain owned values: reordering or dropping one never touches the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapGroup {
    name: String,
    taps: Vec<Tap>,
}

impl TapGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            taps: Vec::new(),
        }
    }

    /// Append a tap; insertion order is display order. A tap whose identity
    /// is already present is ignored.
    pub fn with_tap(mut self, tap: Tap) -> Self {
        self.add(tap);
        self
    }

    pub fn add(&mut self, tap: Tap) {
        if !self.taps.contains(&tap) {
            self.taps.push(tap);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in group order. Call again to restart the sequence.
    pub fn taps(&self) -> std::slice::Iter<'_, Tap> {
        self.taps.iter()
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// The advertised member with the same identity as `tap`, if any.
    pub fn find(&self, tap: &Tap) -> Option<&Tap> {
        self.taps.iter().find(|t| *t == tap)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Tap> {
        self.taps.iter().find(|t| t.name() == name)
    }
}

impl<'a> IntoIterator for &'a TapGroup {
    type Item = &'a Tap;
    type IntoIter = std::slice::Iter<'a, Tap>;

    fn into_iter(self) -> Self::IntoIter {
        self.taps()
    }
}

/// Find the advertised tap matching `tap` across a set of groups.
pub fn find_advertised<'a>(groups: &'a [TapGroup], tap: &Tap) -> Option<&'a Tap> {
    groups.iter().find_map(|group| group.find(tap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tap::TapType;

    fn sync_group() -> TapGroup {
        TapGroup::new("Sync Detector")
            .with_tap(Tap::new("Dibit Stream", TapType::StreamDibit))
            .with_tap(Tap::new("Sync Event", TapType::EventSyncDetect))
    }

    #[test]
    fn test_taps_preserve_insertion_order() {
        let group = sync_group();
        let names: Vec<_> = group.taps().map(Tap::name).collect();
        assert_eq!(names, vec!["Dibit Stream", "Sync Event"]);
    }

    #[test]
    fn test_taps_iteration_is_restartable() {
        let group = sync_group();
        assert_eq!(group.taps().count(), 2);
        assert_eq!(group.taps().count(), 2);
        assert_eq!((&group).into_iter().count(), 2);
    }

    #[test]
    fn test_duplicate_identity_ignored() {
        let group = sync_group().with_tap(Tap::with_batch_size("Dibit Stream", TapType::StreamDibit, 8));
        assert_eq!(group.len(), 2);
        assert_eq!(group.find_by_name("Dibit Stream").unwrap().batch_size(), 1);
    }

    #[test]
    fn test_find_advertised_returns_module_instance() {
        let groups = vec![
            TapGroup::new("Demod").with_tap(Tap::with_batch_size("Demodulated", TapType::StreamFloat, 128)),
            sync_group(),
        ];
        let requested = Tap::new("Demodulated", TapType::StreamFloat);
        let found = find_advertised(&groups, &requested).unwrap();
        assert_eq!(found.batch_size(), 128);
        assert!(find_advertised(&groups, &Tap::new("Demodulated", TapType::StreamDibit)).is_none());
    }
}
