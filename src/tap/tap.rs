// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;

use crate::tap::TapType;

/// Registry key for a tap: the `(name, type)` identity without the batch size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TapKey {
    pub name: Arc<str>,
    pub tap_type: TapType,
}

impl fmt::Display for TapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.tap_type)
    }
}

/// A named, typed probe point on a module's internal stream.
///
/// Taps are immutable values. Two taps are equal when their name and type
/// match; the batch size is a delivery detail owned by the advertising module
/// and does not take part in identity, so a caller may hold a tap built from a
/// stale group and still register or unregister it.
#[derive(Debug, Clone, Serialize)]
pub struct Tap {
    key: TapKey,
    batch_size: usize,
}

impl Tap {
    /// Event tap or unbatched stream tap (one unit per delivery).
    pub fn new(name: impl Into<Arc<str>>, tap_type: TapType) -> Self {
        Self::with_batch_size(name, tap_type, 1)
    }

    /// Stream tap delivering `batch_size` units at a time.
    ///
    /// Event taps ignore the requested size and always deliver singly; a size
    /// of zero is treated as one.
    pub fn with_batch_size(name: impl Into<Arc<str>>, tap_type: TapType, batch_size: usize) -> Self {
        let batch_size = if tap_type.is_event() { 1 } else { batch_size.max(1) };
        Self {
            key: TapKey {
                name: name.into(),
                tap_type,
            },
            batch_size,
        }
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn tap_type(&self) -> TapType {
        self.key.tap_type
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn key(&self) -> &TapKey {
        &self.key
    }

    /// Dispatch predicate: does this tap consume units of `tap_type`?
    pub fn matches(&self, tap_type: TapType) -> bool {
        self.key.tap_type == tap_type
    }
}

impl PartialEq for Tap {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Tap {}

impl Hash for Tap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Tap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}
