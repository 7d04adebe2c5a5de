// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use serde::Serialize;

use crate::tap::{Tap, TapListener, TapPayload};

/// Builds the listener that displays one tap.
pub trait TapViewFactory {
    /// `None` when there is no view for this kind of tap; the binding then
    /// skips the selection.
    fn create_view(&self, module_id: &str, tap: &Tap) -> Option<Arc<dyn TapListener>>;
}

#[derive(Serialize)]
struct ViewRecord<'a> {
    module: &'a str,
    tap: &'a str,
    payload: &'a TapPayload,
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes every delivered batch as one JSON object per line.
pub struct JsonLinesView {
    module_id: String,
    writer: SharedWriter,
}

impl TapListener for JsonLinesView {
    fn receive(&self, tap: &Tap, payload: &TapPayload) -> anyhow::Result<()> {
        let record = ViewRecord {
            module: &self.module_id,
            tap: tap.name(),
            payload,
        };
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *writer, &record).context("serializing tap payload")?;
        writeln!(writer).context("writing tap payload")?;
        Ok(())
    }
}

/// View factory for stream taps; event taps get no view.
pub struct JsonLinesViewFactory {
    writer: SharedWriter,
}

impl JsonLinesViewFactory {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl TapViewFactory for JsonLinesViewFactory {
    fn create_view(&self, module_id: &str, tap: &Tap) -> Option<Arc<dyn TapListener>> {
        if tap.tap_type().is_event() {
            return None;
        }
        Some(Arc::new(JsonLinesView {
            module_id: module_id.to_string(),
            writer: Arc::clone(&self.writer),
        }))
    }
}
