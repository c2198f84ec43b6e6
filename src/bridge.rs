//! Forwards keyboard reports to the host, diverting chord keys to Hemiola

use crate::device::SharedOutput;
use crate::error::HemiolaError;
use crate::hemiola::{Capture, Hemiola};
use crate::keyboard::{KeyEvent, KeyEventType, KeyReport, KeyTable};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Event callback target for [`KeyboardEvents::capture`]
///
/// Without a [`Hemiola`] every report is forwarded unchanged. With one,
/// keys the capture window absorbs are kept off the host until their
/// release, and every forwarded report has them masked out. Absorbed keys
/// reach the host as typed text, either from the worker or ahead of the
/// next key that passes through.
///
/// [`KeyboardEvents::capture`]: crate::keyboard::KeyboardEvents::capture
pub struct Bridge {
    table: Arc<KeyTable>,
    output: SharedOutput,
    hemiola: Option<Hemiola>,
    /// Usage codes of held keys the host never saw pressed
    absorbed: HashSet<u8>,
}

impl Bridge {
    pub fn new(table: Arc<KeyTable>, output: SharedOutput, hemiola: Option<Hemiola>) -> Self {
        Self {
            table,
            output,
            hemiola,
            absorbed: HashSet::new(),
        }
    }

    pub fn hemiola(&self) -> Option<&Hemiola> {
        self.hemiola.as_ref()
    }

    pub fn handle(&mut self, report: &KeyReport, event: &KeyEvent) -> Result<(), HemiolaError> {
        let usage = if self.table.is_char_key(event.key) {
            self.table.scan_to_hex(event.key)
        } else {
            0x00
        };

        if let Some(hemiola) = &self.hemiola {
            if hemiola.add_key(event)? == Capture::Absorbed {
                if usage != 0x00 {
                    self.absorbed.insert(usage);
                }
                return Ok(());
            }
        }

        if event.event_type == KeyEventType::Release && self.absorbed.remove(&usage) {
            debug!("Swallowing release of absorbed key {}", event.key.0);
            return Ok(());
        }

        if self.absorbed.is_empty() {
            return self.write(report);
        }
        let mut outgoing = KeyReport::empty();
        outgoing.modifiers = report.modifiers;
        for &key in report.keys.iter().filter(|k| !self.absorbed.contains(*k)) {
            outgoing.set_key(key);
        }
        self.write(&outgoing)
    }

    fn write(&self, report: &KeyReport) -> Result<(), HemiolaError> {
        if let Some(hemiola) = &self.hemiola {
            return hemiola.forward(report);
        }
        let mut device = self
            .output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        device.write_report(report)
    }

    /// Stop the chord worker and release everything on the host
    pub fn shutdown(&mut self) {
        if let Some(mut hemiola) = self.hemiola.take() {
            hemiola.stop();
        }
        self.absorbed.clear();
        let mut device = self
            .output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if device.is_open() {
            if let Err(e) = device.release_all() {
                warn!("Could not release keys: {}", e);
            }
        }
    }
}
