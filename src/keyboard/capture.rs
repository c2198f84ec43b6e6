//! Raw event stream to running key report

use super::{InputEvent, KeyCode, KeyEvent, KeyEventType, KeyReport, KeyTable};
use crate::device::InputDevice;
use crate::error::HemiolaError;
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Instant;

/// Maintains the report for one input device and feeds each key transition
/// to a callback
pub struct KeyboardEvents<D: InputDevice> {
    device: D,
    table: Arc<KeyTable>,
    report: KeyReport,
}

impl<D: InputDevice> KeyboardEvents<D> {
    pub fn new(device: D, table: Arc<KeyTable>) -> Self {
        Self {
            device,
            table,
            report: KeyReport::empty(),
        }
    }

    /// Current report snapshot
    pub fn report(&self) -> &KeyReport {
        &self.report
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Apply one raw event to the report.
    ///
    /// Returns the key event the callback should see, or `None` for events
    /// that are not key transitions.
    pub fn process(&mut self, event: &InputEvent, timestamp: Instant) -> Option<KeyEvent> {
        let event_type = event.key_event_type()?;
        let key = KeyCode::from(event.code);
        debug!(
            "(type, value, code) = ({}, {}, {})",
            event.event_type, event.value, event.code
        );

        match event_type {
            KeyEventType::Repeat => {}
            KeyEventType::Release => {
                if self.table.is_modifier(key) {
                    self.report.unset_modifier(self.table.mod_to_hex(key));
                } else if self.table.is_key_valid(key) {
                    self.report.unset_key(self.table.scan_to_hex(key));
                }
            }
            KeyEventType::Press => {
                if self.table.is_modifier(key) {
                    self.report.set_modifier(self.table.mod_to_hex(key));
                } else if self.table.is_key_valid(key) {
                    if self.report.set_key(self.table.scan_to_hex(key)) {
                        warn!("Report full, dropping key {}", key.0);
                    }
                } else {
                    debug!("Ignoring unknown key {}", key.0);
                }
            }
        }

        Some(KeyEvent::new(key, event_type, timestamp))
    }

    /// Read events until the device fails or `on_event` returns an error.
    ///
    /// The device is opened if needed. On failure it is closed before
    /// `on_error` runs, and `on_error` runs exactly once.
    pub fn capture<F, E>(&mut self, mut on_event: F, on_error: E)
    where
        F: FnMut(&KeyReport, &KeyEvent) -> Result<(), HemiolaError>,
        E: FnOnce(HemiolaError),
    {
        if let Err(e) = self.start() {
            error!("Could not open keyboard: {}", e);
            on_error(e);
            return;
        }

        let err = loop {
            let raw = match self.device.read_event() {
                Ok(raw) => raw,
                Err(e) => {
                    error!("Connection to keyboard seems to have been lost: {}", e);
                    break e;
                }
            };
            let Some(event) = self.process(&raw, Instant::now()) else {
                continue;
            };
            if let Err(e) = on_event(&self.report, &event) {
                error!("An error occurred while handling keyboard event: {}", e);
                break e;
            }
        };

        self.device.close();
        on_error(err);
    }

    fn start(&mut self) -> Result<(), HemiolaError> {
        if self.device.is_open() {
            return Ok(());
        }
        self.device.open()
    }
}
