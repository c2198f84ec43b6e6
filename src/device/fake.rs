//! Scripted input and recording output

use super::{InputDevice, OutputDevice};
use crate::error::HemiolaError;
use crate::keyboard::{InputEvent, KeyReport};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

/// Input device that replays a fixed list of events, then fails
#[derive(Debug, Default)]
pub struct FakeInput {
    events: VecDeque<InputEvent>,
    open: bool,
}

impl FakeInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            open: false,
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Events not yet read
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputDevice for FakeInput {
    fn open(&mut self) -> Result<(), HemiolaError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read_event(&mut self) -> Result<InputEvent, HemiolaError> {
        if !self.open {
            return Err(HemiolaError::NotOpen("input"));
        }
        self.events.pop_front().ok_or_else(|| {
            HemiolaError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "No more data to read.",
            ))
        })
    }
}

/// Output device that keeps every report written to it
///
/// Clones share the same log, so a test can keep one handle while the
/// bridge owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    reports: Arc<Mutex<Vec<KeyReport>>>,
    open: bool,
    fail_writes: bool,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// An output whose writes always fail, for exercising error paths
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<KeyReport>> {
        self.reports.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of everything written so far
    pub fn reports(&self) -> Vec<KeyReport> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl OutputDevice for RecordingOutput {
    fn open(&mut self) -> Result<(), HemiolaError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write_report(&mut self, report: &KeyReport) -> Result<(), HemiolaError> {
        if !self.open {
            return Err(HemiolaError::NotOpen("output"));
        }
        if self.fail_writes {
            return Err(HemiolaError::Write(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "host disconnected",
            )));
        }
        self.lock().push(*report);
        Ok(())
    }
}
