//! Input and output device capabilities
//!
//! The event layer reads raw kernel events from an [`InputDevice`] and the
//! bridge writes boot-protocol reports to an [`OutputDevice`]. Real devices
//! live in `evdev_input` and `hid_output` (Linux only); `fake` holds scripted
//! stand-ins used by the tests.

pub mod fake;

#[cfg(target_os = "linux")]
pub mod evdev_input;
#[cfg(target_os = "linux")]
pub mod hid_output;

use crate::error::HemiolaError;
use crate::keyboard::{InputEvent, KeyReport};
use std::sync::{Arc, Mutex};

pub use fake::{FakeInput, RecordingOutput};

#[cfg(target_os = "linux")]
pub use evdev_input::{find_keyboard, EvdevInput};
#[cfg(target_os = "linux")]
pub use hid_output::HidOutput;

/// Source of raw kernel input events
pub trait InputDevice {
    fn open(&mut self) -> Result<(), HemiolaError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Block until the next event is available
    fn read_event(&mut self) -> Result<InputEvent, HemiolaError>;
}

/// Sink for keyboard reports
pub trait OutputDevice {
    fn open(&mut self) -> Result<(), HemiolaError>;

    /// Release every key on the host, then close
    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn write_report(&mut self, report: &KeyReport) -> Result<(), HemiolaError>;

    /// Send the all-released report
    fn release_all(&mut self) -> Result<(), HemiolaError> {
        self.write_report(&KeyReport::empty())
    }
}

/// Output device shared between the bridge and the chord worker
pub type SharedOutput = Arc<Mutex<dyn OutputDevice + Send>>;

/// Wrap an output device for sharing across threads
pub fn shared<O: OutputDevice + Send + 'static>(device: O) -> SharedOutput {
    Arc::new(Mutex::new(device))
}
