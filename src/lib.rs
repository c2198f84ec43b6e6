//! Hemiola - keyboard to USB HID gadget bridge with chord expansion
//!
//! Reads key events from a Linux input device, forwards them to a USB HID
//! gadget as boot-protocol keyboard reports, and expands keys pressed
//! together into dictionary words.

pub mod bridge;
pub mod chords;
pub mod config;
pub mod device;
pub mod error;
pub mod hemiola;
pub mod keyboard;

pub use bridge::Bridge;
pub use chords::{Chord, KeyChords};
pub use config::Config;
pub use error::{ErrorSink, HemiolaError};
pub use hemiola::{Capture, CaptureState, Drained, Hemiola, Timing};
