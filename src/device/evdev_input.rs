//! Kernel event node reader and keyboard discovery
//!
//! Events are read as raw `struct input_event` records straight from the
//! device file. Discovery uses the `evdev` crate to inspect each node's
//! capabilities.

use super::InputDevice;
use crate::error::HemiolaError;
use crate::keyboard::{InputEvent, INPUT_EVENT_SIZE};
use log::{debug, error, info};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Blocking reader for `/dev/input/event*`
#[derive(Debug)]
pub struct EvdevInput {
    path: PathBuf,
    file: Option<File>,
    buffer: [u8; INPUT_EVENT_SIZE],
}

impl EvdevInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            buffer: [0u8; INPUT_EVENT_SIZE],
        }
    }
}

impl InputDevice for EvdevInput {
    fn open(&mut self) -> Result<(), HemiolaError> {
        let file = File::open(&self.path).map_err(|source| HemiolaError::Open {
            path: self.path.clone(),
            source,
        })?;
        info!("Reading key events from {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("Closed {}", self.path.display());
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn read_event(&mut self) -> Result<InputEvent, HemiolaError> {
        let file = self.file.as_mut().ok_or(HemiolaError::NotOpen("input"))?;
        file.read_exact(&mut self.buffer).map_err(|e| {
            error!("Read from {} failed: {}", self.path.display(), e);
            HemiolaError::Read(e)
        })?;
        InputEvent::from_bytes(&self.buffer).ok_or_else(|| {
            HemiolaError::Read(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "short input event",
            ))
        })
    }
}

impl Drop for EvdevInput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Rank a device as a keyboard candidate; `None` if it cannot type letters
fn keyboard_score(name: &str, key_count: usize, has_letters: bool) -> Option<usize> {
    if !has_letters {
        return None;
    }
    let bonus = if name.to_lowercase().contains("keyboard") {
        100
    } else {
        0
    };
    Some(key_count + bonus)
}

/// Pick the event node that looks most like a keyboard
pub fn find_keyboard() -> Result<PathBuf, HemiolaError> {
    let mut best: Option<(usize, PathBuf)> = None;

    for (path, device) in evdev::enumerate() {
        let Some(keys) = device.supported_keys() else {
            continue;
        };
        let name = device.name().unwrap_or("");
        let Some(score) = keyboard_score(
            name,
            keys.iter().count(),
            keys.contains(evdev::Key::KEY_A),
        ) else {
            continue;
        };
        debug!("{} ({:?}) scores {}", path.display(), name, score);

        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, path));
        }
    }

    match best {
        Some((_, path)) => {
            info!("Using keyboard at {}", path.display());
            Ok(path)
        }
        None => Err(HemiolaError::NoKeyboard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_prefers_named_keyboards() {
        let named = keyboard_score("AT Translated Set 2 keyboard", 80, true);
        let unnamed = keyboard_score("Power Button", 150, true);
        assert_eq!(named, Some(180));
        assert!(named > unnamed);
    }

    #[test]
    fn score_skips_devices_without_letters() {
        assert_eq!(keyboard_score("Consumer Control keyboard", 300, false), None);
    }

    #[test]
    fn read_before_open_fails() {
        let mut input = EvdevInput::new("/dev/input/event-missing");
        assert!(!input.is_open());
        assert!(matches!(
            input.read_event(),
            Err(HemiolaError::NotOpen("input"))
        ));
        assert!(matches!(input.open(), Err(HemiolaError::Open { .. })));
    }
}
