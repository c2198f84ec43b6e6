//! Raw kernel input events and the key events derived from them

use super::KeyCode;
use std::ffi::c_long;
use std::time::Instant;

/// Kernel event type for key events
pub const EV_KEY: u16 = 0x01;
/// Kernel event type for synchronisation markers
pub const EV_SYN: u16 = 0x00;

/// `struct input_event` as read from `/dev/input/event*`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEvent {
    pub tv_sec: c_long,
    pub tv_usec: c_long,
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

pub const INPUT_EVENT_SIZE: usize = std::mem::size_of::<InputEvent>();

impl InputEvent {
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
            ..Self::default()
        }
    }

    /// A key event with value 0 (release), 1 (press) or 2 (autorepeat)
    pub fn key(code: KeyCode, value: i32) -> Self {
        Self::new(EV_KEY, code.0, value)
    }

    pub fn press(code: KeyCode) -> Self {
        Self::key(code, 1)
    }

    pub fn release(code: KeyCode) -> Self {
        Self::key(code, 0)
    }

    pub fn repeat(code: KeyCode) -> Self {
        Self::key(code, 2)
    }

    /// Decode one event from the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < INPUT_EVENT_SIZE {
            return None;
        }
        // InputEvent is repr(C) plain data; any bit pattern is valid
        Some(unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const InputEvent) })
    }

    /// The key transition this event describes, if it is a key event
    pub fn key_event_type(&self) -> Option<KeyEventType> {
        if self.event_type != EV_KEY {
            return None;
        }
        KeyEventType::from_value(self.value)
    }
}

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key was released
    Release,
    /// Key was pressed down
    Press,
    /// Key is held and the kernel generated an autorepeat
    Repeat,
}

impl KeyEventType {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Release),
            1 => Some(Self::Press),
            2 => Some(Self::Repeat),
            _ => None,
        }
    }
}

/// A keyboard event with timing information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code
    pub key: KeyCode,
    /// Type of event (press/release/repeat)
    pub event_type: KeyEventType,
    /// When the event was read
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn new(key: KeyCode, event_type: KeyEventType, timestamp: Instant) -> Self {
        Self {
            key,
            event_type,
            timestamp,
        }
    }

    pub fn press(key: KeyCode, timestamp: Instant) -> Self {
        Self::new(key, KeyEventType::Press, timestamp)
    }

    pub fn release(key: KeyCode, timestamp: Instant) -> Self {
        Self::new(key, KeyEventType::Release, timestamp)
    }

    pub fn repeat(key: KeyCode, timestamp: Instant) -> Self {
        Self::new(key, KeyEventType::Repeat, timestamp)
    }
}
