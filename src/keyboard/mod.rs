//! Key codes, reports and the event state machine

mod capture;
mod event;
pub mod keymap;
mod report;

pub use capture::KeyboardEvents;
pub use event::{InputEvent, KeyEvent, KeyEventType, EV_KEY, EV_SYN, INPUT_EVENT_SIZE};
pub use keymap::{codes, KeyCode, KeyInfo, KeyTable, ModifierInfo, MOD_LEFTSHIFT, MOD_SHIFT_MASK};
pub use report::{KeyReport, KEY_SLOTS, REPORT_SIZE};
