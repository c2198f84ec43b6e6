//! Time-windowed chord capture
//!
//! Printable keys pressed without a modifier are held back in a capture
//! window instead of going straight to the host. A background worker checks
//! the window every poll interval; keys older than the threshold are folded,
//! in the order they were first pressed, into one candidate string. The
//! candidate is resolved through [`KeyChords`] and typed out on the output
//! device, so keys pressed together come out as the dictionary word and
//! anything else comes out as typed.
//!
//! Shifts and right-alt are transparent: they never block capture and never
//! enter the window, but a key captured while a shift is held is typed
//! shifted. Any other modifier suspends capture so shortcuts reach the host
//! untouched.
//!
//! A key that goes to the host while the window holds keys first pushes the
//! window out, so the host sees keystrokes in the order they were made. A
//! word boundary (space, enter) types the window as-is; any other key
//! resolves it as a chord first.

use crate::chords::KeyChords;
use crate::config::CaptureConfig;
use crate::device::SharedOutput;
use crate::error::{ErrorSink, HemiolaError};
use crate::keyboard::codes::*;
use crate::keyboard::{KeyCode, KeyEvent, KeyEventType, KeyReport, KeyTable, MOD_SHIFT_MASK};
use log::{debug, error, info, warn};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Modifiers that do not suspend capture
const TRANSPARENT_MODIFIERS: [KeyCode; 3] = [KEY_LEFTSHIFT, KEY_RIGHTSHIFT, KEY_RIGHTALT];

/// What happened to a key handed to the capture window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The window took the key (or removed one); the host must not see it
    Absorbed,
    /// The key is not part of a chord and goes to the host as usual
    PassThrough,
}

#[derive(Debug, Clone, Copy)]
struct Captured {
    stamp: Instant,
    seq: u64,
    shifted: bool,
}

/// Window contents pushed out by a key bound for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drained {
    pub text: String,
    /// Look the text up as a chord before typing it
    pub resolve: bool,
}

/// Capture window and modifier tracking, without any threading
#[derive(Debug)]
pub struct CaptureState {
    table: Arc<KeyTable>,
    captured: HashMap<KeyCode, Captured>,
    active_modifiers: Vec<KeyCode>,
    /// Report bits of held transparent modifiers
    transparent: u8,
    next_seq: u64,
    drained: Vec<Drained>,
}

impl CaptureState {
    pub fn new(table: Arc<KeyTable>) -> Self {
        Self {
            table,
            captured: HashMap::new(),
            active_modifiers: Vec::new(),
            transparent: 0,
            next_seq: 0,
            drained: Vec::new(),
        }
    }

    /// Feed one key transition into the window
    pub fn add_key(&mut self, event: &KeyEvent) -> Capture {
        let code = event.key;

        match event.event_type {
            KeyEventType::Release => {
                self.release(code);
                return Capture::PassThrough;
            }
            KeyEventType::Repeat => {
                if let Some(entry) = self.captured.get_mut(&code) {
                    entry.stamp = event.timestamp;
                    return Capture::Absorbed;
                }
                if !self.table.is_modifier(code) {
                    self.drain(true);
                }
                return Capture::PassThrough;
            }
            KeyEventType::Press => {}
        }

        if self.table.is_modifier(code) {
            if !Self::is_transparent(code) {
                self.drain(true);
            }
            self.toggle_modifier(code);
            return Capture::PassThrough;
        }

        if !self.active_modifiers.is_empty() {
            debug!("Not capturing {} while modifiers are held", code.0);
            self.drain(true);
            return Capture::PassThrough;
        }

        if code == KEY_SPACE || code == KEY_ENTER {
            self.drain(false);
            return Capture::PassThrough;
        }

        if code == KEY_BACKSPACE {
            return if self.delete_newest() {
                Capture::Absorbed
            } else {
                Capture::PassThrough
            };
        }

        if !self.is_capturable(code) {
            self.drain(true);
            return Capture::PassThrough;
        }

        let shifted = self.shifted();
        match self.captured.entry(code) {
            Entry::Occupied(mut entry) => {
                let entry = entry.get_mut();
                entry.stamp = event.timestamp;
                entry.shifted = shifted;
            }
            Entry::Vacant(slot) => {
                slot.insert(Captured {
                    stamp: event.timestamp,
                    seq: self.next_seq,
                    shifted,
                });
                self.next_seq += 1;
            }
        }
        Capture::Absorbed
    }

    /// Empty the window into the drained queue
    fn drain(&mut self, resolve: bool) {
        if self.captured.is_empty() {
            return;
        }
        let text = self.captured_text();
        self.captured.clear();
        debug!("Draining {:?} ahead of a host key", text);
        self.drained.push(Drained { text, resolve });
    }

    /// Window contents pushed out since the last call, oldest first
    pub fn take_drained(&mut self) -> Vec<Drained> {
        std::mem::take(&mut self.drained)
    }

    fn is_transparent(code: KeyCode) -> bool {
        TRANSPARENT_MODIFIERS.contains(&code)
    }

    fn toggle_modifier(&mut self, code: KeyCode) {
        if Self::is_transparent(code) {
            self.transparent ^= self.table.mod_to_hex(code);
            return;
        }
        match self.active_modifiers.iter().position(|&m| m == code) {
            Some(index) => {
                self.active_modifiers.remove(index);
            }
            None => self.active_modifiers.push(code),
        }
    }

    fn release(&mut self, code: KeyCode) {
        if !self.table.is_modifier(code) {
            return;
        }
        if Self::is_transparent(code) {
            self.transparent &= !self.table.mod_to_hex(code);
        } else {
            self.active_modifiers.retain(|&m| m != code);
        }
    }

    fn shifted(&self) -> bool {
        self.transparent & MOD_SHIFT_MASK != 0
    }

    fn is_capturable(&self, code: KeyCode) -> bool {
        if !self.table.is_char_key(code) {
            return false;
        }
        let plain = self.table.char_keys(code);
        let mut chars = plain.chars();
        matches!(
            (chars.next(), chars.next()),
            (Some(c), None) if !c.is_whitespace() && !c.is_control()
        )
    }

    fn delete_newest(&mut self) -> bool {
        let newest = self
            .captured
            .iter()
            .max_by_key(|(_, entry)| (entry.stamp, entry.seq))
            .map(|(&code, _)| code);
        match newest {
            Some(code) => {
                self.captured.remove(&code);
                true
            }
            None => false,
        }
    }

    fn render(&self, code: KeyCode, entry: &Captured) -> String {
        if entry.shifted {
            self.table.shift_keys(code)
        } else {
            self.table.char_keys(code)
        }
    }

    fn ordered(&self) -> Vec<(KeyCode, Captured)> {
        let mut entries: Vec<_> = self.captured.iter().map(|(&c, &e)| (c, e)).collect();
        entries.sort_by_key(|(_, entry)| entry.seq);
        entries
    }

    /// Captured keys in the order they were first pressed
    pub fn captured(&self) -> Vec<KeyCode> {
        self.ordered().into_iter().map(|(code, _)| code).collect()
    }

    /// The window as text, shifted where the key was captured with shift
    pub fn captured_text(&self) -> String {
        self.ordered()
            .iter()
            .map(|(code, entry)| self.render(*code, entry))
            .collect()
    }

    /// Held non-transparent modifiers, oldest first
    pub fn active_modifiers(&self) -> &[KeyCode] {
        &self.active_modifiers
    }

    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// Remove every key at least `threshold` old and return them as one
    /// candidate string, or `None` if nothing expired
    pub fn flush_expired(&mut self, now: Instant, threshold: Duration) -> Option<String> {
        let expired: Vec<(KeyCode, Captured)> = self
            .ordered()
            .into_iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.stamp) >= threshold)
            .collect();
        if expired.is_empty() {
            return None;
        }

        let mut text = String::new();
        for (code, entry) in &expired {
            text.push_str(&self.render(*code, entry));
            self.captured.remove(code);
        }
        Some(text)
    }
}

/// Window and polling periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub threshold: Duration,
    pub poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            threshold: Duration::from_millis(300),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl From<&CaptureConfig> for Timing {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            threshold: Duration::from_millis(config.threshold_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Capture state plus what the host currently sees held
struct Window {
    capture: CaptureState,
    host: KeyReport,
}

struct Shared {
    window: Mutex<Window>,
    running: AtomicBool,
    table: Arc<KeyTable>,
    chords: Arc<KeyChords>,
    output: SharedOutput,
}

impl Shared {
    fn window(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Type window text, looking it up as a chord when `resolve` is set.
    /// Callers hold the window lock so nothing reaches the host in between.
    fn type_text(&self, host: &KeyReport, text: &str, resolve: bool) -> Result<(), HemiolaError> {
        let word = if resolve {
            self.chords.get_word(text)
        } else {
            text.to_string()
        };
        debug!("Resolved {:?} -> {:?}", text, word);
        type_word(&self.output, &self.table, &word, host)
    }
}

/// Capture window plus the worker thread that drains it
///
/// While a `Hemiola` exists every write to the host should go through
/// [`Hemiola::forward`], so typed words and forwarded reports stay in order.
/// Dropping a `Hemiola` stops the worker and waits for it.
pub struct Hemiola {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Hemiola {
    /// Start the worker.
    ///
    /// A write failure on `output` is passed to `on_error` once and ends the
    /// worker; keys added afterwards stay in the window until a host key
    /// pushes them out.
    pub fn spawn(
        table: Arc<KeyTable>,
        chords: Arc<KeyChords>,
        output: SharedOutput,
        timing: Timing,
        on_error: ErrorSink,
    ) -> Result<Self, HemiolaError> {
        let shared = Arc::new(Shared {
            window: Mutex::new(Window {
                capture: CaptureState::new(Arc::clone(&table)),
                host: KeyReport::empty(),
            }),
            running: AtomicBool::new(true),
            table,
            chords,
            output,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("hemiola".into())
            .spawn(move || run(worker_shared, timing, on_error))
            .map_err(HemiolaError::Spawn)?;

        info!(
            "Chord capture started (threshold {:?}, poll {:?})",
            timing.threshold, timing.poll_interval
        );

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Feed a key into the window.
    ///
    /// If the key is bound for the host and keys were waiting, they are
    /// typed before this returns.
    pub fn add_key(&self, event: &KeyEvent) -> Result<Capture, HemiolaError> {
        let mut window = self.shared.window();
        let capture = window.capture.add_key(event);
        for drained in window.capture.take_drained() {
            self.shared
                .type_text(&window.host, &drained.text, drained.resolve)?;
        }
        Ok(capture)
    }

    /// Write a report to the host and remember it as the held state
    pub fn forward(&self, report: &KeyReport) -> Result<(), HemiolaError> {
        let mut window = self.shared.window();
        self.shared
            .output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .write_report(report)?;
        window.host = *report;
        Ok(())
    }

    pub fn captured(&self) -> Vec<KeyCode> {
        self.shared.window().capture.captured()
    }

    pub fn captured_text(&self) -> String {
        self.shared.window().capture.captured_text()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Signal the worker and wait for it to finish its current tick
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Chord worker panicked");
            }
        }
    }
}

impl Drop for Hemiola {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(shared: Arc<Shared>, timing: Timing, on_error: ErrorSink) {
    while shared.running.load(Ordering::SeqCst) {
        let result = {
            let mut window = shared.window();
            match window.capture.flush_expired(Instant::now(), timing.threshold) {
                Some(text) => shared.type_text(&window.host, &text, true),
                None => Ok(()),
            }
        };

        if let Err(e) = result {
            error!("Could not type chord output: {}", e);
            shared.running.store(false, Ordering::SeqCst);
            on_error(e);
            break;
        }

        thread::sleep(timing.poll_interval);
    }
    debug!("Chord worker stopped");
}

/// Type `word` one character at a time on top of the keys the host already
/// holds, returning to `host` after each character
fn type_word(
    output: &SharedOutput,
    table: &KeyTable,
    word: &str,
    host: &KeyReport,
) -> Result<(), HemiolaError> {
    let mut device = output.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    for ch in word.chars() {
        let Some((usage, modifiers)) = table.char_to_stroke(ch) else {
            warn!("No keystroke produces {:?}", ch);
            continue;
        };
        let mut stroke = *host;
        stroke.modifiers = modifiers;
        if stroke.set_key(usage) {
            warn!("No free report slot to type {:?}", ch);
            continue;
        }
        device.write_report(&stroke)?;
        device.write_report(host)?;
    }
    Ok(())
}
