//! Integration tests for hemiola
//!
//! These drive the whole pipeline with scripted input: raw events through
//! the report state machine, the capture window and the chord worker, out
//! to a recording output device.

use hemiola::config::Config;
use hemiola::device::{
    shared, FakeInput, InputDevice, OutputDevice, RecordingOutput, SharedOutput,
};
use hemiola::keyboard::codes::*;
use hemiola::keyboard::{InputEvent, KeyCode, KeyEvent, KeyReport, KeyTable, KeyboardEvents};
use hemiola::{Bridge, CaptureState, Hemiola, HemiolaError, KeyChords, Timing};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn table() -> Arc<KeyTable> {
    Arc::new(KeyTable::new())
}

fn recording() -> (RecordingOutput, SharedOutput) {
    let watcher = RecordingOutput::new();
    let mut device = watcher.clone();
    device.open().unwrap();
    (watcher, shared(device))
}

/// Press and release a key
fn tap(key: KeyCode) -> [InputEvent; 2] {
    [InputEvent::press(key), InputEvent::release(key)]
}

fn press(state: &mut CaptureState, key: KeyCode) {
    state.add_key(&KeyEvent::press(key, Instant::now()));
}

fn wait_for(output: &RecordingOutput, count: usize) -> Vec<KeyReport> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while output.reports().len() < count && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    output.reports()
}

const DICTIONARY: &str = r#"
log_level = "warn"

[capture]
threshold_ms = 50
poll_interval_ms = 2

[dictionary.chords]
cats = "cat+;"
the = "teh"
tea = "eat"
"#;

// ---------------------------------------------------------------------------
// Report state machine
// ---------------------------------------------------------------------------

#[test]
fn key_press_and_release_yield_two_reports() {
    let input = FakeInput::new(tap(KEY_5));
    let mut keyboard = KeyboardEvents::new(input, table());
    let mut reports = Vec::new();
    let mut errors = Vec::new();

    keyboard.capture(
        |report, _| {
            reports.push(*report);
            Ok(())
        },
        |e| errors.push(e),
    );

    assert_eq!(
        reports,
        vec![KeyReport::single(0x22, 0x00), KeyReport::empty()]
    );
    // the scripted input runs dry, which ends the session exactly once
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], HemiolaError::Read(_)));
    assert!(!keyboard.device().is_open());
}

#[test]
fn pass_through_bridge_writes_boot_reports() {
    let table = table();
    let (watcher, output) = recording();
    let mut bridge = Bridge::new(Arc::clone(&table), output, None);
    let mut keyboard = KeyboardEvents::new(FakeInput::new(tap(KEY_5)), table);

    keyboard.capture(|report, event| bridge.handle(report, event), |_| {});

    let bytes: Vec<[u8; 8]> = watcher.reports().iter().map(KeyReport::to_bytes).collect();
    assert_eq!(
        bytes,
        vec![
            [0x00, 0x00, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00],
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        ]
    );
}

#[test]
fn output_failure_ends_capture() {
    let table = table();
    let mut device = RecordingOutput::failing();
    device.open().unwrap();
    let mut bridge = Bridge::new(Arc::clone(&table), shared(device), None);

    let mut events = tap(KEY_A).to_vec();
    events.extend(tap(KEY_B));
    let mut keyboard = KeyboardEvents::new(FakeInput::new(events), table);
    let mut errors = Vec::new();

    keyboard.capture(|report, event| bridge.handle(report, event), |e| errors.push(e));

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], HemiolaError::Write(_)));
    assert_eq!(keyboard.device().remaining(), 3);
}

// ---------------------------------------------------------------------------
// Capture window
// ---------------------------------------------------------------------------

#[test]
fn held_keys_accumulate_until_space() {
    let mut state = CaptureState::new(table());
    for key in [KEY_H, KEY_E, KEY_M, KEY_I, KEY_O, KEY_L, KEY_A] {
        press(&mut state, key);
    }
    assert_eq!(state.captured_text(), "hemiola");

    press(&mut state, KEY_SPACE);
    assert!(state.captured().is_empty());
}

#[test]
fn right_shift_toggle_leaves_only_letter() {
    let mut state = CaptureState::new(table());
    press(&mut state, KEY_RIGHTSHIFT);
    press(&mut state, KEY_A);
    press(&mut state, KEY_RIGHTSHIFT);

    assert_eq!(state.captured(), vec![KEY_A]);
}

#[test]
fn backspace_unwinds_capture() {
    let mut state = CaptureState::new(table());
    let t0 = Instant::now();
    state.add_key(&KeyEvent::press(KEY_A, t0));
    state.add_key(&KeyEvent::press(KEY_B, t0 + Duration::from_millis(1)));

    press(&mut state, KEY_BACKSPACE);
    assert_eq!(state.captured(), vec![KEY_A]);
    press(&mut state, KEY_BACKSPACE);
    assert!(state.captured().is_empty());
}

// ---------------------------------------------------------------------------
// Chord expansion
// ---------------------------------------------------------------------------

/// Run `keys` through the full pipeline as if pressed at the same instant,
/// then release them, and return what reached the host
fn type_chord(config: &Config, keys: &[KeyCode], expected_reports: usize) -> Vec<KeyReport> {
    let table = table();
    let chords = Arc::new(KeyChords::from_config(
        Arc::clone(&table),
        &config.dictionary,
    ));
    let (watcher, output) = recording();
    let hemiola = Hemiola::spawn(
        Arc::clone(&table),
        chords,
        Arc::clone(&output),
        Timing::from(&config.capture),
        Arc::new(|_: HemiolaError| {}),
    )
    .unwrap();
    let mut bridge = Bridge::new(Arc::clone(&table), output, Some(hemiola));
    let mut keyboard = KeyboardEvents::new(FakeInput::default(), table);

    let now = Instant::now();
    let presses = keys.iter().map(|&k| InputEvent::press(k));
    let releases = keys.iter().map(|&k| InputEvent::release(k));
    for raw in presses.chain(releases) {
        if let Some(event) = keyboard.process(&raw, now) {
            bridge.handle(keyboard.report(), &event).unwrap();
        }
    }

    let reports = wait_for(&watcher, expected_reports);
    bridge.shutdown();
    reports
}

fn typed(word: &str) -> Vec<KeyReport> {
    let table = KeyTable::new();
    word.chars()
        .flat_map(|ch| {
            let (usage, modifiers) = table.char_to_stroke(ch).unwrap();
            [KeyReport::single(usage, modifiers), KeyReport::empty()]
        })
        .collect()
}

#[test]
fn chord_expands_to_word() {
    let config: Config = toml::from_str(DICTIONARY).unwrap();
    let reports = type_chord(&config, &[KEY_E, KEY_A, KEY_T], 6);
    assert_eq!(reports, typed("tea"));
}

#[test]
fn chord_with_marker_expands() {
    let config: Config = toml::from_str(DICTIONARY).unwrap();
    let reports = type_chord(&config, &[KEY_SEMICOLON, KEY_A, KEY_C, KEY_T], 8);
    assert_eq!(reports, typed("cats"));
}

#[test]
fn unknown_chord_is_typed_as_pressed() {
    let config: Config = toml::from_str(DICTIONARY).unwrap();
    let reports = type_chord(&config, &[KEY_Z, KEY_Q], 4);
    assert_eq!(reports, typed("zq"));
}

#[test]
fn typing_then_space_keeps_keystroke_order() {
    let config: Config = toml::from_str(DICTIONARY).unwrap();
    let table = table();
    let chords = Arc::new(KeyChords::from_config(
        Arc::clone(&table),
        &config.dictionary,
    ));
    let (watcher, output) = recording();
    let hemiola = Hemiola::spawn(
        Arc::clone(&table),
        chords,
        Arc::clone(&output),
        Timing::from(&config.capture),
        Arc::new(|_: HemiolaError| {}),
    )
    .unwrap();
    let mut bridge = Bridge::new(Arc::clone(&table), output, Some(hemiola));

    let mut events = tap(KEY_A).to_vec();
    events.extend(tap(KEY_B));
    events.extend(tap(KEY_SPACE));
    let mut keyboard = KeyboardEvents::new(FakeInput::new(events), table);
    keyboard.capture(|report, event| bridge.handle(report, event), |_| {});

    let mut expected = typed("ab");
    expected.extend([KeyReport::single(0x2c, 0x00), KeyReport::empty()]);
    assert_eq!(watcher.reports(), expected);
    bridge.shutdown();
}

#[test]
fn dictionary_loads_from_file() {
    let path = std::env::temp_dir().join(format!("hemiola-it-{}.toml", std::process::id()));
    std::fs::write(&path, DICTIONARY).unwrap();

    let config = Config::load_from(&path).unwrap();
    let chords = KeyChords::from_config(table(), &config.dictionary);
    assert_eq!(chords.len(), 3);
    assert_eq!(chords.get_word("tae"), "tea");
    assert_eq!(config.capture.threshold_ms, 50);

    let _ = std::fs::remove_file(&path);
}
