//! Hemiola - keyboard to USB HID gadget bridge
//!
//! Usage: `hemiola [CONFIG]`. Without an argument the config is read from the
//! platform config directory, falling back to defaults when no file exists.
//! A config that fails to parse stops startup.

use anyhow::{Context, Result};
use hemiola::config::Config;
use std::path::Path;

#[cfg(target_os = "linux")]
use {
    hemiola::device::{find_keyboard, shared, EvdevInput, HidOutput, OutputDevice},
    hemiola::keyboard::{KeyTable, KeyboardEvents},
    hemiola::{Bridge, ErrorSink, Hemiola, HemiolaError, KeyChords, Timing},
    log::{error, info},
    std::sync::Arc,
};

fn load_config() -> Result<Config> {
    match std::env::args_os().nth(1) {
        Some(path) => {
            let path = Path::new(&path);
            Config::load_from(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Config::load().context("loading config"),
    }
}

#[cfg(target_os = "linux")]
fn main() -> Result<()> {
    let config = load_config()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let table = Arc::new(KeyTable::new());
    let chords = Arc::new(KeyChords::from_config(
        Arc::clone(&table),
        &config.dictionary,
    ));
    info!("Loaded {} chords", chords.len());

    let mut hid = HidOutput::new(&config.devices.output);
    hid.open()?;
    let output = shared(hid);

    let input_path = match &config.devices.input {
        Some(path) => path.clone(),
        None => find_keyboard()?,
    };

    let signal_output = Arc::clone(&output);
    ctrlc::set_handler(move || {
        info!("Interrupted, releasing keys");
        signal_output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .close();
        std::process::exit(0);
    })
    .context("installing signal handler")?;

    let hemiola = if config.capture.enabled {
        let sink: ErrorSink =
            Arc::new(|e: HemiolaError| error!("Chord capture stopped: {}", e));
        Some(Hemiola::spawn(
            Arc::clone(&table),
            chords,
            Arc::clone(&output),
            Timing::from(&config.capture),
            sink,
        )?)
    } else {
        info!("Chord capture disabled, passing keys straight through");
        None
    };

    let mut bridge = Bridge::new(Arc::clone(&table), Arc::clone(&output), hemiola);
    let mut keyboard = KeyboardEvents::new(EvdevInput::new(input_path), table);
    let mut failure = None;

    keyboard.capture(
        |report, event| bridge.handle(report, event),
        |e| failure = Some(e),
    );

    bridge.shutdown();
    output
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .close();

    match failure {
        Some(e) => Err(e).context("keyboard capture ended"),
        None => Ok(()),
    }
}

#[cfg(not(target_os = "linux"))]
fn main() -> Result<()> {
    let config = load_config()?;
    anyhow::bail!(
        "hemiola needs Linux input devices and a USB gadget ({} is unavailable)",
        config.devices.output.display()
    )
}
