//! Configuration for the hemiola bridge
//!
//! Settings live in a TOML file that is loaded once at startup. A missing
//! file means defaults throughout.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/hemiola/config.toml` |
//! | macOS | `~/Library/Application Support/hemiola/config.toml` |
//!
//! ## Example
//!
//! ```toml
//! log_level = "info"
//!
//! [devices]
//! input = "/dev/input/event0"
//! output = "/dev/hidg0"
//!
//! [capture]
//! threshold_ms = 300
//!
//! [dictionary]
//! plural = ";"
//!
//! [dictionary.chords]
//! the = "teh"
//! cats = "cat+;"
//! ```

use crate::chords::{DEFAULT_DUP, DEFAULT_PAST, DEFAULT_PLURAL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the config file, creating its directory if needed
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("hemiola");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub devices: DevicesConfig,
    pub capture: CaptureConfig,
    pub dictionary: DictionaryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            devices: DevicesConfig::default(),
            capture: CaptureConfig::default(),
            dictionary: DictionaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DevicesConfig {
    /// Keyboard event node; detected automatically when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// USB HID gadget node
    pub output: PathBuf,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from("/dev/hidg0"),
        }
    }
}

/// Chord capture timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// When false, keys are passed straight through and no chords resolve
    pub enabled: bool,
    /// How long a key stays in the chord window
    pub threshold_ms: u64,
    /// How often the window is checked for expired keys
    pub poll_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_ms: 300,
            poll_interval_ms: 10,
        }
    }
}

/// Chord dictionary and its marker characters
///
/// Markers are kept as raw TOML values so a bad override is warned about
/// when the dictionary is built instead of rejecting the whole file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DictionaryConfig {
    pub dup: toml::Value,
    pub plural: toml::Value,
    pub past: toml::Value,
    /// word -> chord spec, in file order
    pub chords: toml::Table,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            dup: toml::Value::from(DEFAULT_DUP),
            plural: toml::Value::from(DEFAULT_PLURAL),
            past: toml::Value::from(DEFAULT_PAST),
            chords: toml::Table::new(),
        }
    }
}

impl Config {
    /// Load from the default location; defaults if the file does not exist
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.capture.threshold_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.capture.poll_interval_ms)
    }
}
