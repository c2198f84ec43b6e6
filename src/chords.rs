//! Chord dictionary: sets of held keys mapped to words
//!
//! A chord spec is written as a run of base characters optionally followed
//! by `+`-separated markers, e.g. `cat+;` for "cats". The markers for a
//! doubled letter, plural and past tense default to `=`, `;` and `,` and can
//! be overridden in the `[dictionary]` config section.

use crate::config::DictionaryConfig;
use crate::keyboard::codes::KEY_RESERVED;
use crate::keyboard::{KeyCode, KeyTable};
use log::{debug, warn};
use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const DEFAULT_DUP: &str = "=";
pub const DEFAULT_PLURAL: &str = ";";
pub const DEFAULT_PAST: &str = ",";

const SEPARATOR: char = '+';

/// A set of key codes held together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chord(BTreeSet<KeyCode>);

impl Chord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: KeyCode) -> bool {
        self.0.insert(code)
    }

    pub fn contains(&self, code: KeyCode) -> bool {
        self.0.contains(&code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<KeyCode> for Chord {
    fn from_iter<I: IntoIterator<Item = KeyCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Hash for Chord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Commutative combination so membership alone decides the hash
        let combined = self.0.iter().fold(0u64, |acc, code| {
            let mut h = DefaultHasher::new();
            code.hash(&mut h);
            acc.wrapping_add(h.finish())
        });
        state.write_u64(combined);
        state.write_usize(self.0.len());
    }
}

/// Read-only after construction; shared as `Arc<KeyChords>`
#[derive(Debug)]
pub struct KeyChords {
    table: Arc<KeyTable>,
    map: HashMap<Chord, String>,
    dup: KeyCode,
    plural: KeyCode,
    past: KeyCode,
}

impl KeyChords {
    /// Empty dictionary with the default markers
    pub fn new(table: Arc<KeyTable>) -> Self {
        let dup = table.get_key_code(DEFAULT_DUP);
        let plural = table.get_key_code(DEFAULT_PLURAL);
        let past = table.get_key_code(DEFAULT_PAST);
        Self {
            table,
            map: HashMap::new(),
            dup,
            plural,
            past,
        }
    }

    pub fn from_config(table: Arc<KeyTable>, config: &DictionaryConfig) -> Self {
        let mut chords = Self::new(table);
        chords.build_map(config);
        chords
    }

    /// Apply marker overrides and register every configured chord.
    ///
    /// Entries are visited in file order, so the first word registered for
    /// a chord keeps it.
    pub fn build_map(&mut self, config: &DictionaryConfig) {
        self.dup = self.marker("dup", &config.dup, self.dup);
        self.plural = self.marker("plural", &config.plural, self.plural);
        self.past = self.marker("past", &config.past, self.past);

        for (word, value) in &config.chords {
            match value.as_str() {
                Some(spec) => {
                    self.insert(word, spec);
                }
                None => warn!("Nested chords are not supported ({}).", word),
            }
        }
        debug!("Loaded {} chords", self.map.len());
    }

    fn marker(&self, name: &str, value: &toml::Value, current: KeyCode) -> KeyCode {
        if let Some(text) = value.as_str() {
            let mut chars = text.chars();
            if let (Some(_), None) = (chars.next(), chars.next()) {
                let code = self.table.get_key_code(text);
                if code != KEY_RESERVED {
                    return code;
                }
            }
        }
        warn!(
            "Invalid {} marker {}, keeping {:?}",
            name,
            value,
            self.table.char_keys(current)
        );
        current
    }

    /// True if `segment` names `marker` in either its plain or shifted form
    fn is_marker(&self, segment: &str, marker: KeyCode) -> bool {
        segment == self.table.char_keys(marker) || segment == self.table.shift_keys(marker)
    }

    /// Register `word` under the chord described by `spec`.
    ///
    /// Returns `false` if the chord is empty or already taken.
    pub fn insert(&mut self, word: &str, spec: &str) -> bool {
        let chord = self.parse_chord(spec);
        if chord.is_empty() {
            warn!("Chord for {:?} is empty", word);
            return false;
        }
        match self.map.entry(chord) {
            Entry::Occupied(existing) => {
                warn!(
                    "The provided chord ({}) clashes with another chord ({}).",
                    word,
                    existing.get()
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(word.to_string());
                true
            }
        }
    }

    /// Turn a chord spec (or a captured candidate) into a set of key codes
    pub fn parse_chord(&self, raw: &str) -> Chord {
        let text: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let mut segments = text.split(SEPARATOR);
        let mut chord = Chord::new();

        if let Some(base) = segments.next() {
            let mut buf = [0u8; 4];
            for ch in base.chars() {
                let code = self.table.get_key_code(ch.encode_utf8(&mut buf));
                if code == KEY_RESERVED {
                    warn!("Unknown key {:?} in chord {:?}", ch, raw);
                    continue;
                }
                chord.insert(code);
            }
        }

        for special in segments {
            match [self.dup, self.plural, self.past]
                .into_iter()
                .find(|&marker| self.is_marker(special, marker))
            {
                Some(marker) => {
                    chord.insert(marker);
                }
                None => warn!("Unknown special in chord: {:?}", special),
            }
        }

        chord
    }

    /// Word for the candidate text, or the text itself if no chord matches
    pub fn get_word(&self, candidate: &str) -> String {
        let chord = self.parse_chord(candidate);
        match self.map.get(&chord) {
            Some(word) if !chord.is_empty() => word.clone(),
            _ => candidate.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
