//! Key code definitions and the kernel-code / HID-usage lookup tables
//!
//! Four code spaces meet here: kernel key codes (as delivered by
//! `/dev/input/event*`), display strings, modifier tag names and the HID
//! usage / modifier-bit bytes written to the USB gadget. All tables are
//! static; a [`KeyTable`] only indexes them.

use log::error;
use std::collections::HashMap;

/// Represents a physical key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KeyCode(pub u16);

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Kernel key codes from `linux/input-event-codes.h`
pub mod codes {
    use super::KeyCode;

    pub const KEY_RESERVED: KeyCode = KeyCode(0);
    pub const KEY_ESC: KeyCode = KeyCode(1);
    pub const KEY_1: KeyCode = KeyCode(2);
    pub const KEY_2: KeyCode = KeyCode(3);
    pub const KEY_3: KeyCode = KeyCode(4);
    pub const KEY_4: KeyCode = KeyCode(5);
    pub const KEY_5: KeyCode = KeyCode(6);
    pub const KEY_6: KeyCode = KeyCode(7);
    pub const KEY_7: KeyCode = KeyCode(8);
    pub const KEY_8: KeyCode = KeyCode(9);
    pub const KEY_9: KeyCode = KeyCode(10);
    pub const KEY_0: KeyCode = KeyCode(11);
    pub const KEY_MINUS: KeyCode = KeyCode(12);
    pub const KEY_EQUAL: KeyCode = KeyCode(13);
    pub const KEY_BACKSPACE: KeyCode = KeyCode(14);
    pub const KEY_TAB: KeyCode = KeyCode(15);
    pub const KEY_Q: KeyCode = KeyCode(16);
    pub const KEY_W: KeyCode = KeyCode(17);
    pub const KEY_E: KeyCode = KeyCode(18);
    pub const KEY_R: KeyCode = KeyCode(19);
    pub const KEY_T: KeyCode = KeyCode(20);
    pub const KEY_Y: KeyCode = KeyCode(21);
    pub const KEY_U: KeyCode = KeyCode(22);
    pub const KEY_I: KeyCode = KeyCode(23);
    pub const KEY_O: KeyCode = KeyCode(24);
    pub const KEY_P: KeyCode = KeyCode(25);
    pub const KEY_LEFTBRACE: KeyCode = KeyCode(26);
    pub const KEY_RIGHTBRACE: KeyCode = KeyCode(27);
    pub const KEY_ENTER: KeyCode = KeyCode(28);
    pub const KEY_LEFTCTRL: KeyCode = KeyCode(29);
    pub const KEY_A: KeyCode = KeyCode(30);
    pub const KEY_S: KeyCode = KeyCode(31);
    pub const KEY_D: KeyCode = KeyCode(32);
    pub const KEY_F: KeyCode = KeyCode(33);
    pub const KEY_G: KeyCode = KeyCode(34);
    pub const KEY_H: KeyCode = KeyCode(35);
    pub const KEY_J: KeyCode = KeyCode(36);
    pub const KEY_K: KeyCode = KeyCode(37);
    pub const KEY_L: KeyCode = KeyCode(38);
    pub const KEY_SEMICOLON: KeyCode = KeyCode(39);
    pub const KEY_APOSTROPHE: KeyCode = KeyCode(40);
    pub const KEY_GRAVE: KeyCode = KeyCode(41);
    pub const KEY_LEFTSHIFT: KeyCode = KeyCode(42);
    pub const KEY_BACKSLASH: KeyCode = KeyCode(43);
    pub const KEY_Z: KeyCode = KeyCode(44);
    pub const KEY_X: KeyCode = KeyCode(45);
    pub const KEY_C: KeyCode = KeyCode(46);
    pub const KEY_V: KeyCode = KeyCode(47);
    pub const KEY_B: KeyCode = KeyCode(48);
    pub const KEY_N: KeyCode = KeyCode(49);
    pub const KEY_M: KeyCode = KeyCode(50);
    pub const KEY_COMMA: KeyCode = KeyCode(51);
    pub const KEY_DOT: KeyCode = KeyCode(52);
    pub const KEY_SLASH: KeyCode = KeyCode(53);
    pub const KEY_RIGHTSHIFT: KeyCode = KeyCode(54);
    pub const KEY_KPASTERISK: KeyCode = KeyCode(55);
    pub const KEY_LEFTALT: KeyCode = KeyCode(56);
    pub const KEY_SPACE: KeyCode = KeyCode(57);
    pub const KEY_CAPSLOCK: KeyCode = KeyCode(58);
    pub const KEY_F1: KeyCode = KeyCode(59);
    pub const KEY_F2: KeyCode = KeyCode(60);
    pub const KEY_F3: KeyCode = KeyCode(61);
    pub const KEY_F4: KeyCode = KeyCode(62);
    pub const KEY_F5: KeyCode = KeyCode(63);
    pub const KEY_F6: KeyCode = KeyCode(64);
    pub const KEY_F7: KeyCode = KeyCode(65);
    pub const KEY_F8: KeyCode = KeyCode(66);
    pub const KEY_F9: KeyCode = KeyCode(67);
    pub const KEY_F10: KeyCode = KeyCode(68);
    pub const KEY_NUMLOCK: KeyCode = KeyCode(69);
    pub const KEY_SCROLLLOCK: KeyCode = KeyCode(70);
    pub const KEY_KP7: KeyCode = KeyCode(71);
    pub const KEY_KP8: KeyCode = KeyCode(72);
    pub const KEY_KP9: KeyCode = KeyCode(73);
    pub const KEY_KPMINUS: KeyCode = KeyCode(74);
    pub const KEY_KP4: KeyCode = KeyCode(75);
    pub const KEY_KP5: KeyCode = KeyCode(76);
    pub const KEY_KP6: KeyCode = KeyCode(77);
    pub const KEY_KPPLUS: KeyCode = KeyCode(78);
    pub const KEY_KP1: KeyCode = KeyCode(79);
    pub const KEY_KP2: KeyCode = KeyCode(80);
    pub const KEY_KP3: KeyCode = KeyCode(81);
    pub const KEY_KP0: KeyCode = KeyCode(82);
    pub const KEY_KPDOT: KeyCode = KeyCode(83);
    pub const KEY_102ND: KeyCode = KeyCode(86);
    pub const KEY_F11: KeyCode = KeyCode(87);
    pub const KEY_F12: KeyCode = KeyCode(88);
    pub const KEY_KPENTER: KeyCode = KeyCode(96);
    pub const KEY_RIGHTCTRL: KeyCode = KeyCode(97);
    pub const KEY_KPSLASH: KeyCode = KeyCode(98);
    pub const KEY_SYSRQ: KeyCode = KeyCode(99);
    pub const KEY_RIGHTALT: KeyCode = KeyCode(100);
    pub const KEY_HOME: KeyCode = KeyCode(102);
    pub const KEY_UP: KeyCode = KeyCode(103);
    pub const KEY_PAGEUP: KeyCode = KeyCode(104);
    pub const KEY_LEFT: KeyCode = KeyCode(105);
    pub const KEY_RIGHT: KeyCode = KeyCode(106);
    pub const KEY_END: KeyCode = KeyCode(107);
    pub const KEY_DOWN: KeyCode = KeyCode(108);
    pub const KEY_PAGEDOWN: KeyCode = KeyCode(109);
    pub const KEY_INSERT: KeyCode = KeyCode(110);
    pub const KEY_DELETE: KeyCode = KeyCode(111);
    pub const KEY_MUTE: KeyCode = KeyCode(113);
    pub const KEY_VOLUMEDOWN: KeyCode = KeyCode(114);
    pub const KEY_VOLUMEUP: KeyCode = KeyCode(115);
    pub const KEY_KPEQUAL: KeyCode = KeyCode(117);
    pub const KEY_PAUSE: KeyCode = KeyCode(119);
    pub const KEY_LEFTMETA: KeyCode = KeyCode(125);
    pub const KEY_RIGHTMETA: KeyCode = KeyCode(126);
    pub const KEY_COMPOSE: KeyCode = KeyCode(127);
}

use codes::*;

/// A non-modifier key: its display strings and HID usage code
#[derive(Debug, Clone)]
pub struct KeyInfo {
    /// Kernel key code
    pub code: KeyCode,
    /// Unshifted display string (a single character, or a `<NAME/>` tag)
    pub plain: &'static str,
    /// Shifted display string, if the key produces a different character
    pub shifted: Option<&'static str>,
    /// HID usage code (keyboard/keypad page)
    pub usage: u8,
}

impl KeyInfo {
    const fn new(code: KeyCode, plain: &'static str, shifted: Option<&'static str>, usage: u8) -> Self {
        Self { code, plain, shifted, usage }
    }
}

/// A modifier key: its tag name and bit in the report's modifier byte
#[derive(Debug, Clone)]
pub struct ModifierInfo {
    pub code: KeyCode,
    pub name: &'static str,
    pub bit: u8,
}

impl ModifierInfo {
    const fn new(code: KeyCode, name: &'static str, bit: u8) -> Self {
        Self { code, name, bit }
    }
}

/// Modifier bit for left shift, used when typing shifted characters
pub const MOD_LEFTSHIFT: u8 = 0x02;

/// Modifier bits that change which character a key produces
pub const MOD_SHIFT_MASK: u8 = 0x02 | 0x20;

/// Modifiers in report bit order
pub static MODIFIERS: &[ModifierInfo] = &[
    ModifierInfo::new(KEY_LEFTCTRL, "LCTRL", 0x01),
    ModifierInfo::new(KEY_LEFTSHIFT, "LSHIFT", 0x02),
    ModifierInfo::new(KEY_LEFTALT, "LALT", 0x04),
    ModifierInfo::new(KEY_LEFTMETA, "LMETA", 0x08),
    ModifierInfo::new(KEY_RIGHTCTRL, "RCTRL", 0x10),
    ModifierInfo::new(KEY_RIGHTSHIFT, "RSHIFT", 0x20),
    ModifierInfo::new(KEY_RIGHTALT, "RALT", 0x40),
    ModifierInfo::new(KEY_RIGHTMETA, "RMETA", 0x80),
];

/// Standard US layout. Order matters for reverse lookup: the first key
/// producing a character wins, so the main block comes before the keypad.
pub static KEYS: &[KeyInfo] = &[
    // Number row
    KeyInfo::new(KEY_GRAVE, "`", Some("~"), 0x35),
    KeyInfo::new(KEY_1, "1", Some("!"), 0x1e),
    KeyInfo::new(KEY_2, "2", Some("@"), 0x1f),
    KeyInfo::new(KEY_3, "3", Some("#"), 0x20),
    KeyInfo::new(KEY_4, "4", Some("$"), 0x21),
    KeyInfo::new(KEY_5, "5", Some("%"), 0x22),
    KeyInfo::new(KEY_6, "6", Some("^"), 0x23),
    KeyInfo::new(KEY_7, "7", Some("&"), 0x24),
    KeyInfo::new(KEY_8, "8", Some("*"), 0x25),
    KeyInfo::new(KEY_9, "9", Some("("), 0x26),
    KeyInfo::new(KEY_0, "0", Some(")"), 0x27),
    KeyInfo::new(KEY_MINUS, "-", Some("_"), 0x2d),
    KeyInfo::new(KEY_EQUAL, "=", Some("+"), 0x2e),
    KeyInfo::new(KEY_BACKSPACE, "<BACKSPACE/>", None, 0x2a),
    // Top letter row
    KeyInfo::new(KEY_TAB, "\t", None, 0x2b),
    KeyInfo::new(KEY_Q, "q", Some("Q"), 0x14),
    KeyInfo::new(KEY_W, "w", Some("W"), 0x1a),
    KeyInfo::new(KEY_E, "e", Some("E"), 0x08),
    KeyInfo::new(KEY_R, "r", Some("R"), 0x15),
    KeyInfo::new(KEY_T, "t", Some("T"), 0x17),
    KeyInfo::new(KEY_Y, "y", Some("Y"), 0x1c),
    KeyInfo::new(KEY_U, "u", Some("U"), 0x18),
    KeyInfo::new(KEY_I, "i", Some("I"), 0x0c),
    KeyInfo::new(KEY_O, "o", Some("O"), 0x12),
    KeyInfo::new(KEY_P, "p", Some("P"), 0x13),
    KeyInfo::new(KEY_LEFTBRACE, "[", Some("{"), 0x2f),
    KeyInfo::new(KEY_RIGHTBRACE, "]", Some("}"), 0x30),
    KeyInfo::new(KEY_BACKSLASH, "\\", Some("|"), 0x31),
    // Home row
    KeyInfo::new(KEY_CAPSLOCK, "<CAPSLOCK/>", None, 0x39),
    KeyInfo::new(KEY_A, "a", Some("A"), 0x04),
    KeyInfo::new(KEY_S, "s", Some("S"), 0x16),
    KeyInfo::new(KEY_D, "d", Some("D"), 0x07),
    KeyInfo::new(KEY_F, "f", Some("F"), 0x09),
    KeyInfo::new(KEY_G, "g", Some("G"), 0x0a),
    KeyInfo::new(KEY_H, "h", Some("H"), 0x0b),
    KeyInfo::new(KEY_J, "j", Some("J"), 0x0d),
    KeyInfo::new(KEY_K, "k", Some("K"), 0x0e),
    KeyInfo::new(KEY_L, "l", Some("L"), 0x0f),
    KeyInfo::new(KEY_SEMICOLON, ";", Some(":"), 0x33),
    KeyInfo::new(KEY_APOSTROPHE, "'", Some("\""), 0x34),
    KeyInfo::new(KEY_ENTER, "\n", None, 0x28),
    // Bottom letter row
    KeyInfo::new(KEY_102ND, "<102ND/>", None, 0x64),
    KeyInfo::new(KEY_Z, "z", Some("Z"), 0x1d),
    KeyInfo::new(KEY_X, "x", Some("X"), 0x1b),
    KeyInfo::new(KEY_C, "c", Some("C"), 0x06),
    KeyInfo::new(KEY_V, "v", Some("V"), 0x19),
    KeyInfo::new(KEY_B, "b", Some("B"), 0x05),
    KeyInfo::new(KEY_N, "n", Some("N"), 0x11),
    KeyInfo::new(KEY_M, "m", Some("M"), 0x10),
    KeyInfo::new(KEY_COMMA, ",", Some("<"), 0x36),
    KeyInfo::new(KEY_DOT, ".", Some(">"), 0x37),
    KeyInfo::new(KEY_SLASH, "/", Some("?"), 0x38),
    KeyInfo::new(KEY_SPACE, " ", None, 0x2c),
    KeyInfo::new(KEY_COMPOSE, "<MENU/>", None, 0x65),
    // Function row
    KeyInfo::new(KEY_ESC, "<ESC/>", None, 0x29),
    KeyInfo::new(KEY_F1, "<F1/>", None, 0x3a),
    KeyInfo::new(KEY_F2, "<F2/>", None, 0x3b),
    KeyInfo::new(KEY_F3, "<F3/>", None, 0x3c),
    KeyInfo::new(KEY_F4, "<F4/>", None, 0x3d),
    KeyInfo::new(KEY_F5, "<F5/>", None, 0x3e),
    KeyInfo::new(KEY_F6, "<F6/>", None, 0x3f),
    KeyInfo::new(KEY_F7, "<F7/>", None, 0x40),
    KeyInfo::new(KEY_F8, "<F8/>", None, 0x41),
    KeyInfo::new(KEY_F9, "<F9/>", None, 0x42),
    KeyInfo::new(KEY_F10, "<F10/>", None, 0x43),
    KeyInfo::new(KEY_F11, "<F11/>", None, 0x44),
    KeyInfo::new(KEY_F12, "<F12/>", None, 0x45),
    KeyInfo::new(KEY_SYSRQ, "<PRTSC/>", None, 0x46),
    KeyInfo::new(KEY_SCROLLLOCK, "<SCROLLLOCK/>", None, 0x47),
    KeyInfo::new(KEY_PAUSE, "<PAUSE/>", None, 0x48),
    // Navigation cluster
    KeyInfo::new(KEY_INSERT, "<INSERT/>", None, 0x49),
    KeyInfo::new(KEY_HOME, "<HOME/>", None, 0x4a),
    KeyInfo::new(KEY_PAGEUP, "<PAGEUP/>", None, 0x4b),
    KeyInfo::new(KEY_DELETE, "<DELETE/>", None, 0x4c),
    KeyInfo::new(KEY_END, "<END/>", None, 0x4d),
    KeyInfo::new(KEY_PAGEDOWN, "<PAGEDOWN/>", None, 0x4e),
    KeyInfo::new(KEY_RIGHT, "<RIGHT/>", None, 0x4f),
    KeyInfo::new(KEY_LEFT, "<LEFT/>", None, 0x50),
    KeyInfo::new(KEY_DOWN, "<DOWN/>", None, 0x51),
    KeyInfo::new(KEY_UP, "<UP/>", None, 0x52),
    // Keypad
    KeyInfo::new(KEY_NUMLOCK, "<NUMLOCK/>", None, 0x53),
    KeyInfo::new(KEY_KPSLASH, "<KP//>", None, 0x54),
    KeyInfo::new(KEY_KPASTERISK, "<KP*/>", None, 0x55),
    KeyInfo::new(KEY_KPMINUS, "<KP-/>", None, 0x56),
    KeyInfo::new(KEY_KPPLUS, "<KP+/>", None, 0x57),
    KeyInfo::new(KEY_KPENTER, "<KPENTER/>", None, 0x58),
    KeyInfo::new(KEY_KP1, "<KP1/>", None, 0x59),
    KeyInfo::new(KEY_KP2, "<KP2/>", None, 0x5a),
    KeyInfo::new(KEY_KP3, "<KP3/>", None, 0x5b),
    KeyInfo::new(KEY_KP4, "<KP4/>", None, 0x5c),
    KeyInfo::new(KEY_KP5, "<KP5/>", None, 0x5d),
    KeyInfo::new(KEY_KP6, "<KP6/>", None, 0x5e),
    KeyInfo::new(KEY_KP7, "<KP7/>", None, 0x5f),
    KeyInfo::new(KEY_KP8, "<KP8/>", None, 0x60),
    KeyInfo::new(KEY_KP9, "<KP9/>", None, 0x61),
    KeyInfo::new(KEY_KP0, "<KP0/>", None, 0x62),
    KeyInfo::new(KEY_KPDOT, "<KP./>", None, 0x63),
    KeyInfo::new(KEY_KPEQUAL, "<KP=/>", None, 0x67),
    // Media
    KeyInfo::new(KEY_MUTE, "<MUTE/>", None, 0x7f),
    KeyInfo::new(KEY_VOLUMEUP, "<VOLUMEUP/>", None, 0x80),
    KeyInfo::new(KEY_VOLUMEDOWN, "<VOLUMEDOWN/>", None, 0x81),
];

/// Read-only index over [`KEYS`] and [`MODIFIERS`]
#[derive(Debug, Clone)]
pub struct KeyTable {
    keys: HashMap<KeyCode, &'static KeyInfo>,
    modifiers: HashMap<KeyCode, &'static ModifierInfo>,
    /// display string -> (code, needs shift)
    reverse: HashMap<&'static str, (KeyCode, bool)>,
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTable {
    pub fn new() -> Self {
        let mut keys = HashMap::with_capacity(KEYS.len());
        let mut reverse = HashMap::with_capacity(KEYS.len() * 2);

        for info in KEYS {
            keys.insert(info.code, info);
            reverse.entry(info.plain).or_insert((info.code, false));
            if let Some(shifted) = info.shifted {
                reverse.entry(shifted).or_insert((info.code, true));
            }
        }

        let modifiers = MODIFIERS.iter().map(|m| (m.code, m)).collect();

        Self { keys, modifiers, reverse }
    }

    /// True if the code is one of the eight modifier keys
    pub fn is_modifier(&self, code: KeyCode) -> bool {
        self.modifiers.contains_key(&code)
    }

    /// True if the code is a non-modifier key with a display string
    pub fn is_char_key(&self, code: KeyCode) -> bool {
        self.keys.contains_key(&code)
    }

    /// True if the code can be translated to a HID report at all
    pub fn is_key_valid(&self, code: KeyCode) -> bool {
        self.is_char_key(code) || self.is_modifier(code)
    }

    /// HID usage code for a non-modifier key, `0x00` if unknown
    pub fn scan_to_hex(&self, code: KeyCode) -> u8 {
        match self.keys.get(&code) {
            Some(info) => info.usage,
            None => {
                error!("Unknown key code: {}", code.0);
                0x00
            }
        }
    }

    /// Modifier bit for a modifier key, `0x00` if unknown
    pub fn mod_to_hex(&self, code: KeyCode) -> u8 {
        match self.modifiers.get(&code) {
            Some(info) => info.bit,
            None => {
                error!("Unknown modifier key code: {}", code.0);
                0x00
            }
        }
    }

    /// Unshifted display string, empty if unknown
    pub fn char_keys(&self, code: KeyCode) -> String {
        match self.keys.get(&code) {
            Some(info) => info.plain.to_string(),
            None => {
                error!("Invalid character key code: {}", code.0);
                String::new()
            }
        }
    }

    /// Shifted display string, falling back to the unshifted one
    pub fn shift_keys(&self, code: KeyCode) -> String {
        match self.keys.get(&code) {
            Some(info) => info.shifted.unwrap_or(info.plain).to_string(),
            None => {
                error!("Invalid character key code: {}", code.0);
                String::new()
            }
        }
    }

    /// Modifier name (`RSHIFT`), empty if unknown
    pub fn mod_keys(&self, code: KeyCode) -> String {
        match self.modifiers.get(&code) {
            Some(info) => info.name.to_string(),
            None => {
                error!("Invalid modifier key code: {}", code.0);
                String::new()
            }
        }
    }

    /// Reverse lookup of a display string; `KEY_RESERVED` if nothing produces it
    pub fn get_key_code(&self, key: &str) -> KeyCode {
        if let Some((code, _)) = self.reverse.get(key) {
            return *code;
        }
        if let Some(info) = MODIFIERS.iter().find(|m| m.name == key) {
            return info.code;
        }
        error!("Unknown key: {:?}", key);
        KEY_RESERVED
    }

    /// The keystroke that types `ch`: usage code plus modifier bits
    pub fn char_to_stroke(&self, ch: char) -> Option<(u8, u8)> {
        let mut buf = [0u8; 4];
        let (code, shifted) = *self.reverse.get(&*ch.encode_utf8(&mut buf))?;
        let usage = self.keys.get(&code)?.usage;
        Some((usage, if shifted { MOD_LEFTSHIFT } else { 0 }))
    }

    /// Opening tag for a modifier, e.g. `<RSHIFT>`
    pub fn begin_mod_key(&self, code: KeyCode) -> String {
        let name = self.mod_keys(code);
        if name.is_empty() {
            return name;
        }
        format!("<{}>", name)
    }

    /// Closing tag for a modifier, e.g. `</RSHIFT>`
    pub fn end_mod_key(&self, code: KeyCode) -> String {
        let name = self.mod_keys(code);
        if name.is_empty() {
            return name;
        }
        format!("</{}>", name)
    }

    pub fn is_begin_modifier(&self, tag: &str) -> bool {
        tag.strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .filter(|name| !name.starts_with('/'))
            .is_some_and(|name| MODIFIERS.iter().any(|m| m.name == name))
    }

    pub fn is_end_modifier(&self, tag: &str) -> bool {
        tag.strip_prefix("</")
            .and_then(|t| t.strip_suffix('>'))
            .is_some_and(|name| MODIFIERS.iter().any(|m| m.name == name))
    }

    /// True if the tag opens or closes a modifier
    pub fn is_modifier_tag(&self, tag: &str) -> bool {
        self.is_begin_modifier(tag) || self.is_end_modifier(tag)
    }

    /// True iff the two tags open and close the same modifier, in either order
    pub fn is_modifier_pair(&self, a: &str, b: &str) -> bool {
        let pair = |open: &str, close: &str| {
            self.is_begin_modifier(open)
                && self.is_end_modifier(close)
                && open[1..] == close[2..]
        };
        pair(a, b) || pair(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_valid() {
        let table = KeyTable::new();
        assert!(!table.is_key_valid(KEY_RESERVED));
        assert!(table.is_key_valid(KEY_BACKSPACE));
        assert!(table.is_key_valid(KEY_RIGHTMETA));
    }

    #[test]
    fn char_key() {
        let table = KeyTable::new();
        assert!(!table.is_char_key(KEY_RESERVED));
        assert!(table.is_char_key(KEY_W));
        assert!(table.is_char_key(KEY_8));
        assert!(table.is_char_key(KEY_BACKSPACE));
        assert!(!table.is_char_key(KEY_LEFTCTRL));
    }

    #[test]
    fn modifier_codes() {
        let table = KeyTable::new();
        assert!(table.is_modifier(KEY_LEFTCTRL));
        assert!(table.is_modifier(KEY_RIGHTALT));
        assert!(!table.is_modifier(KEY_A));
        assert!(!table.is_modifier(KEY_RESERVED));
    }

    #[test]
    fn modifier_tags() {
        let table = KeyTable::new();
        assert!(table.is_modifier_tag("<RCTRL>"));
        assert!(table.is_modifier_tag("</RSHIFT>"));
        assert!(!table.is_modifier_tag(""));
        assert!(!table.is_modifier_tag("RCTRL"));
        assert!(!table.is_modifier_tag("f"));
    }

    #[test]
    fn modifier_pair() {
        let table = KeyTable::new();
        assert!(table.is_modifier_pair("<RALT>", "</RALT>"));
        assert!(table.is_modifier_pair("</RALT>", "<RALT>"));
        assert!(!table.is_modifier_pair("<LALT>", "</RALT>"));
        assert!(!table.is_modifier_pair("</LALT>", "<RALT>"));
        assert!(!table.is_modifier_pair("", ""));
        assert!(!table.is_modifier_pair("<BACKSPACE/>", "<BACKSPACE/>"));
    }

    #[test]
    fn begin_end_modifier() {
        let table = KeyTable::new();
        assert!(table.is_begin_modifier("<RALT>"));
        assert!(table.is_end_modifier("</RALT>"));
        assert!(!table.is_begin_modifier("</LALT>"));
        assert!(!table.is_end_modifier("<LALT>"));
        assert!(!table.is_begin_modifier(""));
        assert!(!table.is_end_modifier(""));
        assert!(!table.is_begin_modifier("<BACKSPACE/>"));
        assert!(!table.is_end_modifier("<BACKSPACE/>"));
        assert!(!table.is_begin_modifier("<BACKSPACE>"));
        assert!(!table.is_end_modifier("<BACKSPACE>"));
    }

    #[test]
    fn mod_key_tags() {
        let table = KeyTable::new();
        assert_eq!(table.begin_mod_key(KEY_RIGHTSHIFT), "<RSHIFT>");
        assert_eq!(table.end_mod_key(KEY_RIGHTSHIFT), "</RSHIFT>");
        assert_eq!(table.begin_mod_key(KEY_A), "");
    }

    #[test]
    fn hex_lookups() {
        let table = KeyTable::new();
        assert_eq!(table.scan_to_hex(KEY_A), 0x04);
        assert_eq!(table.scan_to_hex(KEY_H), 0x0b);
        assert_eq!(table.scan_to_hex(KEY_ENTER), 0x28);
        assert_eq!(table.scan_to_hex(KeyCode(999)), 0x00);
        assert_eq!(table.mod_to_hex(KEY_LEFTCTRL), 0x01);
        assert_eq!(table.mod_to_hex(KEY_RIGHTSHIFT), 0x20);
        assert_eq!(table.mod_to_hex(KEY_RIGHTMETA), 0x80);
        assert_eq!(table.mod_to_hex(KEY_A), 0x00);
    }

    #[test]
    fn lookups_are_stable() {
        let table = KeyTable::new();
        for code in 0..256u16 {
            let code = KeyCode(code);
            assert_eq!(table.scan_to_hex(code), table.scan_to_hex(code));
            assert_eq!(table.mod_to_hex(code), table.mod_to_hex(code));
        }
    }

    #[test]
    fn no_code_is_both_modifier_and_key() {
        let table = KeyTable::new();
        for info in MODIFIERS {
            assert!(!table.is_char_key(info.code));
        }
    }

    #[test]
    fn usage_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for info in KEYS {
            assert!(seen.insert(info.usage), "duplicate usage {:#x}", info.usage);
        }
    }

    #[test]
    fn reverse_lookup() {
        let table = KeyTable::new();
        assert_eq!(table.get_key_code("a"), KEY_A);
        assert_eq!(table.get_key_code("A"), KEY_A);
        assert_eq!(table.get_key_code("="), KEY_EQUAL);
        assert_eq!(table.get_key_code("+"), KEY_EQUAL);
        assert_eq!(table.get_key_code(";"), KEY_SEMICOLON);
        assert_eq!(table.get_key_code(" "), KEY_SPACE);
        assert_eq!(table.get_key_code("RSHIFT"), KEY_RIGHTSHIFT);
        assert_eq!(table.get_key_code("ä"), KEY_RESERVED);
        assert_eq!(table.get_key_code(&table.char_keys(KEY_BACKSPACE)), KEY_BACKSPACE);
    }

    #[test]
    fn char_strokes() {
        let table = KeyTable::new();
        assert_eq!(table.char_to_stroke('h'), Some((0x0b, 0)));
        assert_eq!(table.char_to_stroke('H'), Some((0x0b, MOD_LEFTSHIFT)));
        assert_eq!(table.char_to_stroke('!'), Some((0x1e, MOD_LEFTSHIFT)));
        assert_eq!(table.char_to_stroke(' '), Some((0x2c, 0)));
        assert_eq!(table.char_to_stroke('é'), None);
    }

    #[test]
    fn shift_keys_fall_back_to_plain() {
        let table = KeyTable::new();
        assert_eq!(table.shift_keys(KEY_A), "A");
        assert_eq!(table.shift_keys(KEY_SPACE), " ");
        assert_eq!(table.shift_keys(KeyCode(999)), "");
    }
}
