//! USB HID keyboard report (boot protocol)
//!
//! Wire layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left Meta,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right Meta
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous HID usage codes, zero = empty slot
//! ```

/// Report size in bytes
pub const REPORT_SIZE: usize = 8;

/// Number of non-modifier key slots
pub const KEY_SLOTS: usize = 6;

/// Currently held modifiers and non-modifier keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyReport {
    pub modifiers: u8,
    pub keys: [u8; KEY_SLOTS],
}

impl KeyReport {
    /// The all-released report
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            keys: [0; KEY_SLOTS],
        }
    }

    /// A report holding one key with the given modifiers
    pub fn single(usage: u8, modifiers: u8) -> Self {
        let mut report = Self::empty();
        report.modifiers = modifiers;
        report.keys[0] = usage;
        report
    }

    /// Put a usage code in the first free slot.
    ///
    /// Returns `true` if the report overflowed (six other keys already
    /// held); the report is left unchanged in that case. Setting a key that
    /// is already present is a no-op.
    pub fn set_key(&mut self, usage: u8) -> bool {
        if usage == 0x00 || self.contains(usage) {
            return false;
        }
        match self.keys.iter_mut().find(|slot| **slot == 0x00) {
            Some(slot) => {
                *slot = usage;
                false
            }
            None => true,
        }
    }

    /// Clear the slot holding `usage`, leaving a hole
    pub fn unset_key(&mut self, usage: u8) {
        if usage == 0x00 {
            return;
        }
        if let Some(slot) = self.keys.iter_mut().find(|slot| **slot == usage) {
            *slot = 0x00;
        }
    }

    pub fn set_modifier(&mut self, bit: u8) {
        self.modifiers |= bit;
    }

    pub fn unset_modifier(&mut self, bit: u8) {
        self.modifiers &= !bit;
    }

    pub fn contains(&self, usage: u8) -> bool {
        usage != 0x00 && self.keys.contains(&usage)
    }

    /// Number of occupied key slots
    pub fn held(&self) -> usize {
        self.keys.iter().filter(|&&k| k != 0x00).count()
    }

    /// True if nothing is pressed
    pub fn is_empty(&self) -> bool {
        self.modifiers == 0 && self.held() == 0
    }

    /// Serialise for the HID gadget
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut buf = [0u8; REPORT_SIZE];
        buf[0] = self.modifiers;
        buf[2..].copy_from_slice(&self.keys);
        buf
    }

    /// Parse a boot-protocol report; the reserved byte is ignored
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < REPORT_SIZE {
            return None;
        }
        let mut keys = [0u8; KEY_SLOTS];
        keys.copy_from_slice(&data[2..REPORT_SIZE]);
        Some(Self {
            modifiers: data[0],
            keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_release_restores_report() {
        let mut report = KeyReport::empty();
        report.set_key(0x04);
        let before = report;

        assert!(!report.set_key(0x05));
        assert!(report.contains(0x05));
        report.unset_key(0x05);
        assert_eq!(report, before);
    }

    #[test]
    fn seventh_key_overflows_without_change() {
        let mut report = KeyReport::empty();
        for usage in 0x04..0x0a {
            assert!(!report.set_key(usage));
        }
        let full = report;

        assert!(report.set_key(0x0a));
        assert_eq!(report, full);
        assert_eq!(report.held(), KEY_SLOTS);
    }

    #[test]
    fn duplicate_key_is_not_added_twice() {
        let mut report = KeyReport::empty();
        report.set_key(0x04);
        report.set_key(0x04);
        assert_eq!(report.held(), 1);

        for usage in 0x05..0x0a {
            report.set_key(usage);
        }
        // already present, so not an overflow
        assert!(!report.set_key(0x04));
    }

    #[test]
    fn released_slot_is_reused() {
        let mut report = KeyReport::empty();
        report.set_key(0x04);
        report.set_key(0x05);
        report.unset_key(0x04);
        assert_eq!(report.keys, [0x00, 0x05, 0, 0, 0, 0]);

        report.set_key(0x06);
        assert_eq!(report.keys, [0x06, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn modifiers_are_bits() {
        let mut report = KeyReport::empty();
        report.set_modifier(0x20);
        report.set_modifier(0x01);
        assert_eq!(report.modifiers, 0x21);
        report.unset_modifier(0x20);
        assert_eq!(report.modifiers, 0x01);
        assert!(!report.is_empty());
    }

    #[test]
    fn wire_layout() {
        let mut report = KeyReport::empty();
        report.set_modifier(0x20);
        report.set_key(0x0b);
        assert_eq!(
            report.to_bytes(),
            [0x20, 0x00, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(KeyReport::empty().to_bytes(), [0u8; REPORT_SIZE]);
    }

    #[test]
    fn from_bytes_rejects_short_input() {
        assert_eq!(KeyReport::from_bytes(&[0x00; 7]), None);
        let report = KeyReport::from_bytes(&[0x02, 0xff, 0x04, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(report, KeyReport::single(0x04, 0x02));
    }
}
