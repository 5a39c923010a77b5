//! A/B slot selection and target expansion

use std::collections::BTreeSet;
use std::fmt;

/// One of the two redundant partition sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Slot `a`
    A,
    /// Slot `b`
    B,
}

impl Slot {
    /// Both slots, in the order they are written
    pub const BOTH: [Slot; 2] = [Slot::A, Slot::B];

    /// Slot letter as used by fastboot
    pub fn letter(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }

    /// Parse a slot letter (`a` or `b`, case-insensitive)
    pub fn from_letter(letter: &str) -> Option<Slot> {
        Self::BOTH
            .into_iter()
            .find(|slot| slot.letter().eq_ignore_ascii_case(letter.trim()))
    }

    /// Partition name with this slot's suffix (`boot` -> `boot_a`)
    pub fn suffixed(self, base: &str) -> String {
        format!("{}_{}", base, self.letter())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Which slots slot-specific partitions are written to
///
/// Chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotMode {
    /// Let fastboot pick the active slot
    #[default]
    Current,
    /// Write `_a` and `_b` explicitly
    Both,
}

impl fmt::Display for SlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("current slot"),
            Self::Both => f.write_str("both slots"),
        }
    }
}

/// Flash targets for one partition
///
/// Yields `[base_a, base_b]` when `mode` is [`SlotMode::Both`] and `base` is
/// slot-specific, otherwise `[base]`.
pub fn flash_targets(base: &str, mode: SlotMode, slot_specific: &BTreeSet<String>) -> Vec<String> {
    match mode {
        SlotMode::Both if slot_specific.contains(base) => {
            Slot::BOTH.iter().map(|slot| slot.suffixed(base)).collect()
        }
        _ => vec![base.to_string()],
    }
}
