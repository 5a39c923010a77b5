//! Device descriptor types

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Well-known super image base names, in flashing priority order
///
/// `super_empty` carries only the partition metadata and must land before a
/// full `super` image.
pub const SUPER_IMAGES: [&str; 2] = ["super_empty", "super"];

/// Partition category
///
/// The category decides which confirmation and resolution rules apply to a
/// group of partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartitionCategory {
    /// Kernel, ramdisk and device tree images
    Boot,
    /// Verified boot metadata
    VbMeta,
    /// Dynamic partitions living inside `super`
    Logical,
    /// Radio, bootloader and other firmware blobs
    Firmware,
    /// Whole `super` images replacing the logical partitions
    Super,
}

impl PartitionCategory {
    /// All categories in flashing order
    pub const ALL: [PartitionCategory; 5] = [
        PartitionCategory::Boot,
        PartitionCategory::VbMeta,
        PartitionCategory::Super,
        PartitionCategory::Logical,
        PartitionCategory::Firmware,
    ];

    /// Catalog key for this category
    pub fn key(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::VbMeta => "vbmeta",
            Self::Logical => "logical",
            Self::Firmware => "firmware",
            Self::Super => "super",
        }
    }

    /// Parse a catalog key (case-insensitive)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for PartitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Category to ordered partition names
///
/// Categories that were not configured behave as empty lists. The `super`
/// category always yields [`SUPER_IMAGES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionTable {
    entries: BTreeMap<PartitionCategory, Vec<String>>,
}

impl PartitionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the partition list for a category, replacing any previous list
    ///
    /// Lists for [`PartitionCategory::Super`] are ignored.
    pub fn set(&mut self, category: PartitionCategory, names: Vec<String>) {
        if category == PartitionCategory::Super {
            return;
        }
        self.entries.insert(category, names);
    }

    /// Builder-style variant of [`PartitionTable::set`]
    pub fn with(mut self, category: PartitionCategory, names: &[&str]) -> Self {
        self.set(category, names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Partition names for a category, in configured order
    pub fn get(&self, category: PartitionCategory) -> Vec<String> {
        if category == PartitionCategory::Super {
            return SUPER_IMAGES.iter().map(|n| n.to_string()).collect();
        }
        self.entries.get(&category).cloned().unwrap_or_default()
    }

    /// Number of configured partitions in a category
    pub fn count(&self, category: PartitionCategory) -> usize {
        self.get(category).len()
    }
}

/// A supported device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Display name (e.g., "Pixel 7")
    pub model: String,
    /// Board identifier the device reports via `getvar product`, if known
    pub board: Option<String>,
    /// Partitions grouped by category
    pub partitions: PartitionTable,
    /// Partitions that exist once per A/B slot
    pub slot_specific: BTreeSet<String>,
}

impl DeviceDescriptor {
    /// Create a descriptor with no partitions
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            board: None,
            partitions: PartitionTable::new(),
            slot_specific: BTreeSet::new(),
        }
    }

    /// Set the expected board identifier
    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = Some(board.into());
        self
    }

    /// Set the partition list of one category
    pub fn with_partitions(mut self, category: PartitionCategory, names: &[&str]) -> Self {
        self.partitions = self.partitions.with(category, names);
        self
    }

    /// Mark partitions as slot-specific
    pub fn with_slot_specific(mut self, names: &[&str]) -> Self {
        self.slot_specific.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Partition names of a category in configured order
    pub fn partitions(&self, category: PartitionCategory) -> Vec<String> {
        self.partitions.get(category)
    }

    /// Whether the partition exists once per slot
    pub fn is_slot_specific(&self, name: &str) -> bool {
        self.slot_specific.contains(name)
    }

    /// Whether a reported board identifier matches the expected one
    ///
    /// Always true when the descriptor has no board.
    pub fn board_matches(&self, reported: &str) -> bool {
        match &self.board {
            Some(expected) => expected.trim().eq_ignore_ascii_case(reported.trim()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_keys() {
        for category in PartitionCategory::ALL {
            assert_eq!(PartitionCategory::from_key(category.key()), Some(category));
        }
        assert_eq!(
            PartitionCategory::from_key("VBMETA"),
            Some(PartitionCategory::VbMeta)
        );
        assert_eq!(PartitionCategory::from_key("system"), None);
    }

    #[test]
    fn test_super_is_fixed() {
        let mut table = PartitionTable::new();
        table.set(PartitionCategory::Super, vec!["custom".into()]);
        assert_eq!(table.get(PartitionCategory::Super), vec!["super_empty", "super"]);
    }

    #[test]
    fn test_unconfigured_category_is_empty() {
        let device =
            DeviceDescriptor::new("Test").with_partitions(PartitionCategory::Boot, &["boot"]);
        assert_eq!(device.partitions(PartitionCategory::Boot), vec!["boot"]);
        assert!(device.partitions(PartitionCategory::Firmware).is_empty());
    }

    #[test]
    fn test_board_matches_case_insensitive() {
        let device = DeviceDescriptor::new("Pixel 7").with_board("Panther");
        assert!(device.board_matches("panther"));
        assert!(device.board_matches(" PANTHER "));
        assert!(!device.board_matches("cheetah"));

        let no_board = DeviceDescriptor::new("Generic");
        assert!(no_board.board_matches("anything"));
    }
}
