//! Flash session state

use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};

use crate::device::{DeviceDescriptor, PartitionCategory};
use crate::partition::SlotMode;

/// Orchestrator stages, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Verify the connected board against the descriptor
    SelectDevice,
    /// Ask for current-slot or both-slot flashing
    ChooseSlotMode,
    /// Make slot `a` active
    ActivateSlot,
    /// Optional user data wipe
    WipeData,
    /// Boot category
    FlashBoot,
    /// Verified boot metadata, optionally with AVB disabled
    FlashVbMeta,
    /// Switch into userspace fastboot
    RebootToFastbootd,
    /// Super images, or the logical category when none are present
    FlashSuperOrLogical,
    /// Firmware category
    FlashFirmware,
    /// Optional reboot to system
    FinalReboot,
    /// Write the session summary
    Summary,
    /// Terminal state
    Done,
}

impl Stage {
    /// Stage that follows this one
    pub fn next(self) -> Stage {
        match self {
            Self::SelectDevice => Self::ChooseSlotMode,
            Self::ChooseSlotMode => Self::ActivateSlot,
            Self::ActivateSlot => Self::WipeData,
            Self::WipeData => Self::FlashBoot,
            Self::FlashBoot => Self::FlashVbMeta,
            Self::FlashVbMeta => Self::RebootToFastbootd,
            Self::RebootToFastbootd => Self::FlashSuperOrLogical,
            Self::FlashSuperOrLogical => Self::FlashFirmware,
            Self::FlashFirmware => Self::FinalReboot,
            Self::FinalReboot => Self::Summary,
            Self::Summary | Self::Done => Self::Done,
        }
    }
}

/// Options fixed for the whole session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Directory searched for `<partition>.img` files
    pub image_dir: PathBuf,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("."),
        }
    }
}

/// A partition target that was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashedTarget {
    /// Category the partition belongs to
    pub category: PartitionCategory,
    /// Target name passed to fastboot (possibly slot-suffixed)
    pub target: String,
    /// Image that was written
    pub image: PathBuf,
}

/// Mutable state of one flashing session
#[derive(Debug, Clone)]
pub struct FlashSession {
    /// Device being flashed
    pub device: DeviceDescriptor,
    /// Slot mode chosen for the session
    pub slot_mode: SlotMode,
    /// Whether vbmeta was flashed with verification disabled
    pub disable_avb: bool,
    /// Whether user data was wiped
    pub wiped: bool,
    /// Whether the device was rebooted to the system at the end
    pub rebooted: bool,
    /// Targets written, in order
    pub flashed: Vec<FlashedTarget>,
    /// Categories that were not flashed
    pub skipped: Vec<PartitionCategory>,
    /// Current stage
    pub stage: Stage,
}

impl FlashSession {
    /// Fresh session for a device
    pub fn new(device: DeviceDescriptor) -> Self {
        Self {
            device,
            slot_mode: SlotMode::default(),
            disable_avb: false,
            wiped: false,
            rebooted: false,
            flashed: Vec::new(),
            skipped: Vec::new(),
            stage: Stage::SelectDevice,
        }
    }

    /// Targets written for one category
    pub fn flashed_in(&self, category: PartitionCategory) -> Vec<&str> {
        self.flashed
            .iter()
            .filter(|f| f.category == category)
            .map(|f| f.target.as_str())
            .collect()
    }

    /// Summary block written to the command log at the end of a session
    pub fn summary(&self, log_path: &Path, commands: usize, failures: usize) -> String {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        let targets: Vec<&str> = self.flashed.iter().map(|f| f.target.as_str()).collect();

        let mut lines = vec![
            String::new(),
            "=== FLASHING SUMMARY ===".to_string(),
            format!("Log file: {}", log_path.display()),
            format!(
                "Timestamp: {}",
                Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
            ),
            format!("Device: {}", self.device.model),
            format!("Slot mode: {}", self.slot_mode),
            format!("AVB disabled: {}", yes_no(self.disable_avb)),
            format!("User data wiped: {}", yes_no(self.wiped)),
            format!("Flashed ({}): {}", targets.len(), targets.join(", ")),
        ];
        if !self.skipped.is_empty() {
            let skipped: Vec<&str> = self.skipped.iter().map(|c| c.key()).collect();
            lines.push(format!("Skipped categories: {}", skipped.join(", ")));
        }
        lines.push(format!("Rebooted to system: {}", yes_no(self.rebooted)));
        lines.push(format!("Commands: {} issued, {} failed", commands, failures));

        let mut s = lines.join("\n");
        s.push('\n');
        s
    }
}
