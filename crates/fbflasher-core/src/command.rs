//! Fastboot command vocabulary and the transport trait
//!
//! The orchestrator only ever speaks in [`FastbootCommand`]s. A [`Transport`]
//! turns the resulting argument list into a device interaction, usually by
//! running the `fastboot` executable.

use std::io;
use std::path::PathBuf;

use crate::partition::Slot;

/// Flags attached to `flash` when verified boot is disabled
pub const DISABLE_AVB_FLAGS: [&str; 2] = ["--disable-verity", "--disable-verification"];

/// Size used when recreating a logical partition
///
/// The real size is set when the image is flashed.
pub const PLACEHOLDER_LOGICAL_SIZE: u64 = 1;

/// Result of running one command on a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, `None` when the process was killed by a signal
    pub status: Option<i32>,
    /// Combined stdout and stderr
    pub output: String,
}

impl CommandOutput {
    /// Successful output
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            output: output.into(),
        }
    }

    /// Failed output with the given exit code
    pub fn failed(code: i32, output: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            output: output.into(),
        }
    }

    /// True for a zero exit status
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Channel to the device
///
/// Implementations run one command to completion and report its combined
/// output. They never retry and never impose a timeout.
pub trait Transport {
    /// Short transport name (e.g., "fastboot", "dummy")
    fn name(&self) -> &str;

    /// Program name shown in logs as the first word of each command line
    fn program(&self) -> String;

    /// Run a command with the given arguments and wait for it to finish
    ///
    /// Returns `Err` only when the command could not be run at all. A command
    /// that ran and failed is reported through [`CommandOutput::status`].
    fn run(&mut self, args: &[String]) -> io::Result<CommandOutput>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn program(&self) -> String {
        (**self).program()
    }

    fn run(&mut self, args: &[String]) -> io::Result<CommandOutput> {
        (**self).run(args)
    }
}

/// A device-facing fastboot operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastbootCommand {
    /// List connected devices
    Devices,
    /// Query a bootloader variable
    GetVar(String),
    /// Make a slot the active one
    SetActive(Slot),
    /// Erase user data
    Wipe,
    /// Write an image to a partition
    Flash {
        /// Target partition name (possibly slot-suffixed)
        partition: String,
        /// Image file
        image: PathBuf,
        /// Attach the verity/verification disable flags
        disable_avb: bool,
    },
    /// Delete a logical partition
    DeleteLogical(String),
    /// Create a logical partition
    CreateLogical {
        /// Partition name
        name: String,
        /// Size in bytes
        size: u64,
    },
    /// Reboot to the system
    Reboot,
    /// Reboot into userspace fastboot (fastbootd)
    RebootFastboot,
    /// Report the tool version
    Version,
}

impl FastbootCommand {
    /// Argument list passed to the transport
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Devices => vec!["devices".into()],
            Self::GetVar(var) => vec!["getvar".into(), var.clone()],
            Self::SetActive(slot) => vec![format!("--set-active={}", slot.letter())],
            Self::Wipe => vec!["-w".into()],
            Self::Flash {
                partition,
                image,
                disable_avb,
            } => {
                let mut args = vec!["flash".to_string()];
                if *disable_avb {
                    args.extend(DISABLE_AVB_FLAGS.iter().map(|f| f.to_string()));
                }
                args.push(partition.clone());
                args.push(image.display().to_string());
                args
            }
            Self::DeleteLogical(name) => vec!["delete-logical-partition".into(), name.clone()],
            Self::CreateLogical { name, size } => vec![
                "create-logical-partition".into(),
                name.clone(),
                size.to_string(),
            ],
            Self::Reboot => vec!["reboot".into()],
            Self::RebootFastboot => vec!["reboot".into(), "fastboot".into()],
            Self::Version => vec!["--version".into()],
        }
    }

    /// Whether this command writes to a partition
    pub fn is_flash(&self) -> bool {
        matches!(self, Self::Flash { .. })
    }
}

/// Serial numbers of devices listed as being in fastboot mode
///
/// Parses `fastboot devices` output, one `<serial>\t<state>` per line.
pub fn parse_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.to_lowercase().contains("fastboot"))
        .filter_map(|line| line.split_whitespace().next())
        .map(|serial| serial.to_string())
        .collect()
}

/// Value of a variable in `fastboot getvar` output
///
/// fastboot prints `<var>: <value>` followed by a timing line.
pub fn parse_getvar(output: &str, var: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() == var {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

/// Whether a failed delete reported a partition that was not there
pub fn is_missing_partition_error(output: &str) -> bool {
    let output = output.to_lowercase();
    ["does not exist", "not found", "could not find"]
        .iter()
        .any(|needle| output.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_args() {
        let cmd = FastbootCommand::Flash {
            partition: "vbmeta".into(),
            image: PathBuf::from("vbmeta.img"),
            disable_avb: true,
        };
        assert_eq!(
            cmd.args(),
            vec![
                "flash",
                "--disable-verity",
                "--disable-verification",
                "vbmeta",
                "vbmeta.img"
            ]
        );
        assert!(cmd.is_flash());

        let cmd = FastbootCommand::Flash {
            partition: "boot".into(),
            image: PathBuf::from("boot.img"),
            disable_avb: false,
        };
        assert_eq!(cmd.args(), vec!["flash", "boot", "boot.img"]);
    }

    #[test]
    fn test_other_args() {
        assert_eq!(FastbootCommand::SetActive(Slot::A).args(), vec!["--set-active=a"]);
        assert_eq!(FastbootCommand::Wipe.args(), vec!["-w"]);
        assert_eq!(FastbootCommand::RebootFastboot.args(), vec!["reboot", "fastboot"]);
        assert_eq!(
            FastbootCommand::CreateLogical {
                name: "system_a".into(),
                size: PLACEHOLDER_LOGICAL_SIZE
            }
            .args(),
            vec!["create-logical-partition", "system_a", "1"]
        );
        assert_eq!(
            FastbootCommand::GetVar("product".into()).args(),
            vec!["getvar", "product"]
        );
    }

    #[test]
    fn test_parse_devices() {
        let output = "1A2B3C4D\tfastboot\nZY22\tdevice\n\n99887766 fastboot\n";
        assert_eq!(parse_devices(output), vec!["1A2B3C4D", "99887766"]);
        assert!(parse_devices("").is_empty());
    }

    #[test]
    fn test_parse_getvar() {
        let output = "product: panther\nFinished. Total time: 0.001s\n";
        assert_eq!(parse_getvar(output, "product").as_deref(), Some("panther"));
        assert_eq!(parse_getvar(output, "serialno"), None);
        assert_eq!(parse_getvar("product:\n", "product"), None);
    }

    #[test]
    fn test_missing_partition_error() {
        assert!(is_missing_partition_error(
            "FAILED (remote: 'Partition system_a-cow does not exist')"
        ));
        assert!(is_missing_partition_error("FAILED (remote: 'Could not find partition')"));
        assert!(!is_missing_partition_error("FAILED (remote: 'Device locked')"));
    }
}
