//! fbflasher-dummy - Simulated fastboot device for testing
//!
//! This crate provides a transport that answers fastboot commands from an
//! in-memory device model instead of spawning the real tool. It tracks the
//! active slot, the bootloader/fastbootd mode, dynamic partitions, flashed
//! images and reboots, which makes whole sessions observable without
//! hardware.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use fbflasher_core::command::{CommandOutput, Transport, DISABLE_AVB_FLAGS};
use fbflasher_core::partition::Slot;

const TIMING: &str = "Finished. Total time: 0.001s";

/// Configuration for the dummy device
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Serial number reported by `devices`
    pub serial: String,
    /// Value of `getvar product`
    pub product: String,
    /// Partition whose flash always fails
    pub fail_partition: Option<String>,
    /// Logical partitions present at start, created in both slots
    pub logical: Vec<String>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            serial: "DUMMY0001".into(),
            product: "dummy".into(),
            fail_partition: None,
            logical: vec!["system".into(), "vendor".into(), "product".into()],
        }
    }
}

impl DummyConfig {
    /// Report `product` as the board identifier
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    /// Make every flash of `partition` fail
    pub fn with_failing_partition(mut self, partition: impl Into<String>) -> Self {
        self.fail_partition = Some(partition.into());
        self
    }
}

/// Where the simulated device currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    /// Bootloader fastboot
    Bootloader,
    /// Userspace fastboot (fastbootd)
    Fastbootd,
    /// Booted into Android; no longer answering fastboot
    System,
}

/// One image written to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashedImage {
    /// Target partition
    pub partition: String,
    /// Image file
    pub image: PathBuf,
    /// Whether the AVB disable flags were given
    pub disable_avb: bool,
}

/// Dummy fastboot device
///
/// Implements [`Transport`] by interpreting the argument list directly.
pub struct DummyDevice {
    config: DummyConfig,
    mode: DeviceMode,
    active_slot: Slot,
    logical: BTreeMap<String, u64>,
    flashed: Vec<FlashedImage>,
    wipes: usize,
    reboots: usize,
}

impl DummyDevice {
    /// Create a device in bootloader mode with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let logical = config
            .logical
            .iter()
            .flat_map(|name| Slot::BOTH.map(|slot| (slot.suffixed(name), 4096 * 1024)))
            .collect();

        Self {
            config,
            mode: DeviceMode::Bootloader,
            active_slot: Slot::B,
            logical,
            flashed: Vec::new(),
            wipes: 0,
            reboots: 0,
        }
    }

    /// Create a device with the default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Current mode
    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    /// Active slot
    pub fn active_slot(&self) -> Slot {
        self.active_slot
    }

    /// Size of a logical partition, if it exists
    pub fn logical_size(&self, name: &str) -> Option<u64> {
        self.logical.get(name).copied()
    }

    /// Images written so far, in order
    pub fn flashed(&self) -> &[FlashedImage] {
        &self.flashed
    }

    /// Number of user data wipes
    pub fn wipes(&self) -> usize {
        self.wipes
    }

    /// Number of reboots to the system
    pub fn reboots(&self) -> usize {
        self.reboots
    }

    fn getvar(&self, var: &str) -> CommandOutput {
        let value = match var {
            "product" => self.config.product.clone(),
            "current-slot" => self.active_slot.letter().to_string(),
            "serialno" => self.config.serial.clone(),
            "is-userspace" => {
                if self.mode == DeviceMode::Fastbootd {
                    "yes".into()
                } else {
                    "no".into()
                }
            }
            _ => {
                return CommandOutput::failed(
                    1,
                    format!(
                        "getvar:{} FAILED (remote: 'GetVar Variable Not found')\n{}",
                        var, TIMING
                    ),
                )
            }
        };
        CommandOutput::ok(format!("{}: {}\n{}", var, value, TIMING))
    }

    fn set_active(&mut self, letter: &str) -> CommandOutput {
        match Slot::from_letter(letter) {
            Some(slot) => {
                self.active_slot = slot;
                CommandOutput::ok(format!(
                    "Setting current slot to '{}' OKAY\n{}",
                    slot, TIMING
                ))
            }
            None => CommandOutput::failed(1, format!("fastboot: error: unknown slot '{}'", letter)),
        }
    }

    fn flash(&mut self, args: &[String]) -> CommandOutput {
        let flags: Vec<&String> = args.iter().take_while(|a| a.starts_with("--")).collect();
        let rest = &args[flags.len()..];
        let [partition, image] = rest else {
            return CommandOutput::failed(1, "fastboot: usage: flash PARTITION FILENAME");
        };
        let disable_avb = DISABLE_AVB_FLAGS
            .iter()
            .all(|flag| flags.iter().any(|f| f.as_str() == *flag));

        let size = match fs::metadata(image) {
            Ok(meta) => meta.len(),
            Err(e) => {
                return CommandOutput::failed(
                    1,
                    format!("fastboot: error: cannot load '{}': {}", image, e),
                )
            }
        };

        if self.config.fail_partition.as_deref() == Some(partition.as_str()) {
            log::debug!("dummy: Failing flash of {}", partition);
            return CommandOutput::failed(
                1,
                format!(
                    "Sending '{}' ({} KB) OKAY\nWriting '{}' FAILED (remote: 'Flashing is not allowed for Critical Partitions')\n{}",
                    partition,
                    size / 1024,
                    partition,
                    TIMING
                ),
            );
        }

        if let Some(current) = self.logical.get_mut(partition.as_str()) {
            if self.mode != DeviceMode::Fastbootd {
                return CommandOutput::failed(
                    1,
                    format!(
                        "Writing '{}' FAILED (remote: 'Partition should be flashed in fastbootd')",
                        partition
                    ),
                );
            }
            *current = size;
        }

        self.flashed.push(FlashedImage {
            partition: partition.clone(),
            image: PathBuf::from(image),
            disable_avb,
        });
        CommandOutput::ok(format!(
            "Sending '{}' ({} KB) OKAY\nWriting '{}' OKAY\n{}",
            partition,
            size / 1024,
            partition,
            TIMING
        ))
    }

    fn delete_logical(&mut self, name: &str) -> CommandOutput {
        if self.mode != DeviceMode::Fastbootd {
            return CommandOutput::failed(
                1,
                format!("Deleting '{}' FAILED (remote: 'unknown command')", name),
            );
        }
        match self.logical.remove(name) {
            Some(_) => CommandOutput::ok(format!("Deleting '{}' OKAY\n{}", name, TIMING)),
            None => CommandOutput::failed(
                1,
                format!(
                    "Deleting '{}' FAILED (remote: 'Partition {} does not exist')\n{}",
                    name, name, TIMING
                ),
            ),
        }
    }

    fn create_logical(&mut self, name: &str, size: &str) -> CommandOutput {
        if self.mode != DeviceMode::Fastbootd {
            return CommandOutput::failed(
                1,
                format!("Creating '{}' FAILED (remote: 'unknown command')", name),
            );
        }
        let Ok(size) = size.parse::<u64>() else {
            return CommandOutput::failed(1, format!("fastboot: error: invalid size '{}'", size));
        };
        if self.logical.contains_key(name) {
            return CommandOutput::failed(
                1,
                format!(
                    "Creating '{}' FAILED (remote: 'Partition already exists')",
                    name
                ),
            );
        }
        self.logical.insert(name.to_string(), size);
        CommandOutput::ok(format!("Creating '{}' OKAY\n{}", name, TIMING))
    }
}

impl Transport for DummyDevice {
    fn name(&self) -> &str {
        "dummy"
    }

    fn program(&self) -> String {
        "fastboot".into()
    }

    fn run(&mut self, args: &[String]) -> io::Result<CommandOutput> {
        let words: Vec<&str> = args.iter().map(String::as_str).collect();
        log::trace!("dummy: {:?}", words);

        if self.mode == DeviceMode::System && words.first() != Some(&"devices") {
            return Ok(CommandOutput::failed(1, "< waiting for any device >"));
        }

        let result = match words.as_slice() {
            ["devices"] => match self.mode {
                DeviceMode::System => CommandOutput::ok(""),
                _ => CommandOutput::ok(format!("{}\tfastboot\n", self.config.serial)),
            },
            ["--version"] => {
                CommandOutput::ok("fastboot version 35.0.2-dummy\nInstalled as fbflasher-dummy\n")
            }
            ["getvar", var] => self.getvar(var),
            [flag] if flag.starts_with("--set-active=") => {
                self.set_active(&flag["--set-active=".len()..])
            }
            ["-w"] => {
                self.wipes += 1;
                CommandOutput::ok(format!(
                    "Erasing 'userdata' OKAY\nErasing 'metadata' OKAY\n{}",
                    TIMING
                ))
            }
            ["flash", ..] => self.flash(&args[1..]),
            ["delete-logical-partition", name] => self.delete_logical(name),
            ["create-logical-partition", name, size] => self.create_logical(name, size),
            ["reboot"] => {
                self.mode = DeviceMode::System;
                self.reboots += 1;
                CommandOutput::ok(format!("Rebooting OKAY\n{}", TIMING))
            }
            ["reboot", "fastboot"] => {
                self.mode = DeviceMode::Fastbootd;
                CommandOutput::ok(format!("Rebooting into fastboot OKAY\n{}", TIMING))
            }
            _ => CommandOutput::failed(1, format!("fastboot: usage: unknown command {}", words.join(" "))),
        };
        Ok(result)
    }
}

/// Parse transport options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "product" => config.product = value.to_string(),
            "serial" => config.serial = value.to_string(),
            "fail" => config.fail_partition = Some(value.to_string()),
            "logical" => {
                config.logical = value
                    .split('+')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect();
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.serial.is_empty() {
        return Err("Empty serial value".to_string());
    }

    Ok(config)
}

/// Open a dummy device and return it boxed
///
/// # Example Options
///
/// - `product=lynx` - Optional: board identifier (default: `dummy`)
/// - `serial=ABC123` - Optional: serial number
/// - `fail=dtbo` - Optional: partition whose flash fails
/// - `logical=system+vendor` - Optional: logical partitions present at start
pub fn open_dummy(
    options: &[(&str, &str)],
) -> Result<Box<dyn Transport>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    log::info!(
        "dummy: Simulating device {} (product {})",
        config.serial,
        config.product
    );
    Ok(Box::new(DummyDevice::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(device: &mut DummyDevice, args: &[&str]) -> CommandOutput {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        device.run(&args).unwrap()
    }

    #[test]
    fn test_devices_and_getvar() {
        let mut device = DummyDevice::new(DummyConfig::default().with_product("lynx"));
        assert_eq!(run(&mut device, &["devices"]).output, "DUMMY0001\tfastboot\n");

        let product = run(&mut device, &["getvar", "product"]);
        assert!(product.success());
        assert!(product.output.starts_with("product: lynx\n"));

        assert!(!run(&mut device, &["getvar", "nonsense"]).success());
    }

    #[test]
    fn test_set_active() {
        let mut device = DummyDevice::new_default();
        assert_eq!(device.active_slot(), Slot::B);
        assert!(run(&mut device, &["--set-active=a"]).success());
        assert_eq!(device.active_slot(), Slot::A);
        assert!(!run(&mut device, &["--set-active=z"]).success());
    }

    #[test]
    fn test_flash_records_image_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("vbmeta.img");
        fs::write(&image, vec![0u8; 8192]).unwrap();
        let image = image.display().to_string();

        let mut device = DummyDevice::new_default();
        let result = run(
            &mut device,
            &[
                "flash",
                "--disable-verity",
                "--disable-verification",
                "vbmeta",
                image.as_str(),
            ],
        );
        assert!(result.success());
        assert!(result.output.contains("Sending 'vbmeta' (8 KB) OKAY"));
        assert_eq!(
            device.flashed(),
            &[FlashedImage {
                partition: "vbmeta".into(),
                image: PathBuf::from(&image),
                disable_avb: true,
            }]
        );
    }

    #[test]
    fn test_flash_missing_image_fails() {
        let mut device = DummyDevice::new_default();
        let result = run(&mut device, &["flash", "boot", "/nonexistent/boot.img"]);
        assert_eq!(result.status, Some(1));
        assert!(result.output.contains("cannot load"));
        assert!(device.flashed().is_empty());
    }

    #[test]
    fn test_failing_partition() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("dtbo.img");
        fs::write(&image, b"dtbo").unwrap();

        let mut device =
            DummyDevice::new(DummyConfig::default().with_failing_partition("dtbo_a"));
        let image = image.display().to_string();
        let result = run(&mut device, &["flash", "dtbo_a", image.as_str()]);
        assert!(!result.success());
        assert!(result.output.contains("FAILED (remote:"));
    }

    #[test]
    fn test_logical_partitions_need_fastbootd() {
        let mut device = DummyDevice::new_default();
        assert!(!run(&mut device, &["delete-logical-partition", "system_a"]).success());
        assert!(device.logical_size("system_a").is_some());

        run(&mut device, &["reboot", "fastboot"]);
        assert_eq!(device.mode(), DeviceMode::Fastbootd);

        let missing = run(&mut device, &["delete-logical-partition", "system_a-cow"]);
        assert!(missing.output.contains("does not exist"));

        assert!(run(&mut device, &["delete-logical-partition", "system_a"]).success());
        assert!(device.logical_size("system_a").is_none());
        assert!(run(&mut device, &["create-logical-partition", "system_a", "1"]).success());
        assert_eq!(device.logical_size("system_a"), Some(1));
        assert!(!run(&mut device, &["create-logical-partition", "system_a", "1"]).success());
    }

    #[test]
    fn test_reboot_leaves_fastboot() {
        let mut device = DummyDevice::new_default();
        run(&mut device, &["reboot"]);
        assert_eq!(device.mode(), DeviceMode::System);
        assert_eq!(device.reboots(), 1);
        assert_eq!(run(&mut device, &["devices"]).output, "");
        assert!(!run(&mut device, &["getvar", "product"]).success());
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[
            ("product", "cheetah"),
            ("fail", "boot"),
            ("logical", "system+system_ext"),
        ])
        .unwrap();
        assert_eq!(config.product, "cheetah");
        assert_eq!(config.fail_partition.as_deref(), Some("boot"));
        assert_eq!(config.logical, vec!["system", "system_ext"]);
        assert!(parse_options(&[("serial", "")]).is_err());
    }
}
