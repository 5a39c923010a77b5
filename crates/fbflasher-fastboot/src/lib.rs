//! fbflasher-fastboot - fastboot executable transport
//!
//! This crate runs the Android platform-tools `fastboot` executable for
//! every device command and reports its exit status and combined output.
//!
//! # Example
//!
//! ```no_run
//! use fbflasher_core::command::{FastbootCommand, Transport};
//! use fbflasher_fastboot::{FastbootConfig, FastbootTool};
//!
//! // Find fastboot on PATH
//! let mut tool = FastbootTool::locate()?;
//!
//! // Or point at a specific build
//! let config = FastbootConfig::default().with_path("/opt/platform-tools/fastboot");
//! let mut tool = FastbootTool::open(&config)?;
//!
//! let result = tool.run(&FastbootCommand::Devices.args())?;
//! println!("{}", result.output);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with fbflasher CLI
//!
//! ```bash
//! # fastboot from PATH
//! fbflasher flash
//!
//! # Explicit executable
//! fbflasher --transport fastboot:path=/opt/platform-tools/fastboot flash
//! ```
//!
//! # System Requirements
//!
//! - Android SDK platform-tools
//! - On Linux, udev rules granting access to the device in bootloader mode

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, FastbootConfig, FastbootTool, DEFAULT_PROGRAM};
pub use error::{FastbootError, Result};

use fbflasher_core::command::Transport;

/// Open the fastboot transport and return it boxed
///
/// This is a convenience function for use in the CLI transport dispatch.
///
/// # Example Options
///
/// - `path=/opt/platform-tools/fastboot` - Optional: executable to run
///   (default: `fastboot` from `PATH`)
pub fn open_fastboot(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn Transport>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let tool = FastbootTool::open(&config)?;
    Ok(Box::new(tool))
}
