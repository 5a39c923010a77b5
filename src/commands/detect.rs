//! Detect command implementation

use std::path::Path;

use fbflasher_core::preflight;

/// List connected devices in fastboot mode
pub fn run_detect(transport: &str, log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut executor = fbflasher_flash::open_executor(transport, log_dir)?;
    let version = preflight::tool_version(&mut executor)?;
    println!("Tool: {}", version);

    let devices = preflight::detect_devices(&mut executor)?;
    println!("Devices in fastboot mode:");
    for serial in &devices {
        println!("  {}", serial);
    }
    Ok(())
}
