//! Flash command implementation

use std::path::Path;

use fbflasher_core::device::{DeviceCatalog, DeviceDescriptor, PartitionCategory};
use fbflasher_core::gate::PromptGate;
use fbflasher_core::orchestrator::{FlashSession, Orchestrator, SessionOptions};
use fbflasher_core::{preflight, Error};

use super::progress::IndicatifProgress;

/// Run an interactive flashing session
pub fn run_flash(
    catalog: &DeviceCatalog,
    transport: &str,
    images: &Path,
    log_dir: &Path,
    device: Option<&str>,
    skip_checks: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut gate = PromptGate::stdio();

    if skip_checks {
        log::warn!("Skipping prerequisite questions");
    } else {
        println!("Prerequisites (see {}):", preflight::SETUP_HINT);
        preflight::check_prerequisites(&mut gate)?;
    }

    let mut executor = fbflasher_flash::open_executor(transport, log_dir)?;
    let log_path = executor.log().path().to_path_buf();

    preflight::detect_devices(&mut executor)?;
    preflight::tool_version(&mut executor)?;

    let descriptor = select_device(catalog, device, &mut gate)?;
    println!("Selected device: {}", descriptor.model);

    let options = SessionOptions {
        image_dir: images.to_path_buf(),
    };
    let mut progress = IndicatifProgress::new();
    let result =
        Orchestrator::new(descriptor, options, &mut executor, &mut gate, &mut progress).run();

    match result {
        Ok(session) => {
            print_summary(&session);
            println!("Command log: {}", log_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Command log: {}", log_path.display());
            Err(e.into())
        }
    }
}

/// Pick the device by name, or from a numbered menu
fn select_device(
    catalog: &DeviceCatalog,
    name: Option<&str>,
    gate: &mut PromptGate<std::io::StdinLock<'static>, std::io::Stdout>,
) -> Result<DeviceDescriptor, Error> {
    if let Some(name) = name {
        return catalog
            .find(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDevice(name.to_string()));
    }

    let models: Vec<String> = catalog.iter().map(|d| d.model.clone()).collect();
    let index = gate.select("Supported devices:", &models)?;
    Ok(catalog.devices()[index].clone())
}

fn print_summary(session: &FlashSession) {
    println!();
    println!("Flashing completed successfully");
    println!("  Device:       {}", session.device.model);
    println!("  Slot mode:    {}", session.slot_mode);
    println!("  AVB disabled: {}", if session.disable_avb { "yes" } else { "no" });
    println!("  Data wiped:   {}", if session.wiped { "yes" } else { "no" });
    println!("  Flashed:      {} targets", session.flashed.len());
    for category in PartitionCategory::ALL {
        let targets = session.flashed_in(category);
        if !targets.is_empty() {
            println!("    {:<9} {}", category.key(), targets.join(", "));
        }
    }
    if !session.skipped.is_empty() {
        let skipped: Vec<&str> = session.skipped.iter().map(|c| c.key()).collect();
        println!("  Skipped:      {}", skipped.join(", "));
    }
    if !session.rebooted {
        println!("Device left in fastboot mode");
    }
}
