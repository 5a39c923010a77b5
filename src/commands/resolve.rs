//! Resolve command implementation
//!
//! A read-only view of what a flashing session would find in the image
//! directory. No device command is issued.

use std::path::Path;

use fbflasher_core::device::{DeviceCatalog, PartitionCategory};
use fbflasher_core::partition::{image_file_name, resolve};
use fbflasher_core::Error;

/// Print found and missing images per category
pub fn run_resolve(catalog: &DeviceCatalog, device: &str, images: &Path) -> Result<(), Error> {
    let device = catalog
        .find(device)
        .ok_or_else(|| Error::UnknownDevice(device.to_string()))?;

    println!("Device: {}", device.model);
    println!("Images: {}", images.display());

    let supers = resolve(&device.partitions(PartitionCategory::Super), images);
    for category in PartitionCategory::ALL {
        let resolution = resolve(&device.partitions(category), images);
        println!();
        if resolution.is_unconfigured() {
            println!("{}: not configured", category);
            continue;
        }

        println!(
            "{}: found {}/{}{}",
            category,
            resolution.found.len(),
            resolution.expected(),
            if resolution.is_complete() { " (complete)" } else { "" }
        );
        for name in &resolution.found {
            println!("  + {}", image_file_name(name));
        }
        for name in &resolution.missing {
            println!("  - {}", image_file_name(name));
        }
    }

    if !supers.found.is_empty() && !device.partitions(PartitionCategory::Logical).is_empty() {
        println!();
        println!("Super images present: logical partitions will not be flashed individually");
    }
    Ok(())
}
