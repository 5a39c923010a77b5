//! List commands implementation

use fbflasher_core::device::{DeviceCatalog, PartitionCategory};
use fbflasher_core::Error;

/// List all devices in the catalog
pub fn list_devices(catalog: &DeviceCatalog) {
    println!("Supported devices:");
    println!();
    println!("{:<28} {:<12} {:>10}", "Model", "Board", "Partitions");
    println!("{}", "-".repeat(52));

    for device in catalog.iter() {
        let total: usize = PartitionCategory::ALL
            .into_iter()
            .filter(|c| *c != PartitionCategory::Super)
            .map(|c| device.partitions.count(c))
            .sum();
        println!(
            "{:<28} {:<12} {:>10}",
            device.model,
            device.board.as_deref().unwrap_or("-"),
            total
        );
    }
}

/// Show the partition layout of one device
pub fn show_device(catalog: &DeviceCatalog, name: &str) -> Result<(), Error> {
    let device = catalog
        .find(name)
        .ok_or_else(|| Error::UnknownDevice(name.to_string()))?;

    println!("Device: {}", device.model);
    if let Some(board) = &device.board {
        println!("Board:  {}", board);
    }
    println!();

    for category in PartitionCategory::ALL {
        let names = device.partitions(category);
        if names.is_empty() {
            println!("  {:<9} (none)", category.key());
            continue;
        }
        let shown: Vec<String> = names
            .iter()
            .map(|n| {
                if device.is_slot_specific(n) {
                    format!("{} [a/b]", n)
                } else {
                    n.clone()
                }
            })
            .collect();
        println!("  {:<9} {}", category.key(), shown.join(", "));
    }
    Ok(())
}

/// List all transports compiled in
pub fn list_transports() {
    println!("Supported transports:");
    println!();
    for transport in fbflasher_flash::available_transports() {
        println!("  {:<9} - {}", transport.name, transport.description);
    }
}
