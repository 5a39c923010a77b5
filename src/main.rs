//! fbflasher - Interactive fastboot flashing of Android partition images
//!
//! Walks a device in bootloader mode through a fixed flashing procedure:
//! board check, slot selection, optional wipe, boot/vbmeta/logical/firmware
//! partitions and a final reboot. Every decision is confirmed at the console
//! and every device command is written to a command log.
//!
//! # Architecture
//!
//! - `fbflasher-core` holds the sequencing logic and knows nothing about
//!   processes or terminals
//! - `fbflasher-flash` opens a transport from `--transport`
//! - this binary parses arguments, loads the device catalog and renders
//!   prompts and progress on the console

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use fbflasher_core::device::DeviceCatalog;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still overrides the verbosity flags
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();

    // Commands that need neither the catalog nor a device
    match &cli.command {
        Commands::ListTransports => {
            commands::list_transports();
            return Ok(());
        }
        Commands::Detect => {
            return exit_on_error(commands::run_detect(&cli.transport, &cli.log_dir));
        }
        _ => {}
    }

    // Load device catalog
    let catalog = match load_device_catalog(cli.catalog.as_deref()) {
        Ok(catalog) if catalog.is_empty() => {
            eprintln!("Failed to load device catalog: no supported devices found");
            std::process::exit(1);
        }
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Failed to load device catalog: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Loaded {} device definitions", catalog.len());

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Flash {
            device,
            skip_checks,
        } => commands::run_flash(
            &catalog,
            &cli.transport,
            &cli.images,
            &cli.log_dir,
            device.as_deref(),
            skip_checks,
        ),
        Commands::ListDevices => {
            commands::list_devices(&catalog);
            Ok(())
        }
        Commands::ShowDevice { name } => {
            commands::show_device(&catalog, &name).map_err(Into::into)
        }
        Commands::Resolve { device } => {
            commands::run_resolve(&catalog, &device, &cli.images).map_err(Into::into)
        }
        Commands::Detect | Commands::ListTransports => Ok(()),
    };

    exit_on_error(result)
}

/// Default log filter for a `-v` count
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Print a fatal error and exit non-zero
fn exit_on_error(
    result: Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Load the device catalog from the specified path or default locations
fn load_device_catalog(path: Option<&Path>) -> Result<DeviceCatalog, Box<dyn std::error::Error>> {
    let mut catalog = DeviceCatalog::new();

    if let Some(path) = path {
        // User specified a path
        if path.is_dir() {
            catalog.load_dir(path)?;
        } else if path.is_file() {
            catalog.load_file(path)?;
        } else {
            return Err(format!("Device catalog path not found: {}", path.display()).into());
        }
    } else {
        // Try default locations
        let default_paths = [
            PathBuf::from("devices"),
            PathBuf::from("/usr/share/fbflasher/devices"),
            PathBuf::from("/usr/local/share/fbflasher/devices"),
        ];

        if !load_search_dirs(&mut catalog, &default_paths)? {
            log::warn!("No device catalog found in default locations");
        }
    }

    Ok(catalog)
}

/// Load every existing directory in `dirs`; any broken file is fatal
///
/// Returns whether at least one directory existed.
fn load_search_dirs(
    catalog: &mut DeviceCatalog,
    dirs: &[PathBuf],
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut loaded = false;
    for dir in dirs {
        if dir.is_dir() {
            let count = catalog
                .load_dir(dir)
                .map_err(|e| format!("Failed to load devices from {}: {}", dir.display(), e))?;
            log::debug!("Loaded {} devices from {}", count, dir.display());
            loaded = true;
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_verbosity_raises_filter() {
        assert_eq!(log_filter(0), "info");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(2), "trace");
        assert_eq!(log_filter(5), "trace");
    }

    #[test]
    fn test_debug_enabled_with_one_v() {
        let logger = env_logger::Builder::from_env(
            env_logger::Env::new()
                .filter("FBFLASHER_TEST_UNSET_LOG")
                .default_filter_or(log_filter(1)),
        )
        .build();
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_bad_catalog_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"devices": [{"model": "Moto G84"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), "{ not json").unwrap();

        assert!(load_device_catalog(Some(dir.path())).is_err());
    }

    #[test]
    fn test_broken_search_dir_is_fatal() {
        let good = tempfile::tempdir().unwrap();
        fs::write(
            good.path().join("a.json"),
            r#"{"devices": [{"model": "Moto G84"}]}"#,
        )
        .unwrap();
        let bad = tempfile::tempdir().unwrap();
        fs::write(
            bad.path().join("b.json"),
            r#"{"devices": [{"model": "X", "partitions": {"radio": ["modem"]}}]}"#,
        )
        .unwrap();

        let mut catalog = DeviceCatalog::new();
        let dirs = [good.path().to_path_buf(), bad.path().to_path_buf()];
        let err = load_search_dirs(&mut catalog, &dirs).unwrap_err();
        assert!(err.to_string().contains("b.json"));

        let mut catalog = DeviceCatalog::new();
        let dirs = [good.path().join("absent"), good.path().to_path_buf()];
        assert!(load_search_dirs(&mut catalog, &dirs).unwrap());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_explicit_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(&path, r#"{"devices": [{"model": "Moto G84"}]}"#).unwrap();

        let catalog = load_device_catalog(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(load_device_catalog(Some(&dir.path().join("missing"))).is_err());
    }
}
