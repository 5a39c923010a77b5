//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate dynamic help text for the transport argument
fn transport_help() -> String {
    format!(
        "Transport to use, as name[:key=value,...] [available: {}]",
        fbflasher_flash::transport_names_short()
    )
}

#[derive(Parser)]
#[command(name = "fbflasher")]
#[command(author, version, about = "Interactive fastboot flashing of Android partition images", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the device catalog (a .ron/.json file or a directory of them)
    /// Defaults to looking in ./devices/ and /usr/share/fbflasher/devices/
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[arg(short, long, global = true, default_value = fbflasher_flash::DEFAULT_TRANSPORT, help = transport_help())]
    pub transport: String,

    /// Directory containing the <partition>.img files
    #[arg(short, long, global = true, default_value = ".")]
    pub images: PathBuf,

    /// Directory the command log is written to
    #[arg(long, global = true, default_value = ".")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive flashing session
    Flash {
        /// Device model from the catalog (asked interactively if omitted)
        #[arg(short, long)]
        device: Option<String>,

        /// Skip the prerequisite questions
        #[arg(long)]
        skip_checks: bool,
    },

    /// List devices in the catalog
    ListDevices,

    /// Show the partition layout of a catalog device
    ShowDevice {
        /// Device model
        name: String,
    },

    /// Report which images are present for a device, without touching it
    Resolve {
        /// Device model
        #[arg(short, long)]
        device: String,
    },

    /// List connected devices in fastboot mode
    Detect,

    /// List available transports
    ListTransports,
}
