//! fbflasher-core - Sequencing logic for flashing Android partition images
//!
//! This crate holds everything needed to drive a device that sits in
//! bootloader (fastboot) mode through a complete flashing session:
//!
//! - [`device`] - device descriptors and the on-disk device catalog
//! - [`partition`] - image resolution and A/B slot expansion
//! - [`gate`] - closed-vocabulary yes/no confirmation prompts
//! - [`command`] - the `Transport` trait and fastboot command vocabulary
//! - [`executor`] - runs one command, logs it, classifies the outcome
//! - [`command_log`] - the append-only command log file
//! - [`orchestrator`] - the state machine tying it all together
//!
//! The crate never talks to a console or spawns a process directly. Both are
//! injected: prompts through [`gate::Confirm`], progress display through
//! [`progress::FlashProgress`] and the device through [`command::Transport`].
//!
//! # Example
//!
//! ```ignore
//! use fbflasher_core::device::DeviceCatalog;
//! use fbflasher_core::executor::FlashExecutor;
//! use fbflasher_core::gate::PromptGate;
//! use fbflasher_core::command_log::CommandLog;
//! use fbflasher_core::orchestrator::{Orchestrator, SessionOptions};
//! use fbflasher_core::progress::NoProgress;
//!
//! let catalog = DeviceCatalog::from_file("devices/devices.ron")?;
//! let device = catalog.find("Pixel 7").unwrap().clone();
//! let log = CommandLog::create(".")?;
//! let mut executor = FlashExecutor::new(transport, log);
//! let mut gate = PromptGate::stdio();
//! let mut progress = NoProgress;
//!
//! let report = Orchestrator::new(device, SessionOptions::default(), &mut executor, &mut gate, &mut progress)
//!     .run()?;
//! println!("flashed {} targets", report.flashed.len());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod command;
pub mod command_log;
pub mod device;
pub mod error;
pub mod executor;
pub mod gate;
pub mod orchestrator;
pub mod partition;
pub mod preflight;
pub mod progress;

pub use error::{AbortReason, Error, Result};
