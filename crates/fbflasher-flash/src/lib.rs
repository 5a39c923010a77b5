//! Transport selection for the fbflasher CLI
//!
//! This crate opens a device transport from a `name[:key=value,...]` string
//! and wraps it in a logging [`FlashExecutor`]. The CLI only deals with
//! boxed [`Transport`]s and never names a concrete transport type.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    CLI (bin/fbflasher)                    │
//! │  - Prompts, spinner, device catalog lookup                │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                fbflasher-flash (this crate)               │
//! │  - Opens transports by name                               │
//! │  - Creates the session executor and command log           │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │    fbflasher-core        │   │  Transport crates        │
//! │  - Transport trait       │   │  - fastboot, dummy       │
//! │  - Orchestrator          │   │  - Implement Transport   │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fbflasher_flash::open_executor;
//!
//! let mut executor = open_executor("fastboot", ".")?;
//! println!("log: {}", executor.log().path().display());
//! ```
//!
//! [`FlashExecutor`]: fbflasher_core::executor::FlashExecutor
//! [`Transport`]: fbflasher_core::command::Transport

mod registry;

pub use registry::{
    available_transports, open_executor, open_transport, parse_transport_params,
    transport_names_short, TransportInfo, TransportParams, DEFAULT_TRANSPORT,
};
