//! CLI command implementations
//!
//! `flash` and `detect` talk to a device through the selected transport.
//! The remaining commands only read the catalog and the image directory.

mod detect;
mod flash;
mod list;
mod progress;
mod resolve;

pub use detect::run_detect;
pub use flash::run_flash;
pub use list::{list_devices, list_transports, show_device};
pub use resolve::run_resolve;
