//! Error types for the fastboot transport

use std::path::PathBuf;
use thiserror::Error;

/// fastboot transport errors
#[derive(Debug, Error)]
pub enum FastbootError {
    /// The tool is not on `PATH`
    #[error("{name} not found in PATH: {source}. Install platform-tools or use path=/path/to/fastboot")]
    NotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    /// An explicit path does not point to a file
    #[error("{} is not a file", .0.display())]
    InvalidPath(PathBuf),
}

/// Result type for fastboot transport operations
pub type Result<T> = std::result::Result<T, FastbootError>;
