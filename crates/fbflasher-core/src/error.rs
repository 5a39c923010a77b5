//! Error types for fbflasher-core
//!
//! Errors fall into four groups:
//!
//! - configuration problems (catalog missing or empty, unknown device)
//! - execution failures (a device command exited non-zero or could not start)
//! - operator aborts (a gate was declined where declining ends the session)
//! - console and log I/O failures

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::device::{CatalogError, PartitionCategory};

/// Why the operator ended the session early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Board reported by the device differs from the descriptor and no override was given
    BoardMismatch {
        /// Board name from the device descriptor
        expected: String,
        /// Board name reported by the connected device
        reported: String,
    },
    /// A partition category gate was declined
    CategoryDeclined(PartitionCategory),
    /// A preflight question was answered "no"
    PrerequisiteNotMet(String),
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoardMismatch { expected, reported } => write!(
                f,
                "board mismatch (expected '{}', device reports '{}')",
                expected, reported
            ),
            Self::CategoryDeclined(category) => {
                write!(f, "flashing of {} partitions declined", category)
            }
            Self::PrerequisiteNotMet(question) => {
                write!(f, "essential requirement not met: {}", question)
            }
        }
    }
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The device catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog loaded but lists no devices
    #[error("no supported devices found in catalog")]
    NoDevices,

    /// No device in the catalog matches the requested name
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// No device in fastboot mode is connected
    #[error("no device in fastboot mode detected")]
    NoDeviceDetected,

    /// The flashing tool could not be started
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Full command line
        command: String,
        #[source]
        source: io::Error,
    },

    /// A device command exited with a non-zero status
    #[error("command `{command}` failed ({}):\n{output}", describe_status(.status))]
    CommandFailed {
        /// Full command line
        command: String,
        /// Exit status, absent when the tool was killed by a signal
        status: Option<i32>,
        /// Captured combined stdout/stderr
        output: String,
    },

    /// The command log could not be written
    #[error("failed to write command log {path}: {source}")]
    Log {
        /// Path of the log file
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from or writing to the console failed
    #[error("console I/O error: {0}")]
    Console(#[source] io::Error),

    /// The console input stream ended while a question was pending
    #[error("input closed while waiting for an answer")]
    InputClosed,

    /// The operator ended the session
    #[error("flashing aborted: {0}")]
    Aborted(AbortReason),
}

/// Render an exit status for error messages
pub fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Result type for fbflasher-core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_carries_output() {
        let err = Error::CommandFailed {
            command: "fastboot flash boot boot.img".into(),
            status: Some(1),
            output: "FAILED (remote: 'partition locked')".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fastboot flash boot boot.img"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("partition locked"));
    }

    #[test]
    fn test_abort_reason_display() {
        let reason = AbortReason::CategoryDeclined(PartitionCategory::Firmware);
        assert_eq!(reason.to_string(), "flashing of firmware partitions declined");

        let reason = AbortReason::BoardMismatch {
            expected: "panther".into(),
            reported: "cheetah".into(),
        };
        assert!(reason.to_string().contains("cheetah"));
    }

    #[test]
    fn test_signal_status() {
        assert_eq!(describe_status(&None), "terminated by signal");
        assert_eq!(describe_status(&Some(2)), "exit code 2");
    }
}
