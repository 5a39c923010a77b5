//! fastboot executable transport
//!
//! Each command spawns the tool once and waits for it to exit. stderr is
//! merged into stdout because fastboot reports most results on stderr.

use std::io;
use std::path::{Path, PathBuf};

use fbflasher_core::command::{CommandOutput, Transport};

use crate::error::{FastbootError, Result};

/// Executable looked up on `PATH` when no path is given
pub const DEFAULT_PROGRAM: &str = "fastboot";

/// Configuration for the fastboot transport
#[derive(Debug, Clone, Default)]
pub struct FastbootConfig {
    /// Explicit path to the executable
    pub path: Option<PathBuf>,
}

impl FastbootConfig {
    /// Use the executable at `path`
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Transport that runs the fastboot executable
#[derive(Debug, Clone)]
pub struct FastbootTool {
    program: PathBuf,
}

impl FastbootTool {
    /// Locate the executable described by `config`
    pub fn open(config: &FastbootConfig) -> Result<Self> {
        let program = match &config.path {
            Some(path) => {
                if !path.is_file() {
                    return Err(FastbootError::InvalidPath(path.clone()));
                }
                path.clone()
            }
            None => which::which(DEFAULT_PROGRAM).map_err(|source| FastbootError::NotFound {
                name: DEFAULT_PROGRAM.to_string(),
                source,
            })?,
        };

        log::debug!("fastboot: Using {}", program.display());
        Ok(Self { program })
    }

    /// Find `fastboot` on `PATH`
    pub fn locate() -> Result<Self> {
        Self::open(&FastbootConfig::default())
    }

    /// Path of the executable
    pub fn path(&self) -> &Path {
        &self.program
    }
}

impl Transport for FastbootTool {
    fn name(&self) -> &str {
        "fastboot"
    }

    fn program(&self) -> String {
        self.program.display().to_string()
    }

    fn run(&mut self, args: &[String]) -> io::Result<CommandOutput> {
        let output = duct::cmd(&self.program, args)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked()
            .run()?;

        Ok(CommandOutput {
            status: output.status.code(),
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Parse transport options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<FastbootConfig, String> {
    let mut config = FastbootConfig::default();

    for (key, value) in options {
        match *key {
            "path" => {
                if value.is_empty() {
                    return Err("Empty path value".to_string());
                }
                config.path = Some(PathBuf::from(value));
            }
            _ => {
                log::warn!("fastboot: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}
