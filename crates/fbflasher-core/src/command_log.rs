//! Append-only command log
//!
//! Every command sent to the device ends up here together with its output,
//! one human-readable record per command. Records are flushed and synced to
//! disk before [`CommandLog::append`] returns, so a crash mid-session leaves
//! every earlier record intact. The file is never truncated or rewritten.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};

use crate::error::{describe_status, Error, Result};

/// How a logged command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Zero exit status
    Success,
    /// Non-zero exit status, or the tool could not be run
    Failed(Option<i32>),
    /// Non-zero exit status that the caller chose to tolerate
    Ignored(Option<i32>),
}

impl Outcome {
    /// True unless the command failed
    pub fn is_ok(self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("OK"),
            Self::Failed(status) => write!(f, "FAILED ({})", describe_status(status)),
            Self::Ignored(status) => write!(f, "IGNORED ({})", describe_status(status)),
        }
    }
}

/// One logged command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// When the command finished
    pub timestamp: DateTime<Local>,
    /// Full command line as issued
    pub command: String,
    /// Captured combined output
    pub output: String,
    /// How the command ended
    pub outcome: Outcome,
}

impl CommandRecord {
    /// Create a record stamped with the current time
    pub fn now(command: impl Into<String>, output: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            timestamp: Local::now(),
            command: command.into(),
            output: output.into(),
            outcome,
        }
    }

    /// Render the record as it appears in the log file
    pub fn render(&self) -> String {
        format!(
            "[{}] COMMAND: {}\nSTATUS: {}\nOUTPUT:\n{}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false),
            self.command,
            self.outcome,
            self.output.trim_end()
        )
    }
}

/// Log file name for a session started at `started`
pub fn log_file_name(started: &DateTime<Local>) -> String {
    started.format("flash_log_%Y%m%d_%H%M%S.txt").to_string()
}

/// Session command log backed by a file
pub struct CommandLog {
    path: PathBuf,
    file: File,
    records: Vec<CommandRecord>,
}

impl CommandLog {
    /// Create the log for a session starting now, inside `dir`
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| Error::Log {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open(dir.join(log_file_name(&Local::now())))
    }

    /// Open (or create) a log at an explicit path, appending to any content
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::Log {
                path: path.clone(),
                source,
            })?;
        log::debug!("Command log: {}", path.display());

        Ok(Self {
            path,
            file,
            records: Vec::new(),
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written during this session, oldest first
    pub fn records(&self) -> &[CommandRecord] {
        &self.records
    }

    /// Number of records whose command failed
    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| !r.outcome.is_ok()).count()
    }

    /// Append one record and make it durable
    pub fn append(&mut self, record: CommandRecord) -> Result<()> {
        self.write_durable(&record.render())?;
        self.records.push(record);
        Ok(())
    }

    /// Append a free-form block (used for the session summary)
    pub fn append_text(&mut self, text: &str) -> Result<()> {
        let mut block = text.trim_end().to_string();
        block.push('\n');
        self.write_durable(&block)
    }

    fn write_durable(&mut self, text: &str) -> Result<()> {
        let result: io::Result<()> = (|| {
            self.file.write_all(text.as_bytes())?;
            self.file.write_all(b"\n")?;
            self.file.flush()?;
            self.file.sync_data()
        })();

        result.map_err(|source| Error::Log {
            path: self.path.clone(),
            source,
        })
    }
}

impl fmt::Debug for CommandLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLog")
            .field("path", &self.path)
            .field("records", &self.records.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_from_start_time() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(log_file_name(&started), "flash_log_20240309_140507.txt");
    }

    #[test]
    fn test_records_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = CommandLog::create(dir.path()).unwrap();

        log.append(CommandRecord::now(
            "fastboot --set-active=a",
            "Setting current slot to 'a' OKAY",
            Outcome::Success,
        ))
        .unwrap();
        log.append(CommandRecord::now(
            "fastboot flash boot boot.img",
            "FAILED (remote: 'locked')",
            Outcome::Failed(Some(1)),
        ))
        .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let first = content.find("--set-active=a").unwrap();
        let second = content.find("flash boot boot.img").unwrap();
        assert!(first < second);
        assert!(content.contains("STATUS: OK"));
        assert!(content.contains("STATUS: FAILED (exit code 1)"));
        assert!(content.contains("FAILED (remote: 'locked')"));
        assert_eq!(log.records().len(), 2);
        assert_eq!(log.failures(), 1);
    }

    #[test]
    fn test_reopen_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");

        let mut log = CommandLog::open(&path).unwrap();
        log.append(CommandRecord::now("fastboot devices", "", Outcome::Success))
            .unwrap();
        drop(log);

        let mut log = CommandLog::open(&path).unwrap();
        log.append_text("=== FLASHING SUMMARY ===").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("fastboot devices"));
        assert!(content.contains("=== FLASHING SUMMARY ==="));
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let record = CommandRecord::now("fastboot reboot", "", Outcome::Ignored(Some(1)));
        let rendered = record.render();
        let stamp = &rendered[1..rendered.find(']').unwrap()];
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert!(rendered.contains("IGNORED (exit code 1)"));
    }
}
