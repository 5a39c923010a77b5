//! Flash executor
//!
//! Runs exactly one device command at a time and hands every invocation to
//! the [`CommandLog`] before the caller sees the result. A non-zero exit
//! status becomes [`Error::CommandFailed`] carrying the command line, the
//! captured output and the status.

use crate::command::{CommandOutput, FastbootCommand, Transport};
use crate::command_log::{CommandLog, CommandRecord, Outcome};
use crate::error::{Error, Result};

/// Runs commands on a transport and logs them
pub struct FlashExecutor<T: Transport = Box<dyn Transport>> {
    transport: T,
    log: CommandLog,
}

impl<T: Transport> FlashExecutor<T> {
    /// Create an executor writing to `log`
    pub fn new(transport: T, log: CommandLog) -> Self {
        Self { transport, log }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The session command log
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Mutable access to the session command log
    pub fn log_mut(&mut self) -> &mut CommandLog {
        &mut self.log
    }

    /// Full command line for a command, as written to the log
    pub fn command_line(&self, command: &FastbootCommand) -> String {
        let mut line = self.transport.program();
        for arg in command.args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// Run a command; any non-zero exit status is an error
    ///
    /// Returns the captured output on success.
    pub fn execute(&mut self, command: &FastbootCommand) -> Result<String> {
        self.run(command, |_| false)
    }

    /// Run a command, tolerating failures that `tolerate` accepts
    ///
    /// A tolerated failure is logged with [`Outcome::Ignored`] and returns
    /// `Ok` with the captured output.
    pub fn execute_tolerant<F>(&mut self, command: &FastbootCommand, tolerate: F) -> Result<String>
    where
        F: Fn(&CommandOutput) -> bool,
    {
        self.run(command, tolerate)
    }

    fn run<F>(&mut self, command: &FastbootCommand, tolerate: F) -> Result<String>
    where
        F: Fn(&CommandOutput) -> bool,
    {
        let line = self.command_line(command);
        log::info!("{}", line);

        let result = match self.transport.run(&command.args()) {
            Ok(result) => result,
            Err(source) => {
                self.log.append(CommandRecord::now(
                    line.clone(),
                    source.to_string(),
                    Outcome::Failed(None),
                ))?;
                return Err(Error::Spawn {
                    command: line,
                    source,
                });
            }
        };

        let output = result.output.trim_end().to_string();
        if !output.is_empty() {
            log::debug!("{}", output);
        }

        let outcome = if result.success() {
            Outcome::Success
        } else if tolerate(&result) {
            Outcome::Ignored(result.status)
        } else {
            Outcome::Failed(result.status)
        };
        self.log
            .append(CommandRecord::now(line.clone(), output.clone(), outcome))?;

        match outcome {
            Outcome::Success => Ok(output),
            Outcome::Ignored(_) => {
                log::debug!("Ignoring failure of `{}`", line);
                Ok(output)
            }
            Outcome::Failed(status) => {
                log::error!("Command failed: {}", line);
                Err(Error::CommandFailed {
                    command: line,
                    status,
                    output,
                })
            }
        }
    }
}
