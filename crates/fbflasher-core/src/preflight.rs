//! Checks run before a flashing session
//!
//! The operator first confirms the environment prerequisites, then the
//! connected devices are listed and the tool version is recorded. None of
//! these steps touch a partition.

use crate::command::{parse_devices, FastbootCommand, Transport};
use crate::error::{AbortReason, Error, Result};
use crate::executor::FlashExecutor;
use crate::gate::{Answer, Confirm};

/// Questions that must all be answered "yes" before flashing
pub const PREREQUISITES: [&str; 3] = [
    "Is your device bootloader unlocked?",
    "Is your device in fastboot mode?",
    "Are USB drivers properly configured?",
];

/// Where to read up on getting a device ready
pub const SETUP_HINT: &str = "https://developer.android.com/tools/device";

/// Ask every prerequisite question
///
/// The first "no" aborts with [`AbortReason::PrerequisiteNotMet`].
pub fn check_prerequisites(gate: &mut dyn Confirm) -> Result<()> {
    for question in PREREQUISITES {
        if !gate.yes_no(question, Answer::No)? {
            log::error!("Essential requirement not met, see {}", SETUP_HINT);
            return Err(Error::Aborted(AbortReason::PrerequisiteNotMet(
                question.to_string(),
            )));
        }
    }
    Ok(())
}

/// Serial numbers of devices in fastboot mode
///
/// Fails with [`Error::NoDeviceDetected`] when the list is empty.
pub fn detect_devices<T: Transport>(executor: &mut FlashExecutor<T>) -> Result<Vec<String>> {
    let output = executor.execute(&FastbootCommand::Devices)?;
    let devices = parse_devices(&output);
    match devices.first() {
        Some(first) => {
            log::info!("Connected device: {}", first);
            if devices.len() > 1 {
                log::warn!(
                    "{} devices in fastboot mode, commands go to the tool's default",
                    devices.len()
                );
            }
            Ok(devices)
        }
        None => Err(Error::NoDeviceDetected),
    }
}

/// First line of the tool's version report
pub fn tool_version<T: Transport>(executor: &mut FlashExecutor<T>) -> Result<String> {
    let output = executor.execute(&FastbootCommand::Version)?;
    let version = output.lines().next().unwrap_or_default().trim().to_string();
    log::info!("Flashing tool: {}", version);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::command_log::CommandLog;
    use crate::executor::tests::ScriptedTransport;
    use crate::gate::tests::ScriptedGate;

    fn executor(
        transport: ScriptedTransport,
    ) -> (tempfile::TempDir, FlashExecutor<ScriptedTransport>) {
        let dir = tempfile::tempdir().unwrap();
        let log = CommandLog::create(dir.path()).unwrap();
        (dir, FlashExecutor::new(transport, log))
    }

    #[test]
    fn test_all_prerequisites_met() {
        let mut gate = ScriptedGate::default()
            .answer("bootloader unlocked", true)
            .answer("fastboot mode", true)
            .answer("USB drivers", true);
        check_prerequisites(&mut gate).unwrap();
        assert!(gate.answers.is_empty());
    }

    #[test]
    fn test_first_no_stops_questions() {
        let mut gate = ScriptedGate::default()
            .answer("bootloader unlocked", true)
            .answer("fastboot mode", false);
        let err = check_prerequisites(&mut gate).unwrap_err();
        assert!(matches!(
            err,
            Error::Aborted(AbortReason::PrerequisiteNotMet(ref q)) if q.contains("fastboot mode")
        ));
        assert_eq!(gate.asked.len(), 2);
    }

    #[test]
    fn test_detect_devices() {
        let transport = ScriptedTransport::with_handler(|_| {
            Ok(CommandOutput::ok("1A2B3C4D\tfastboot\nZX1G22\tfastboot\n"))
        });
        let (_dir, mut exec) = executor(transport);
        assert_eq!(
            detect_devices(&mut exec).unwrap(),
            vec!["1A2B3C4D".to_string(), "ZX1G22".to_string()]
        );
    }

    #[test]
    fn test_no_devices_is_fatal() {
        let (_dir, mut exec) = executor(ScriptedTransport::with_handler(|_| {
            Ok(CommandOutput::ok(""))
        }));
        assert!(matches!(
            detect_devices(&mut exec),
            Err(Error::NoDeviceDetected)
        ));
        assert_eq!(exec.log().records().len(), 1);
    }

    #[test]
    fn test_tool_version_first_line() {
        let (_dir, mut exec) = executor(ScriptedTransport::with_handler(|_| {
            Ok(CommandOutput::ok(
                "fastboot version 35.0.1-11580240\nInstalled as /usr/bin/fastboot\n",
            ))
        }));
        assert_eq!(
            tool_version(&mut exec).unwrap(),
            "fastboot version 35.0.1-11580240"
        );
    }
}
