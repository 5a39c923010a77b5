//! Flash orchestrator
//!
//! Drives one device through the fixed sequence of [`Stage`]s. Each stage
//! runs to completion before the next one starts; any command failure stops
//! the session on the spot. Operator decisions come from a [`Confirm`]
//! implementation and progress goes to a [`FlashProgress`] implementation,
//! so the same state machine runs behind the console and in tests.
//!
//! Stage order:
//!
//! 1. board check (only when the descriptor names a board)
//! 2. slot mode question
//! 3. `--set-active=a`
//! 4. optional user data wipe, confirmed twice
//! 5. boot category
//! 6. vbmeta category, optionally with AVB disabled
//! 7. reboot into fastbootd
//! 8. super images, or the logical category when there are none
//! 9. firmware category
//! 10. optional reboot to system
//! 11. summary record in the command log

mod session;

pub use session::{FlashSession, FlashedTarget, SessionOptions, Stage};

use crate::command::{
    is_missing_partition_error, parse_getvar, CommandOutput, FastbootCommand, Transport,
    PLACEHOLDER_LOGICAL_SIZE,
};
use crate::device::{DeviceDescriptor, PartitionCategory, SUPER_IMAGES};
use crate::error::{AbortReason, Error, Result};
use crate::executor::FlashExecutor;
use crate::gate::{Answer, Confirm};
use crate::partition::{flash_targets, image_path, resolve, Slot, SlotMode};
use crate::progress::FlashProgress;

/// Vbmeta member that holds the raw preloader
pub const PRELOADER_IMAGE: &str = "preloader_raw";

/// Partition the raw preloader is written to
pub const PRELOADER_TARGET: &str = "preloader";

/// Variable queried for the board check
const BOARD_VARIABLE: &str = "product";

/// What to do with a partition category after resolving it
#[derive(Debug, Clone, PartialEq, Eq)]
enum CategoryDecision {
    /// Flash these partitions
    Flash(Vec<String>),
    /// Nothing to flash, move on
    Skip,
    /// The operator said no
    Declined,
}

fn tolerate_missing(result: &CommandOutput) -> bool {
    is_missing_partition_error(&result.output)
}

/// The flashing state machine for one session
pub struct Orchestrator<'a, T: Transport> {
    session: FlashSession,
    options: SessionOptions,
    executor: &'a mut FlashExecutor<T>,
    gate: &'a mut dyn Confirm,
    progress: &'a mut dyn FlashProgress,
}

impl<'a, T: Transport> Orchestrator<'a, T> {
    /// Create an orchestrator for `device`
    pub fn new(
        device: DeviceDescriptor,
        options: SessionOptions,
        executor: &'a mut FlashExecutor<T>,
        gate: &'a mut dyn Confirm,
        progress: &'a mut dyn FlashProgress,
    ) -> Self {
        Self {
            session: FlashSession::new(device),
            options,
            executor,
            gate,
            progress,
        }
    }

    /// Current session state
    pub fn session(&self) -> &FlashSession {
        &self.session
    }

    /// Run every stage in order
    ///
    /// Returns the finished session. Any command failure or abort ends the
    /// run with an error; everything issued up to that point is already in
    /// the command log.
    pub fn run(mut self) -> Result<FlashSession> {
        log::info!("Starting flash session for {}", self.session.device.model);
        let result = self.run_stages();
        self.progress.idle();
        result.map(|()| self.session)
    }

    fn run_stages(&mut self) -> Result<()> {
        while self.session.stage != Stage::Done {
            let stage = self.session.stage;
            log::debug!("Entering stage {:?}", stage);
            self.step(stage)?;
            self.session.stage = stage.next();
        }
        Ok(())
    }

    fn step(&mut self, stage: Stage) -> Result<()> {
        match stage {
            Stage::SelectDevice => self.verify_board(),
            Stage::ChooseSlotMode => self.choose_slot_mode(),
            Stage::ActivateSlot => self.activate_slot(),
            Stage::WipeData => self.wipe_data(),
            Stage::FlashBoot => self.flash_boot(),
            Stage::FlashVbMeta => self.flash_vbmeta(),
            Stage::RebootToFastbootd => self.reboot_to_fastbootd(),
            Stage::FlashSuperOrLogical => self.flash_super_or_logical(),
            Stage::FlashFirmware => self.flash_firmware(),
            Stage::FinalReboot => self.final_reboot(),
            Stage::Summary => self.write_summary(),
            Stage::Done => Ok(()),
        }
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    fn ask(&mut self, question: &str, default: Answer) -> Result<bool> {
        self.progress.idle();
        self.gate.yes_no(question, default)
    }

    fn ask_typed(&mut self, operation: &str) -> Result<bool> {
        self.progress.idle();
        self.gate.typed(operation)
    }

    /// Resolve a category and ask whether to flash what was found
    fn confirm_category(&mut self, category: PartitionCategory) -> Result<CategoryDecision> {
        let names = self.session.device.partitions(category);
        let resolution = resolve(&names, &self.options.image_dir);

        if resolution.is_unconfigured() {
            self.progress.note(&format!(
                "No {} partitions configured for {}, skipping",
                category, self.session.device.model
            ));
            self.session.skipped.push(category);
            return Ok(CategoryDecision::Skip);
        }

        self.progress.resolution(category, &resolution);

        if resolution.found.is_empty() {
            if self.ask(
                &format!("Continue without flashing {} partitions?", category),
                Answer::No,
            )? {
                self.session.skipped.push(category);
                return Ok(CategoryDecision::Skip);
            }
            return Ok(CategoryDecision::Declined);
        }

        if self.ask(
            &format!("Flash available {} partitions?", category),
            Answer::No,
        )? {
            Ok(CategoryDecision::Flash(resolution.found))
        } else {
            Ok(CategoryDecision::Declined)
        }
    }

    // =========================================================================
    // Device commands
    // =========================================================================

    fn flash_one(
        &mut self,
        category: PartitionCategory,
        target: &str,
        image_name: &str,
        disable_avb: bool,
    ) -> Result<()> {
        let image = image_path(&self.options.image_dir, image_name);
        self.progress.flashing(target);
        self.executor.execute(&FastbootCommand::Flash {
            partition: target.to_string(),
            image: image.clone(),
            disable_avb,
        })?;
        self.session.flashed.push(FlashedTarget {
            category,
            target: target.to_string(),
            image,
        });
        Ok(())
    }

    /// Flash partitions in order, expanding each through the slot mode
    fn flash_all(&mut self, category: PartitionCategory, names: &[String]) -> Result<()> {
        self.progress
            .busy(&format!("Flashing {} partitions", category));
        for name in names {
            let targets = flash_targets(
                name,
                self.session.slot_mode,
                &self.session.device.slot_specific,
            );
            for target in targets {
                self.flash_one(category, &target, name, false)?;
            }
        }
        self.progress.idle();
        Ok(())
    }

    /// Recreate every logical partition in both slots with a placeholder size
    fn resize_logical(&mut self) -> Result<()> {
        self.progress.busy("Resizing logical partitions");
        for name in self.session.device.partitions(PartitionCategory::Logical) {
            for slot in Slot::BOTH {
                let partition = slot.suffixed(&name);
                self.executor.execute_tolerant(
                    &FastbootCommand::DeleteLogical(format!("{}-cow", partition)),
                    tolerate_missing,
                )?;
                self.executor.execute_tolerant(
                    &FastbootCommand::DeleteLogical(partition.clone()),
                    tolerate_missing,
                )?;
                self.executor.execute(&FastbootCommand::CreateLogical {
                    name: partition,
                    size: PLACEHOLDER_LOGICAL_SIZE,
                })?;
            }
        }
        self.progress.idle();
        Ok(())
    }

    // =========================================================================
    // Stages
    // =========================================================================

    fn verify_board(&mut self) -> Result<()> {
        let Some(expected) = self.session.device.board.clone() else {
            log::debug!(
                "{} has no board identifier, skipping board check",
                self.session.device.model
            );
            return Ok(());
        };

        self.progress.section("DEVICE CHECK");
        self.progress.busy("Querying board identifier");
        let query = FastbootCommand::GetVar(BOARD_VARIABLE.to_string());
        let output = self.executor.execute_tolerant(&query, |_| true)?;
        self.progress.idle();

        let Some(reported) = parse_getvar(&output, BOARD_VARIABLE) else {
            self.progress.warn(&format!(
                "Could not read the board identifier, expected '{}'",
                expected
            ));
            return Ok(());
        };

        if self.session.device.board_matches(&reported) {
            log::info!("Board '{}' matches {}", reported, self.session.device.model);
            return Ok(());
        }

        self.progress.warn(&format!(
            "Board mismatch: {} expects '{}', device reports '{}'",
            self.session.device.model, expected, reported
        ));
        if self.ask("Continue flashing despite board mismatch?", Answer::No)? {
            log::warn!("Board mismatch overridden by operator");
            Ok(())
        } else {
            Err(Error::Aborted(AbortReason::BoardMismatch { expected, reported }))
        }
    }

    fn choose_slot_mode(&mut self) -> Result<()> {
        self.progress.section("SLOT SELECTION");
        self.session.slot_mode = if self.ask("Flash partitions to both slots (A/B)?", Answer::Yes)? {
            SlotMode::Both
        } else {
            SlotMode::Current
        };
        self.progress
            .note(&format!("Selected: flash to {}", self.session.slot_mode));
        Ok(())
    }

    fn activate_slot(&mut self) -> Result<()> {
        self.progress.busy("Activating slot a");
        self.executor.execute(&FastbootCommand::SetActive(Slot::A))?;
        self.progress.idle();
        Ok(())
    }

    fn wipe_data(&mut self) -> Result<()> {
        if !self.ask("Wipe user data? (Recommended for clean install)", Answer::No)? {
            return Ok(());
        }
        if !self.ask_typed("WIPE ALL USER DATA")? {
            self.progress.note("User data wipe cancelled");
            return Ok(());
        }

        self.progress.busy("Wiping user data");
        self.executor.execute(&FastbootCommand::Wipe)?;
        self.progress.idle();
        self.session.wiped = true;
        Ok(())
    }

    fn flash_boot(&mut self) -> Result<()> {
        self.progress.section("BOOT PARTITIONS");
        match self.confirm_category(PartitionCategory::Boot)? {
            CategoryDecision::Flash(found) => self.flash_all(PartitionCategory::Boot, &found),
            CategoryDecision::Skip => Ok(()),
            CategoryDecision::Declined => {
                if self.ask("Abort entire flashing process?", Answer::No)? {
                    return Err(Error::Aborted(AbortReason::CategoryDeclined(
                        PartitionCategory::Boot,
                    )));
                }
                self.session.skipped.push(PartitionCategory::Boot);
                Ok(())
            }
        }
    }

    fn flash_vbmeta(&mut self) -> Result<()> {
        self.progress.section("VBMETA PARTITIONS");
        let category = PartitionCategory::VbMeta;
        let names = self.session.device.partitions(category);
        let resolution = resolve(&names, &self.options.image_dir);

        if resolution.is_unconfigured() {
            self.progress.note(&format!(
                "No vbmeta partitions configured for {}, skipping",
                self.session.device.model
            ));
            self.session.skipped.push(category);
            return Ok(());
        }

        self.progress.resolution(category, &resolution);
        let disable_avb = self.ask("Disable Android Verified Boot (AVB)?", Answer::No)?;
        self.session.disable_avb = disable_avb;

        if resolution.found.is_empty() {
            self.progress.warn("No vbmeta images found, skipping");
            self.session.skipped.push(category);
            return Ok(());
        }

        self.progress.busy("Flashing vbmeta partitions");
        for name in &resolution.found {
            if name == PRELOADER_IMAGE {
                self.flash_one(category, PRELOADER_TARGET, name, false)?;
                continue;
            }
            let targets = flash_targets(
                name,
                self.session.slot_mode,
                &self.session.device.slot_specific,
            );
            for target in targets {
                self.flash_one(category, &target, name, disable_avb)?;
            }
        }
        self.progress.idle();
        Ok(())
    }

    fn reboot_to_fastbootd(&mut self) -> Result<()> {
        self.progress.section("REBOOTING TO FASTBOOTD");
        self.progress.busy("Rebooting to fastbootd");
        self.executor.execute(&FastbootCommand::RebootFastboot)?;
        self.progress.idle();
        Ok(())
    }

    fn flash_super_or_logical(&mut self) -> Result<()> {
        self.progress.section("SUPER PARTITIONS");
        let supers = resolve(&SUPER_IMAGES, &self.options.image_dir);
        if supers.found.is_empty() {
            self.progress
                .note("No super images found, using logical partitions");
            return self.flash_logical();
        }

        self.resize_logical()?;
        self.flash_all(PartitionCategory::Super, &supers.found)?;
        self.session.skipped.push(PartitionCategory::Logical);
        Ok(())
    }

    fn flash_logical(&mut self) -> Result<()> {
        self.progress.section("LOGICAL PARTITIONS");
        match self.confirm_category(PartitionCategory::Logical)? {
            CategoryDecision::Flash(found) => {
                self.resize_logical()?;
                self.flash_all(PartitionCategory::Logical, &found)
            }
            CategoryDecision::Skip => Ok(()),
            CategoryDecision::Declined => Err(Error::Aborted(AbortReason::CategoryDeclined(
                PartitionCategory::Logical,
            ))),
        }
    }

    fn flash_firmware(&mut self) -> Result<()> {
        self.progress.section("FIRMWARE PARTITIONS");
        match self.confirm_category(PartitionCategory::Firmware)? {
            CategoryDecision::Flash(found) => {
                self.flash_all(PartitionCategory::Firmware, &found)
            }
            CategoryDecision::Skip => Ok(()),
            CategoryDecision::Declined => Err(Error::Aborted(AbortReason::CategoryDeclined(
                PartitionCategory::Firmware,
            ))),
        }
    }

    fn final_reboot(&mut self) -> Result<()> {
        if !self.ask("Reboot to system?", Answer::No)? {
            return Ok(());
        }
        self.progress.busy("Rebooting to system");
        self.executor.execute(&FastbootCommand::Reboot)?;
        self.progress.idle();
        self.session.rebooted = true;
        Ok(())
    }

    fn write_summary(&mut self) -> Result<()> {
        let log = self.executor.log();
        let summary = self
            .session
            .summary(log.path(), log.records().len(), log.failures());
        self.executor.log_mut().append_text(&summary)?;
        self.progress.note("Flashing completed successfully");
        log::info!(
            "Flashed {} targets on {}",
            self.session.flashed.len(),
            self.session.device.model
        );
        Ok(())
    }
}
