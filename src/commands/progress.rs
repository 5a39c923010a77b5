//! Console progress for flashing sessions

use fbflasher_core::device::PartitionCategory;
use fbflasher_core::partition::Resolution;
use fbflasher_core::progress::FlashProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a standard spinner style
fn create_spinner_style() -> Result<ProgressStyle, Box<dyn std::error::Error>> {
    Ok(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?)
}

/// Progress reporter drawing an indicatif spinner while commands run
pub struct IndicatifProgress {
    spinner: Option<ProgressBar>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    fn start_spinner(&mut self, message: String) {
        if let Some(pb) = &self.spinner {
            pb.set_message(message);
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(create_spinner_style().unwrap_or_else(|_| ProgressStyle::default_spinner()));
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    /// Print a line without tearing the spinner
    fn println(&self, line: &str) {
        match &self.spinner {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashProgress for IndicatifProgress {
    fn section(&mut self, title: &str) {
        self.idle();
        println!();
        println!("=== {} ===", title);
    }

    fn busy(&mut self, message: &str) {
        self.start_spinner(message.to_string());
    }

    fn idle(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn flashing(&mut self, target: &str) {
        self.start_spinner(format!("Flashing {}...", target));
    }

    fn resolution(&mut self, category: PartitionCategory, resolution: &Resolution) {
        self.println(&format!(
            "Found {}/{} {} files",
            resolution.found.len(),
            resolution.expected(),
            category
        ));
        if !resolution.missing.is_empty() {
            self.println(&format!("Missing: {}", resolution.missing.join(", ")));
        }
    }

    fn note(&mut self, message: &str) {
        self.println(message);
    }

    fn warn(&mut self, message: &str) {
        self.println(&format!("Warning: {}", message));
    }
}
