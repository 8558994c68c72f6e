//! Terminal spinner that follows an import.

use std::time::Duration;

use cartshelf_core::util::format_bytes;
use cartshelf_import::ImportProgress;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// An [`ImportProgress`] that shows the current step on a single spinner line.
pub(crate) struct SpinnerProgress {
    spinner: ProgressBar,
}

impl SpinnerProgress {
    pub(crate) fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_draw_target(ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("/-\\|");
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    /// Stop ticking and clear the line. Safe to call more than once.
    pub(crate) fn finish(&self) {
        self.spinner.disable_steady_tick();
        self.spinner.finish_and_clear();
    }
}

impl ImportProgress for SpinnerProgress {
    fn on_phase(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    fn on_file(&self, name: &str, size: u64) {
        self.spinner
            .set_message(format!("{} ({})", name, format_bytes(size)));
    }

    fn on_complete(&self, _message: &str) {
        self.finish();
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        self.finish();
    }
}
