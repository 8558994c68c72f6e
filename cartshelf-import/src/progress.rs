//! Import progress reporting.

/// Trait for receiving import progress updates.
pub trait ImportProgress {
    /// Called when a phase starts (e.g., "Resolving manifest").
    fn on_phase(&self, message: &str);

    /// Called after each file is written into the library entry.
    fn on_file(&self, name: &str, size: u64);

    /// Called when the import is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_phase(&self, _message: &str) {}
    fn on_file(&self, _name: &str, _size: u64) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_file(&self, name: &str, size: u64) {
        log::info!("  wrote {} ({} bytes)", name, size);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
