//! Progress bar wrapper for the CLI front-end.
//!
//! Not used by the library's core drivers, which report batch
//! boundaries through `tracing` instead; this wraps `indicatif` for
//! the thin CLI that drives `prepare`/`process_received` against whole
//! files.

use anyhow::Result;
use indicatif::{ProgressBar as Bar, ProgressStyle as Style};

const PROGRESS_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// A byte-counted progress bar for one file operation.
pub struct ProgressBar {
    bar: Bar,
}

impl ProgressBar {
    /// Creates a progress bar for `total` bytes, labeled `description`.
    pub fn new(total: u64, description: &str) -> Result<Self> {
        let bar = Bar::new(total);
        bar.set_style(Style::with_template(PROGRESS_TEMPLATE)?.progress_chars("●○ "));
        bar.set_message(description.to_owned());
        Ok(Self { bar })
    }

    /// Advances the bar by `delta` bytes.
    #[inline]
    pub fn add(&self, delta: u64) {
        self.bar.inc(delta);
    }

    /// Marks the bar as complete.
    #[inline]
    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_with_message("Done");
        }
    }
}
