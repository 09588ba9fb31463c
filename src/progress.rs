//! Progress reporting for long-running recognition loops.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for per-image work.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// A reporter that never draws, for tests and library callers.
    pub fn hidden() -> Self {
        Self::new(true)
    }

    /// Start a bar over `total` images.
    pub fn start(&mut self, total: u64, label: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb.set_prefix(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// Mark one image as done.
    pub fn advance(&self, name: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(name.to_string());
            pb.inc(1);
        }
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("done");
        }
    }
}
