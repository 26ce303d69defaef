//! Progress reporting utilities using indicatif.
//!
//! The engine reports through the [`ProgressCallback`] trait; the
//! [`Progress`] struct renders those events as terminal progress bars.
//! Progress is a UI concern only and has no bearing on correctness.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for pipeline phases.
///
/// Implement this trait to receive progress updates during scanning and
/// hashing.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts with the number of items, if known.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed (1-based position).
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item finished processing, with its size in bytes.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the displayed message.
    fn on_message(&self, _message: &str) {}
}

/// Terminal progress reporter.
///
/// A spinner during scanning (total unknown), a bar during hashing.
pub struct Progress {
    multi: MultiProgress,
    scanning: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// With `quiet`, no bars are displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            scanning: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn scanning_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        match phase {
            "scanning" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::scanning_style());
                pb.set_message("Scanning");
                pb.enable_steady_tick(Duration::from_millis(100));
                *self.scanning.lock().unwrap() = Some(pb);
            }
            "hashing" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Hashing");
                *self.hashing.lock().unwrap() = Some(pb);
            }
            _ => {}
        }
    }

    fn on_progress(&self, current: usize, _path: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.hashing.lock().unwrap().as_ref() {
            pb.set_position(current as u64);
            return;
        }
        if let Some(pb) = self.scanning.lock().unwrap().as_ref() {
            pb.set_position(current as u64);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        let slot = match phase {
            "scanning" => &self.scanning,
            "hashing" => &self.hashing,
            _ => return,
        };
        if let Some(pb) = slot.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.scanning.lock().unwrap().as_ref() {
            pb.set_message(message.to_string());
        }
    }
}
