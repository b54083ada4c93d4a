//! Upload progress bar.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tgtracks_telegram::TransferProgress;

const TEMPLATE: &str = "[{bar:40}] {pos:>3}% (elapsed: {elapsed})";

#[derive(Default)]
struct State {
    bar: Option<ProgressBar>,
    last_percent: u64,
}

/// Renders transfer callbacks as a percentage bar.
///
/// The bar is only drawn once the first callback arrives, so uploads that
/// report no progress at all leave nothing behind.
#[derive(Default)]
pub struct ProgressReporter {
    state: Mutex<State>,
    finished: AtomicBool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage reported by the most recent callback.
    pub fn last_percent(&self) -> u64 {
        self.state.lock().map(|state| state.last_percent).unwrap_or_default()
    }

    /// Clear the bar. Safe to call any number of times, and before any
    /// progress was reported.
    pub fn finish(&self) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(state) = self.state.lock()
            && let Some(bar) = &state.bar
        {
            bar.finish_and_clear();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    fn create_bar() -> ProgressBar {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        ProgressBar::new(100).with_style(style)
    }
}

impl TransferProgress for ProgressReporter {
    fn update(&self, transferred: u64, total: u64) {
        if total == 0 || self.is_finished() {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let percent = (transferred.min(total) * 100) / total;
        let step = percent.saturating_sub(state.last_percent);
        state.last_percent = percent;
        state.bar.get_or_insert_with(Self::create_bar).inc(step);
        tracing::trace!(percent, "Upload progress");
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}
