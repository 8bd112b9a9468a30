//! Progress bar for a run.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A bar with one step per ticker.
pub(crate) fn ticker_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
