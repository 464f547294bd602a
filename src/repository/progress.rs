//! Progress reporting abstraction
//!
//! Keeps indicatif out of the history-building code.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

/// A handle to an active progress bar
pub trait ProgressHandle: Send + Sync {
    fn inc(&self, n: u64);
    fn finish(&self);
}

/// Factory for creating progress handles
pub trait ProgressReporter: Send + Sync {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle>;
}

/// Indicatif bar on stderr, for interactive CLI runs
pub struct BarProgress;

impl ProgressReporter for BarProgress {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle> {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} {:<20} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                    label
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Box::new(BarHandle {
            bar,
            label: label.to_string(),
            started: Instant::now(),
        })
    }
}

struct BarHandle {
    bar: ProgressBar,
    label: String,
    started: Instant,
}

impl ProgressHandle for BarHandle {
    fn inc(&self, n: u64) {
        self.bar.inc(n);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
        tracing::debug!(
            phase = %self.label,
            items = self.bar.position(),
            elapsed = ?self.started.elapsed(),
            "phase finished"
        );
    }
}

/// Silent reporter for quiet mode, tests and benches
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _label: &str, _total: u64) -> Box<dyn ProgressHandle> {
        Box::new(NoopHandle)
    }
}

struct NoopHandle;

impl ProgressHandle for NoopHandle {
    fn inc(&self, _n: u64) {}
    fn finish(&self) {}
}

/// Bar when `visible`, silence otherwise
pub fn reporter(visible: bool) -> Box<dyn ProgressReporter> {
    if visible {
        Box::new(BarProgress)
    } else {
        Box::new(NoopProgress)
    }
}
