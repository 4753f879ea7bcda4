//! Progress display for a download run
//!
//! The scheduler reports [`FetchEvent`]s over an `mpsc` channel. A background
//! task drains that channel into an indicatif byte-count bar and keeps a
//! running [`ProgressSummary`] that is handed back when the channel closes.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::FetchEvent;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}";

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Draw a progress bar on stderr
    pub enable_progress_bar: bool,
    /// Spinner tick interval
    pub tick_interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enable_progress_bar: true,
            tick_interval: Duration::from_millis(120),
        }
    }
}

impl ProgressConfig {
    /// Configuration with no visible output
    pub fn hidden() -> Self {
        Self {
            enable_progress_bar: false,
            ..Self::default()
        }
    }
}

/// Counters accumulated from fetch events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub sources: usize,
    pub completed: usize,
    pub failed: usize,
    pub bytes: u64,
}

/// Renders fetch events as a progress bar
pub struct ProgressDisplay {
    bar: ProgressBar,
    summary: ProgressSummary,
}

impl ProgressDisplay {
    /// Create a display; the bar stays hidden when disabled or not on a terminal
    pub fn new(config: ProgressConfig) -> Self {
        let bar = if config.enable_progress_bar {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-");
            bar.set_style(style);
            bar.enable_steady_tick(config.tick_interval);
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            summary: ProgressSummary::default(),
        }
    }

    pub fn summary(&self) -> &ProgressSummary {
        &self.summary
    }

    /// Apply one event to the counters and the bar
    pub fn handle(&mut self, event: &FetchEvent) {
        match event {
            FetchEvent::Planned {
                sources,
                expected_bytes,
            } => {
                self.summary.sources = *sources;
                self.bar.set_length(*expected_bytes);
            }
            FetchEvent::Started { index } => {
                debug!("Source #{} started", index);
            }
            FetchEvent::Completed { bytes, .. } => {
                self.summary.completed += 1;
                self.summary.bytes += bytes;
                self.bar.inc(*bytes);
            }
            FetchEvent::Failed { index, error } => {
                self.summary.failed += 1;
                self.bar
                    .println(format!("source #{} failed: {}", index, error));
            }
        }

        self.bar.set_message(format!(
            "{}/{} sources",
            self.summary.completed + self.summary.failed,
            self.summary.sources
        ));
    }

    /// Stop drawing, leaving a final line on the terminal
    pub fn finish(&self) {
        if self.summary.failed > 0 {
            self.bar.abandon_with_message(format!(
                "{} of {} sources failed",
                self.summary.failed, self.summary.sources
            ));
        } else {
            self.bar.finish_with_message(format!(
                "{} sources, {} bytes",
                self.summary.completed, self.summary.bytes
            ));
        }
    }

    /// Drain `events` until every sender is dropped, then finish
    pub fn spawn(mut self, mut events: mpsc::Receiver<FetchEvent>) -> JoinHandle<ProgressSummary> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.handle(&event);
            }
            self.finish();
            self.summary
        })
    }
}
