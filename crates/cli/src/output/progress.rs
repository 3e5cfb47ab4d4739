//! Progress bar for transfers
//!
//! Implements the engine's progress sink on top of indicatif. Bars draw to
//! stderr so stdout stays clean for results.

use std::sync::Mutex;

use indicatif::ProgressStyle;
use ydg_core::{Direction, ProgressEvent, ProgressSink};

use super::OutputConfig;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";

/// Progress bar wrapper
///
/// Handles progress display based on output configuration.
/// In quiet or JSON mode, progress is suppressed.
#[derive(Debug)]
pub struct ProgressBar {
    visible: bool,
    bar: Mutex<Option<indicatif::ProgressBar>>,
}

impl ProgressBar {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            visible: config.shows_progress(),
            bar: Mutex::new(None),
        }
    }

    /// Check if progress bar is visible
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<indicatif::ProgressBar>)) {
        let mut bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut bar);
    }
}

fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or(fallback)
}

impl ProgressSink for ProgressBar {
    fn started(&self, direction: Direction, position: u64, total: Option<u64>) {
        if !self.visible {
            return;
        }

        let bar = match total {
            Some(total) => {
                let bar = indicatif::ProgressBar::new(total);
                bar.set_style(
                    style(BAR_TEMPLATE, ProgressStyle::default_bar()).progress_chars("#>-"),
                );
                bar
            }
            None => {
                let bar = indicatif::ProgressBar::new_spinner();
                bar.set_style(style(SPINNER_TEMPLATE, ProgressStyle::default_spinner()));
                bar
            }
        };
        bar.set_message(direction.to_string());
        bar.set_position(position);

        self.with_bar(|slot| {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        });
    }

    fn advanced(&self, event: ProgressEvent) {
        self.with_bar(|slot| {
            if let Some(bar) = slot {
                bar.set_position(event.position);
            }
        });
    }

    fn finished(&self) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        });
    }
}
