//! Minimal progress-sink capability and the console renderer.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receiver for progress updates during a run.
///
/// The run controller reports deltas of the driver's step value, which may
/// be fractional for drivers whose progress measure is continuous time, so
/// the capability is phrased in `f64`.
pub trait ProgressSink {
    /// Announces the total amount of progress the run will cover.
    fn begin(&mut self, total: f64);

    /// Updates the label shown next to the indicator (current loss).
    fn set_label(&mut self, label: &str);

    /// Advances the indicator by a possibly fractional delta.
    fn advance_by(&mut self, delta: f64);

    /// Marks the run as complete.
    fn finish(&mut self);
}

/// Sink that ignores all events.
///
/// Used on non-primary processes and when progress display is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&mut self, _total: f64) {}

    fn set_label(&mut self, _label: &str) {}

    fn advance_by(&mut self, _delta: f64) {}

    fn finish(&mut self) {}
}

/// Fixed-point resolution used to map fractional progress onto bar ticks.
const TICKS_PER_UNIT: f64 = 1000.0;

/// Console progress bar rendered with `indicatif` on stderr.
pub struct ConsoleProgress {
    bar: ProgressBar,
    position: f64,
}

impl ConsoleProgress {
    /// Creates a hidden bar; `begin` attaches it to stderr.
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            position: 0.0,
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn begin(&mut self, total: f64) {
        let ticks = (total.max(0.0) * TICKS_PER_UNIT).round() as u64;
        self.bar = ProgressBar::new(ticks.max(1)).with_style(Self::bar_style());
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.position = 0.0;
    }

    fn set_label(&mut self, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn advance_by(&mut self, delta: f64) {
        self.position += delta;
        self.bar
            .set_position((self.position.max(0.0) * TICKS_PER_UNIT).round() as u64);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}
