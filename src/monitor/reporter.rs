// file: src/monitor/reporter.rs
// description: sinks for relative progress amounts
// reference: uses indicatif for progress bars, tracing for log output

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use tracing::{debug, warn};

/// Receives relative progress: units completed since the previous report.
///
/// Amounts are not uniform. The final report from `done` reconciles the
/// running sum with the estimate and may be zero or even negative.
pub trait Reporter {
    fn progress(&mut self, amount: i64);

    /// Called once after the terminal report.
    fn finish(&mut self) {}
}

impl<F> Reporter for F
where
    F: FnMut(i64),
{
    fn progress(&mut self, amount: i64) {
        self(amount)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    amounts: Vec<i64>,
    finished: bool,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amounts(&self) -> &[i64] {
        &self.amounts
    }

    pub fn sum(&self) -> i64 {
        self.amounts.iter().sum()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Reporter for RecordingReporter {
    fn progress(&mut self, amount: i64) {
        self.amounts.push(amount);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

pub struct PercentBarReporter {
    bar: ProgressBar,
    total: u64,
    reported: i64,
}

impl PercentBarReporter {
    pub fn new(total: u64, colored: bool) -> Self {
        Self::with_target(total, colored, ProgressDrawTarget::stderr())
    }

    pub fn hidden(total: u64) -> Self {
        Self::with_target(total, false, ProgressDrawTarget::hidden())
    }

    fn with_target(total: u64, colored: bool, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total.max(1)), target);
        bar.set_style(create_bar_style(colored));
        Self {
            bar,
            total,
            reported: 0,
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            return 100;
        }
        (self.position() as u128 * 100 / self.total as u128) as u64
    }
}

impl Reporter for PercentBarReporter {
    fn progress(&mut self, amount: i64) {
        self.reported = self.reported.saturating_add(amount);
        let ceiling = i64::try_from(self.total).unwrap_or(i64::MAX);
        // in [0, ceiling], so non-negative
        let position = self.reported.clamp(0, ceiling) as u64;
        self.bar.set_position(position);
    }

    fn finish(&mut self) {
        if self.total == 0 {
            self.bar.set_position(1);
        }
        self.bar.finish_with_message("Import complete");
    }
}

fn create_bar_style(colored: bool) -> ProgressStyle {
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {percent}% {msg}"
    };
    let chars = if colored { "█▓▒░" } else { "=>-" };

    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars)
}

/// Text rendering: `dots` dots across the whole run, with a percentage
/// marker after every tenth of them.
pub struct DotReporter<W: Write> {
    out: W,
    total: u64,
    dots: u64,
    reported: u64,
    printed_dots: u64,
    colored: bool,
}

impl<W: Write> DotReporter<W> {
    pub fn new(out: W, total: u64, dots: u64, colored: bool) -> Self {
        Self {
            out,
            total,
            // whole number of dots per ten percent
            dots: dots.max(10) / 10 * 10,
            reported: 0,
            printed_dots: 0,
            colored,
        }
    }

    pub fn printed_dots(&self) -> u64 {
        self.printed_dots
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn dots_due(&self) -> u64 {
        if self.total == 0 {
            return self.dots;
        }
        let due = (self.reported as u128 * self.dots as u128 / self.total as u128) as u64;
        due.min(self.dots)
    }

    fn catch_up(&mut self) -> std::io::Result<()> {
        let due = self.dots_due();
        let per_marker = self.dots / 10;
        while self.printed_dots < due {
            self.printed_dots += 1;
            write!(self.out, ".")?;
            if self.printed_dots % per_marker == 0 {
                let marker = format!(" {:>3}%", self.printed_dots * 100 / self.dots);
                if self.colored {
                    writeln!(self.out, "{}", marker.cyan())?;
                } else {
                    writeln!(self.out, "{}", marker)?;
                }
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Reporter for DotReporter<W> {
    fn progress(&mut self, amount: i64) {
        if amount > 0 {
            self.reported = self.reported.saturating_add(amount as u64).min(self.total);
        } else if amount < 0 {
            // dots already printed stay printed
            self.reported = self.reported.saturating_sub(amount.unsigned_abs());
        }
        if let Err(e) = self.catch_up() {
            warn!("Failed to render progress dots: {}", e);
        }
    }

    fn finish(&mut self) {
        self.reported = self.total;
        if let Err(e) = self.catch_up() {
            warn!("Failed to render progress dots: {}", e);
        }
    }
}

#[derive(Debug, Default)]
pub struct LogReporter {
    reported: i64,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for LogReporter {
    fn progress(&mut self, amount: i64) {
        self.reported = self.reported.saturating_add(amount);
        debug!(amount, reported = self.reported, "progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_closure_is_a_reporter() {
        let mut seen = Vec::new();
        {
            let mut reporter = |amount: i64| seen.push(amount);
            reporter.progress(3);
            reporter.progress(-1);
            reporter.finish();
        }
        assert_eq!(seen, vec![3, -1]);
    }

    #[test]
    fn test_recording_reporter() {
        let mut reporter = RecordingReporter::new();
        reporter.progress(2);
        reporter.progress(5);
        reporter.finish();

        assert_eq!(reporter.amounts(), &[2, 5]);
        assert_eq!(reporter.sum(), 7);
        assert!(reporter.is_finished());
    }

    #[test]
    fn test_percent_bar_clamps_position() {
        let mut reporter = PercentBarReporter::hidden(20);
        reporter.progress(5);
        assert_eq!(reporter.percent(), 25);

        reporter.progress(30);
        assert_eq!(reporter.position(), 20);

        reporter.progress(-15);
        assert_eq!(reporter.position(), 20);
        assert_eq!(reporter.percent(), 100);
    }

    #[test]
    fn test_percent_bar_accepts_totals_beyond_signed_range() {
        let mut reporter = PercentBarReporter::hidden(u64::MAX);
        reporter.progress(1);
        assert_eq!(reporter.position(), 1);

        reporter.progress(i64::MAX);
        assert_eq!(reporter.position(), i64::MAX as u64);
        assert_eq!(reporter.percent(), 49);
    }

    #[test]
    fn test_dot_reporter_prints_markers() {
        let mut reporter = DotReporter::new(Vec::new(), 100, 20, false);
        reporter.progress(10);
        assert_eq!(reporter.printed_dots(), 2);

        reporter.progress(40);
        assert_eq!(reporter.printed_dots(), 10);

        reporter.progress(0);
        reporter.finish();
        assert_eq!(reporter.printed_dots(), 20);

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(output.matches('.').count(), 20);
        assert!(output.contains(" 50%"));
        assert!(output.ends_with("100%\n"));
    }

    #[test]
    fn test_dot_reporter_absorbs_over_reporting() {
        let mut reporter = DotReporter::new(Vec::new(), 10, 10, false);
        reporter.progress(25);
        reporter.progress(-15);
        reporter.finish();

        assert_eq!(reporter.printed_dots(), 10);
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(output.matches('.').count(), 10);
    }
}
