// file: src/monitor/sampler.rs
// description: coarse bounded progress monitor sampling stage counters
// reference: delta sampling against a fixed total estimate with final reconciliation

use crate::error::{ProgressError, Result};
use crate::execution::StageExecution;
use crate::monitor::ExecutionMonitor;
use crate::monitor::estimator::{MAX_TOTAL_BATCHES, PassMultipliers, estimate_total_batches};
use crate::monitor::reporter::Reporter;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum SamplerState {
    NotStarted,
    Started { previous_readings: Vec<u64> },
    Done,
}

/// Reports progress in relative amounts, knowing the expected number of
/// batches up front.
///
/// The lifetime sum of everything handed to the reporter equals
/// [`total`](Self::total) once [`done`](ExecutionMonitor::done) has run,
/// whatever the accuracy of the estimate.
pub struct CoarseProgressMonitor<R: Reporter> {
    total_batches: u64,
    total_reported: u64,
    state: SamplerState,
    check_interval: Duration,
    reporter: R,
}

impl<R: Reporter> CoarseProgressMonitor<R> {
    pub fn new(
        primary_count: u64,
        secondary_count: u64,
        batch_size: u64,
        passes: PassMultipliers,
        reporter: R,
    ) -> Result<Self> {
        let total_batches =
            estimate_total_batches(primary_count, secondary_count, batch_size, passes)?;
        debug!(
            primary_count,
            secondary_count, batch_size, total_batches, "Estimated total batches"
        );
        Self::with_total(total_batches, reporter)
    }

    /// Fails when `total_batches` exceeds [`MAX_TOTAL_BATCHES`].
    pub fn with_total(total_batches: u64, reporter: R) -> Result<Self> {
        if total_batches > MAX_TOTAL_BATCHES {
            return Err(ProgressError::Config(format!(
                "total of {} batches exceeds {}",
                total_batches, MAX_TOTAL_BATCHES
            )));
        }

        Ok(Self {
            total_batches,
            total_reported: 0,
            state: SamplerState::NotStarted,
            check_interval: DEFAULT_CHECK_INTERVAL,
            reporter,
        })
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn total(&self) -> u64 {
        self.total_batches
    }

    /// Batches reported by checks; the reconciliation from `done` is not
    /// included.
    pub fn total_reported(&self) -> u64 {
        self.total_reported
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, SamplerState::Done)
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    fn previous_readings(&mut self, operation: &'static str) -> Result<&mut Vec<u64>> {
        match &mut self.state {
            SamplerState::Started { previous_readings } => Ok(previous_readings),
            _ => Err(ProgressError::NotStarted { operation }),
        }
    }
}

impl<R: Reporter> ExecutionMonitor for CoarseProgressMonitor<R> {
    fn check_interval(&self) -> Duration {
        self.check_interval
    }

    fn start(&mut self, executions: &[StageExecution]) -> Result<()> {
        if let SamplerState::Started { .. } = self.state {
            debug!("Restarting monitor without done, discarding previous readings");
        }
        info!(
            executions = executions.len(),
            stages = %stage_names(executions),
            "Monitoring stages"
        );
        self.state = SamplerState::Started {
            previous_readings: vec![0; executions.len()],
        };
        Ok(())
    }

    fn check(&mut self, executions: &[StageExecution]) -> Result<()> {
        let (readings, diff) = {
            let previous = self.previous_readings("check")?;
            if previous.len() != executions.len() {
                return Err(ProgressError::ExecutionCountMismatch {
                    expected: previous.len(),
                    actual: executions.len(),
                });
            }
            sample(previous, executions)?
        };

        let reported = diff
            .and_then(|diff| self.total_reported.checked_add(diff))
            .filter(|reported| *reported <= MAX_TOTAL_BATCHES)
            .ok_or(ProgressError::ProgressOverflow {
                reported: self.total_reported,
                delta: diff.unwrap_or(u64::MAX),
            })?;
        *self.previous_readings("check")? = readings;

        if reported > self.total_reported {
            let diff = reported - self.total_reported;
            self.total_reported = reported;
            self.reporter.progress(to_amount(diff));
        }
        Ok(())
    }

    fn done(&mut self, total_time: Duration, additional_information: &str) -> Result<()> {
        self.previous_readings("done")?;

        let remainder = to_amount(self.total_batches) - to_amount(self.total_reported);
        if remainder < 0 {
            warn!(
                total = self.total_batches,
                reported = self.total_reported,
                "Reported more batches than estimated, reconciling"
            );
        }
        self.reporter.progress(remainder);
        self.reporter.finish();
        self.state = SamplerState::Done;

        info!(
            total_batches = self.total_batches,
            reconciled = remainder,
            elapsed_ms = total_time.as_millis() as u64,
            "Progress monitoring done {}",
            additional_information
        );
        Ok(())
    }
}

/// Reads every execution's done batches against `previous`. Returns the new
/// readings and their summed delta, `None` when the sum overflows.
fn sample(previous: &[u64], executions: &[StageExecution]) -> Result<(Vec<u64>, Option<u64>)> {
    let mut readings = Vec::with_capacity(executions.len());
    let mut diff = Some(0u64);
    for (i, execution) in executions.iter().enumerate() {
        let current = execution.done_batches();
        let delta = current.checked_sub(previous[i]).ok_or_else(|| {
            warn!(
                stage = execution.name(),
                previous = previous[i],
                current,
                "Done batches went backwards"
            );
            ProgressError::CounterRegression {
                execution: i,
                previous: previous[i],
                current,
            }
        })?;
        diff = diff.and_then(|sum| sum.checked_add(delta));
        readings.push(current);
    }
    Ok((readings, diff))
}

// total and reported batches never exceed MAX_TOTAL_BATCHES
fn to_amount(batches: u64) -> i64 {
    debug_assert!(batches <= MAX_TOTAL_BATCHES);
    batches as i64
}

fn stage_names(executions: &[StageExecution]) -> String {
    executions
        .iter()
        .map(StageExecution::name)
        .collect::<Vec<_>>()
        .join(", ")
}
