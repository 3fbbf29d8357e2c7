// file: src/monitor/mod.rs
// description: execution monitor interface and progress monitor exports
// reference: polling monitors driven by a fixed interval supervisor

mod estimator;
mod reporter;
mod sampler;
mod supervisor;

pub use estimator::{MAX_TOTAL_BATCHES, PassMultipliers, estimate_total_batches};
pub use reporter::{DotReporter, LogReporter, PercentBarReporter, RecordingReporter, Reporter};
pub use sampler::{CoarseProgressMonitor, DEFAULT_CHECK_INTERVAL};
pub use supervisor::Supervisor;

use crate::error::Result;
use crate::execution::StageExecution;
use std::time::Duration;

/// Observes running stages on behalf of a scheduler.
///
/// Calls are strictly serial: `start` once per phase, `check` every
/// [`check_interval`](Self::check_interval) while the phase runs, and
/// `done` exactly once after the last phase.
pub trait ExecutionMonitor {
    fn check_interval(&self) -> Duration;

    fn start(&mut self, executions: &[StageExecution]) -> Result<()>;

    fn check(&mut self, executions: &[StageExecution]) -> Result<()>;

    fn done(&mut self, total_time: Duration, additional_information: &str) -> Result<()>;
}
