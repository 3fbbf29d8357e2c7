// file: src/monitor/supervisor.rs
// description: interval driven supervision of one pipeline phase
// reference: tokio interval timers polling concurrently running stages

use crate::error::{ProgressError, Result};
use crate::execution::StageExecution;
use crate::monitor::ExecutionMonitor;
use std::time::{Duration, Instant};
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

pub struct Supervisor;

impl Supervisor {
    /// Starts `monitor` on `executions` and checks it on the monitor's
    /// interval until every execution has completed. Ends with one more
    /// check so batches finished after the last tick are reported.
    ///
    /// `done` is left to the caller, which calls it once after its last phase.
    pub async fn supervise<M>(monitor: &mut M, executions: &[StageExecution]) -> Result<Duration>
    where
        M: ExecutionMonitor + ?Sized,
    {
        let period = monitor.check_interval();
        if period.is_zero() {
            return Err(ProgressError::Config(
                "check interval must be greater than 0".to_string(),
            ));
        }

        let started = Instant::now();
        monitor.start(executions)?;

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        let mut checks = 0usize;
        while !executions.iter().all(StageExecution::is_completed) {
            ticker.tick().await;
            monitor.check(executions)?;
            checks += 1;
        }
        monitor.check(executions)?;

        let elapsed = started.elapsed();
        debug!(
            checks,
            elapsed_ms = elapsed.as_millis() as u64,
            "Phase supervision finished"
        );
        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{CoarseProgressMonitor, RecordingReporter};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    fn stages(names: &[&str]) -> Arc<Vec<StageExecution>> {
        Arc::new(
            names
                .iter()
                .map(|name| StageExecution::with_step_names(*name, ["process", "write"]).unwrap())
                .collect(),
        )
    }

    fn run_workers(executions: &Arc<Vec<StageExecution>>, batches: u64) -> thread::JoinHandle<()> {
        let executions = Arc::clone(executions);
        thread::spawn(move || {
            for _ in 0..batches {
                for execution in executions.iter() {
                    for step in execution.steps() {
                        step.stats().record_done(1);
                    }
                }
                thread::sleep(Duration::from_millis(2));
            }
            for execution in executions.iter() {
                execution.mark_completed();
            }
        })
    }

    #[tokio::test]
    async fn test_supervise_reports_every_batch() {
        let mut monitor = CoarseProgressMonitor::with_total(60, RecordingReporter::new())
            .unwrap()
            .with_check_interval(Duration::from_millis(5));

        let executions = stages(&["nodes", "relationships"]);
        let worker = run_workers(&executions, 20);

        Supervisor::supervise(&mut monitor, &executions).await.unwrap();
        worker.join().unwrap();

        assert_eq!(monitor.reporter().sum(), 40);
        assert!(monitor.reporter().amounts().iter().all(|amount| *amount > 0));

        monitor.done(Duration::ZERO, "").unwrap();
        assert_eq!(monitor.reporter().sum(), 60);
    }

    #[test]
    fn test_supervise_phases_share_one_monitor() {
        let mut monitor = CoarseProgressMonitor::with_total(30, RecordingReporter::new())
            .unwrap()
            .with_check_interval(Duration::from_millis(5));

        tokio_test::block_on(async {
            for batches in [10, 15] {
                let executions = stages(&["phase"]);
                let worker = run_workers(&executions, batches);
                Supervisor::supervise(&mut monitor, &executions).await.unwrap();
                worker.join().unwrap();
            }
        });

        assert_eq!(monitor.total_reported(), 25);
        monitor.done(Duration::ZERO, "").unwrap();
        assert_eq!(monitor.reporter().sum(), 30);
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let mut monitor = CoarseProgressMonitor::with_total(1, RecordingReporter::new())
            .unwrap()
            .with_check_interval(Duration::ZERO);
        let executions = stages(&["nodes"]);

        let result = Supervisor::supervise(&mut monitor, &executions).await;
        assert!(matches!(result, Err(ProgressError::Config(_))));
    }
}
