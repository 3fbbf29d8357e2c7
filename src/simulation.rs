// file: src/simulation.rs
// description: simulated multi-phase batch import driving a monitor end to end
// reference: blocking worker tasks publishing step counters while a supervisor polls

use crate::config::SimulationConfig;
use crate::error::{ProgressError, Result};
use crate::execution::StageExecution;
use crate::monitor::{ExecutionMonitor, Supervisor};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

const STEP_NAMES: [&str; 4] = ["read", "prepare", "process", "write"];

#[derive(Debug, Clone, Serialize)]
pub struct StagePlan {
    pub name: String,
    pub batches: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhasePlan {
    pub name: String,
    pub stages: Vec<StagePlan>,
}

impl PhasePlan {
    fn new(name: &str, stages: &[(&str, u64)]) -> Self {
        Self {
            name: name.to_string(),
            stages: stages
                .iter()
                .map(|(stage, batches)| StagePlan {
                    name: stage.to_string(),
                    batches: *batches,
                })
                .collect(),
        }
    }

    pub fn batches(&self) -> u64 {
        self.stages.iter().map(|stage| stage.batches).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub name: String,
    pub batches: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub phases: Vec<PhaseSummary>,
    pub batches_processed: u64,
    pub elapsed_ms: u64,
}

/// Import shaped like the parallel importer: primary entities pass through
/// three phases, secondary entities through four.
pub struct ImportSimulation {
    phases: Vec<PhasePlan>,
    steps_per_stage: usize,
    batch_delay: Duration,
}

impl ImportSimulation {
    pub fn from_config(config: &SimulationConfig, batch_size: u64) -> Result<Self> {
        if batch_size == 0 {
            return Err(ProgressError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if config.steps_per_stage == 0 {
            return Err(ProgressError::Config(
                "steps_per_stage must be greater than 0".to_string(),
            ));
        }

        // partial batches are real work, unlike in the floored estimate
        let primary = config.primary_count.div_ceil(batch_size);
        let secondary = config.secondary_count.div_ceil(batch_size);

        let phases = vec![
            PhasePlan::new("Primary import", &[("primary import", primary)]),
            PhasePlan::new("Secondary import", &[("secondary import", secondary)]),
            PhasePlan::new(
                "Linking",
                &[("primary link", primary), ("secondary link", secondary)],
            ),
            PhasePlan::new(
                "Counting",
                &[("primary count", primary), ("secondary count", secondary)],
            ),
            PhasePlan::new("Finalize", &[("secondary finalize", secondary)]),
        ];

        Ok(Self {
            phases,
            steps_per_stage: config.steps_per_stage,
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        })
    }

    pub fn phases(&self) -> &[PhasePlan] {
        &self.phases
    }

    pub fn total_batches(&self) -> u64 {
        self.phases.iter().map(PhasePlan::batches).sum()
    }

    /// Runs every phase under `monitor`, then calls `done` once.
    pub async fn run<M>(&self, monitor: &mut M) -> Result<SimulationSummary>
    where
        M: ExecutionMonitor + ?Sized,
    {
        let started = Instant::now();
        let mut phases = Vec::with_capacity(self.phases.len());

        for (index, phase) in self.phases.iter().enumerate() {
            info!(
                "Phase {}/{}: {} ({} batches)",
                index + 1,
                self.phases.len(),
                phase.name,
                phase.batches()
            );

            let executions = Arc::new(self.build_executions(phase)?);
            let workers = phase
                .stages
                .iter()
                .enumerate()
                .map(|(i, stage)| {
                    spawn_worker(Arc::clone(&executions), i, stage.batches, self.batch_delay)
                })
                .collect::<Vec<_>>();

            let supervised = Supervisor::supervise(&mut *monitor, &executions).await;
            try_join_all(workers)
                .await
                .map_err(|e| ProgressError::Worker(e.to_string()))?;
            let elapsed = supervised?;

            phases.push(PhaseSummary {
                name: phase.name.clone(),
                batches: phase.batches(),
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        let elapsed = started.elapsed();
        let note = format!("({} phases)", phases.len());
        monitor.done(elapsed, &note)?;

        Ok(SimulationSummary {
            batches_processed: phases.iter().map(|phase| phase.batches).sum(),
            phases,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    fn build_executions(&self, phase: &PhasePlan) -> Result<Vec<StageExecution>> {
        phase
            .stages
            .iter()
            .map(|stage| {
                StageExecution::with_step_names(&stage.name, step_names(self.steps_per_stage))
            })
            .collect()
    }
}

fn step_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match STEP_NAMES.get(i) {
            Some(name) => name.to_string(),
            None => format!("step {}", i + 1),
        })
        .collect()
}

/// Marks its execution completed when dropped, also when a worker panics,
/// so the supervisor never waits on a dead stage.
struct CompletionGuard {
    executions: Arc<Vec<StageExecution>>,
    index: usize,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.executions[self.index].mark_completed();
    }
}

fn spawn_worker(
    executions: Arc<Vec<StageExecution>>,
    index: usize,
    batches: u64,
    batch_delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let guard = CompletionGuard { executions, index };
        let execution = &guard.executions[guard.index];
        for _ in 0..batches {
            for step in execution.steps() {
                step.stats().record_received(1);
                step.stats().record_done(1);
            }
            if !batch_delay.is_zero() {
                std::thread::sleep(batch_delay);
            }
        }
    })
}
