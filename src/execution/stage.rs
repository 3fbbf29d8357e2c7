// file: src/execution/stage.rs
// description: stage executions composed of ordered steps
// reference: pipeline stage topology, last step carries stage progress

use crate::error::{ProgressError, Result};
use crate::execution::stats::StepStats;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct Step {
    name: String,
    stats: StepStats,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: StepStats::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &StepStats {
        &self.stats
    }
}

/// One concurrently running stage of the pipeline.
///
/// Steps are ordered as batches flow through them. A batch is only counted
/// as done by the last step once every earlier step has handled it, so the
/// last step's done counter stands for the progress of the whole stage.
#[derive(Debug)]
pub struct StageExecution {
    name: String,
    steps: Vec<Arc<Step>>,
    completed: AtomicBool,
}

impl StageExecution {
    /// Fails with [`ProgressError::EmptyExecution`] when `steps` is empty.
    pub fn new(name: impl Into<String>, steps: Vec<Arc<Step>>) -> Result<Self> {
        let name = name.into();
        if steps.is_empty() {
            return Err(ProgressError::EmptyExecution(name));
        }

        Ok(Self {
            name,
            steps,
            completed: AtomicBool::new(false),
        })
    }

    /// Builds a stage with one fresh step per name, in order.
    pub fn with_step_names<I, S>(name: impl Into<String>, step_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = step_names
            .into_iter()
            .map(|step| Arc::new(Step::new(step)))
            .collect();
        Self::new(name, steps)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Arc<Step>] {
        &self.steps
    }

    /// The step whose done counter represents this stage's progress.
    pub fn progress_step(&self) -> &Step {
        // non-empty by construction
        &self.steps[self.steps.len() - 1]
    }

    pub fn done_batches(&self) -> u64 {
        self.progress_step().stats().done_batches()
    }

    pub fn mark_completed(&self) {
        self.completed.store(true, Ordering::Release);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}
