// file: src/execution/stats.rs
// description: atomic per-step counters published by worker threads
// reference: lock-free counters shared between workers and the polling monitor

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    ReceivedBatches,
    DoneBatches,
}

/// Counters for a single step.
///
/// Writers publish with `Release` and the monitor reads with `Acquire`, so a
/// poll from another thread always sees a whole, monotonic value.
#[derive(Debug, Default)]
pub struct StepStats {
    received_batches: AtomicU64,
    done_batches: AtomicU64,
}

impl StepStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self, batches: u64) {
        self.received_batches.fetch_add(batches, Ordering::Release);
    }

    pub fn record_done(&self, batches: u64) {
        self.done_batches.fetch_add(batches, Ordering::Release);
    }

    pub fn stat(&self, key: StatKey) -> u64 {
        match key {
            StatKey::ReceivedBatches => self.received_batches.load(Ordering::Acquire),
            StatKey::DoneBatches => self.done_batches.load(Ordering::Acquire),
        }
    }

    pub fn done_batches(&self) -> u64 {
        self.stat(StatKey::DoneBatches)
    }

    /// Batches received but not yet finished by this step.
    pub fn queued_batches(&self) -> u64 {
        self.stat(StatKey::ReceivedBatches)
            .saturating_sub(self.stat(StatKey::DoneBatches))
    }
}
