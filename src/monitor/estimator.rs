// file: src/monitor/estimator.rs
// description: fixed total work estimate from entity counts and pass multipliers
// reference: batch accounting of the parallel import pipeline

use crate::error::{ProgressError, Result};
use serde::{Deserialize, Serialize};

/// How many times the downstream pipeline visits each entity class.
///
/// The defaults match the parallel importer topology: primary entities are
/// encountered three times, secondary entities four times. Other pipelines
/// should pass their own values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassMultipliers {
    pub primary: u64,
    pub secondary: u64,
}

impl Default for PassMultipliers {
    fn default() -> Self {
        Self {
            primary: 3,
            secondary: 4,
        }
    }
}

/// Largest total a monitor accepts; relative amounts are signed.
pub const MAX_TOTAL_BATCHES: u64 = i64::MAX as u64;

pub fn estimate_total_batches(
    primary_count: u64,
    secondary_count: u64,
    batch_size: u64,
    passes: PassMultipliers,
) -> Result<u64> {
    if batch_size == 0 {
        return Err(ProgressError::Config(
            "batch_size must be greater than 0".to_string(),
        ));
    }

    (primary_count / batch_size)
        .checked_mul(passes.primary)
        .zip((secondary_count / batch_size).checked_mul(passes.secondary))
        .and_then(|(primary, secondary)| primary.checked_add(secondary))
        .filter(|total| *total <= MAX_TOTAL_BATCHES)
        .ok_or_else(|| ProgressError::Config("estimated total overflows".to_string()))
}
