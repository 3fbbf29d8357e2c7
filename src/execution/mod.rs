// file: src/execution/mod.rs
// description: execution model exports for stages, steps and step statistics
// reference: pipeline stage topology

mod stage;
mod stats;

pub use stage::{StageExecution, Step};
pub use stats::{StatKey, StepStats};
