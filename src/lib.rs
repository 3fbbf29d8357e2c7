// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod execution;
pub mod monitor;
pub mod simulation;
pub mod utils;

pub use config::{Config, MonitorConfig, OutputConfig, OutputStyle, SimulationConfig};
pub use error::{ProgressError, Result};
pub use execution::{StageExecution, StatKey, Step, StepStats};
pub use monitor::{
    CoarseProgressMonitor, DotReporter, ExecutionMonitor, LogReporter, PassMultipliers,
    PercentBarReporter, RecordingReporter, Reporter, Supervisor, estimate_total_batches,
};
pub use simulation::{ImportSimulation, PhaseSummary, SimulationSummary};
