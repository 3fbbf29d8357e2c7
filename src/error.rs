// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProgressError>;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Counter regression in execution {execution}: done batches went from {previous} to {current}"
    )]
    CounterRegression {
        execution: usize,
        previous: u64,
        current: u64,
    },

    #[error("Progress overflow: {reported} batches reported, {delta} more exceed the limit")]
    ProgressOverflow { reported: u64, delta: u64 },

    #[error("Monitor not started: {operation} called before start")]
    NotStarted { operation: &'static str },

    #[error("Execution count mismatch: started with {expected}, checked with {actual}")]
    ExecutionCountMismatch { expected: usize, actual: usize },

    #[error("Stage execution {0} has no steps")]
    EmptyExecution(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ProgressError {
    fn from(err: config::ConfigError) -> Self {
        ProgressError::Config(err.to_string())
    }
}
