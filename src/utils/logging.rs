// file: src/utils/logging.rs
// description: tracing subscriber setup and colored status lines for the cli
// reference: https://docs.rs/tracing-subscriber

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Other crates stay at `warn`; `RUST_LOG` replaces the whole filter.
pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,stage_progress={}", level)));

    // stderr, so the dot renderer owns stdout
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_phase(index: usize, phases: usize, name: &str, batches: u64) -> String {
    format!(
        "{} {} {}",
        format!("[{}/{}]", index + 1, phases).cyan().bold(),
        name,
        format!("({} batches)", batches).dimmed()
    )
}

pub fn format_estimate(primary: u64, secondary: u64, batch_size: u64, total: u64) -> String {
    format!(
        "{} {} primary, {} secondary, batch size {}: {} batches",
        "ℹ".blue().bold(),
        primary,
        secondary,
        batch_size,
        total.to_string().bold()
    )
}

pub fn format_finished(batches: u64, elapsed_ms: u64, finished_at: &str) -> String {
    format!(
        "{} Finished at {}: {} batches in {:.2}s",
        "✓".green().bold(),
        finished_at,
        batches,
        elapsed_ms as f64 / 1000.0
    )
    .green()
    .to_string()
}

/// `None` when the estimate matched the batches actually processed.
pub fn format_reconciliation(estimated: u64, processed: u64) -> Option<String> {
    if estimated == processed {
        return None;
    }
    let adjustment = estimated as i128 - processed as i128;
    Some(format!(
        "{} Estimate was {} batches, reconciled by {:+} at completion",
        "⚠".yellow().bold(),
        estimated,
        adjustment
    ))
}
