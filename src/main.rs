// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use stage_progress::utils::logging::{
    format_estimate, format_finished, format_phase, format_reconciliation,
};
use stage_progress::{
    CoarseProgressMonitor, Config, DotReporter, ImportSimulation, LogReporter, OutputStyle,
    PercentBarReporter, Reporter, SimulationSummary, estimate_total_batches,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "stage_progress")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Coarse bounded progress monitoring for batch pipelines", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the total number of batches expected for the given counts
    Estimate {
        #[arg(long, value_name = "COUNT")]
        primary: Option<u64>,

        #[arg(long, value_name = "COUNT")]
        secondary: Option<u64>,

        #[arg(long, value_name = "SIZE")]
        batch_size: Option<u64>,
    },

    /// Run a simulated multi-phase import under the progress monitor
    Simulate {
        #[arg(long, value_name = "COUNT")]
        primary: Option<u64>,

        #[arg(long, value_name = "COUNT")]
        secondary: Option<u64>,

        #[arg(long, value_enum)]
        style: Option<StyleArg>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Bar,
    Dots,
    Log,
}

impl From<StyleArg> for OutputStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Bar => OutputStyle::Bar,
            StyleArg::Dots => OutputStyle::Dots,
            StyleArg::Log => OutputStyle::Log,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    stage_progress::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    info!("Loading configuration from: {}", cli.config.display());

    if !cli.config.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            cli.config.display()
        );
    }
    let config =
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?;

    match cli.command {
        Commands::Estimate {
            primary,
            secondary,
            batch_size,
        } => {
            cmd_estimate(&config, primary, secondary, batch_size)?;
        }
        Commands::Simulate {
            primary,
            secondary,
            style,
            json,
        } => {
            let mut config = config;
            if let Some(primary) = primary {
                config.simulation.primary_count = primary;
            }
            if let Some(secondary) = secondary {
                config.simulation.secondary_count = secondary;
            }
            if let Some(style) = style {
                config.output.style = style.into();
            }
            cmd_simulate(&config, cli.color, json).await?;
        }
    }

    Ok(())
}

fn cmd_estimate(
    config: &Config,
    primary: Option<u64>,
    secondary: Option<u64>,
    batch_size: Option<u64>,
) -> Result<()> {
    let primary = primary.unwrap_or(config.simulation.primary_count);
    let secondary = secondary.unwrap_or(config.simulation.secondary_count);
    let batch_size = batch_size.unwrap_or(config.monitor.batch_size);

    let total = estimate_total_batches(primary, secondary, batch_size, config.monitor.passes())
        .context("Failed to estimate total batches")?;

    println!("{}", format_estimate(primary, secondary, batch_size, total));

    Ok(())
}

async fn cmd_simulate(config: &Config, colored: bool, json: bool) -> Result<()> {
    let simulation = ImportSimulation::from_config(&config.simulation, config.monitor.batch_size)
        .context("Failed to plan simulation")?;

    for (index, phase) in simulation.phases().iter().enumerate() {
        info!(
            "{}",
            format_phase(index, simulation.phases().len(), &phase.name, phase.batches())
        );
    }

    let summary = match config.output.style {
        OutputStyle::Bar => {
            let total = estimated_total(config)?;
            run_simulation(config, &simulation, PercentBarReporter::new(total, colored)).await?
        }
        OutputStyle::Dots => {
            let total = estimated_total(config)?;
            let reporter = DotReporter::new(std::io::stdout(), total, config.output.dots, colored);
            let summary = run_simulation(config, &simulation, reporter).await?;
            println!();
            summary
        }
        OutputStyle::Log => run_simulation(config, &simulation, LogReporter::new()).await?,
    };

    print_summary(config, &simulation, &summary, json)
}

fn estimated_total(config: &Config) -> Result<u64> {
    estimate_total_batches(
        config.simulation.primary_count,
        config.simulation.secondary_count,
        config.monitor.batch_size,
        config.monitor.passes(),
    )
    .context("Failed to estimate total batches")
}

async fn run_simulation<R: Reporter>(
    config: &Config,
    simulation: &ImportSimulation,
    reporter: R,
) -> Result<SimulationSummary> {
    let mut monitor = CoarseProgressMonitor::new(
        config.simulation.primary_count,
        config.simulation.secondary_count,
        config.monitor.batch_size,
        config.monitor.passes(),
        reporter,
    )
    .context("Failed to create progress monitor")?
    .with_check_interval(config.monitor.poll_interval());

    simulation
        .run(&mut monitor)
        .await
        .context("Simulated import failed")
}

fn print_summary(
    config: &Config,
    simulation: &ImportSimulation,
    summary: &SimulationSummary,
    json: bool,
) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
        println!("{}", rendered);
        return Ok(());
    }

    let estimated = estimated_total(config)?;
    let finished_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    println!(
        "{}",
        format_finished(summary.batches_processed, summary.elapsed_ms, &finished_at)
    );

    if let Some(line) = format_reconciliation(estimated, simulation.total_batches()) {
        println!("{}", line);
    }

    Ok(())
}
