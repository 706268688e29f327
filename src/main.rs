//! Command line entry point for the ghost-coordinator
//!
//! Runs a simulated self-play league over the learning-team scheduler and
//! prints the final standings as JSON.

use anyhow::Result;
use clap::Parser;
use ghost_coordinator::config::AppConfig;
use ghost_coordinator::simulation::LeagueSimulation;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

/// Ghost Coordinator - learning-team rotation and ELO for self-play
#[derive(Parser)]
#[command(
    name = "ghost-coordinator",
    version,
    about = "Simulate a self-play league with a rotating learning team",
    long_about = "Ghost Coordinator rotates a single learning slot between self-play teams \
                 every swap interval and rates the learning team against frozen opponent \
                 snapshots with ELO. This binary runs a simulated league of concurrent \
                 trainers over the scheduler."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Number of teams override
    #[arg(long, value_name = "N", help = "Override number of teams in the league")]
    teams: Option<u32>,

    /// Steps per team override
    #[arg(long, value_name = "STEPS", help = "Override steps each trainer runs")]
    steps: Option<u64>,

    /// Swap interval override
    #[arg(
        long,
        value_name = "STEPS",
        help = "Override trainer steps between learning-team rotations"
    )]
    swap_interval: Option<u64>,

    /// Seed override
    #[arg(long, value_name = "SEED", help = "Override simulation RNG seed")]
    seed: Option<u64>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Print Prometheus metrics after the run
    #[arg(long, help = "Print collected metrics in Prometheus text format")]
    print_metrics: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without running")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with run information
fn display_startup_banner(config: &AppConfig) {
    info!("Ghost Coordinator {}", ghost_coordinator::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Teams: {}", config.simulation.teams);
    info!("   Steps per team: {}", config.simulation.steps_per_team);
    info!("   Swap interval: {}", config.scheduler.swap_interval);
    info!("   Queue capacity: {}", config.scheduler.queue_capacity);
    info!("   Initial rating: {}", config.rating.initial_rating);
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(config_path) => AppConfig::from_file(config_path)?,
        None => AppConfig::from_env()?,
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(teams) = args.teams {
        config.simulation.teams = teams;
    }

    if let Some(steps) = args.steps {
        config.simulation.steps_per_team = steps;
    }

    if let Some(swap_interval) = args.swap_interval {
        config.scheduler.swap_interval = swap_interval;
    }

    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }

    ghost_coordinator::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful, exiting without running");
        return Ok(());
    }

    let simulation = match LeagueSimulation::new(config) {
        Ok(simulation) => simulation,
        Err(e) => {
            error!("Failed to initialize simulation: {}", e);
            std::process::exit(1);
        }
    };

    let report = tokio::select! {
        report = simulation.run() => report,
        _ = signal::ctrl_c() => {
            warn!("Received SIGINT (Ctrl+C), abandoning the league");
            return Ok(());
        }
    };

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.print_metrics {
        let metrics = simulation.metrics();
        info!(
            "Exporting {} metric families",
            metrics.registry().gather().len()
        );
        print!("{}", metrics.encode_text()?);
    }

    Ok(())
}
