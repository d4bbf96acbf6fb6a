use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use evtx_sweep::cli::{Args, Commands};
use evtx_sweep::collectors::ShareCopier;
use evtx_sweep::config::{resolve_config, SweepConfig};
use evtx_sweep::discovery::SystemPing;
use evtx_sweep::pipeline::run_sweep;

fn main() -> ExitCode {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    if let Err(e) = initialize_logging(&args) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the specified verbosity level.
///
/// Every line carries the level and the target (the component's module path).
fn initialize_logging(args: &Args) -> Result<()> {
    let log_level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .context(format!("Failed to create log file {}", path.display()))?;
        loggers.push(WriteLogger::new(log_level, config, file));
    }

    CombinedLogger::init(loggers).context("Failed to initialize logger")?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    // Handle subcommands
    if let Some(Commands::InitConfig { path }) = &args.command {
        info!("Creating default configuration file at {}", path.display());
        SweepConfig::create_default_config_file(path)?;
        return Ok(());
    }

    let config = resolve_config(args)?;
    info!("Starting event-log sweep of {}", config.network);

    let probe = Arc::new(SystemPing::new(config.probe_timeout()));
    let copier = Arc::new(ShareCopier::new(config.copy_timeout()));
    let report = run_sweep(&config, probe, copier)?;

    info!(
        "{} host(s) scanned, {} Windows, {} log(s) collected, {} failed",
        report.classifications.len(),
        report.windows_hosts.len(),
        report.collected(),
        report.failed()
    );
    if let Some(archive) = &report.archive_path {
        info!("Archive: {}", archive.display());
    }
    Ok(())
}
