//! Run configuration.
//!
//! A `SweepConfig` is built once in `main` (YAML file if given, then
//! explicit command-line flags on top) and handed to every component. There
//! is no process-wide settings object.

pub mod sweep_config;

use anyhow::Result;
use log::info;

pub use sweep_config::{InvalidNetworkPolicy, SweepConfig};

use crate::cli::Args;

/// Build the effective configuration from an optional YAML file and the
/// command-line flags. Flags that were given always win.
pub fn resolve_config(args: &Args) -> Result<SweepConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            SweepConfig::from_yaml_file(path)?
        }
        None => SweepConfig::default(),
    };

    if let Some(network) = &args.network {
        config.network = network.clone();
    }
    if let Some(input) = &args.input {
        config.source_path = input.clone();
    }
    if let Some(output) = &args.output {
        config.output_path = output.into();
    }
    if let Some(log_types) = &args.log_types {
        config.log_types = log_types.clone();
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(probe_timeout) = args.probe_timeout {
        config.probe_timeout_ms = probe_timeout;
    }
    if let Some(copy_timeout) = args.copy_timeout {
        config.copy_timeout_secs = copy_timeout;
    }
    if args.compress {
        config.compress = true;
    }
    if args.allow_empty_scan {
        config.invalid_network = InvalidNetworkPolicy::Continue;
    }

    config.normalize();
    Ok(config)
}
