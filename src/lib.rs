//! # evtx-sweep
//!
//! Sweeps an IPv4 network for Windows hosts and pulls their event logs over
//! the administrative shares.
//!
//! ## Overview
//!
//! A sweep runs in two strictly separated phases, each on its own bounded
//! worker pool:
//!
//! 1. **Fingerprinting**: every usable address in the target CIDR gets one
//!    echo probe. The reply TTL puts the host into Windows (120 < TTL < 140),
//!    Other, or Offline (no reply).
//! 2. **Collection**: for each Windows host, every requested log type is
//!    copied from `\\<host>\<drive>$\<path>\<type>.evtx` into
//!    `<output>/<type>/<type>_<host>.evtx`.
//!
//! A JSON summary is then written into the output directory, which can
//! optionally be zipped.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use evtx_sweep::config::SweepConfig;
//! use evtx_sweep::collectors::ShareCopier;
//! use evtx_sweep::discovery::SystemPing;
//! use evtx_sweep::pipeline::run_sweep;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SweepConfig {
//!     network: "192.168.1.0/24".to_string(),
//!     output_path: "C:/cases/sweep-01".into(),
//!     ..SweepConfig::default()
//! };
//!
//! let report = run_sweep(
//!     &config,
//!     Arc::new(SystemPing::new(config.probe_timeout())),
//!     Arc::new(ShareCopier::new(config.copy_timeout())),
//! )?;
//! println!("Collected {} logs from {} hosts", report.collected(), report.windows_hosts.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: command-line interface definitions
//! - [`config`]: run configuration (YAML + flags)
//! - [`pool`]: the bounded worker pool both phases run on
//! - [`discovery`]: CIDR expansion, echo probing, TTL classification
//! - [`collectors`]: admin-share log collection
//! - [`utils`]: archiving, hashing, run summary
//! - [`pipeline`]: phase sequencing
//! - [`models`], [`errors`], [`constants`]: shared types and values

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Run configuration
pub mod config;

/// Application constants
pub mod constants;

/// Error taxonomy
pub mod errors;

/// Core data models
pub mod models;

/// Bounded worker pool
pub mod pool;

/// Host enumeration and OS fingerprinting
pub mod discovery;

/// Remote event-log collection
pub mod collectors;

/// Archiving, hashing and reporting
pub mod utils;

/// Sweep orchestration
pub mod pipeline;

pub use errors::SweepError;
pub use models::HostClassification;
