use std::net::Ipv4Addr;
use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for a sweep.
///
/// Per-item variants (`ProbeFailure`, `CopyFailure`) are absorbed where they
/// occur and only ever show up in logs and in the run summary. The structural
/// variants propagate to `main` and end the run with a non-zero status.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("invalid network '{input}': {reason}")]
    InvalidNetwork { input: String, reason: String },

    #[error("probe of {host} failed: {reason}")]
    ProbeFailure { host: Ipv4Addr, reason: String },

    #[error("copy {source_path} -> {destination} failed: {reason}")]
    CopyFailure {
        source_path: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    #[error("setup failed: {0}")]
    SetupFailure(String),

    #[error("source path '{0}' has no drive letter")]
    InvalidSourcePath(String),
}

impl SweepError {
    pub fn probe(host: Ipv4Addr, reason: impl Into<String>) -> Self {
        SweepError::ProbeFailure {
            host,
            reason: reason.into(),
        }
    }
}
