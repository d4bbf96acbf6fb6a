use std::collections::BTreeMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde_json::json;
use uuid::Uuid;

use crate::constants::SUMMARY_FILE_NAME;
use crate::models::{CollectionOutcome, HostClassification};

/// Inputs for the sweep summary.
pub struct SweepSummaryInput<'a> {
    pub network: &'a str,
    pub started_at: &'a str,
    pub finished_at: &'a str,
    pub classifications: &'a BTreeMap<Ipv4Addr, HostClassification>,
    pub windows_hosts: &'a [Ipv4Addr],
    pub outcomes: &'a [CollectionOutcome],
}

/// Create a JSON summary of the sweep.
///
/// The summary records every host's classification and every collection
/// attempt (with size and SHA-256 for the files that arrived), which is what
/// an analyst needs to account for the contents of the output directory.
///
/// # Example Output
///
/// ```json
/// {
///   "sweep_id": "550e8400-e29b-41d4-a716-446655440000",
///   "collector_host": "analyst-01",
///   "network": "10.0.0.0/24",
///   "host_count": 254,
///   "hosts": { "10.0.0.1": "windows", "10.0.0.2": "offline" },
///   "windows_hosts": ["10.0.0.1"],
///   "collections": [...]
/// }
/// ```
pub fn create_sweep_summary(input: &SweepSummaryInput<'_>) -> Result<String> {
    let collector_host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let hosts: BTreeMap<String, HostClassification> = input
        .classifications
        .iter()
        .map(|(host, class)| (host.to_string(), *class))
        .collect();

    let collected = input.outcomes.iter().filter(|o| o.is_collected()).count();

    let summary = json!({
        "sweep_id": Uuid::new_v4().to_string(),
        "collector_host": collector_host,
        "tool_version": env!("CARGO_PKG_VERSION"),
        "network": input.network,
        "started_at": input.started_at,
        "finished_at": input.finished_at,
        "host_count": input.classifications.len(),
        "hosts": hosts,
        "windows_hosts": input.windows_hosts,
        "collections_attempted": input.outcomes.len(),
        "collections_succeeded": collected,
        "collections": input.outcomes,
    });

    serde_json::to_string_pretty(&summary).context("Failed to serialize sweep summary to JSON")
}

/// Write the summary into `output_root` and return its path.
pub fn write_sweep_summary(output_root: &Path, input: &SweepSummaryInput<'_>) -> Result<PathBuf> {
    let summary = create_sweep_summary(input)?;
    fs::create_dir_all(output_root)
        .context(format!("Failed to create output directory {}", output_root.display()))?;

    let path = output_root.join(SUMMARY_FILE_NAME);
    fs::write(&path, summary).context(format!("Failed to write summary to {}", path.display()))?;
    info!("Sweep summary written to {}", path.display());
    Ok(path)
}
