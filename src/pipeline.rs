//! Sequencing of a full sweep.
//!
//! Enumerate -> fingerprint every host on a pool -> keep the Windows hosts
//! -> collect their logs on a second pool -> write the summary -> archive.
//! The two pools never overlap; collection starts only after fingerprinting
//! has fully drained.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::collectors::copier::FileCopier;
use crate::collectors::remote_logs::{prepare_destination, RemoteLogCollector};
use crate::config::{InvalidNetworkPolicy, SweepConfig};
use crate::discovery::{enumerate, ClassificationMap, EchoProbe, Fingerprinter};
use crate::errors::SweepError;
use crate::models::{CollectionOutcome, HostClassification};
use crate::pool::WorkerPool;
use crate::utils::compress::compress_directory;
use crate::utils::summary::{write_sweep_summary, SweepSummaryInput};

/// What a finished sweep produced.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub classifications: BTreeMap<Ipv4Addr, HostClassification>,
    pub windows_hosts: Vec<Ipv4Addr>,
    pub outcomes: Vec<CollectionOutcome>,
    pub summary_path: PathBuf,
    pub archive_path: Option<PathBuf>,
}

impl SweepReport {
    pub fn collected(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_collected()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.collected()
    }
}

/// Expand the target, honoring the configured parse-failure policy.
pub fn resolve_targets(config: &SweepConfig) -> Result<Vec<Ipv4Addr>, SweepError> {
    match enumerate(&config.network) {
        Ok(hosts) => Ok(hosts),
        Err(e) if config.invalid_network == InvalidNetworkPolicy::Continue => {
            error!("{}; continuing with no hosts", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Probe every host and return the filled classification map.
pub fn fingerprint_hosts(
    hosts: &[Ipv4Addr],
    probe: Arc<dyn EchoProbe>,
    threads: usize,
) -> Result<Arc<ClassificationMap>> {
    let results = Arc::new(ClassificationMap::seeded(hosts));
    let fingerprinter = Fingerprinter::new(probe, Arc::clone(&results));
    let pool = WorkerPool::new("fingerprint", threads)?;

    info!("Fingerprinting {} host(s) with {} worker(s)", hosts.len(), threads);
    let stats = pool.run(hosts.iter().copied(), |host| {
        fingerprinter.probe(host);
    })?;

    let unresolved = results.unresolved();
    if !unresolved.is_empty() {
        warn!("{} host(s) left unclassified: {:?}", unresolved.len(), unresolved);
    }
    info!(
        "Fingerprinting done: {} probed, {} windows, {} other, {} offline",
        stats.processed,
        results.count(HostClassification::Windows),
        results.count(HostClassification::Other),
        results.count(HostClassification::Offline)
    );
    Ok(results)
}

/// Pull the configured logs from every Windows host.
pub fn collect_logs(
    windows_hosts: &[Ipv4Addr],
    collector: &RemoteLogCollector,
    threads: usize,
) -> Result<Vec<CollectionOutcome>> {
    let pool = WorkerPool::new("collect", threads)?;
    let outcomes = Mutex::new(Vec::new());

    info!(
        "Collecting {} log type(s) from {} host(s) with {} worker(s)",
        collector.log_types().len(),
        windows_hosts.len(),
        threads
    );
    pool.run(windows_hosts.iter().copied(), |host| {
        let host_outcomes = collector.collect_host(host);
        outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(host_outcomes);
    })?;

    let mut outcomes = outcomes
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    outcomes.sort_by(|a, b| (a.host, &a.log_type).cmp(&(b.host, &b.log_type)));
    Ok(outcomes)
}

/// Run a whole sweep with the given probe and copier.
pub fn run_sweep(
    config: &SweepConfig,
    probe: Arc<dyn EchoProbe>,
    copier: Arc<dyn FileCopier>,
) -> Result<SweepReport> {
    let started_at = chrono::Utc::now().to_rfc3339();
    config.validate()?;

    let hosts = resolve_targets(config)?;
    info!("Target {} yields {} host(s)", config.network, hosts.len());

    let results = fingerprint_hosts(&hosts, probe, config.threads)?;
    let windows_hosts = results.windows_hosts();

    let outcomes = if windows_hosts.is_empty() {
        info!("No Windows hosts found; skipping log collection");
        Vec::new()
    } else {
        prepare_destination(&config.output_path, &config.log_types)?;
        let collector = RemoteLogCollector::new(
            copier,
            config.source_path.clone(),
            config.output_path.clone(),
            config.log_types.clone(),
        )?;
        collect_logs(&windows_hosts, &collector, config.threads)?
    };

    let classifications = results.snapshot();
    let finished_at = chrono::Utc::now().to_rfc3339();
    let summary_path = write_sweep_summary(
        &config.output_path,
        &SweepSummaryInput {
            network: &config.network,
            started_at: &started_at,
            finished_at: &finished_at,
            classifications: &classifications,
            windows_hosts: &windows_hosts,
            outcomes: &outcomes,
        },
    )
    .map_err(|e| SweepError::SetupFailure(format!("{:#}", e)))?;

    let archive_path = if config.compress {
        Some(compress_directory(&config.output_path).context("Failed to archive output directory")?)
    } else {
        None
    };

    let report = SweepReport {
        classifications,
        windows_hosts,
        outcomes,
        summary_path,
        archive_path,
    };
    info!(
        "Sweep finished: {} log(s) collected, {} failed",
        report.collected(),
        report.failed()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedTtl(u32);

    impl EchoProbe for FixedTtl {
        fn probe(&self, _host: Ipv4Addr) -> Result<u32, SweepError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_resolve_targets_policy() {
        let mut config = SweepConfig {
            network: "not a network".to_string(),
            ..SweepConfig::default()
        };
        assert!(matches!(
            resolve_targets(&config),
            Err(SweepError::InvalidNetwork { .. })
        ));

        config.invalid_network = InvalidNetworkPolicy::Continue;
        assert!(resolve_targets(&config).unwrap().is_empty());
    }

    #[test]
    fn test_fingerprint_hosts_fills_every_entry() {
        let hosts = enumerate("10.1.0.0/26").unwrap();
        let results = fingerprint_hosts(&hosts, Arc::new(FixedTtl(128)), 6).unwrap();
        assert_eq!(results.len(), 62);
        assert!(results.unresolved().is_empty());
        assert_eq!(results.windows_hosts(), hosts);
    }

    #[test]
    fn test_no_windows_hosts_skips_collection() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");
        let config = SweepConfig {
            network: "10.0.0.0/30".to_string(),
            output_path: output.clone(),
            ..SweepConfig::default()
        };

        let copier = crate::collectors::copier::MockFileCopier::new();
        let report = run_sweep(&config, Arc::new(FixedTtl(64)), Arc::new(copier)).unwrap();

        assert!(report.windows_hosts.is_empty());
        assert!(report.outcomes.is_empty());
        assert!(!output.join("Security").exists());
        assert!(report.summary_path.exists());
    }
}
