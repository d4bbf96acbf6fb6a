use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::collectors::copier::FileCopier;
use crate::constants::EVTX_EXTENSION;
use crate::errors::SweepError;
use crate::models::{CollectionJob, CollectionOutcome, CollectionStatus};
use crate::utils::hash::calculate_sha256;

/// Split a local-style Windows path into its drive letter and the
/// backslash-joined remainder, e.g. `C:/Windows/Logs` -> (`C`, `Windows\Logs`).
pub fn split_drive(source: &str) -> Result<(char, String), SweepError> {
    let mut chars = source.chars();
    let drive = match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => letter.to_ascii_uppercase(),
        _ => return Err(SweepError::InvalidSourcePath(source.to_string())),
    };

    let subpath = source[2..]
        .split(|c: char| c == '/' || c == '\\')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("\\");

    Ok((drive, subpath))
}

/// Administrative-share path of one log on one host:
/// `\\<host>\<drive>$\<subpath>\<logType>.evtx`.
pub fn remote_log_path(host: Ipv4Addr, source: &str, log_type: &str) -> Result<String, SweepError> {
    let (drive, subpath) = split_drive(source)?;
    let file_name = format!("{}.{}", log_type, EVTX_EXTENSION);

    if subpath.is_empty() {
        Ok(format!("\\\\{}\\{}$\\{}", host, drive, file_name))
    } else {
        Ok(format!("\\\\{}\\{}$\\{}\\{}", host, drive, subpath, file_name))
    }
}

/// Local destination of one log: `<dest_root>/<logType>/<logType>_<host>.evtx`.
pub fn local_log_path(dest_root: &Path, host: Ipv4Addr, log_type: &str) -> PathBuf {
    dest_root
        .join(log_type)
        .join(format!("{}_{}.{}", log_type, host, EVTX_EXTENSION))
}

/// Create one folder per log type under `dest_root`, before any copy runs.
pub fn prepare_destination(dest_root: &Path, log_types: &[String]) -> Result<(), SweepError> {
    for log_type in log_types {
        let dir = dest_root.join(log_type);
        fs::create_dir_all(&dir).map_err(|e| {
            SweepError::SetupFailure(format!("cannot create {}: {}", dir.display(), e))
        })?;
        debug!("Prepared destination folder {}", dir.display());
    }
    Ok(())
}

/// Pulls the configured event logs from one Windows host.
pub struct RemoteLogCollector {
    copier: Arc<dyn FileCopier>,
    source: String,
    dest_root: PathBuf,
    log_types: Vec<String>,
}

impl RemoteLogCollector {
    pub fn new(
        copier: Arc<dyn FileCopier>,
        source: impl Into<String>,
        dest_root: impl Into<PathBuf>,
        log_types: Vec<String>,
    ) -> Result<Self, SweepError> {
        let source = source.into();
        split_drive(&source)?;
        Ok(Self {
            copier,
            source,
            dest_root: dest_root.into(),
            log_types,
        })
    }

    pub fn log_types(&self) -> &[String] {
        &self.log_types
    }

    /// Build the job for one (host, log type) pair.
    pub fn job(&self, host: Ipv4Addr, log_type: &str) -> Result<CollectionJob, SweepError> {
        Ok(CollectionJob {
            host,
            log_type: log_type.to_string(),
            source: PathBuf::from(remote_log_path(host, &self.source, log_type)?),
            destination: local_log_path(&self.dest_root, host, log_type),
        })
    }

    /// Copy every configured log type from `host`.
    ///
    /// Each job stands alone: a failed copy is logged and recorded, and the
    /// remaining log types are still attempted.
    pub fn collect_host(&self, host: Ipv4Addr) -> Vec<CollectionOutcome> {
        self.log_types
            .iter()
            .map(|log_type| self.collect_one(host, log_type))
            .collect()
    }

    fn collect_one(&self, host: Ipv4Addr, log_type: &str) -> CollectionOutcome {
        let job = match self.job(host, log_type) {
            Ok(job) => job,
            Err(e) => {
                warn!("Skipping {} on {}: {}", log_type, host, e);
                return CollectionOutcome {
                    host,
                    log_type: log_type.to_string(),
                    source: self.source.clone(),
                    destination: local_log_path(&self.dest_root, host, log_type)
                        .to_string_lossy()
                        .to_string(),
                    status: CollectionStatus::Failed { error: e.to_string() },
                };
            }
        };

        let status = match self.copier.copy(&job.source, &job.destination) {
            Ok(file_size) => {
                info!("Collected {} from {} ({} bytes)", job.log_type, host, file_size);
                let sha256 = match calculate_sha256(&job.destination) {
                    Ok(hash) => Some(hash),
                    Err(e) => {
                        debug!("Could not hash {}: {}", job.destination.display(), e);
                        None
                    }
                };
                CollectionStatus::Collected {
                    file_size,
                    sha256,
                    collection_time: chrono::Utc::now().to_rfc3339(),
                }
            }
            Err(e) => {
                let failure = SweepError::CopyFailure {
                    source_path: job.source.clone(),
                    destination: job.destination.clone(),
                    reason: format!("{:#}", e),
                };
                warn!("{}", failure);
                CollectionStatus::Failed {
                    error: failure.to_string(),
                }
            }
        };

        CollectionOutcome {
            host,
            log_type: job.log_type,
            source: job.source.to_string_lossy().to_string(),
            destination: job.destination.to_string_lossy().to_string(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::copier::MockFileCopier;
    use anyhow::anyhow;
    use tempfile::TempDir;

    const SOURCE: &str = "C:/Windows/System32/winevt/Logs";

    #[test]
    fn test_remote_path_forward_slashes() {
        let path = remote_log_path(Ipv4Addr::new(10, 0, 0, 1), SOURCE, "Security").unwrap();
        assert_eq!(path, r"\\10.0.0.1\C$\Windows\System32\winevt\Logs\Security.evtx");
    }

    #[test]
    fn test_remote_path_backslashes_and_lowercase_drive() {
        let path = remote_log_path(
            Ipv4Addr::new(192, 168, 1, 20),
            r"d:\EventLogs\Archive\",
            "System",
        )
        .unwrap();
        assert_eq!(path, r"\\192.168.1.20\D$\EventLogs\Archive\System.evtx");
    }

    #[test]
    fn test_remote_path_drive_root() {
        let path = remote_log_path(Ipv4Addr::new(10, 0, 0, 1), "E:/", "Application").unwrap();
        assert_eq!(path, r"\\10.0.0.1\E$\Application.evtx");
    }

    #[test]
    fn test_source_without_drive_rejected() {
        for bad in ["/var/log", "Windows/Logs", "", "1:/Logs"] {
            assert!(
                matches!(split_drive(bad), Err(SweepError::InvalidSourcePath(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_local_path_layout() {
        let path = local_log_path(Path::new("D:/out"), Ipv4Addr::new(10, 0, 0, 1), "Security");
        assert_eq!(
            path,
            Path::new("D:/out").join("Security").join("Security_10.0.0.1.evtx")
        );
        #[cfg(not(windows))]
        assert_eq!(path.to_string_lossy(), "D:/out/Security/Security_10.0.0.1.evtx");
    }

    #[test]
    fn test_prepare_destination_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let types = vec!["Security".to_string(), "System".to_string()];
        prepare_destination(temp_dir.path(), &types).unwrap();
        prepare_destination(temp_dir.path(), &types).unwrap();
        assert!(temp_dir.path().join("Security").is_dir());
        assert!(temp_dir.path().join("System").is_dir());
    }

    #[test]
    fn test_prepare_destination_unwritable_root() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();
        let result = prepare_destination(&blocker, &["Security".to_string()]);
        assert!(matches!(result, Err(SweepError::SetupFailure(_))));
    }

    #[test]
    fn test_job_paths() {
        let collector = RemoteLogCollector::new(
            Arc::new(MockFileCopier::new()),
            SOURCE,
            "D:/out",
            vec!["Security".to_string()],
        )
        .unwrap();
        let job = collector.job(Ipv4Addr::new(10, 0, 0, 1), "Security").unwrap();
        assert_eq!(
            job.source,
            PathBuf::from(r"\\10.0.0.1\C$\Windows\System32\winevt\Logs\Security.evtx")
        );
        assert_eq!(job.destination, local_log_path(Path::new("D:/out"), job.host, "Security"));
    }

    #[test]
    fn test_failed_log_type_does_not_block_siblings() {
        let temp_dir = TempDir::new().unwrap();
        let host = Ipv4Addr::new(10, 0, 0, 1);

        let mut copier = MockFileCopier::new();
        copier
            .expect_copy()
            .withf(|source, _| source.to_string_lossy().ends_with("System.evtx"))
            .times(1)
            .returning(|_, _| Err(anyhow!("access denied")));
        copier
            .expect_copy()
            .withf(|source, _| source.to_string_lossy().ends_with("Security.evtx"))
            .times(1)
            .returning(|_, _| Ok(4096));

        let collector = RemoteLogCollector::new(
            Arc::new(copier),
            SOURCE,
            temp_dir.path(),
            vec!["Security".to_string(), "System".to_string()],
        )
        .unwrap();

        let outcomes = collector.collect_host(host);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_collected());
        assert!(!outcomes[1].is_collected());
        match &outcomes[1].status {
            CollectionStatus::Failed { error } => assert!(error.contains("access denied")),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_rejects_source_without_drive() {
        let result = RemoteLogCollector::new(
            Arc::new(MockFileCopier::new()),
            "/var/log",
            "out",
            vec!["Security".to_string()],
        );
        assert!(matches!(result, Err(SweepError::InvalidSourcePath(_))));
    }
}
