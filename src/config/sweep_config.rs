use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::collectors::remote_logs::split_drive;
use crate::constants::{
    DEFAULT_COPY_TIMEOUT_SECS, DEFAULT_LOG_TYPES, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_SOURCE_PATH,
    DEFAULT_THREADS,
};
use crate::errors::SweepError;
use crate::utils::compress::archive_path_for;

/// What to do when the network target does not parse.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidNetworkPolicy {
    /// Stop the run with a non-zero exit status.
    #[default]
    Abort,
    /// Log the error and carry on with no hosts.
    Continue,
}

/// Everything a sweep needs, passed explicitly to each component.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    pub network: String,
    pub source_path: String,
    pub output_path: PathBuf,
    pub log_types: Vec<String>,
    pub threads: usize,
    pub compress: bool,
    pub probe_timeout_ms: u64,
    pub copy_timeout_secs: u64,
    pub invalid_network: InvalidNetworkPolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            network: String::new(),
            source_path: DEFAULT_SOURCE_PATH.to_string(),
            output_path: PathBuf::new(),
            log_types: DEFAULT_LOG_TYPES.iter().map(|t| t.to_string()).collect(),
            threads: DEFAULT_THREADS,
            compress: false,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            copy_timeout_secs: DEFAULT_COPY_TIMEOUT_SECS,
            invalid_network: InvalidNetworkPolicy::Abort,
        }
    }
}

/// Turn Windows separators into forward slashes, as typed paths may use either.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

impl SweepConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: SweepConfig =
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml).context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Create a default configuration YAML file
    pub fn create_default_config_file(path: &Path) -> Result<()> {
        Self::default().save_to_yaml_file(path)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn copy_timeout(&self) -> Duration {
        Duration::from_secs(self.copy_timeout_secs)
    }

    /// Normalize user-typed paths and drop blank or repeated log types.
    pub fn normalize(&mut self) {
        self.source_path = normalize_separators(self.source_path.trim());
        self.output_path = PathBuf::from(normalize_separators(&self.output_path.to_string_lossy()));

        let mut seen = Vec::with_capacity(self.log_types.len());
        for log_type in self.log_types.drain(..) {
            let log_type = log_type.trim().to_string();
            if !log_type.is_empty() && !seen.contains(&log_type) {
                seen.push(log_type);
            }
        }
        self.log_types = seen;
    }

    /// Check the structural settings a run cannot start without.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.threads == 0 {
            return Err(SweepError::SetupFailure("thread count must be at least 1".to_string()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(SweepError::SetupFailure("no output directory given".to_string()));
        }
        if self.log_types.is_empty() {
            return Err(SweepError::SetupFailure("no log types given".to_string()));
        }
        if let Some(bad) = self
            .log_types
            .iter()
            .find(|t| t.contains(|c: char| c == '/' || c == '\\') || t.as_str() == "." || t.as_str() == "..")
        {
            return Err(SweepError::SetupFailure(format!("invalid log type '{}'", bad)));
        }
        split_drive(&self.source_path)?;
        if self.compress {
            archive_path_for(&self.output_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid() -> SweepConfig {
        SweepConfig {
            network: "10.0.0.0/30".to_string(),
            output_path: PathBuf::from("/tmp/sweep"),
            ..SweepConfig::default()
        }
    }

    #[test]
    fn test_defaults_match_tool_defaults() {
        let config = SweepConfig::default();
        assert_eq!(config.threads, 4);
        assert_eq!(config.source_path, "C:/Windows/System32/winevt/Logs");
        assert_eq!(config.log_types, vec!["Security", "System", "Application"]);
        assert!(!config.compress);
        assert_eq!(config.invalid_network, InvalidNetworkPolicy::Abort);
    }

    #[test]
    fn test_yaml_round_trip_with_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sweep.yaml");
        fs::write(
            &path,
            "network: 192.168.10.0/24\nthreads: 16\ninvalid_network: continue\nlog_types: [Security]\n",
        )
        .unwrap();

        let config = SweepConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.network, "192.168.10.0/24");
        assert_eq!(config.threads, 16);
        assert_eq!(config.invalid_network, InvalidNetworkPolicy::Continue);
        assert_eq!(config.log_types, vec!["Security"]);
        assert_eq!(config.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);

        let saved = temp_dir.path().join("saved.yaml");
        config.save_to_yaml_file(&saved).unwrap();
        assert_eq!(SweepConfig::from_yaml_file(&saved).unwrap(), config);
    }

    #[test]
    fn test_normalize_paths_and_log_types() {
        let mut config = SweepConfig {
            source_path: r"C:\Windows\System32\winevt\Logs".to_string(),
            output_path: PathBuf::from(r"D:\cases\out"),
            log_types: vec![" Security".into(), "".into(), "System".into(), "Security".into()],
            ..valid()
        };
        config.normalize();
        assert_eq!(config.source_path, "C:/Windows/System32/winevt/Logs");
        assert_eq!(config.output_path, PathBuf::from("D:/cases/out"));
        assert_eq!(config.log_types, vec!["Security", "System"]);
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let zero = SweepConfig { threads: 0, ..valid() };
        assert!(matches!(zero.validate(), Err(SweepError::SetupFailure(_))));

        let no_drive = SweepConfig { source_path: "/var/log".into(), ..valid() };
        assert!(matches!(no_drive.validate(), Err(SweepError::InvalidSourcePath(_))));

        let no_output = SweepConfig { output_path: PathBuf::new(), ..valid() };
        assert!(no_output.validate().is_err());

        let traversal = SweepConfig { log_types: vec!["../Security".into()], ..valid() };
        assert!(traversal.validate().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_archive_root_needs_a_name() {
        let root = SweepConfig { output_path: PathBuf::from("/"), compress: true, ..valid() };
        assert!(matches!(root.validate(), Err(SweepError::SetupFailure(_))));

        // Without compression the root is never archived
        let root = SweepConfig { output_path: PathBuf::from("/"), ..valid() };
        assert!(root.validate().is_ok());

        let dotted = SweepConfig { output_path: PathBuf::from("/cases/out.2024"), compress: true, ..valid() };
        assert!(dotted.validate().is_ok());
    }
}
