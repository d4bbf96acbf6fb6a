use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// OS bucket a host falls into after a single echo probe.
///
/// `Unknown` only seeds the classification map; `classify` never returns it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HostClassification {
    Unknown,
    Windows,
    Other,
    Offline,
}

impl fmt::Display for HostClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostClassification::Unknown => "unknown",
            HostClassification::Windows => "windows",
            HostClassification::Other => "other",
            HostClassification::Offline => "offline",
        };
        write!(f, "{}", name)
    }
}

/// One (host, log type) copy, built per work item and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionJob {
    pub host: Ipv4Addr,
    pub log_type: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CollectionStatus {
    Collected {
        file_size: u64,
        sha256: Option<String>,
        collection_time: String,
    },
    Failed {
        error: String,
    },
}

/// Result of one collection job, as recorded in the run summary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CollectionOutcome {
    pub host: Ipv4Addr,
    pub log_type: String,
    pub source: String,
    pub destination: String,
    #[serde(flatten)]
    pub status: CollectionStatus,
}

impl CollectionOutcome {
    pub fn is_collected(&self) -> bool {
        matches!(self.status, CollectionStatus::Collected { .. })
    }
}
