//! Global constants for evtx-sweep.
//!
//! Centralizes the fingerprinting thresholds, defaults and file-layout
//! names so the rest of the crate never hardcodes them.

use std::time::Duration;

// Fingerprinting
/// TTL values strictly above this are candidates for Windows (default TTL 128).
pub const WINDOWS_TTL_LOWER_EXCLUSIVE: u32 = 120;

/// TTL values strictly below this are candidates for Windows.
pub const WINDOWS_TTL_UPPER_EXCLUSIVE: u32 = 140;

/// TTL reported for a host that did not answer.
pub const OFFLINE_TTL: u32 = 0;

/// Shortest accepted prefix. A /8 already expands to 16,777,214 hosts.
pub const MIN_NETWORK_PREFIX: u8 = 8;

// Defaults
/// Default number of workers per phase
pub const DEFAULT_THREADS: usize = 4;

/// Default per-probe timeout in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;

/// Default per-copy timeout in seconds
pub const DEFAULT_COPY_TIMEOUT_SECS: u64 = 300;

/// Remote directory holding the event logs on a stock Windows install
pub const DEFAULT_SOURCE_PATH: &str = "C:/Windows/System32/winevt/Logs";

/// Log channels fetched when none are given
pub const DEFAULT_LOG_TYPES: &[&str] = &["Security", "System", "Application"];

// File layout
/// Extension of Windows event-log files
pub const EVTX_EXTENSION: &str = "evtx";

/// Extension of the finished archive
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Suffix of staging files that are renamed into place once complete
pub const PARTIAL_SUFFIX: &str = "part";

/// Name of the JSON report written into the output root
pub const SUMMARY_FILE_NAME: &str = "sweep_summary.json";

// Process handling
/// How often a child `ping` is polled for exit
pub const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Grace added on top of the probe timeout before the child is killed
pub const PROBE_DEADLINE_GRACE: Duration = Duration::from_millis(500);

/// Chunk size for hashing collected logs (1MB)
pub const HASH_BUFFER_SIZE: usize = 1024 * 1024;
