//! Event-log collection from Windows hosts over administrative shares.
//!
//! ## Layout
//!
//! ```text
//! <output_root>/
//! ├── Security/
//! │   ├── Security_10.0.0.1.evtx
//! │   └── Security_10.0.0.7.evtx
//! ├── System/
//! │   └── System_10.0.0.1.evtx
//! └── sweep_summary.json
//! ```
//!
//! - **remote_logs**: path construction and the per-host collector
//! - **copier**: the `FileCopier` seam and the staging/timeout copy

pub mod copier;
pub mod remote_logs;

pub use copier::{FileCopier, ShareCopier};
pub use remote_logs::{local_log_path, prepare_destination, remote_log_path, RemoteLogCollector};
