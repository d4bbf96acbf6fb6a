//! Host discovery: CIDR expansion and TTL-based OS fingerprinting.
//!
//! ## Components
//!
//! - **enumerate**: expands a CIDR target into usable host addresses
//! - **probe**: the `EchoProbe` seam and its `ping`-backed implementation
//! - **fingerprint**: TTL classification and the shared classification map
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use evtx_sweep::discovery::{enumerate, ClassificationMap, Fingerprinter, SystemPing};
//!
//! # fn example() -> anyhow::Result<()> {
//! let hosts = enumerate("192.168.1.0/24")?;
//! let results = Arc::new(ClassificationMap::seeded(&hosts));
//! let fingerprinter = Fingerprinter::new(
//!     Arc::new(SystemPing::new(Duration::from_millis(1000))),
//!     Arc::clone(&results),
//! );
//! for host in hosts {
//!     fingerprinter.probe(host);
//! }
//! println!("Windows hosts: {:?}", results.windows_hosts());
//! # Ok(())
//! # }
//! ```

pub mod enumerate;
pub mod fingerprint;
pub mod probe;

pub use enumerate::{enumerate, parse_network};
pub use fingerprint::{classify, ClassificationMap, Fingerprinter};
pub use probe::{EchoProbe, SystemPing};
