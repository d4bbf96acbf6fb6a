//! Output handling for a finished sweep.
//!
//! - **compress**: packs the output root into a sibling ZIP archive
//! - **hash**: SHA-256 of collected logs
//! - **summary**: the JSON report written before archiving
//!
//! ### Archiving an output directory
//!
//! ```no_run
//! use evtx_sweep::utils::compress::compress_directory;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let zip_path = compress_directory(Path::new("/cases/sweep-01"))?;
//! println!("Created archive: {}", zip_path.display());
//! # Ok(())
//! # }
//! ```

pub mod compress;
pub mod hash;
pub mod summary;
