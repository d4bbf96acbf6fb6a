//! File transfer from administrative shares.
//!
//! `ShareCopier` stages every copy in a `.part` file next to the final
//! destination and renames it into place only when the copy completed, so a
//! destination is either a whole log file or absent.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{bounded, RecvTimeoutError};
use log::debug;

use crate::constants::PARTIAL_SUFFIX;

/// Copies one remote file to one local destination.
#[cfg_attr(test, mockall::automock)]
pub trait FileCopier: Send + Sync {
    /// Returns the number of bytes written.
    fn copy(&self, source: &Path, destination: &Path) -> Result<u64>;
}

/// Staging path used while `destination` is being written.
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

/// `FileCopier` over `std::fs::copy`, which resolves `\\host\C$\...` UNC
/// paths on Windows.
#[derive(Debug, Clone)]
pub struct ShareCopier {
    timeout: Duration,
}

impl ShareCopier {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl FileCopier for ShareCopier {
    fn copy(&self, source: &Path, destination: &Path) -> Result<u64> {
        let staging = partial_path(destination);
        let abandoned = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = bounded::<std::io::Result<u64>>(1);

        let transfer = {
            let source = source.to_path_buf();
            let staging = staging.clone();
            let abandoned = Arc::clone(&abandoned);
            move || {
                let result = fs::copy(&source, &staging);
                if abandoned.load(Ordering::SeqCst) || result.is_err() {
                    let _ = fs::remove_file(&staging);
                }
                let _ = sender.send(result);
            }
        };

        thread::Builder::new()
            .name("share-copy".to_string())
            .spawn(transfer)
            .context("Failed to spawn copy thread")?;

        let bytes = match receiver.recv_timeout(self.timeout) {
            Ok(result) => result.context(format!("Failed to copy {}", source.display()))?,
            Err(RecvTimeoutError::Timeout) => {
                // Whichever side observes the flag last removes the staging file
                abandoned.store(true, Ordering::SeqCst);
                let _ = fs::remove_file(&staging);
                return Err(anyhow!(
                    "Copy of {} timed out after {:?}",
                    source.display(),
                    self.timeout
                ));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(anyhow!("Copy thread for {} exited without a result", source.display()));
            }
        };

        if let Err(e) = fs::rename(&staging, destination) {
            let _ = fs::remove_file(&staging);
            return Err(e).context(format!(
                "Failed to move {} into place at {}",
                staging.display(),
                destination.display()
            ));
        }

        debug!("Copied {} ({} bytes) to {}", source.display(), bytes, destination.display());
        Ok(bytes)
    }
}
