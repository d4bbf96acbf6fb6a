use std::env;
use std::fs;
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use walkdir::WalkDir;
use zip::{write::FileOptions, ZipWriter};

use crate::collectors::copier::partial_path;
use crate::constants::ARCHIVE_EXTENSION;
use crate::errors::SweepError;

/// Absolute form of `path` with `.` and `..` resolved lexically. The path
/// does not need to exist yet.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = if path.is_absolute() {
        PathBuf::new()
    } else {
        env::current_dir()?
    };
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Archive path for `source_dir`: a sibling named `<dir name>.zip`.
///
/// The full directory name is kept, so `out.2024` archives to
/// `out.2024.zip`. A filesystem root has no name to archive under.
pub fn archive_path_for(source_dir: &Path) -> Result<PathBuf, SweepError> {
    let absolute = absolute_path(source_dir).map_err(|e| {
        SweepError::SetupFailure(format!("cannot resolve {}: {}", source_dir.display(), e))
    })?;
    let mut name = absolute
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| {
            SweepError::SetupFailure(format!(
                "{} has no directory name to archive under",
                source_dir.display()
            ))
        })?;
    name.push(".");
    name.push(ARCHIVE_EXTENSION);
    Ok(absolute.with_file_name(name))
}

fn entry_options() -> FileOptions {
    FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(6))
        .unix_permissions(0o644)
}

/// Relative path of `path` under `base`, `/`-separated as ZIP expects.
fn archive_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .map_err(|_| anyhow!("{} is outside {}", path.display(), base.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Ok(parts.join("/"))
}

/// Pack every file under `source_dir` into `<source_dir>.zip`.
///
/// Relative paths are preserved and directories get their own entries.
/// The archive is written to a `.part` file first and renamed on success,
/// so a failed run never leaves a truncated archive behind.
pub fn compress_directory(source_dir: &Path) -> Result<PathBuf> {
    let start = Instant::now();
    if !source_dir.is_dir() {
        return Err(anyhow!("{} is not a directory", source_dir.display()));
    }

    let source_dir = absolute_path(source_dir)
        .context(format!("Failed to resolve {}", source_dir.display()))?;
    let zip_path = archive_path_for(&source_dir)?;
    let staging = partial_path(&zip_path);
    info!("Compressing {} -> {}", source_dir.display(), zip_path.display());

    let result = write_archive(&source_dir, &staging);
    match result {
        Ok(count) => {
            fs::rename(&staging, &zip_path)
                .context(format!("Failed to move archive into place at {}", zip_path.display()))?;
            info!(
                "Compressed {} file(s) into {} in {:?}",
                count,
                zip_path.display(),
                start.elapsed()
            );
            Ok(zip_path)
        }
        Err(e) => {
            let _ = fs::remove_file(&staging);
            Err(e)
        }
    }
}

fn write_archive(source_dir: &Path, zip_path: &Path) -> Result<usize> {
    let zip_file = fs::File::create(zip_path)
        .context(format!("Failed to create zip file {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(zip_file);
    let mut files = 0;

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.context(format!("Failed to walk {}", source_dir.display()))?;
        let name = archive_name(source_dir, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), FileOptions::default())
                .context(format!("Failed to add directory entry {}", name))?;
            continue;
        }

        let file = fs::File::open(entry.path())
            .context(format!("Failed to open {}", entry.path().display()))?;
        let mut reader = BufReader::new(file);

        zip.start_file(name.clone(), entry_options())
            .context(format!("Failed to start file entry for {}", name))?;
        let bytes = io::copy(&mut reader, &mut zip)
            .context(format!("Failed to write {} to zip", name))?;
        debug!("Archived {} ({} bytes)", name, bytes);
        files += 1;
    }

    zip.finish().context("Failed to finalize zip file")?;
    Ok(files)
}
