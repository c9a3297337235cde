//! I/O operations for the declared-dependency file.
//!
//! - [`load_config`] reads and parses `vendor.conf`
//! - [`write_config`] writes the two-field form (used by `vndr init` and the
//!   validation suggestion)
//! - [`suggestion_path`] names the suggested-fix file next to the config

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::constants::SUGGESTION_SUFFIX;
use crate::core::VndrError;
use crate::manifest::{DependencyEntry, ParseMode, parse_deps, serialize_deps};
use crate::utils::fs::atomic_write;

/// Read and parse a declared-dependency file.
///
/// # Errors
///
/// - [`VndrError::ConfigNotFound`] if the file cannot be read
/// - [`VndrError::InvalidConfigFormat`] (with "Failed to parse config" context)
///   for a malformed line
pub fn load_config(path: &Path, mode: ParseMode) -> Result<Vec<DependencyEntry>> {
    let text = std::fs::read_to_string(path).map_err(|e| VndrError::ConfigNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let deps = parse_deps(&text, mode).context("Failed to parse config")?;
    tracing::debug!("Read {} dependencies from {}", deps.len(), path.display());
    Ok(deps)
}

/// Write entries to `path` in the two-field config format.
pub fn write_config(path: &Path, entries: &[DependencyEntry]) -> Result<()> {
    atomic_write(path, serialize_deps(entries).as_bytes())
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Path of the suggested-fix file for a given config file (`vendor.conf.tmp`).
pub fn suggestion_path(config: &Path) -> PathBuf {
    let mut name = config.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(SUGGESTION_SUFFIX);
    config.with_file_name(name)
}
