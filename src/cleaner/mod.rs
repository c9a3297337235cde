//! Pruning of the vendor tree down to the import closure.
//!
//! After fetching, `vendor/` holds whole repositories. [`clean_vendor`] keeps
//! only what the build needs:
//!
//! - files directly inside a package of the [`PackageClosure`]
//! - license files in directories above a closure package, so a repository's
//!   top-level `LICENSE` survives even when only a sub-package is used
//! - anything whose vendor-relative path matches a [`Whitelist`] pattern,
//!   including the whole subtree below a matching directory
//!
//! Everything else is deleted, then directories left empty are removed
//! bottom-up. A second run over the same tree changes nothing.
//!
//! [`check_unused`] and [`check_license`] inspect the pruned tree afterwards;
//! they only report and never modify it.

pub mod license;

use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::collector::PackageClosure;
use crate::core::{VndrError, Warnings};
use crate::git::import_dir;
use crate::manifest::DependencyEntry;
use crate::utils::slash_relative;

pub use license::{has_license_file, is_license_file};

/// Vendor-relative path patterns that are never pruned.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    patterns: Vec<Regex>,
}

impl Whitelist {
    /// Compile the `--whitelist` values.
    ///
    /// # Errors
    ///
    /// [`VndrError::InvalidWhitelist`] for the first pattern that does not compile.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self, VndrError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| VndrError::InvalidWhitelist {
                    pattern: p.as_ref().to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Whether `rel` (slash-separated, relative to `vendor/`) is protected.
    /// Directories are also tried with a trailing `/`.
    pub fn is_match(&self, rel: &str, is_dir: bool) -> bool {
        self.patterns.iter().any(|re| re.is_match(rel) || (is_dir && re.is_match(&format!("{rel}/"))))
    }
}

/// What a [`clean_vendor`] pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Files deleted.
    pub removed_files: usize,
    /// Directories deleted because they ended up empty.
    pub removed_dirs: usize,
    /// Whitelisted paths that were left untouched, vendor-relative.
    pub preserved: Vec<String>,
}

impl CleanReport {
    /// Whether the pass changed nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.removed_files == 0 && self.removed_dirs == 0
    }
}

/// Delete everything below `vendor_root` the closure does not need.
///
/// A missing vendor root is not an error; there is nothing to clean.
///
/// # Errors
///
/// [`VndrError::Reconciliation`] when the tree cannot be read or an entry
/// cannot be removed.
pub fn clean_vendor(vendor_root: &Path, closure: &PackageClosure, whitelist: &Whitelist) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    if !vendor_root.is_dir() {
        return Ok(report);
    }

    let packages: HashSet<&str> = closure.import_paths().collect();
    let ancestors: HashSet<&str> = closure
        .import_paths()
        .flat_map(|path| path.match_indices('/').map(move |(i, _)| &path[..i]))
        .chain(std::iter::once(""))
        .collect();

    let mut doomed = Vec::new();
    let mut dirs = Vec::new();
    let walker = WalkDir::new(vendor_root).min_depth(1).into_iter().filter_entry(|entry| {
        let rel = slash_relative(vendor_root, entry.path()).unwrap_or_default();
        if whitelist.is_match(&rel, entry.file_type().is_dir()) {
            report.preserved.push(rel);
            return false;
        }
        true
    });
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(vendor_root, &e))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
            continue;
        }
        let rel = slash_relative(vendor_root, entry.path()).unwrap_or_default();
        let (parent, name) = rel.rsplit_once('/').unwrap_or(("", rel.as_str()));

        let keep = packages.contains(parent) || (ancestors.contains(parent) && is_license_file(name));
        if !keep {
            doomed.push(entry.into_path());
        }
    }

    for path in &doomed {
        std::fs::remove_file(path).map_err(|e| reconciliation_error(path, &e))?;
    }
    report.removed_files = doomed.len();

    // Pre-order listing reversed: children come before their parents.
    for dir in dirs.iter().rev() {
        let mut entries = std::fs::read_dir(dir).map_err(|e| reconciliation_error(dir, &e))?;
        if entries.next().is_none() {
            std::fs::remove_dir(dir).map_err(|e| reconciliation_error(dir, &e))?;
            report.removed_dirs += 1;
        }
    }

    tracing::debug!(
        "Removed {} files and {} directories from {}",
        report.removed_files,
        report.removed_dirs,
        vendor_root.display()
    );
    Ok(report)
}

fn reconciliation_error(path: &Path, err: &std::io::Error) -> VndrError {
    VndrError::Reconciliation {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn walk_error(vendor_root: &Path, err: &walkdir::Error) -> VndrError {
    VndrError::Reconciliation {
        path: err.path().unwrap_or(vendor_root).display().to_string(),
        reason: err.to_string(),
    }
}

/// Warn about declared dependencies that have no directory in the vendor tree.
///
/// Returns the import paths warned about.
pub fn check_unused(entries: &[DependencyEntry], vendor_root: &Path, warnings: &Warnings) -> Vec<String> {
    let mut unused = Vec::new();
    for entry in entries {
        if !import_dir(vendor_root, &entry.import_path).exists() {
            warnings.warn(format!(
                "package {} is unused, consider removing it from vendor.conf",
                entry.import_path
            ));
            unused.push(entry.import_path.clone());
        }
    }
    unused
}

/// Report vendored dependencies without a license file in their root directory.
///
/// Dependencies without a directory are skipped; [`check_unused`] covers them.
/// The report is only logged in verbose mode and never counts as a warning for
/// `--strict`. Returns the import paths lacking a license.
pub fn check_license(entries: &[DependencyEntry], vendor_root: &Path, verbose: bool) -> Vec<String> {
    let mut lacking = Vec::new();
    for entry in entries {
        let dir = import_dir(vendor_root, &entry.import_path);
        if !dir.is_dir() || has_license_file(&dir) {
            continue;
        }
        if verbose {
            tracing::warn!("WARNING(verbose): package {} may lack license information", entry.import_path);
        }
        lacking.push(entry.import_path.clone());
    }
    lacking
}

#[cfg(test)]
mod tests;
