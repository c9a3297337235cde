//! File system helpers shared by the config writer, the fetcher and the
//! vendor cleaner.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vndr::utils::fs::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("vendor/github.com/pkg"))?;
//! atomic_write(Path::new("vendor.conf"), b"github.com/pkg/errors v0.8.0\n")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Ensures a directory exists, creating it and its parents if necessary.
///
/// # Errors
///
/// Fails if the directory cannot be created or the path exists as a file.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// Content goes to `<path>.partial` first, is synced to disk and then renamed
/// over the target, so readers never see a half-written config file. Parent
/// directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let temp_path = partial_path(path);
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Removes a directory and all its contents if it exists.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Renders a path relative to `base` with `/` separators.
///
/// Vendor-relative paths are matched against import paths and whitelist
/// regexes, both of which always use forward slashes.
pub fn slash_relative(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> =
        rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    Some(parts.join("/"))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents_and_leaves_no_partial() -> Result<()> {
        let temp = TempDir::new()?;
        let target = temp.path().join("nested").join("vendor.conf.tmp");

        atomic_write(&target, b"github.com/a/b v1\n")?;

        assert_eq!(fs::read_to_string(&target)?, "github.com/a/b v1\n");
        assert!(!temp.path().join("nested").join("vendor.conf.tmp.partial").exists());
        Ok(())
    }

    #[test]
    fn test_ensure_dir_rejects_files() -> Result<()> {
        let temp = TempDir::new()?;
        let file = temp.path().join("file");
        fs::write(&file, "x")?;
        assert!(ensure_dir(&file).is_err());
        ensure_dir(&temp.path().join("a/b/c"))?;
        assert!(temp.path().join("a/b/c").is_dir());
        Ok(())
    }

    #[test]
    fn test_slash_relative() {
        let base = Path::new("/project/vendor");
        let path = base.join("github.com").join("pkg").join("errors");
        assert_eq!(slash_relative(base, &path).as_deref(), Some("github.com/pkg/errors"));
        assert_eq!(slash_relative(base, Path::new("/elsewhere")), None);
    }
}
