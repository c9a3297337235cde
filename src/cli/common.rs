//! Locating the project and its import path.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::core::VndrError;
use crate::utils::slash_relative;

/// Resolve the project directory, following symlinks so it can be compared
/// with `$GOPATH/src`.
pub fn project_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Error getting working directory")?,
    };
    std::fs::canonicalize(&dir).with_context(|| format!("Error resolving working directory {}", dir.display()))
}

/// Import path of the project in `project_dir`.
///
/// An explicit `--import-path` wins. Otherwise the project must live below
/// `src/` of one of the `$GOPATH` entries (`$HOME/go` when `GOPATH` is unset).
///
/// # Errors
///
/// [`VndrError::Usage`] when neither source yields an import path.
pub fn project_import_path(project_dir: &Path, explicit: Option<&str>) -> Result<String> {
    if let Some(path) = explicit {
        let path = path.trim_matches('/');
        if !path.is_empty() {
            return Ok(path.to_string());
        }
    }

    let gopath = std::env::var_os("GOPATH")
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join("go").into_os_string()));

    gopath
        .and_then(|gopath| import_path_from_gopath(project_dir, &gopath))
        .ok_or_else(|| {
            VndrError::Usage {
                message: format!(
                    "cannot determine the import path of {}: it is not below $GOPATH/src, pass --import-path",
                    project_dir.display()
                ),
            }
            .into()
        })
}

/// Import path of `project_dir` relative to the first `$GOPATH` entry whose
/// `src/` contains it.
pub fn import_path_from_gopath(project_dir: &Path, gopath: &OsStr) -> Option<String> {
    std::env::split_paths(gopath).find_map(|entry| {
        let src = entry.join("src");
        let src = std::fs::canonicalize(&src).unwrap_or(src);
        slash_relative(&src, project_dir).filter(|rel| !rel.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_import_path_wins() {
        let path = project_import_path(Path::new("/anywhere"), Some("github.com/me/proj/")).unwrap();
        assert_eq!(path, "github.com/me/proj");
    }

    #[test]
    fn test_import_path_from_gopath() {
        let temp = TempDir::new().unwrap();
        let gopath = temp.path().canonicalize().unwrap();
        let project = gopath.join("src/github.com/me/proj");
        std::fs::create_dir_all(&project).unwrap();

        let other = TempDir::new().unwrap();
        let joined = std::env::join_paths([other.path(), gopath.as_path()]).unwrap();

        assert_eq!(import_path_from_gopath(&project, &joined).as_deref(), Some("github.com/me/proj"));
        assert_eq!(import_path_from_gopath(&gopath.join("src"), &joined), None);
        assert_eq!(import_path_from_gopath(other.path(), &joined), None);
    }

    #[test]
    fn test_project_dir_resolves_existing_directory() {
        let temp = TempDir::new().unwrap();
        let dir = project_dir(Some(temp.path())).unwrap();
        assert_eq!(dir, temp.path().canonicalize().unwrap());
        assert!(project_dir(Some(&temp.path().join("missing"))).is_err());
    }
}
