//! Git-backed fetching of dependencies.
//!
//! vndr drives the system `git` binary instead of an embedded library, so the
//! user's credential helpers, SSH agent and `insteadOf` rewrites apply to
//! every clone.
//!
//! Fetching one dependency with [`GitFetcher`]:
//!
//! 1. resolve the repository root and clone URL of the import path (or use the
//!    entry's repository override, in which case the import path itself is the
//!    root)
//! 2. remove whatever sits at `<vendor>/<root>`
//! 3. `git clone --quiet <url> <vendor>/<root>`
//! 4. `git checkout <revision>` when a revision is pinned
//! 5. read the checked-out commit with `git rev-parse HEAD`
//! 6. drop the `.git` directory; the vendor tree keeps sources only
//!
//! # Module Structure
//!
//! - `mod.rs` - [`GitFetcher`] and availability checks
//! - `command_builder` - [`GitCommand`](command_builder::GitCommand), the
//!   builder every invocation goes through

pub mod command_builder;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::VndrError;
use crate::manifest::DependencyEntry;
use crate::resolver::{RepoRoot, RootLookup, invalid_path_element};
use crate::source::{FetchFuture, FetchedSource, Fetcher};
use crate::utils::{ensure_dir, remove_dir_all};
use command_builder::{GitCommand, git_executable};

/// Returns true when a `git` executable is on `PATH`.
pub fn is_git_installed() -> bool {
    git_executable().is_ok()
}

/// Fail early with [`VndrError::GitNotFound`](crate::core::VndrError::GitNotFound) when git is missing.
pub fn ensure_git_available() -> Result<()> {
    git_executable()?;
    Ok(())
}

/// [`Fetcher`] that clones repositories with the system git.
pub struct GitFetcher {
    lookup: Arc<dyn RootLookup>,
}

impl GitFetcher {
    pub fn new(lookup: Arc<dyn RootLookup>) -> Self {
        Self {
            lookup,
        }
    }

    async fn repo_root(&self, entry: &DependencyEntry) -> Result<RepoRoot> {
        match entry.repo_override() {
            Some(repo) => Ok(RepoRoot {
                root: entry.import_path.clone(),
                repo_url: repo.to_string(),
            }),
            None => self.lookup.lookup(&entry.import_path).await,
        }
    }

    async fn fetch_entry(&self, entry: &DependencyEntry, dest_root: &Path) -> Result<FetchedSource> {
        let repo = self.repo_root(entry).await?;
        // the target directory is wiped below
        if let Some(reason) = invalid_path_element(&repo.root) {
            return Err(VndrError::RootLookupFailed {
                import_path: entry.import_path.clone(),
                reason: reason.to_string(),
            }
            .into());
        }
        let target = import_dir(dest_root, &repo.root);

        if target.exists() {
            remove_dir_all(&target)?;
        }
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }

        GitCommand::clone(&repo.repo_url, &target)
            .with_context(&entry.import_path)
            .execute_success()
            .await?;

        if !entry.revision.is_empty() {
            GitCommand::checkout(&entry.revision)
                .current_dir(&target)
                .with_context(&entry.import_path)
                .execute_success()
                .await?;
        }

        let revision = GitCommand::rev_parse("HEAD")
            .current_dir(&target)
            .with_context(&entry.import_path)
            .execute_stdout()
            .await?;

        let git_dir = target.join(".git");
        if git_dir.exists() {
            remove_dir_all(&git_dir)
                .with_context(|| format!("Failed to strip git metadata of {}", repo.root))?;
        }

        Ok(FetchedSource {
            root_import_path: repo.root,
            revision,
        })
    }
}

impl Fetcher for GitFetcher {
    fn fetch<'a>(&'a self, entry: &'a DependencyEntry, dest_root: &'a Path) -> FetchFuture<'a> {
        Box::pin(self.fetch_entry(entry, dest_root))
    }
}

/// Directory of an import path below a vendor root.
pub fn import_dir(vendor_root: &Path, import_path: &str) -> PathBuf {
    let mut dir = vendor_root.to_path_buf();
    dir.extend(import_path.split('/'));
    dir
}
