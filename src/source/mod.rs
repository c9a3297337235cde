//! The fetch capability shared by the acquisition engine and `vndr init`.
//!
//! Fetching one dependency means placing the repository that contains it under
//! `<dest_root>/<repository root>` at the requested revision (or at the
//! repository's current state when the revision is empty) and reporting which
//! root and revision ended up on disk.
//!
//! # Components
//!
//! - [`Fetcher`] - injected capability; [`crate::git::GitFetcher`] is the
//!   production implementation
//! - [`FetchedSource`] - what a successful fetch reports back

use anyhow::Result;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::manifest::DependencyEntry;

/// Boxed future returned by [`Fetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<FetchedSource>> + Send + 'a>>;

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSource {
    /// Root import path of the repository that was fetched.
    pub root_import_path: String,
    /// Revision actually checked out.
    pub revision: String,
}

/// Capability to fetch one dependency into a vendor tree.
///
/// Implementations must be safe to call concurrently for distinct entries:
/// each entry writes only below its own repository directory.
pub trait Fetcher: Send + Sync {
    /// Fetch `entry` below `dest_root`.
    ///
    /// An empty `entry.revision` means "whatever the repository currently
    /// points at"; the concrete revision is returned in [`FetchedSource`].
    fn fetch<'a>(&'a self, entry: &'a DependencyEntry, dest_root: &'a Path) -> FetchFuture<'a>;
}
