//! Repository-root resolution and conflict validation.
//!
//! Every declared dependency must name a repository root, and each root may be
//! declared only once. The [`RootResolver`] maps import paths to roots through
//! a [`RootLookup`], memoizing answers in a per-run [`RootCache`], and the
//! functions in [`conflicts`] group entries by root to find misrooted and
//! conflicting declarations.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vndr::resolver::{KnownHostLookup, RootResolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut resolver = RootResolver::new(Arc::new(KnownHostLookup::new()?));
//! let root = resolver.resolve_root("github.com/docker/docker/pkg/term").await?;
//! assert_eq!(root, "github.com/docker/docker");
//! # Ok(())
//! # }
//! ```

pub mod conflicts;
pub mod root_lookup;


use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

pub use conflicts::{RootCheck, merge_group, validate_deps};
pub use root_lookup::{KnownHostLookup, LookupFuture, RepoRoot, RootLookup, invalid_path_element};

/// Per-run memo of `import path -> repository root`.
///
/// Entries are created on first lookup and never invalidated; the cache is not
/// persisted between runs.
#[derive(Debug, Default, Clone)]
pub struct RootCache {
    roots: HashMap<String, RepoRoot>,
}

impl RootCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached root for `import_path`, if any.
    pub fn get(&self, import_path: &str) -> Option<&RepoRoot> {
        self.roots.get(import_path)
    }

    /// Remember the root of `import_path`.
    pub fn insert(&mut self, import_path: impl Into<String>, root: RepoRoot) {
        self.roots.insert(import_path.into(), root);
    }

    /// Number of cached import paths.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Maps import paths to repository roots, consulting the lookup at most once
/// per import path.
pub struct RootResolver {
    lookup: Arc<dyn RootLookup>,
    cache: RootCache,
}

impl RootResolver {
    /// Create a resolver with an empty cache.
    pub fn new(lookup: Arc<dyn RootLookup>) -> Self {
        Self::with_cache(lookup, RootCache::new())
    }

    /// Create a resolver on top of an existing cache.
    pub fn with_cache(lookup: Arc<dyn RootLookup>, cache: RootCache) -> Self {
        Self {
            lookup,
            cache,
        }
    }

    /// Repository root of `import_path`.
    ///
    /// # Errors
    ///
    /// Propagates the lookup error unchanged; there is no local fallback.
    pub async fn resolve_root(&mut self, import_path: &str) -> Result<String> {
        if let Some(cached) = self.cache.get(import_path) {
            return Ok(cached.root.clone());
        }
        let root = self.lookup.lookup(import_path).await?;
        tracing::debug!("Root of {} is {}", import_path, root.root);
        let name = root.root.clone();
        self.cache.insert(import_path, root);
        Ok(name)
    }

    /// The cache built so far.
    pub fn cache(&self) -> &RootCache {
        &self.cache
    }
}
