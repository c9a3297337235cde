//! Test utilities for vndr
//!
//! Fakes for the two injected capabilities ([`RootLookup`] and [`Fetcher`])
//! plus helpers for laying out Go sources on disk. Nothing here touches the
//! network or requires git.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vndr::test_utils::{ScriptedFetcher, ScriptedRepo, StaticRootLookup};
//!
//! let lookup = StaticRootLookup::new().with_root("github.com/a/b");
//! let fetcher = ScriptedFetcher::new()
//!     .with_repo("github.com/a/b", ScriptedRepo::new("abc123").with_go_package("", "b", &["fmt"]));
//! # let _ = (Arc::new(lookup), Arc::new(fetcher));
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::VndrError;
use crate::git::import_dir;
use crate::manifest::DependencyEntry;
use crate::resolver::{LookupFuture, RepoRoot, RootLookup};
use crate::source::{FetchFuture, FetchedSource, Fetcher};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Respects `RUST_LOG` when `level` is `None`; stays silent when neither is
/// given.
///
/// ```bash
/// RUST_LOG=vndr=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Render a minimal Go source file with a package clause and an import block.
pub fn go_source(package: &str, imports: &[&str]) -> String {
    let mut src = format!("// Code for tests.\n\npackage {package}\n\n");
    if !imports.is_empty() {
        src.push_str("import (\n");
        for import in imports {
            src.push_str(&format!("\t\"{import}\"\n"));
        }
        src.push_str(")\n");
    }
    src.push_str("\nfunc placeholder() {}\n");
    src
}

/// Write `content` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Write a one-file Go package at `root/rel_dir`.
pub fn write_go_package(root: &Path, rel_dir: &str, package: &str, imports: &[&str]) {
    let file = if rel_dir.is_empty() {
        format!("{package}.go")
    } else {
        format!("{rel_dir}/{package}.go")
    };
    write_file(root, &file, &go_source(package, imports));
}

/// [`RootLookup`] answering from a fixed list of repository roots.
///
/// The longest registered root that is a path prefix of the import path wins.
/// Unregistered paths fail with [`VndrError::RootLookupFailed`].
#[derive(Debug, Default)]
pub struct StaticRootLookup {
    roots: Vec<RepoRoot>,
    calls: AtomicUsize,
}

impl StaticRootLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `root`, cloned from `https://<root>`.
    #[must_use]
    pub fn with_root(mut self, root: &str) -> Self {
        self.roots.push(RepoRoot::https(root));
        self
    }

    /// Register `root` with an explicit clone URL.
    #[must_use]
    pub fn with_repo(mut self, root: &str, repo_url: &str) -> Self {
        self.roots.push(RepoRoot {
            root: root.to_string(),
            repo_url: repo_url.to_string(),
        });
        self
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn find(&self, import_path: &str) -> Option<RepoRoot> {
        self.roots
            .iter()
            .filter(|r| is_path_prefix(&r.root, import_path))
            .max_by_key(|r| r.root.len())
            .cloned()
    }
}

impl RootLookup for StaticRootLookup {
    fn lookup<'a>(&'a self, import_path: &'a str) -> LookupFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let found = self.find(import_path);
        Box::pin(async move {
            found.ok_or_else(|| {
                VndrError::RootLookupFailed {
                    import_path: import_path.to_string(),
                    reason: "unknown repository".to_string(),
                }
                .into()
            })
        })
    }
}

/// Content and behavior of one fake repository.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRepo {
    revision: String,
    files: Vec<(String, String)>,
    failures: usize,
}

impl ScriptedRepo {
    /// A repository whose unpinned fetches report `revision`.
    pub fn new(revision: &str) -> Self {
        Self {
            revision: revision.to_string(),
            ..Self::default()
        }
    }

    /// Add a file, relative to the repository root.
    #[must_use]
    pub fn with_file(mut self, rel: &str, content: &str) -> Self {
        self.files.push((rel.to_string(), content.to_string()));
        self
    }

    /// Add a one-file Go package in `rel_dir` (empty for the repository root).
    #[must_use]
    pub fn with_go_package(self, rel_dir: &str, package: &str, imports: &[&str]) -> Self {
        let file = if rel_dir.is_empty() {
            format!("{package}.go")
        } else {
            format!("{rel_dir}/{package}.go")
        };
        self.with_file(&file, &go_source(package, imports))
    }

    /// Fail the first `failures` attempts. `usize::MAX` never succeeds.
    #[must_use]
    pub fn failing(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }
}

/// [`Fetcher`] that materializes scripted repositories and records how it was
/// driven: attempts per import path and the peak number of concurrent fetches.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    repos: HashMap<String, ScriptedRepo>,
    delay: Duration,
    attempts: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_repo(mut self, root: &str, repo: ScriptedRepo) -> Self {
        self.repos.insert(root.to_string(), repo);
        self
    }

    /// Hold every attempt for `delay` before completing it.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Attempts made for `import_path`.
    pub fn attempts(&self, import_path: &str) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(import_path)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of fetches observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record_attempt(&self, import_path: &str) -> usize {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = attempts.entry(import_path.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    fn find(&self, entry: &DependencyEntry) -> Option<(&str, &ScriptedRepo)> {
        if entry.repo_override().is_some() {
            return self.repos.get_key_value(&entry.import_path).map(|(k, v)| (k.as_str(), v));
        }
        self.repos
            .iter()
            .filter(|(root, _)| is_path_prefix(root, &entry.import_path))
            .max_by_key(|(root, _)| root.len())
            .map(|(root, repo)| (root.as_str(), repo))
    }

    async fn run(&self, entry: &DependencyEntry, dest_root: &Path) -> Result<FetchedSource> {
        let attempt = self.record_attempt(&entry.import_path);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = self.materialize(entry, dest_root, attempt);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn materialize(&self, entry: &DependencyEntry, dest_root: &Path, attempt: usize) -> Result<FetchedSource> {
        let Some((root, repo)) = self.find(entry) else {
            anyhow::bail!("repository not found for {}", entry.import_path);
        };
        if attempt <= repo.failures {
            anyhow::bail!("scripted failure {attempt} for {}", entry.import_path);
        }

        let target = import_dir(dest_root, root);
        for (rel, content) in &repo.files {
            let path = target.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        }

        let revision = if entry.revision.is_empty() {
            repo.revision.clone()
        } else {
            entry.revision.clone()
        };
        Ok(FetchedSource {
            root_import_path: root.to_string(),
            revision,
        })
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch<'a>(&'a self, entry: &'a DependencyEntry, dest_root: &'a Path) -> FetchFuture<'a> {
        Box::pin(self.run(entry, dest_root))
    }
}

fn is_path_prefix(prefix: &str, path: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}
