//! Transitive import closure of the project over the vendor tree.
//!
//! Starting from the project's own packages, the [`ImportGraphCollector`]
//! follows import declarations breadth-first. Standard library imports and
//! imports inside the project are not followed; every other import must be
//! present as `vendor/<import path>`.
//!
//! # Modes
//!
//! - **Steady**: the vendor tree was filled by the acquisition engine; a
//!   missing package is a [`VndrError::GraphResolution`] error and nothing is
//!   fetched.
//! - **Initialization** ([`ImportGraphCollector::with_downloader`]): a missing
//!   package triggers a fetch of its repository at the latest revision. Each
//!   fetched repository is recorded as a [`DependencyEntry`] in discovery
//!   order; that list becomes the new `vendor.conf`.
//!
//! Traversal is sequential in both modes. Downloads mutate the vendor tree
//! and the discovery order is part of the output.
//!
//! # Module Structure
//!
//! - `mod.rs` - [`ImportGraphCollector`] and [`PackageClosure`]
//! - `package` - loading one Go package from its directory
//! - `local` - scan of the project's own packages

pub mod local;
pub mod package;

use anyhow::Result;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::VndrError;
use crate::git::import_dir;
use crate::manifest::DependencyEntry;
use crate::source::Fetcher;

pub use local::collect_local_packages;
pub use package::{GoPackage, PackageLoadError, is_std_lib, load_package};

/// Vendored packages reachable from the project, keyed by import path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageClosure {
    packages: BTreeMap<String, PathBuf>,
}

impl PackageClosure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package; returns false when it was already present.
    pub fn insert(&mut self, import_path: impl Into<String>, dir: impl Into<PathBuf>) -> bool {
        self.packages.insert(import_path.into(), dir.into()).is_none()
    }

    pub fn contains(&self, import_path: &str) -> bool {
        self.packages.contains_key(import_path)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Import paths in sorted order.
    pub fn import_paths(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Directory of a package in the closure.
    pub fn dir(&self, import_path: &str) -> Option<&Path> {
        self.packages.get(import_path).map(PathBuf::as_path)
    }
}

impl<S: Into<String>> FromIterator<(S, PathBuf)> for PackageClosure {
    fn from_iter<I: IntoIterator<Item = (S, PathBuf)>>(iter: I) -> Self {
        Self {
            packages: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Fetches missing repositories while the graph is walked in `vndr init`.
struct InitDownloader {
    fetcher: Arc<dyn Fetcher>,
    discovered: Vec<DependencyEntry>,
}

impl InitDownloader {
    fn covers(&self, import_path: &str) -> bool {
        self.discovered.iter().any(|d| {
            import_path == d.import_path
                || import_path.strip_prefix(&d.import_path).is_some_and(|rest| rest.starts_with('/'))
        })
    }

    async fn download(&mut self, import_path: &str, vendor_root: &Path) -> Result<()> {
        tracing::info!("\tDownloading dependencies for {}", import_path);
        let probe = DependencyEntry::new(import_path, "");
        let fetched = self.fetcher.fetch(&probe, vendor_root).await.map_err(|e| {
            VndrError::GraphResolution {
                import_path: import_path.to_string(),
                reason: format!("{e:#}"),
            }
        })?;
        tracing::info!(
            "\tFetched {} at revision {}",
            fetched.root_import_path,
            fetched.revision
        );
        self.discovered.push(DependencyEntry::new(fetched.root_import_path, fetched.revision));
        Ok(())
    }
}

/// Walks the import graph of the project through the vendor tree.
pub struct ImportGraphCollector {
    vendor_root: PathBuf,
    project_import_path: String,
    downloader: Option<InitDownloader>,
}

impl ImportGraphCollector {
    /// Steady-mode collector over `vendor_root`.
    ///
    /// Imports equal to or below `project_import_path` belong to the project
    /// and are not followed. An empty project path disables that check.
    pub fn new(vendor_root: impl Into<PathBuf>, project_import_path: impl Into<String>) -> Self {
        Self {
            vendor_root: vendor_root.into(),
            project_import_path: project_import_path.into(),
            downloader: None,
        }
    }

    /// Switch to initialization mode, fetching missing packages with `fetcher`.
    #[must_use]
    pub fn with_downloader(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.downloader = Some(InitDownloader {
            fetcher,
            discovered: Vec::new(),
        });
        self
    }

    /// Dependencies discovered so far in initialization mode, in discovery order.
    pub fn discovered(&self) -> &[DependencyEntry] {
        self.downloader.as_ref().map(|d| d.discovered.as_slice()).unwrap_or_default()
    }

    /// Consume the collector, returning the discovered dependencies.
    pub fn into_discovered(self) -> Vec<DependencyEntry> {
        self.downloader.map(|d| d.discovered).unwrap_or_default()
    }

    fn is_local(&self, import_path: &str) -> bool {
        let project = self.project_import_path.as_str();
        !project.is_empty()
            && (import_path == project
                || import_path.strip_prefix(project).is_some_and(|rest| rest.starts_with('/')))
    }

    /// Compute the closure of vendored packages reachable from `initial`.
    ///
    /// The initial packages contribute their test imports as well; packages
    /// found in the vendor tree only contribute their regular imports.
    ///
    /// # Errors
    ///
    /// [`VndrError::GraphResolution`] when an import cannot be found (steady
    /// mode), fetched or loaded (initialization mode).
    pub async fn collect(&mut self, initial: &[GoPackage]) -> Result<PackageClosure> {
        let mut closure = PackageClosure::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> =
            initial.iter().flat_map(|p| p.all_imports().cloned()).collect();

        while let Some(import_path) = queue.pop_front() {
            if is_std_lib(&import_path) || self.is_local(&import_path) {
                continue;
            }
            if !visited.insert(import_path.clone()) {
                continue;
            }

            let package = self.resolve(&import_path).await?;
            tracing::debug!("Package {} imports {} packages", import_path, package.imports.len());
            queue.extend(package.imports.iter().filter(|i| !visited.contains(*i)).cloned());
            closure.insert(import_path, package.dir);
        }

        tracing::debug!("Import closure holds {} packages", closure.len());
        Ok(closure)
    }

    async fn resolve(&mut self, import_path: &str) -> Result<GoPackage> {
        let dir = import_dir(&self.vendor_root, import_path);
        match load_tolerant(import_path, &dir) {
            Err(PackageLoadError::NoGoFiles {
                ..
            }) => {}
            other => return other.map_err(|e| graph_error(import_path, &e).into()),
        }

        let vendor_root = self.vendor_root.clone();
        let Some(downloader) = self.downloader.as_mut() else {
            return Err(VndrError::GraphResolution {
                import_path: import_path.to_string(),
                reason: format!("package not found in {}", vendor_root.display()),
            }
            .into());
        };
        if downloader.covers(import_path) {
            return Err(VndrError::GraphResolution {
                import_path: import_path.to_string(),
                reason: "package does not exist in its fetched repository".to_string(),
            }
            .into());
        }

        downloader.download(import_path, &vendor_root).await?;
        load_tolerant(import_path, &dir).map_err(|e| graph_error(import_path, &e).into())
    }
}

/// Load a package, accepting the best-effort result for mixed package names.
fn load_tolerant(import_path: &str, dir: &Path) -> Result<GoPackage, PackageLoadError> {
    match load_package(import_path, dir) {
        Err(PackageLoadError::MultiplePackages {
            package,
            names,
        }) => {
            tracing::debug!("{} holds packages {}, continuing with all imports", import_path, names.join(", "));
            Ok(package)
        }
        other => other,
    }
}

fn graph_error(import_path: &str, err: &PackageLoadError) -> VndrError {
    VndrError::GraphResolution {
        import_path: import_path.to_string(),
        reason: err.to_string(),
    }
}
