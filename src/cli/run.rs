//! The vendoring pipeline behind every `vndr` invocation.
//!
//! ```text
//! full / single:  vendor.conf -> validate -> fetch -> closure -> clean -> reports
//! init:           local imports -> closure (fetching on demand) -> clean -> vendor.conf
//! gomod:          vendor.conf -> validate -> go.mod -> go mod vendor
//! ```
//!
//! The root lookup and the fetcher are passed in as [`Collaborators`], so
//! tests drive the full pipeline without network or git.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

use crate::cleaner::{Whitelist, check_license, check_unused, clean_vendor};
use crate::collector::{ImportGraphCollector, collect_local_packages};
use crate::constants::{CONFIG_FILE, VENDOR_DIR};
use crate::core::{VndrError, Warnings};
use crate::git::{GitFetcher, ensure_git_available};
use crate::installer::{AcquisitionEngine, RetryPolicy};
use crate::manifest::gomod::{ensure_gomod_available, gomod_vendor};
use crate::manifest::{DependencyEntry, ParseMode, load_config, suggestion_path, write_config};
use crate::resolver::{KnownHostLookup, RootLookup, RootResolver, validate_deps};
use crate::source::Fetcher;
use crate::utils::remove_dir_all;

use super::common::{project_dir, project_import_path};
use super::{CliConfig, Invocation};

/// External capabilities a run depends on.
pub struct Collaborators {
    pub lookup: Arc<dyn RootLookup>,
    pub fetcher: Arc<dyn Fetcher>,
    pub retry: RetryPolicy,
}

impl Collaborators {
    pub fn new(lookup: Arc<dyn RootLookup>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            lookup,
            fetcher,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Known-host root lookup and the system git.
    pub fn system() -> Result<Self> {
        ensure_git_available()?;
        let lookup: Arc<dyn RootLookup> = Arc::new(KnownHostLookup::new()?);
        let fetcher = Arc::new(GitFetcher::new(Arc::clone(&lookup)));
        Ok(Self::new(lookup, fetcher))
    }
}

/// Run a full, single-dependency or init cycle in the project directory.
pub async fn run_vendor(config: &CliConfig, invocation: &Invocation, collaborators: &Collaborators) -> Result<()> {
    let project = project_dir(config.project_dir.as_deref())?;
    let vendor = project.join(VENDOR_DIR);
    let config_file = project.join(CONFIG_FILE);
    let init = *invocation == Invocation::Init;

    if init && (config_file.exists() || vendor.exists()) {
        return Err(VndrError::InitPreconditions {
            vendor_dir: VENDOR_DIR.to_string(),
            config_file: CONFIG_FILE.to_string(),
        }
        .into());
    }

    let whitelist = Whitelist::parse(&config.whitelist)?;
    let import_path = project_import_path(&project, config.import_path.as_deref())?;
    let warnings = Warnings::new();

    tracing::info!("Collecting initial packages");
    let initial = collect_local_packages(&project, &import_path)
        .context("Error collecting initial packages")?;

    let mut collector = ImportGraphCollector::new(&vendor, import_path.as_str());
    let mut deps = Vec::new();
    if init {
        collector = collector.with_downloader(Arc::clone(&collaborators.fetcher));
        tracing::info!("Start vendoring initialization");
    } else {
        tracing::info!("Download dependencies");
        let declared = load_config(&config_file, ParseMode::Standard)?;
        let mut resolver = RootResolver::new(Arc::clone(&collaborators.lookup));
        validate_deps(&mut resolver, &declared, &suggestion_path(&config_file), &warnings).await?;

        deps = match invocation {
            Invocation::Single {
                import_path,
                revision,
                repository,
            } => vec![single_dependency(&declared, import_path, revision.as_deref(), repository.as_deref())?],
            _ => {
                tracing::info!("Starting whole vndr cycle because no package specified");
                remove_dir_all(&vendor)?;
                declared
            }
        };

        let download_start = Instant::now();
        AcquisitionEngine::new(Arc::clone(&collaborators.fetcher))
            .with_retry_policy(collaborators.retry)
            .fetch_all(&vendor, &deps)
            .await?;
        tracing::info!("Dependencies downloaded. Download time: {:.2?}", download_start.elapsed());
    }

    tracing::info!("Collecting all dependencies");
    let closure = collector.collect(&initial).await.context("Error on collecting all dependencies")?;

    tracing::info!("Clean vendor dir from unused packages");
    for pattern in whitelist.patterns() {
        tracing::info!("\tIgnoring paths matching {:?}", pattern);
    }
    let report = clean_vendor(&vendor, &closure, &whitelist)?;
    tracing::debug!(
        "Kept {} packages, removed {} files and {} directories",
        closure.len(),
        report.removed_files,
        report.removed_dirs
    );

    if init {
        deps = collector.into_discovered();
        write_config(&config_file, &deps)?;
        tracing::info!("Vendor initialized and result is in {}", config_file.display());
    } else {
        check_unused(&deps, &vendor, &warnings);
    }
    check_license(&deps, &vendor, config.verbose);

    warnings.check_strict(config.strict)?;
    tracing::info!("Success");
    Ok(())
}

/// Vendor through `go mod vendor` with a `replace` directive per dependency.
pub async fn run_gomod(config: &CliConfig, lookup: Arc<dyn RootLookup>) -> Result<()> {
    ensure_gomod_available().await?;
    let project = project_dir(config.project_dir.as_deref())?;
    let config_file = project.join(CONFIG_FILE);
    let module_path = project_import_path(&project, config.import_path.as_deref())?;
    let warnings = Warnings::new();

    let deps = load_config(&config_file, ParseMode::Gomod)?;
    let mut resolver = RootResolver::new(lookup);
    validate_deps(&mut resolver, &deps, &suggestion_path(&config_file), &warnings).await?;

    gomod_vendor(&project, &module_path, &deps, config.verbose).await?;
    warnings.check_strict(config.strict)?;
    Ok(())
}

/// The dependency named on the command line, completed from `vendor.conf`
/// when no revision was given.
pub fn single_dependency(
    declared: &[DependencyEntry],
    import_path: &str,
    revision: Option<&str>,
    repository: Option<&str>,
) -> Result<DependencyEntry, VndrError> {
    if let Some(revision) = revision.filter(|r| !r.is_empty()) {
        return Ok(DependencyEntry::new(import_path, revision).with_override(repository.unwrap_or_default()));
    }
    declared.iter().find(|d| d.import_path == import_path).cloned().ok_or_else(|| {
        VndrError::DependencyNotInConfig {
            import_path: import_path.to_string(),
        }
    })
}
