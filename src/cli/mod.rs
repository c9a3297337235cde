//! Command-line interface for vndr.
//!
//! ```text
//! vndr [OPTIONS] [IMPORT_PATH [REVISION [REPOSITORY]]]
//! vndr [OPTIONS] init
//! ```
//!
//! Without positional arguments vndr runs the whole cycle: validate
//! `vendor.conf`, wipe and refetch `vendor/`, compute the import closure and
//! prune everything else. With an import path only that dependency is fetched
//! again, at the given revision or at the one pinned in `vendor.conf`. `init`
//! discovers dependencies from the project's imports and writes a fresh
//! `vendor.conf`.
//!
//! # Options
//!
//! - `--verbose` - debug logging, go tool output and license reports
//! - `--strict` - fail when any warning was emitted
//! - `--gomod` (or `VNDR_GOMOD` set to anything but empty or `0`) - vendor
//!   through `go mod vendor` instead
//! - `--whitelist REGEX` - vendor-relative paths never pruned (repeatable)
//! - `--import-path PATH` - import path of the project, when it does not live
//!   under `$GOPATH/src`
//!
//! # Module Structure
//!
//! - `mod.rs` - argument parsing, [`CliConfig`] and [`Invocation`]
//! - `common` - project location helpers
//! - `run` - the vendoring pipeline

pub mod common;
pub mod run;


use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::core::VndrError;
use crate::resolver::KnownHostLookup;

pub use run::{Collaborators, run_gomod, run_vendor};

/// Runtime settings of one invocation, decoupled from argument parsing.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Debug logging and verbose-only reports.
    pub verbose: bool,
    /// Turn accumulated warnings into an error at the end of the run.
    pub strict: bool,
    /// Vendor through `go mod vendor`.
    pub gomod: bool,
    /// Raw `--whitelist` patterns.
    pub whitelist: Vec<String>,
    /// Explicit project import path.
    pub import_path: Option<String>,
    /// Project directory; the current directory when unset.
    pub project_dir: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default log filter for this configuration when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// What the positional arguments ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Full vendoring cycle from `vendor.conf`.
    Full,
    /// `vndr init`.
    Init,
    /// Refetch a single dependency.
    Single {
        import_path: String,
        revision: Option<String>,
        repository: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "vndr",
    about = "Vendor Go dependencies pinned in vendor.conf",
    version,
    override_usage = "vndr [OPTIONS] [IMPORT_PATH [REVISION [REPOSITORY]]]\n       vndr [OPTIONS] init",
    long_about = "vndr fetches the dependencies listed in vendor.conf into vendor/, keeps only the \
                  packages the project actually imports and reports stale or unlicensed entries."
)]
pub struct Cli {
    /// `init`, or an import path with optional revision and repository
    #[arg(value_name = "ARGS")]
    args: Vec<String>,

    /// Show all warnings and debug output
    #[arg(long)]
    verbose: bool,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,

    /// Use `go mod vendor` (relies on replace directives)
    #[arg(
        long,
        env = "VNDR_GOMOD",
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        value_parser = gomod_enabled,
        default_value = "",
        default_missing_value = "1",
        hide_default_value = true
    )]
    gomod: bool,

    /// Regular expression for vendor-relative paths to keep while cleaning
    #[arg(long, value_name = "REGEX")]
    whitelist: Vec<String>,

    /// Import path of the project (default: derived from $GOPATH/src)
    #[arg(long, value_name = "PATH")]
    import_path: Option<String>,
}

/// `VNDR_GOMOD` enables gomod mode for any value but empty and `0`.
fn gomod_enabled(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(!value.is_empty() && value != "0")
}

impl Cli {
    /// Execute with configuration built from the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        CliConfig {
            verbose: self.verbose,
            strict: self.strict,
            gomod: self.gomod,
            whitelist: self.whitelist.clone(),
            import_path: self.import_path.clone(),
            project_dir: None,
        }
    }

    /// Interpret the positional arguments.
    ///
    /// # Errors
    ///
    /// [`VndrError::Usage`] for more than three arguments or `init` followed
    /// by anything.
    pub fn invocation(&self) -> Result<Invocation, VndrError> {
        if self.args.len() > 3 {
            return Err(VndrError::Usage {
                message: format!("expected at most 3 arguments, got {}", self.args.len()),
            });
        }
        match self.args.as_slice() {
            [] => Ok(Invocation::Full),
            [cmd] if cmd == "init" => Ok(Invocation::Init),
            [cmd, ..] if cmd == "init" => Err(VndrError::Usage {
                message: "init takes no arguments".to_string(),
            }),
            [import_path, rest @ ..] => Ok(Invocation::Single {
                import_path: import_path.clone(),
                revision: rest.first().cloned(),
                repository: rest.get(1).cloned(),
            }),
        }
    }

    /// Execute with an explicit configuration.
    ///
    /// The total running time is logged whether or not the run succeeds.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let start = Instant::now();
        let result = self.dispatch(&config).await;
        tracing::info!("Running time: {:.2?}", start.elapsed());
        result
    }

    async fn dispatch(&self, config: &CliConfig) -> Result<()> {
        let invocation = self.invocation()?;
        if config.gomod {
            if invocation == Invocation::Init {
                return Err(VndrError::Usage {
                    message: "init unsupported with --gomod".to_string(),
                }
                .into());
            }
            return run_gomod(config, Arc::new(KnownHostLookup::new()?)).await;
        }
        let collaborators = Collaborators::system()?;
        run_vendor(config, &invocation, &collaborators).await
    }
}
