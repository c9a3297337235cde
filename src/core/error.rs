//! Error handling for vndr
//!
//! This module provides the error types and the user-facing error reporting of
//! the vendoring tool. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers and tests can match on failure kinds
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`VndrError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! # Error Categories
//!
//! - **Configuration**: [`VndrError::InvalidConfigFormat`], [`VndrError::ConfigNotFound`]
//! - **Root resolution**: [`VndrError::RootLookupFailed`], [`VndrError::ValidationFailed`]
//! - **Acquisition**: [`VndrError::FetchFailed`], [`VndrError::GitCloneFailed`], etc.
//! - **Import graph**: [`VndrError::GraphResolution`]
//! - **Vendor tree**: [`VndrError::Reconciliation`]
//! - **Run policy**: [`VndrError::StrictWarnings`], [`VndrError::InitPreconditions`]
//!
//! Library code returns [`anyhow::Result`] with a [`VndrError`] at the root of
//! the chain. The binary converts whatever reaches `main` with
//! [`user_friendly_error`] and prints it with [`ErrorContext::display`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use vndr::core::{VndrError, user_friendly_error};
//!
//! let err = anyhow::Error::from(VndrError::InvalidConfigFormat {
//!     line: "github.com/foo/bar".to_string(),
//! });
//! let ctx = user_friendly_error(err);
//! ctx.display(); // colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for vndr operations.
///
/// Each variant names one failure mode of a vendoring run. Variants carry the
/// import path, file or line that caused the failure so the message is useful
/// without a backtrace.
#[derive(Error, Debug, Clone)]
pub enum VndrError {
    /// A line of the declared-dependency file does not have 2 or 3 fields.
    #[error("invalid config format: {line}")]
    InvalidConfigFormat {
        /// The offending line with its trailing comment stripped
        line: String,
    },

    /// The declared-dependency file could not be opened.
    #[error("Failed to open config file {path}: {reason}")]
    ConfigNotFound {
        /// Path of the config file
        path: String,
        /// Underlying I/O error
        reason: String,
    },

    /// The repository root of an import path could not be determined.
    ///
    /// This is fatal for validation: there is no local fallback.
    #[error("Failed to find repository root of {import_path}: {reason}")]
    RootLookupFailed {
        /// Import path whose root was requested
        import_path: String,
        /// Why the lookup failed
        reason: String,
    },

    /// Entries are misrooted or share a repository root.
    ///
    /// The rewritten entry list has been written to `suggestion`; it is never
    /// applied automatically.
    #[error("There were some validation errors, suggested config is written to {suggestion}")]
    ValidationFailed {
        /// Path of the suggested-fix file
        suggestion: String,
    },

    /// One or more dependencies could not be fetched after all attempts.
    ///
    /// Each message is `<import path>: <cause>`, listed in the order the
    /// dependencies were declared.
    #[error("Errors on fetch:\n{}", failures.join("\n"))]
    FetchFailed {
        /// One message per failed dependency
        failures: Vec<String>,
    },

    /// A package required by the import graph could not be resolved.
    #[error("Failed to resolve package {import_path}: {reason}")]
    GraphResolution {
        /// Import path of the unresolved package
        import_path: String,
        /// Why resolution failed
        reason: String,
    },

    /// Pruning the vendor tree failed on the filesystem.
    #[error("Failed to clean vendor tree at {path}: {reason}")]
    Reconciliation {
        /// Path that could not be removed or read
        path: String,
        /// Underlying I/O error
        reason: String,
    },

    /// `--strict` turned accumulated warnings into a failure.
    #[error("Treating {count} warnings as errors")]
    StrictWarnings {
        /// Number of warnings emitted during the run
        count: usize,
    },

    /// `init` was requested in a project that already vendors.
    #[error("There must not be {vendor_dir} dir and {config_file} file for initialization")]
    InitPreconditions {
        /// Vendor directory name
        vendor_dir: String,
        /// Config file name
        config_file: String,
    },

    /// A single dependency was requested without revision and is not in the config.
    #[error("Failed to find {import_path} in config file and revision was not specified")]
    DependencyNotInConfig {
        /// The requested import path
        import_path: String,
    },

    /// Git executable not found in PATH.
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// A git command returned a non-zero exit status or timed out.
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g., "clone", "checkout")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Cloning a dependency repository failed.
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone
        url: String,
        /// The reason for the clone failure
        reason: String,
    },

    /// Checking out the pinned revision failed.
    #[error("Failed to checkout reference '{reference}' in repository")]
    GitCheckoutFailed {
        /// The revision that failed to checkout
        reference: String,
        /// The reason for the checkout failure
        reason: String,
    },

    /// `--gomod` was requested but the Go toolchain does not support modules.
    #[error("could not detect go mod support with 'go help mod'")]
    GoModUnavailable,

    /// A `--whitelist` value is not a valid regular expression.
    #[error("Invalid whitelist pattern {pattern:?}: {reason}")]
    InvalidWhitelist {
        /// The pattern as given on the command line
        pattern: String,
        /// Regex compilation error
        reason: String,
    },

    /// The command line was not understood.
    #[error("{message}")]
    Usage {
        /// What was wrong with the arguments
        message: String,
    },

    /// Any other failure, with the full error chain already rendered.
    #[error("{message}")]
    Other {
        /// Rendered message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information.
///
/// `ErrorContext` pairs a [`VndrError`] with optional details (why it
/// happened) and a suggestion (what to do about it).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: VndrError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`VndrError`] with no suggestion or details.
    #[must_use]
    pub const fn new(error: VndrError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known [`VndrError`] variants anywhere in the chain get tailored suggestions;
/// I/O errors get a generic filesystem hint; everything else is rendered with
/// its full `Caused by:` chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(vndr_error) = error.chain().find_map(|e| e.downcast_ref::<VndrError>()) {
        let mut ctx = create_error_context(vndr_error.clone());
        // Keep the outer context messages (e.g. "Failed to parse config") visible.
        let outer: Vec<String> = error
            .chain()
            .take_while(|e| e.downcast_ref::<VndrError>().is_none())
            .map(std::string::ToString::to_string)
            .collect();
        if !outer.is_empty() && ctx.details.is_none() {
            ctx.details = Some(outer.join(": "));
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(VndrError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check ownership and permissions of the project and vendor directories");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(VndrError::Other {
        message,
    })
}

/// Map each [`VndrError`] variant to an [`ErrorContext`] with a suggestion.
fn create_error_context(error: VndrError) -> ErrorContext {
    match &error {
        VndrError::InvalidConfigFormat {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Each line must be 'import/path revision [repository]'; use '#' for comments"),
        VndrError::ConfigNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'vndr init' to create vendor.conf from the project's imports"),
        VndrError::RootLookupFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the import path spelling and your network connection")
            .with_details("Roots of unknown hosts are discovered through '<path>?go-get=1'"),
        VndrError::ValidationFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use diff and common sense before replacing vendor.conf with the suggestion"),
        VndrError::FetchFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Verify the revisions exist and the repositories are reachable"),
        VndrError::GraphResolution {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Add the repository providing this package to vendor.conf"),
        VndrError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ and make sure it is in PATH"),
        VndrError::GitCloneFailed {
            reason,
            ..
        }
        | VndrError::GitCheckoutFailed {
            reason,
            ..
        } => {
            let details = reason.trim().to_string();
            ErrorContext::new(error).with_details(details)
        }
        VndrError::GitCommandError {
            stderr,
            ..
        } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error).with_details(details)
        }
        VndrError::StrictWarnings {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Fix the warnings above or run without --strict"),
        VndrError::GoModUnavailable => ErrorContext::new(error)
            .with_suggestion("Install Go 1.11 or newer, or run without --gomod"),
        _ => ErrorContext::new(error),
    }
}
