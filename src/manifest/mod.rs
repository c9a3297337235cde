//! Declared-dependency file (`vendor.conf`) parsing and serialization.
//!
//! The file lists one external dependency per line:
//!
//! ```text
//! # comment
//! github.com/pkg/errors        v0.8.0
//! golang.org/x/net             a6577fac2d73   # trailing comment
//! github.com/docker/docker     0123abcd       https://github.com/fork/docker.git
//! ```
//!
//! The third field is an optional repository override. It is read but never
//! written back: [`serialize_deps`] emits the two-field form only, so an
//! override does not survive a round trip through the writer. Both
//! `vendor.conf` produced by `vndr init` and the validation suggestion file
//! rely on that exact format.
//!
//! # Module Structure
//!
//! - `mod.rs` - [`DependencyEntry`], [`parse_deps`] and [`serialize_deps`]
//! - `manifest_io` - reading and writing the files on disk
//! - `gomod` - `go.mod` emission for `--gomod` runs

pub mod gomod;
pub mod manifest_io;

#[cfg(test)]
mod manifest_tests;

use std::fmt;

use crate::core::VndrError;

pub use manifest_io::{load_config, suggestion_path, write_config};

/// One declared external dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyEntry {
    /// Import path of the dependency, ideally its repository root.
    pub import_path: String,
    /// Pinned revision (commit, tag or branch). Empty only while a dependency
    /// is being discovered by `vndr init`.
    pub revision: String,
    /// Repository location overriding the one derived from `import_path`.
    /// Empty when not set.
    pub repo_override: String,
}

impl DependencyEntry {
    /// Create an entry without repository override.
    pub fn new(import_path: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            revision: revision.into(),
            repo_override: String::new(),
        }
    }

    /// Set the repository override.
    #[must_use]
    pub fn with_override(mut self, repo_override: impl Into<String>) -> Self {
        self.repo_override = repo_override.into();
        self
    }

    /// Returns the override if one is set.
    pub fn repo_override(&self) -> Option<&str> {
        if self.repo_override.is_empty() {
            None
        } else {
            Some(&self.repo_override)
        }
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.import_path, self.revision)
    }
}

/// How the third field of a config line is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Keep the override exactly as written.
    #[default]
    Standard,
    /// Normalize a transport URL override to a bare location, as expected by
    /// `replace` directives: `git://` or `https://` prefix and `.git` suffix
    /// are removed.
    Gomod,
}

/// Parse declared-dependency text into entries.
///
/// Lines are trimmed; empty lines and lines starting with `#` are skipped and a
/// trailing `#` comment is removed. Every remaining line must have exactly two
/// or three whitespace-separated fields.
///
/// # Errors
///
/// Returns [`VndrError::InvalidConfigFormat`] naming the first malformed line.
/// No partial result is returned.
pub fn parse_deps(text: &str, mode: ParseMode) -> Result<Vec<DependencyEntry>, VndrError> {
    let mut deps = Vec::new();
    for raw in text.lines() {
        let mut line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(idx) = line.find('#') {
            line = line[..idx].trim();
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 && fields.len() != 3 {
            return Err(VndrError::InvalidConfigFormat {
                line: line.to_string(),
            });
        }

        let mut entry = DependencyEntry::new(fields[0], fields[1]);
        if let Some(repo) = fields.get(2) {
            entry.repo_override = match mode {
                ParseMode::Standard => (*repo).to_string(),
                ParseMode::Gomod => normalize_gomod_override(repo),
            };
        }
        deps.push(entry);
    }
    Ok(deps)
}

/// Serialize entries in the two-field config format, one per line.
///
/// Repository overrides are not written.
pub fn serialize_deps(entries: &[DependencyEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

fn normalize_gomod_override(repo: &str) -> String {
    let repo = repo.strip_prefix("git://").unwrap_or(repo);
    let repo = repo.strip_prefix("https://").unwrap_or(repo);
    repo.strip_suffix(".git").unwrap_or(repo).to_string()
}
