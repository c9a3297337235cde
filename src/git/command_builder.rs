//! Builder for the Git invocations used by the fetcher.
//!
//! Every command runs with captured output and a timeout of
//! [`GIT_COMMAND_TIMEOUT`]. A non-zero exit status is mapped to the matching
//! [`VndrError`] variant so callers can report clone and checkout failures
//! without parsing stderr themselves.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::GIT_COMMAND_TIMEOUT;
use crate::core::VndrError;

/// Locate the `git` executable on `PATH`.
///
/// # Errors
///
/// [`VndrError::GitNotFound`] when no executable is found.
pub fn git_executable() -> Result<PathBuf, VndrError> {
    which::which("git").map_err(|_| VndrError::GitNotFound)
}

/// Fluent builder for one Git invocation.
///
/// ```rust,ignore
/// use vndr::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let head = GitCommand::rev_parse("HEAD")
///     .current_dir("vendor/github.com/pkg/errors")
///     .with_context("github.com/pkg/errors")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout_duration: Option<Duration>,
    context: Option<String>,
    /// Kept for clone failures so the error names the URL, not the args.
    clone_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            timeout_duration: Some(GIT_COMMAND_TIMEOUT),
            context: None,
            clone_url: None,
        }
    }
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the command inside `dir` (passed to git as `-C <dir>`).
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label used as a prefix in log lines, usually the import path.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::with_capacity(self.args.len() + 2);
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    /// Run the command and capture its output.
    ///
    /// # Errors
    ///
    /// - [`VndrError::GitNotFound`] when git is missing
    /// - [`VndrError::GitCloneFailed`] / [`VndrError::GitCheckoutFailed`] for
    ///   failing clones and checkouts
    /// - [`VndrError::GitCommandError`] for anything else, including timeouts
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let git = git_executable()?;
        let full_args = self.full_args();
        let operation = self.args.first().cloned().unwrap_or_else(|| "unknown".to_string());
        let label = self.context.clone().unwrap_or_else(|| "git".to_string());

        tracing::debug!(target: "git", "({}) Executing command: git {}", label, full_args.join(" "));

        let mut cmd = Command::new(&git);
        cmd.args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        let output_future = cmd.output();
        let output = match self.timeout_duration {
            Some(duration) => match timeout(duration, output_future).await {
                Ok(result) => {
                    result.with_context(|| format!("Failed to execute git {}", full_args.join(" ")))?
                }
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "({}) Command timed out after {} seconds: git {}",
                        label,
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(VndrError::GitCommandError {
                        operation,
                        stderr: format!("timed out after {} seconds", duration.as_secs()),
                    }
                    .into());
                }
            },
            None => output_future
                .await
                .with_context(|| format!("Failed to execute git {}", full_args.join(" ")))?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "({}) Command failed with exit code {:?}: {}",
                label,
                output.status.code(),
                stderr.trim()
            );
            let reason = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            let error = match operation.as_str() {
                "clone" => VndrError::GitCloneFailed {
                    url: self.clone_url.unwrap_or_else(|| "unknown".to_string()),
                    reason,
                },
                "checkout" => VndrError::GitCheckoutFailed {
                    reference: self.args.get(1).cloned().unwrap_or_default(),
                    reason,
                },
                _ => VndrError::GitCommandError {
                    operation,
                    stderr: reason,
                },
            };
            return Err(error.into());
        }

        if !stderr.trim().is_empty() {
            tracing::debug!(target: "git", "({}) {}", label, stderr.trim());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Run the command and return trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Captured output of a successful Git command.
#[derive(Debug)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

// Convenience builders

impl GitCommand {
    /// `git clone --quiet <url> <target>`
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        let mut cmd = Self::new().args([
            "clone".to_string(),
            "--quiet".to_string(),
            url.to_string(),
            target.as_ref().display().to_string(),
        ]);
        cmd.clone_url = Some(url.to_string());
        cmd
    }

    /// `git checkout --quiet <revision>`
    pub fn checkout(revision: &str) -> Self {
        Self::new().args(["checkout", revision, "--quiet"])
    }

    /// `git rev-parse <ref>`
    pub fn rev_parse(reference: &str) -> Self {
        Self::new().args(["rev-parse", reference])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_basic() {
        let cmd = GitCommand::new().arg("status").arg("--short");
        assert_eq!(cmd.args, vec!["status", "--short"]);
        assert_eq!(cmd.timeout_duration, Some(GIT_COMMAND_TIMEOUT));
    }

    #[test]
    fn test_current_dir_becomes_dash_c() {
        let cmd = GitCommand::rev_parse("HEAD").current_dir("/tmp/repo");
        assert_eq!(cmd.full_args(), vec!["-C", "/tmp/repo", "rev-parse", "HEAD"]);
    }

    #[test]
    fn test_clone_builder() {
        let cmd = GitCommand::clone("https://github.com/pkg/errors", "/tmp/vendor/github.com/pkg/errors");
        assert_eq!(cmd.args[0], "clone");
        assert_eq!(cmd.args[1], "--quiet");
        assert_eq!(cmd.clone_url.as_deref(), Some("https://github.com/pkg/errors"));
        assert_eq!(cmd.args.last().map(String::as_str), Some("/tmp/vendor/github.com/pkg/errors"));
    }

    #[test]
    fn test_checkout_builder() {
        let cmd = GitCommand::checkout("v0.8.0");
        assert_eq!(cmd.args, vec!["checkout", "v0.8.0", "--quiet"]);
    }

    #[tokio::test]
    async fn test_failing_checkout_maps_to_checkout_error() {
        if git_executable().is_err() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        GitCommand::new().args(["init", "--quiet"]).current_dir(dir.path()).execute_success().await.unwrap();

        let err = GitCommand::checkout("no-such-revision")
            .current_dir(dir.path())
            .execute()
            .await
            .unwrap_err();
        match err.downcast_ref::<VndrError>() {
            Some(VndrError::GitCheckoutFailed {
                reference,
                ..
            }) => assert_eq!(reference, "no-such-revision"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
