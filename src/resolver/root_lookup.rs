//! Repository root discovery for import paths.
//!
//! An import path such as `github.com/pkg/errors/internal` lives inside the
//! repository `github.com/pkg/errors`. [`KnownHostLookup`] answers that
//! question with static rules for the common hosting services and falls back
//! to the `go-get=1` protocol for everything else:
//!
//! ```text
//! GET https://example.org/pkg/sub?go-get=1
//! <meta name="go-import" content="example.org/pkg git https://git.example.org/pkg">
//! ```
//!
//! The lookup is a collaborator of the root resolver and of the Git fetcher;
//! both hold it as `Arc<dyn RootLookup>` so tests can substitute a fake.

use anyhow::Result;
use regex::Regex;
use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;

use crate::constants::GO_IMPORT_LOOKUP_TIMEOUT;
use crate::core::VndrError;

/// Boxed future returned by [`RootLookup::lookup`].
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<RepoRoot>> + Send + 'a>>;

/// Repository root of an import path and where to clone it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot {
    /// Shortest import path naming the whole repository.
    pub root: String,
    /// Git URL of the repository.
    pub repo_url: String,
}

impl RepoRoot {
    /// Create a root whose clone URL is `https://<root>`.
    pub fn https(root: impl Into<String>) -> Self {
        let root = root.into();
        let repo_url = format!("https://{root}");
        Self {
            root,
            repo_url,
        }
    }
}

/// Capability to map an import path to its repository root.
pub trait RootLookup: Send + Sync {
    /// Resolve the repository root of `import_path`.
    ///
    /// Errors are fatal to validation; implementations should return
    /// [`VndrError::RootLookupFailed`].
    fn lookup<'a>(&'a self, import_path: &'a str) -> LookupFuture<'a>;
}

/// Root lookup with built-in host rules and `go-get=1` discovery.
#[derive(Debug, Clone)]
pub struct KnownHostLookup {
    client: reqwest::Client,
}

impl KnownHostLookup {
    /// Create a lookup with an HTTP client bounded by [`GO_IMPORT_LOOKUP_TIMEOUT`].
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().timeout(GO_IMPORT_LOOKUP_TIMEOUT).build()?;
        Ok(Self {
            client,
        })
    }

    async fn discover(&self, import_path: &str) -> Result<RepoRoot> {
        let url = format!("https://{import_path}?go-get=1");
        tracing::debug!("Discovering repository root via {}", url);

        let failed = |reason: String| VndrError::RootLookupFailed {
            import_path: import_path.to_string(),
            reason,
        };

        let response = self.client.get(&url).send().await.map_err(|e| failed(e.to_string()))?;
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;

        parse_go_import_meta(&body, import_path)
            .ok_or_else(|| failed(format!("no matching go-import meta tag at {url}")).into())
    }
}

impl RootLookup for KnownHostLookup {
    fn lookup<'a>(&'a self, import_path: &'a str) -> LookupFuture<'a> {
        Box::pin(async move {
            if let Some(known) = known_host_root(import_path) {
                return known.map_err(Into::into);
            }
            self.discover(import_path).await
        })
    }
}

/// Apply the static rules for well-known hosts.
///
/// Returns `None` when the host has no static rule and discovery is needed.
pub fn known_host_root(import_path: &str) -> Option<Result<RepoRoot, VndrError>> {
    let parts: Vec<&str> = import_path.split('/').collect();
    let invalid = |reason: &str| {
        Some(Err(VndrError::RootLookupFailed {
            import_path: import_path.to_string(),
            reason: reason.to_string(),
        }))
    };

    if let Some(reason) = invalid_path_element(import_path) {
        return invalid(reason);
    }
    if !parts[0].contains('.') {
        return invalid("import path does not begin with a hostname");
    }

    match parts[0] {
        "github.com" | "bitbucket.org" | "gitlab.com" => {
            if parts.len() < 3 {
                return invalid("expected <host>/<owner>/<repository>");
            }
            Some(Ok(RepoRoot::https(parts[..3].join("/"))))
        }
        "gopkg.in" => {
            // gopkg.in/pkg.v1 or gopkg.in/user/pkg.v1
            let depth = if parts.len() >= 2 && is_gopkg_versioned(parts[1]) { 2 } else { 3 };
            if parts.len() < depth || !is_gopkg_versioned(parts[depth - 1]) {
                return invalid("expected gopkg.in/<pkg>.vN or gopkg.in/<user>/<pkg>.vN");
            }
            Some(Ok(RepoRoot::https(parts[..depth].join("/"))))
        }
        "golang.org" if parts.len() >= 2 && parts[1] == "x" => {
            if parts.len() < 3 {
                return invalid("expected golang.org/x/<repository>");
            }
            Some(Ok(RepoRoot {
                root: parts[..3].join("/"),
                repo_url: format!("https://go.googlesource.com/{}", parts[2]),
            }))
        }
        _ => None,
    }
}

/// Why `import_path` cannot name a directory below the vendor root, if it
/// cannot: empty, `.` and `..` elements are rejected as `go get` does.
pub fn invalid_path_element(import_path: &str) -> Option<&'static str> {
    import_path.split('/').find_map(|element| match element {
        "" => Some("empty path element"),
        "." | ".." => Some("relative path element"),
        _ => None,
    })
}

fn is_gopkg_versioned(element: &str) -> bool {
    element.rsplit_once(".v").is_some_and(|(name, major)| {
        !name.is_empty() && !major.is_empty() && major.chars().all(|c| c.is_ascii_digit())
    })
}

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s[^>]*name\s*=\s*["']go-import["'][^>]*>"#).expect("valid regex")
});
static META_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)content\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Extract the repository root for `import_path` from a `go-get=1` response.
///
/// Only `git` entries are considered; when several prefixes match, the
/// longest one wins.
pub fn parse_go_import_meta(html: &str, import_path: &str) -> Option<RepoRoot> {
    META_TAG
        .find_iter(html)
        .filter_map(|tag| META_CONTENT.captures(tag.as_str()))
        .filter_map(|caps| {
            let fields: Vec<&str> = caps[1].split_whitespace().collect();
            match fields.as_slice() {
                [prefix, "git", url] => Some(RepoRoot {
                    root: (*prefix).to_string(),
                    repo_url: (*url).to_string(),
                }),
                _ => None,
            }
        })
        .filter(|root| {
            import_path == root.root || import_path.starts_with(&format!("{}/", root.root))
        })
        .max_by_key(|root| root.root.len())
}
