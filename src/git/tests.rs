#[cfg(test)]
mod git_tests {
    use crate::core::VndrError;
    use crate::git::{GitFetcher, import_dir, is_git_installed};
    use crate::manifest::DependencyEntry;
    use crate::source::Fetcher;
    use crate::test_utils::StaticRootLookup;

    use std::path::{Path, PathBuf};
    use std::process::Command;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(["-c", "user.name=vndr", "-c", "user.email=vndr@example.com", "-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {args:?}: {}", String::from_utf8_lossy(&output.stderr));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Repository with two commits; returns its path and both commit ids.
    fn upstream(temp: &TempDir) -> (PathBuf, String, String) {
        let repo = temp.path().join("upstream");
        std::fs::create_dir_all(&repo).unwrap();
        git(&repo, &["init", "--quiet"]);

        std::fs::write(repo.join("lib.go"), "package lib\n").unwrap();
        git(&repo, &["add", "."]);
        git(&repo, &["commit", "--quiet", "-m", "first"]);
        let first = git(&repo, &["rev-parse", "HEAD"]);

        std::fs::write(repo.join("lib.go"), "package lib\n\nconst V = 2\n").unwrap();
        git(&repo, &["commit", "--quiet", "-am", "second"]);
        let second = git(&repo, &["rev-parse", "HEAD"]);

        (repo, first, second)
    }

    fn fetcher_for(root: &str, repo: &Path) -> GitFetcher {
        let lookup = StaticRootLookup::new().with_repo(root, &repo.to_string_lossy());
        GitFetcher::new(Arc::new(lookup))
    }

    #[test]
    fn test_import_dir() {
        let dir = import_dir(Path::new("vendor"), "github.com/a/b");
        assert_eq!(dir, Path::new("vendor").join("github.com").join("a").join("b"));
    }

    #[tokio::test]
    async fn test_relative_root_is_rejected_before_touching_vendor() {
        let temp = TempDir::new().unwrap();
        let vendor = temp.path().join("vendor");
        let sibling = vendor.join("github.com/other/repo/keep.go");
        std::fs::create_dir_all(sibling.parent().unwrap()).unwrap();
        std::fs::write(&sibling, "package repo\n").unwrap();
        let fetcher = GitFetcher::new(Arc::new(StaticRootLookup::new()));

        let entry = DependencyEntry::new("github.com/x/..", "v1").with_override("https://example.com/x.git");
        let err = fetcher.fetch(&entry, &vendor).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<VndrError>(), Some(VndrError::RootLookupFailed { .. })));
        assert!(sibling.exists());
    }

    #[tokio::test]
    async fn test_fetch_pinned_revision() {
        if !is_git_installed() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let (repo, first, _) = upstream(&temp);
        let vendor = temp.path().join("vendor");
        let fetcher = fetcher_for("example.com/lib", &repo);

        let entry = DependencyEntry::new("example.com/lib/sub", first.as_str());
        let fetched = fetcher.fetch(&entry, &vendor).await.unwrap();

        assert_eq!(fetched.root_import_path, "example.com/lib");
        assert_eq!(fetched.revision, first);
        let target = vendor.join("example.com/lib");
        assert_eq!(std::fs::read_to_string(target.join("lib.go")).unwrap(), "package lib\n");
        assert!(!target.join(".git").exists());
    }

    #[tokio::test]
    async fn test_fetch_without_revision_reports_head() {
        if !is_git_installed() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let (repo, _, second) = upstream(&temp);
        let vendor = temp.path().join("vendor");
        let fetcher = fetcher_for("example.com/lib", &repo);

        let fetched = fetcher.fetch(&DependencyEntry::new("example.com/lib", ""), &vendor).await.unwrap();
        assert_eq!(fetched.revision, second);
    }

    #[tokio::test]
    async fn test_fetch_replaces_existing_tree() {
        if !is_git_installed() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let (repo, first, _) = upstream(&temp);
        let vendor = temp.path().join("vendor");
        let stale = vendor.join("example.com/lib/stale.go");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "package lib\n").unwrap();

        let fetcher = fetcher_for("example.com/lib", &repo);
        fetcher.fetch(&DependencyEntry::new("example.com/lib", first.as_str()), &vendor).await.unwrap();

        assert!(!stale.exists());
        assert!(vendor.join("example.com/lib/lib.go").exists());
    }

    #[tokio::test]
    async fn test_override_skips_lookup() {
        if !is_git_installed() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let (repo, first, _) = upstream(&temp);
        let vendor = temp.path().join("vendor");
        let lookup = Arc::new(StaticRootLookup::new());
        let fetcher = GitFetcher::new(lookup.clone());

        let entry = DependencyEntry::new("golang.org/x/lib", first.as_str()).with_override(repo.to_string_lossy());
        let fetched = fetcher.fetch(&entry, &vendor).await.unwrap();

        assert_eq!(fetched.root_import_path, "golang.org/x/lib");
        assert!(vendor.join("golang.org/x/lib/lib.go").exists());
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_revision_fails_checkout() {
        if !is_git_installed() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let (repo, _, _) = upstream(&temp);
        let fetcher = fetcher_for("example.com/lib", &repo);

        let entry = DependencyEntry::new("example.com/lib", "no-such-revision");
        let err = fetcher.fetch(&entry, &temp.path().join("vendor")).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<VndrError>(), Some(VndrError::GitCheckoutFailed { .. })));
    }

    #[tokio::test]
    async fn test_missing_repository_fails_clone() {
        if !is_git_installed() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let fetcher = fetcher_for("example.com/lib", &temp.path().join("absent"));

        let err = fetcher
            .fetch(&DependencyEntry::new("example.com/lib", "v1"), &temp.path().join("vendor"))
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<VndrError>(), Some(VndrError::GitCloneFailed { .. })));
    }
}
