#[cfg(test)]
mod cleaner_tests {
    use crate::cleaner::{Whitelist, check_license, check_unused, clean_vendor};
    use crate::collector::PackageClosure;
    use crate::core::{VndrError, Warnings};
    use crate::manifest::DependencyEntry;
    use crate::test_utils::write_file;

    use std::path::Path;
    use tempfile::TempDir;

    fn closure_of(vendor: &Path, paths: &[&str]) -> PackageClosure {
        paths.iter().map(|p| (*p, vendor.join(p))).collect()
    }

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let vendor = temp.path();
        write_file(vendor, "pkgA/a.go", "package pkgA\n");
        write_file(vendor, "pkgB/b.go", "package pkgB\n");
        write_file(vendor, "extra/e.go", "package extra\n");
        write_file(vendor, "extra/nested/n.go", "package nested\n");
        temp
    }

    #[test]
    fn test_prunes_paths_outside_closure() {
        let temp = sample_tree();
        let vendor = temp.path();
        let closure = closure_of(vendor, &["pkgA", "pkgB"]);

        let report = clean_vendor(vendor, &closure, &Whitelist::default()).unwrap();

        assert!(vendor.join("pkgA/a.go").exists());
        assert!(vendor.join("pkgB/b.go").exists());
        assert!(!vendor.join("extra").exists());
        assert_eq!(report.removed_files, 2);
        assert_eq!(report.removed_dirs, 2);
        assert!(report.preserved.is_empty());
    }

    #[test]
    fn test_whitelist_preserves_subtree() {
        let temp = sample_tree();
        let vendor = temp.path();
        let closure = closure_of(vendor, &["pkgA", "pkgB"]);
        let whitelist = Whitelist::parse(&["^extra/"]).unwrap();

        let report = clean_vendor(vendor, &closure, &whitelist).unwrap();

        assert!(vendor.join("extra/e.go").exists());
        assert!(vendor.join("extra/nested/n.go").exists());
        assert!(report.is_noop());
        assert_eq!(report.preserved, vec!["extra".to_string()]);
    }

    #[test]
    fn test_whitelist_matches_nested_files() {
        let temp = TempDir::new().unwrap();
        let vendor = temp.path();
        write_file(vendor, "github.com/a/b/b.go", "package b\n");
        write_file(vendor, "github.com/a/b/proto/api.proto", "syntax = \"proto3\";\n");
        write_file(vendor, "github.com/a/b/tools/gen.go", "package tools\n");
        let closure = closure_of(vendor, &["github.com/a/b"]);
        let whitelist = Whitelist::parse(&[r"\.proto$"]).unwrap();

        clean_vendor(vendor, &closure, &whitelist).unwrap();

        assert!(vendor.join("github.com/a/b/proto/api.proto").exists());
        assert!(!vendor.join("github.com/a/b/tools").exists());
    }

    #[test]
    fn test_second_run_is_noop() {
        let temp = sample_tree();
        let vendor = temp.path();
        let closure = closure_of(vendor, &["pkgA"]);

        let first = clean_vendor(vendor, &closure, &Whitelist::default()).unwrap();
        assert!(!first.is_noop());
        let second = clean_vendor(vendor, &closure, &Whitelist::default()).unwrap();
        assert!(second.is_noop());
        assert!(vendor.join("pkgA/a.go").exists());
    }

    #[test]
    fn test_keeps_licenses_above_used_subpackages() {
        let temp = TempDir::new().unwrap();
        let vendor = temp.path();
        write_file(vendor, "github.com/a/b/LICENSE", "MIT");
        write_file(vendor, "github.com/a/b/README.md", "readme");
        write_file(vendor, "github.com/a/b/b.go", "package b\n");
        write_file(vendor, "github.com/a/b/sub/sub.go", "package sub\n");
        write_file(vendor, "github.com/a/b/sub/sub_test.go", "package sub\n");
        write_file(vendor, "github.com/a/b/sub/deeper/d.go", "package deeper\n");
        write_file(vendor, "github.com/a/b/other/NOTICE", "notice");
        let closure = closure_of(vendor, &["github.com/a/b/sub"]);

        clean_vendor(vendor, &closure, &Whitelist::default()).unwrap();

        assert!(vendor.join("github.com/a/b/LICENSE").exists());
        assert!(vendor.join("github.com/a/b/sub/sub.go").exists());
        assert!(vendor.join("github.com/a/b/sub/sub_test.go").exists());
        assert!(!vendor.join("github.com/a/b/README.md").exists());
        assert!(!vendor.join("github.com/a/b/b.go").exists());
        assert!(!vendor.join("github.com/a/b/sub/deeper").exists());
        assert!(!vendor.join("github.com/a/b/other").exists());
    }

    #[test]
    fn test_missing_vendor_root() {
        let temp = TempDir::new().unwrap();
        let report =
            clean_vendor(&temp.path().join("vendor"), &PackageClosure::new(), &Whitelist::default()).unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn test_invalid_whitelist() {
        let err = Whitelist::parse(&["ok", "(unclosed"]).unwrap_err();
        assert!(matches!(err, VndrError::InvalidWhitelist { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_check_unused() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "github.com/a/b/b.go", "package b\n");
        let entries = vec![DependencyEntry::new("github.com/a/b", "v1"), DependencyEntry::new("github.com/gone/x", "v2")];
        let warnings = Warnings::new();

        let unused = check_unused(&entries, temp.path(), &warnings);

        assert_eq!(unused, vec!["github.com/gone/x"]);
        assert_eq!(
            warnings.messages(),
            vec!["package github.com/gone/x is unused, consider removing it from vendor.conf"]
        );
    }

    #[test]
    fn test_check_license_is_advisory() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "github.com/a/licensed/COPYING", "GPL");
        write_file(temp.path(), "github.com/a/bare/bare.go", "package bare\n");
        let entries = vec![
            DependencyEntry::new("github.com/a/licensed", "v1"),
            DependencyEntry::new("github.com/a/bare", "v1"),
            DependencyEntry::new("github.com/a/gone", "v1"),
        ];

        assert_eq!(check_license(&entries, temp.path(), false), vec!["github.com/a/bare"]);
        assert_eq!(check_license(&entries, temp.path(), true), vec!["github.com/a/bare"]);
        assert!(temp.path().join("github.com/a/bare/bare.go").exists());
    }
}
