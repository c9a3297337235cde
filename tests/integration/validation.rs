use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use crate::vndr_cmd;

fn project_with_config(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.go"), "package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println() }\n").unwrap();
    fs::write(temp.path().join("vendor.conf"), config).unwrap();
    temp
}

#[test]
fn test_malformed_config_fails() {
    if !vndr::git::is_git_installed() {
        return;
    }
    let temp = project_with_config("# pinned\ngithub.com/foo/bar\n");

    vndr_cmd(temp.path())
        .args(["--import-path", "example.com/me/proj"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid config format: github.com/foo/bar"));
    assert!(!temp.path().join("vendor").exists());
}

#[test]
fn test_misrooted_entry_writes_suggestion() {
    if !vndr::git::is_git_installed() {
        return;
    }
    let temp = project_with_config("github.com/foo/bar/sub v1.2.3\n");

    vndr_cmd(temp.path())
        .args(["--import-path", "example.com/me/proj"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package github.com/foo/bar/sub is not root import, should be github.com/foo/bar"))
        .stderr(predicate::str::contains("suggested config is written to"));

    let suggestion = fs::read_to_string(temp.path().join("vendor.conf.tmp")).unwrap();
    assert_eq!(suggestion, "github.com/foo/bar v1.2.3\n");
    assert_eq!(fs::read_to_string(temp.path().join("vendor.conf")).unwrap(), "github.com/foo/bar/sub v1.2.3\n");
}

#[test]
fn test_conflicting_entries_are_merged() {
    if !vndr::git::is_git_installed() {
        return;
    }
    let temp = project_with_config("github.com/foo/bar/a v1\ngithub.com/foo/bar/b v2\n");

    vndr_cmd(temp.path())
        .args(["--import-path", "example.com/me/proj"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("packages 'github.com/foo/bar/a, github.com/foo/bar/b' has same root import github.com/foo/bar"));

    let suggestion = fs::read_to_string(temp.path().join("vendor.conf.tmp")).unwrap();
    assert_eq!(suggestion, "github.com/foo/bar v1\n");
}

#[test]
fn test_missing_config_fails() {
    if !vndr::git::is_git_installed() {
        return;
    }
    let temp = TempDir::new().unwrap();

    vndr_cmd(temp.path())
        .args(["--import-path", "example.com/me/proj"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open config file"));
}
